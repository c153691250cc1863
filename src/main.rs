use std::path::PathBuf;

use anyhow::Context;
use chrono::TimeZone;
use clap::{Parser, Subcommand};
use poseview::adapter::{Overlay, Redraw, SourceEvent};
use poseview::config::Config;
use poseview::draw::Canvas;
use poseview::history::{Entry, HistoryLog, Kind};
use poseview::ingest::Analysis;
use poseview::timeline::{score_badge, Timeline};

/// Draws skeletal overlays for pose estimation results.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Draws the landmarks of an image analysis on top of the analysed image.
    Image {
        analysis: PathBuf,
        image: PathBuf,
        out: PathBuf,
        /// Also draw the overall score in the top left corner.
        #[arg(long)]
        badge: bool,
    },
    /// Draws the frame of a video analysis shown at a playback time, on a transparent canvas.
    Frame {
        analysis: PathBuf,
        /// Playback time in seconds.
        #[arg(long)]
        time: f64,
        /// Video duration in seconds, if the analysis does not carry one.
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        out: PathBuf,
    },
    /// Draws the per-frame score chart of a video analysis.
    Timeline {
        analysis: PathBuf,
        out: PathBuf,
        #[arg(long, default_value_t = 800)]
        width: u32,
    },
    /// Manages the history of past analyses.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Lists past analyses, most recent first.
    List {
        #[arg(long)]
        kind: Option<Kind>,
    },
    Add {
        #[arg(long)]
        kind: Kind,
        #[arg(long)]
        score: f32,
        #[arg(long)]
        thumbnail: Option<String>,
    },
    Remove {
        id: String,
    },
    Clear,
}

fn main() -> anyhow::Result<()> {
    poseview::init_logger!();

    match Cli::parse().command {
        Command::Image {
            analysis,
            image: image_path,
            out,
            badge,
        } => {
            let analysis = Analysis::load(&analysis)?;
            let score = analysis.overall_score();
            let image = image::open(&image_path)
                .with_context(|| format!("failed to load '{}'", image_path.display()))?
                .to_rgba8();
            let (width, height) = image.dimensions();

            let mut overlay = Overlay::for_analysis(Canvas::with_background(image), analysis);
            overlay.handle(SourceEvent::Loaded { width, height });
            let mut canvas = overlay.into_surface();
            if let (true, Some(score)) = (badge, score) {
                score_badge(&mut canvas, score);
            }
            canvas.save(&out)?;
        }
        Command::Frame {
            analysis,
            time,
            duration,
            width,
            height,
            out,
        } => {
            let analysis = Analysis::load(&analysis)?;
            let duration = duration.or(analysis.duration);

            let mut overlay = Overlay::for_analysis(Canvas::new(width, height), analysis);
            overlay.handle(SourceEvent::MetadataLoaded {
                width,
                height,
                duration,
            });
            match overlay.handle(SourceEvent::Seeked(time)) {
                Redraw::Drawn(Some(index)) => log::info!("showing frame {} at {}s", index, time),
                _ => log::info!("analysis has no frames, drew its top-level landmarks"),
            }
            overlay.into_surface().save(&out)?;
        }
        Command::Timeline {
            analysis,
            out,
            width,
        } => {
            let analysis = Analysis::load(&analysis)?;
            if analysis.frames.is_empty() {
                log::warn!("analysis has no frames, the timeline will be empty");
            }
            let timeline = Timeline::new(width);
            let (w, h) = timeline.size();
            let mut canvas = Canvas::new(w, h);
            timeline.draw(&mut canvas, &analysis.frames);
            canvas.save(&out)?;
        }
        Command::History { command } => history(command)?,
    }

    Ok(())
}

fn history(command: HistoryCommand) -> anyhow::Result<()> {
    let config = Config::from_env();
    let mut history = HistoryLog::new(config.history_store());

    match command {
        HistoryCommand::List { kind } => {
            let records = match kind {
                Some(kind) => history.filter(kind)?,
                None => history.list()?,
            };
            for record in records {
                let time = chrono::Local
                    .timestamp_millis_opt(record.timestamp)
                    .single()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {:<5}  {:>5.1}  {}",
                    record.id,
                    record.kind.as_str(),
                    record.score,
                    time
                );
            }
        }
        HistoryCommand::Add {
            kind,
            score,
            thumbnail,
        } => {
            let mut entry = Entry::new(kind, score);
            entry.thumbnail = thumbnail;
            println!("{}", history.append(entry)?);
        }
        HistoryCommand::Remove { id } => {
            if !history.remove(&id)? {
                anyhow::bail!("no analysis with id '{}' in history", id);
            }
        }
        HistoryCommand::Clear => history.clear()?,
    }
    Ok(())
}
