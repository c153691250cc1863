//! Live camera overlays.
//!
//! [`LiveOverlay`] runs the "detect, then draw" loop over a stream of captured images. Pose
//! detection itself is delegated to a [`PoseDetector`]; this module only sequences it with
//! drawing, and provides a [`StopHandle`] for ending the loop from elsewhere.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use image::RgbaImage;

use crate::body::{Connection, POSE_CONNECTIONS};
use crate::draw::Canvas;
use crate::ingest::{Feedback, Score};
use crate::landmark::Landmarks;
use crate::overlay::{self, OverlayStyle, Source};
use crate::scoring;
use crate::timer::{FpsCounter, Timer};

/// Finds the landmarks of a person in a captured image.
pub trait PoseDetector {
    fn detect(&mut self, image: &RgbaImage) -> anyhow::Result<Landmarks>;
}

impl<F> PoseDetector for F
where
    F: FnMut(&RgbaImage) -> anyhow::Result<Landmarks>,
{
    fn detect(&mut self, image: &RgbaImage) -> anyhow::Result<Landmarks> {
        self(image)
    }
}

/// Ends a running [`LiveOverlay`] loop. Can be cloned and sent to other threads.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop to stop. It finishes the frame it is working on, if any.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A processed frame, passed to the callback of [`LiveOverlay::run`].
pub struct LiveFrame<'a> {
    /// Number of frames processed before this one.
    pub index: usize,
    pub landmarks: &'a Landmarks,
    /// Visibility-based score of `landmarks`.
    pub score: Score,
    /// Coaching message for `score`.
    pub feedback: Feedback,
    /// The captured image with the skeleton drawn on top.
    pub canvas: &'a Canvas,
}

pub struct LiveOverlay<D> {
    detector: D,
    connections: Vec<Connection>,
    style: OverlayStyle,
    stop: StopHandle,
}

impl<D: PoseDetector> LiveOverlay<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            connections: POSE_CONNECTIONS.to_vec(),
            style: OverlayStyle::default(),
            stop: StopHandle::new(),
        }
    }

    pub fn with_connections(mut self, connections: impl Into<Vec<Connection>>) -> Self {
        self.connections = connections.into();
        self
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns a handle that stops [`LiveOverlay::run`].
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Processes `frames` until the stream ends or the loop is stopped.
    ///
    /// Every frame is passed to the detector, then drawn with its landmarks, scored, and handed to
    /// `on_frame`. A failure to capture or detect ends the loop with an error.
    ///
    /// The captured images may change resolution mid-stream; the canvas follows them.
    ///
    /// Returns the number of frames processed.
    pub fn run<I, F>(&mut self, frames: I, mut on_frame: F) -> anyhow::Result<usize>
    where
        I: IntoIterator<Item = anyhow::Result<RgbaImage>>,
        F: FnMut(LiveFrame<'_>),
    {
        let mut frames = frames.into_iter();
        let mut canvas = Canvas::new(0, 0);
        let mut fps = FpsCounter::new("live overlay");
        let mut t_detect = Timer::new("detect");
        let mut t_draw = Timer::new("draw");
        let mut count = 0;

        while !self.stop.is_stopped() {
            let Some(frame) = frames.next() else {
                log::debug!("frame source ended after {} frames", count);
                return Ok(count);
            };
            let image = frame.with_context(|| format!("failed to capture frame {}", count))?;
            let (width, height) = image.dimensions();

            let detector = &mut self.detector;
            let landmarks = t_detect
                .time(|| detector.detect(&image))
                .with_context(|| format!("pose detection failed on frame {}", count))?;

            t_draw.time(|| {
                canvas.set_background(Some(image));
                overlay::render(
                    &mut canvas,
                    &Source::video(width, height, None),
                    &landmarks,
                    &self.connections,
                    &self.style,
                );
            });

            let score = scoring::visibility_score(&landmarks);
            on_frame(LiveFrame {
                index: count,
                landmarks: &landmarks,
                feedback: scoring::feedback_for(score.overall()),
                score,
                canvas: &canvas,
            });
            count += 1;
            fps.tick_with([&t_detect, &t_draw]);
        }

        log::debug!("live overlay stopped after {} frames", count);
        Ok(count)
    }
}
