//! Per-frame score chart for analysed videos, plus the score badge drawn over video frames.

use itertools::Itertools;

use crate::draw::{Align, Color, Font, Pos, Stroke, Surface};
use crate::ingest::Frame;

/// Space around the graph area, in pixels. Axis labels are drawn inside it.
pub const PADDING: f32 = 40.0;

pub const DEFAULT_HEIGHT: u32 = 150;

/// Frame rate assumed when a frame only has a frame number.
pub const DEFAULT_FPS: f64 = 30.0;

const GRID_ROWS: usize = 4;
const GRID_COLOR: Color = Color::from_hex(0x374151);
const LABEL_COLOR: Color = Color::from_hex(0x9ca3af);
const LINE_COLOR: Color = Color::from_hex(0x3b82f6);
const POINT_RADIUS: f32 = 4.0;

/// Color for a 0-100 score: green from 80 up, amber from 60 up, red below.
pub fn score_color(score: f32) -> Color {
    if score >= 80.0 {
        Color::from_hex(0x10b981)
    } else if score >= 60.0 {
        Color::from_hex(0xf59e0b)
    } else {
        Color::from_hex(0xef4444)
    }
}

/// Playback time of `frame` in seconds, derived from its frame number if it has no timestamp.
pub fn frame_time(frame: &Frame, fps: f64) -> f64 {
    frame
        .timestamp
        .unwrap_or_else(|| frame.frame_number.unwrap_or(0) as f64 / fps)
}

/// Formats a number of seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    // NaN and negative times saturate to 0
    let seconds = seconds as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Layout of the score chart.
///
/// Frames are spread evenly over the width of the graph area, scores from 0 (bottom) to 100
/// (top) over its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    width: u32,
    height: u32,
}

impl Timeline {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_height(self, height: u32) -> Self {
        Self { height, ..self }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn graph_size(&self) -> (f32, f32) {
        (
            (self.width as f32 - PADDING * 2.0).max(0.0),
            (self.height as f32 - PADDING * 2.0).max(0.0),
        )
    }

    fn x(&self, index: usize, count: usize) -> f32 {
        let (graph_width, _) = self.graph_size();
        if count > 1 {
            PADDING + graph_width / (count - 1) as f32 * index as f32
        } else {
            PADDING + graph_width / 2.0
        }
    }

    /// Position of the data point of frame `index` out of `count`, with the given score.
    ///
    /// Scores outside of 0-100 are clamped to the graph area.
    pub fn point(&self, index: usize, count: usize, score: f32) -> Pos {
        let (_, graph_height) = self.graph_size();
        let score = score.clamp(0.0, 100.0);
        [
            self.x(index, count),
            PADDING + graph_height - score / 100.0 * graph_height,
        ]
    }

    /// Maps a click at horizontal position `x` back to the nearest frame index.
    ///
    /// Returns [`None`] if the click does not land on any frame.
    pub fn frame_at(&self, x: f32, count: usize) -> Option<usize> {
        let (graph_width, _) = self.graph_size();
        if count == 0 || graph_width <= 0.0 {
            return None;
        }
        let index = ((x - PADDING) / graph_width * (count - 1) as f32).round();
        if index < 0.0 || index >= count as f32 {
            None
        } else {
            Some(index as usize)
        }
    }

    /// Draws the chart for `frames` onto `surface`, resizing the surface to fit.
    ///
    /// Nothing but the cleared surface is left if there are no frames.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, frames: &[Frame]) {
        surface.resize(self.width, self.height);
        surface.clear();
        if frames.is_empty() {
            return;
        }

        let (graph_width, graph_height) = self.graph_size();
        for row in 0..=GRID_ROWS {
            let y = PADDING + graph_height / GRID_ROWS as f32 * row as f32;
            surface.line(
                [PADDING, y],
                [PADDING + graph_width, y],
                Stroke::new(GRID_COLOR, 1),
            );
            let label = 100 - row * (100 / GRID_ROWS);
            surface.text(
                [PADDING - 10.0, y],
                &label.to_string(),
                LABEL_COLOR,
                Font::Small,
                Align::Right,
            );
        }

        let count = frames.len();
        let points = frames
            .iter()
            .enumerate()
            .map(|(i, frame)| (self.point(i, count, frame.overall_score()), frame.overall_score()))
            .collect::<Vec<_>>();

        for ((start, _), (end, _)) in points.iter().tuple_windows() {
            surface.line(*start, *end, Stroke::new(LINE_COLOR, 3));
        }
        for &(pos, score) in &points {
            surface.circle(
                pos,
                POINT_RADIUS,
                score_color(score),
                Stroke::new(Color::WHITE, 2),
            );
        }

        let step = (count + 4) / 5;
        for (i, frame) in frames.iter().enumerate().step_by(step) {
            surface.text(
                [self.x(i, count), self.height as f32 - 10.0],
                &format_time(frame_time(frame, DEFAULT_FPS)),
                LABEL_COLOR,
                Font::Small,
                Align::Center,
            );
        }
    }
}

/// Draws the rounded score and a `SCORE` caption on a translucent box in the top left corner.
pub fn score_badge<S: Surface + ?Sized>(surface: &mut S, score: f32) {
    let rounded = score.round();
    surface.rect([20.0, 20.0], [120.0, 60.0], Color::BLACK.with_alpha(179));
    surface.text(
        [45.0, 50.0],
        &format!("{}", rounded),
        score_color(rounded),
        Font::Large,
        Align::Left,
    );
    surface.text([80.0, 50.0], "SCORE", Color::WHITE, Font::Small, Align::Left);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::draw::Recording;
    use crate::ingest::Analysis;
    use crate::test::VIDEO_RESULT;

    #[test]
    fn color_tiers() {
        assert_eq!(score_color(95.0), Color::from_hex(0x10b981));
        assert_eq!(score_color(80.0), Color::from_hex(0x10b981));
        assert_eq!(score_color(79.9), Color::from_hex(0xf59e0b));
        assert_eq!(score_color(60.0), Color::from_hex(0xf59e0b));
        assert_eq!(score_color(59.0), Color::from_hex(0xef4444));
    }

    #[test]
    fn times() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(75.9), "1:15");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");

        let mut frame = Frame::new(None, Default::default());
        frame.frame_number = Some(45);
        assert_relative_eq!(frame_time(&frame, DEFAULT_FPS), 1.5);
        frame.timestamp = Some(2.25);
        assert_relative_eq!(frame_time(&frame, DEFAULT_FPS), 2.25);
    }

    #[test]
    fn layout() {
        let timeline = Timeline::new(480);
        assert_eq!(timeline.size(), (480, 150));
        assert_eq!(timeline.point(0, 5, 0.0), [40.0, 110.0]);
        assert_eq!(timeline.point(4, 5, 100.0), [440.0, 40.0]);
        assert_eq!(timeline.point(2, 5, 150.0), [240.0, 40.0]);
        assert_eq!(timeline.point(0, 1, 50.0), [240.0, 75.0]);
    }

    #[test]
    fn click_to_frame() {
        let timeline = Timeline::new(480);
        assert_eq!(timeline.frame_at(40.0, 5), Some(0));
        assert_eq!(timeline.frame_at(140.0, 5), Some(1));
        assert_eq!(timeline.frame_at(180.0, 5), Some(1));
        assert_eq!(timeline.frame_at(460.0, 5), Some(4));
        assert_eq!(timeline.frame_at(500.0, 5), None);
        assert_eq!(timeline.frame_at(-100.0, 5), None);
        assert_eq!(timeline.frame_at(100.0, 0), None);
        assert_eq!(Timeline::new(60).frame_at(10.0, 5), None);
    }

    #[test]
    fn chart() {
        let analysis = Analysis::from_json(VIDEO_RESULT).unwrap();
        let mut rec = Recording::new(0, 0);
        Timeline::new(480).draw(&mut rec, &analysis.frames);

        assert_eq!(rec.size(), (480, 150));
        // 5 grid lines, 3 segments between 4 points
        assert_eq!(rec.lines().count(), 8);
        let colors = rec.circles().map(|(_, c)| c).collect::<Vec<_>>();
        assert_eq!(
            colors,
            vec![
                score_color(90.0),
                score_color(75.0),
                score_color(55.0),
                score_color(70.0)
            ]
        );
        let texts = rec.texts().collect::<Vec<_>>();
        assert_eq!(
            texts,
            vec!["100", "75", "50", "25", "0", "0:00", "0:00", "0:01", "0:01"]
        );

        Timeline::new(480).draw(&mut rec, &[]);
        assert!(rec.ops().is_empty());
    }

    #[test]
    fn badge() {
        let mut rec = Recording::new(640, 480);
        score_badge(&mut rec, 72.6);
        assert_eq!(rec.texts().collect::<Vec<_>>(), vec!["73", "SCORE"]);
    }
}
