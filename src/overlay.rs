//! Skeleton overlay rendering.
//!
//! [`render`] is a pure function of its inputs: it sizes the surface to match the visual source,
//! clears it, and draws bones and joints. Calling it twice with the same inputs produces the same
//! surface contents.

use crate::body::Connection;
use crate::draw::{Color, Stroke, Surface};
use crate::landmark::{Landmarks, VISIBILITY_THRESHOLD};

/// Colors and sizes used when drawing a skeleton.
///
/// Both bones and joints are colored by confidence in three tiers: above
/// [`OverlayStyle::high_confidence`] uses [`OverlayStyle::high`], above
/// [`VISIBILITY_THRESHOLD`] uses [`OverlayStyle::medium`], and anything else uses
/// [`OverlayStyle::low`]. Bones use the mean visibility of their two endpoints.
///
/// Since landmarks at or below the visibility threshold are never drawn, the low tier only shows
/// up when a caller colors something else by confidence (see [`OverlayStyle::color_for`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub high_confidence: f32,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
    pub bone_width: u32,
    pub joint_radius: f32,
    pub joint_outline: Stroke,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            high: Color::from_hex(0x00ff00),
            medium: Color::from_hex(0xffff00),
            low: Color::from_hex(0xff0000),
            bone_width: 4,
            joint_radius: 6.0,
            joint_outline: Stroke::new(Color::BLACK, 2),
        }
    }
}

impl OverlayStyle {
    /// Maps a confidence value onto the three color tiers.
    pub fn color_for(&self, confidence: f32) -> Color {
        if confidence > self.high_confidence {
            self.high
        } else if confidence > VISIBILITY_THRESHOLD {
            self.medium
        } else {
            self.low
        }
    }
}

/// The state of the visual source an overlay belongs to (an image or a video element).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Source {
    dimensions: Option<(u32, u32)>,
    current_time: f64,
    duration: Option<f64>,
}

impl Source {
    /// A source that has not finished loading; its dimensions are unknown.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A decoded still image.
    pub fn image(width: u32, height: u32) -> Self {
        Self {
            dimensions: Some((width, height)),
            ..Self::default()
        }
    }

    /// A video whose metadata has loaded, positioned at its start.
    pub fn video(width: u32, height: u32, duration: Option<f64>) -> Self {
        Self {
            dimensions: Some((width, height)),
            current_time: 0.0,
            duration,
        }
    }

    /// Returns a copy of `self` positioned at playback time `time`.
    pub fn at(self, time: f64) -> Self {
        Self {
            current_time: time,
            ..self
        }
    }

    /// Native `(width, height)` of the source, if it has loaded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn is_loaded(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Current playback position, in seconds. Always 0 for still images.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn set_dimensions(&mut self, width: u32, height: u32) {
        self.dimensions = Some((width, height));
    }

    pub(crate) fn set_time(&mut self, time: f64) {
        self.current_time = time;
    }

    pub(crate) fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration;
    }
}

/// Renders `landmarks` onto `surface`, sized to match `source`.
///
/// Returns `false` without touching the surface if the source has not loaded yet; the caller is
/// expected to retry once it has (see [`crate::adapter::Overlay`]). An empty landmark set still
/// resizes and clears the surface.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    source: &Source,
    landmarks: &Landmarks,
    connections: &[Connection],
    style: &OverlayStyle,
) -> bool {
    let Some((width, height)) = source.dimensions() else {
        log::trace!("source not loaded yet, deferring overlay");
        return false;
    };

    surface.resize(width, height);
    surface.clear();
    draw_skeleton(surface, landmarks, connections, style);
    true
}

/// Draws bones and joints onto `surface` at its current size, without clearing it first.
pub fn draw_skeleton<S: Surface + ?Sized>(
    surface: &mut S,
    landmarks: &Landmarks,
    connections: &[Connection],
    style: &OverlayStyle,
) {
    let (width, height) = surface.size();

    for &(a, b) in connections {
        let (Some(start), Some(end)) = (landmarks.get(a), landmarks.get(b)) else {
            continue;
        };
        if !start.is_visible() || !end.is_visible() {
            continue;
        }

        let confidence = (start.visibility() + end.visibility()) / 2.0;
        surface.line(
            start.to_pixel(width, height),
            end.to_pixel(width, height),
            Stroke::new(style.color_for(confidence), style.bone_width),
        );
    }

    for (_, lm) in landmarks.iter() {
        if !lm.is_visible() {
            continue;
        }
        surface.circle(
            lm.to_pixel(width, height),
            style.joint_radius,
            style.color_for(lm.visibility()),
            style.joint_outline,
        );
    }
}
