//! Skeletal overlays for pose estimation results.
//!
//! `poseview` takes the landmarks produced by an external pose estimation backend (for a single
//! image, an analysed video, or a live camera stream) and draws a confidence-colored skeleton on
//! top of the matching visual frame.
//!
//! The pieces fit together like this:
//!
//! - [`ingest`] turns the backend's JSON into [`Frame`]s and canonical [`Landmarks`]. All of the
//!   landmark encodings the backend emits are normalized here, so nothing downstream has to care.
//! - [`overlay::render`] is a pure function drawing one set of landmarks onto a [`draw::Surface`].
//! - [`sync`] picks the frame to show for a given playback time.
//! - [`adapter::Overlay`] reacts to load/playback/seek events of a visual source and redraws.
//! - [`live::LiveOverlay`] drives the detect-then-draw loop for camera streams, scoring each
//!   frame with [`scoring`] since live frames never reach the backend.
//! - [`history::HistoryLog`] is the bounded, most-recent-first list of past analyses.
//!
//! # Coordinates
//!
//! Landmark coordinates are normalized to the source frame: X points right and Y points *down*,
//! both in range 0.0 to 1.0 (values outside that range are accepted and simply end up outside the
//! surface). Z is relative depth and is ignored when drawing.
//!
//! # Environment Variables
//!
//! * `POSEVIEW_HISTORY_DIR`: Directory the analysis history is stored in. If unset, a `poseview`
//!   directory inside the platform's local data directory is used (see [`config::Config`]).
//! * `RUST_LOG`: Overrides the log filters set up by [`init_logger!`].
//!
//! [`Frame`]: ingest::Frame
//! [`Landmarks`]: landmark::Landmarks

use log::LevelFilter;

pub mod adapter;
pub mod body;
pub mod config;
pub mod draw;
pub mod history;
pub mod ingest;
pub mod landmark;
pub mod live;
pub mod overlay;
pub mod scoring;
pub mod sync;
pub mod timeline;
pub mod timer;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and `poseview` will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
