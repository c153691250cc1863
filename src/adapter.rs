//! Keeps an overlay in sync with the visual source it belongs to.
//!
//! Hosts (a video player, an image view, a camera preview) report what happens to the source as
//! [`SourceEvent`]s. [`Overlay`] stores the latest source state and landmark data, and redraws
//! through [`overlay::render`] whenever something relevant changes. There are no callbacks to
//! unregister: dropping the [`Overlay`] is all the teardown there is.
//!
//! [`overlay::render`]: crate::overlay::render

use crate::body::{Connection, POSE_CONNECTIONS};
use crate::draw::Surface;
use crate::ingest::{Analysis, Frame};
use crate::landmark::Landmarks;
use crate::overlay::{self, OverlayStyle, Source};
use crate::sync::select_frame;

/// Something that happened to the visual source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceEvent {
    /// A still image finished decoding.
    Loaded { width: u32, height: u32 },
    /// Video metadata became available. The source can be drawn on from now on.
    MetadataLoaded {
        width: u32,
        height: u32,
        duration: Option<f64>,
    },
    /// Playback advanced to the given time, in seconds.
    TimeUpdate(f64),
    /// The user scrubbed to the given time, in either direction.
    Seeked(f64),
    /// The native resolution of the source changed (eg. a camera switched modes).
    Resized { width: u32, height: u32 },
}

/// Outcome of an event or data update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// The surface was redrawn. For frame sequences, holds the index of the frame now shown.
    Drawn(Option<usize>),
    /// The source has not loaded yet. The draw will happen on the next load event.
    Deferred,
}

#[derive(Debug)]
enum Content {
    Still(Landmarks),
    Frames(Vec<Frame>),
}

/// A skeleton overlay bound to one visual source.
pub struct Overlay<S> {
    surface: S,
    source: Source,
    content: Content,
    connections: Vec<Connection>,
    style: OverlayStyle,
    pending: bool,
    shown: Option<usize>,
}

impl<S: Surface> Overlay<S> {
    /// Creates an overlay with no landmarks, drawing on `surface` once the source has loaded.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            source: Source::pending(),
            content: Content::Still(Landmarks::default()),
            connections: POSE_CONNECTIONS.to_vec(),
            style: OverlayStyle::default(),
            pending: false,
            shown: None,
        }
    }

    /// Creates an overlay showing an analysis result.
    ///
    /// Results with frames are treated as a video; otherwise the top-level landmarks are shown.
    pub fn for_analysis(surface: S, analysis: Analysis) -> Self {
        let connections = analysis.connections().to_vec();
        let content = if analysis.frames.is_empty() {
            Content::Still(analysis.landmarks)
        } else {
            Content::Frames(analysis.frames)
        };
        Self {
            content,
            connections,
            ..Self::new(surface)
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

    /// Replaces the displayed data with a single landmark set.
    pub fn set_landmarks(&mut self, landmarks: Landmarks) -> Redraw {
        self.content = Content::Still(landmarks);
        self.redraw()
    }

    /// Replaces the displayed data with a frame sequence.
    pub fn set_frames(&mut self, frames: Vec<Frame>) -> Redraw {
        self.content = Content::Frames(frames);
        self.redraw()
    }

    /// Applies a source event and redraws.
    pub fn handle(&mut self, event: SourceEvent) -> Redraw {
        match event {
            SourceEvent::Loaded { width, height } | SourceEvent::Resized { width, height } => {
                self.source.set_dimensions(width, height);
            }
            SourceEvent::MetadataLoaded {
                width,
                height,
                duration,
            } => {
                self.source.set_dimensions(width, height);
                self.source.set_duration(duration);
            }
            SourceEvent::TimeUpdate(time) | SourceEvent::Seeked(time) => {
                self.source.set_time(time);
            }
        }
        self.redraw()
    }

    fn redraw(&mut self) -> Redraw {
        let empty = Landmarks::default();
        let (landmarks, index) = match &self.content {
            Content::Still(landmarks) => (landmarks, None),
            Content::Frames(frames) => {
                let index = select_frame(
                    frames,
                    self.source.current_time(),
                    self.source.duration(),
                );
                (index.map_or(&empty, |i| &frames[i].landmarks), index)
            }
        };

        if overlay::render(
            &mut self.surface,
            &self.source,
            landmarks,
            &self.connections,
            &self.style,
        ) {
            self.pending = false;
            self.shown = index;
            Redraw::Drawn(index)
        } else {
            self.pending = true;
            Redraw::Deferred
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Returns `true` if a draw is waiting for the source to load.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Index of the frame drawn last, if the overlay shows a frame sequence.
    pub fn shown_index(&self) -> Option<usize> {
        self.shown
    }

    /// The frame drawn last, if the overlay shows a frame sequence.
    pub fn current_frame(&self) -> Option<&Frame> {
        match &self.content {
            Content::Frames(frames) => self.shown.and_then(|i| frames.get(i)),
            Content::Still(_) => None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
