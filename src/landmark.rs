//! Canonical landmark types.
//!
//! Whatever encoding the analysis backend used, landmarks are converted into [`Landmarks`] at the
//! ingestion boundary (see [`crate::ingest`]). The renderer only ever deals with this form.

use crate::body::{LandmarkIdx, NUM_LANDMARKS};

type Position = [f32; 3];

/// Landmarks with a visibility at or below this value are never drawn.
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// A single body joint in normalized image coordinates.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct Landmark {
    pos: Position,
    visibility: f32,
}

impl Landmark {
    /// Creates a landmark at `position` with a visibility of 0.0.
    pub fn new(position: Position) -> Self {
        Self {
            pos: position,
            visibility: 0.0,
        }
    }

    pub fn with_visibility(self, visibility: f32) -> Self {
        Self { visibility, ..self }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }

    /// Confidence that the joint is where the landmark says it is, from 0.0 to 1.0.
    #[inline]
    pub fn visibility(&self) -> f32 {
        self.visibility
    }

    /// Returns whether this landmark passes the fixed [`VISIBILITY_THRESHOLD`].
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility > VISIBILITY_THRESHOLD
    }

    /// Maps the normalized position onto a surface of the given size, in pixels.
    ///
    /// No clamping is done, so out-of-range coordinates map outside of the surface.
    #[inline]
    pub fn to_pixel(&self, width: u32, height: u32) -> [f32; 2] {
        [self.x() * width as f32, self.y() * height as f32]
    }
}

/// An indexed set of landmarks, some of which may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Landmarks {
    entries: Vec<Option<Landmark>>,
}

impl Landmarks {
    /// Creates a collection with `len` slots, all of them empty.
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    /// Creates a collection with a slot for every landmark of the body taxonomy.
    pub fn body() -> Self {
        Self::new(NUM_LANDMARKS)
    }

    /// Number of slots, including empty ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no slot holds a landmark.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.entries.get(index).copied().flatten()
    }

    pub fn get_body(&self, idx: LandmarkIdx) -> Option<Landmark> {
        self.get(idx.index())
    }

    /// Stores `landmark` at `index`, growing the collection if needed.
    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if index >= self.entries.len() {
            self.entries.resize(index + 1, None);
        }
        self.entries[index] = Some(landmark);
    }

    /// Iterates over all present landmarks along with their index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Landmark)> + Clone + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, lm)| lm.map(|lm| (i, lm)))
    }

    /// Number of present landmarks that pass the visibility threshold.
    pub fn visible_count(&self) -> usize {
        self.iter().filter(|(_, lm)| lm.is_visible()).count()
    }

    pub fn average_visibility(&self) -> Option<f32> {
        let (sum, count) = self
            .iter()
            .fold((0.0, 0usize), |(sum, n), (_, lm)| (sum + lm.visibility(), n + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f32)
        }
    }
}

impl FromIterator<Landmark> for Landmarks {
    fn from_iter<T: IntoIterator<Item = Landmark>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(Some).collect(),
        }
    }
}
