//! Mapping a playback time onto a sequence of analysed frames.
//!
//! For continuous sources (videos and live streams), the overlay has to show the landmarks of the
//! frame closest to what is currently displayed. [`select_frame`] is re-run on every time update
//! and every seek, so scrubbing in either direction always lands on the temporally closest frame.

/// Something that may carry a timestamp, in seconds since the start of the stream.
pub trait Timestamped {
    fn timestamp(&self) -> Option<f64>;
}

impl Timestamped for f64 {
    fn timestamp(&self) -> Option<f64> {
        Some(*self)
    }
}

impl<T: Timestamped> Timestamped for Option<T> {
    fn timestamp(&self) -> Option<f64> {
        self.as_ref().and_then(T::timestamp)
    }
}

/// Returns the index of the frame whose timestamp is nearest to `time`.
///
/// This is a linear scan; if two frames are equally close, the first one wins. Frames without a
/// timestamp are skipped. Returns [`None`] if no frame has a timestamp.
pub fn nearest_frame<F: Timestamped>(frames: &[F], time: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, frame) in frames.iter().enumerate() {
        let Some(ts) = frame.timestamp() else {
            continue;
        };
        let diff = (ts - time).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((i, diff)),
        }
    }
    best.map(|(i, _)| i)
}

/// Maps a playback time onto a frame index, assuming frames are spread evenly over `duration`.
///
/// Computes `floor((time / duration) * frame_count)`, clamped to the last frame. Negative times,
/// and durations that are not finite and positive, map to the first frame. Returns [`None`] only
/// if `frame_count` is zero.
pub fn index_for_time(time: f64, duration: f64, frame_count: usize) -> Option<usize> {
    if frame_count == 0 {
        return None;
    }
    if !duration.is_finite() || duration <= 0.0 || time.is_nan() || time <= 0.0 {
        return Some(0);
    }
    let index = ((time / duration) * frame_count as f64).floor();
    Some((index as usize).min(frame_count - 1))
}

/// Selects the frame to display at playback time `time`.
///
/// Uses [`nearest_frame`] when any frame has a timestamp, and falls back to [`index_for_time`]
/// otherwise. Without a known `duration`, the fallback always picks the first frame.
pub fn select_frame<F: Timestamped>(
    frames: &[F],
    time: f64,
    duration: Option<f64>,
) -> Option<usize> {
    nearest_frame(frames, time)
        .or_else(|| index_for_time(time, duration.unwrap_or(0.0), frames.len()))
}
