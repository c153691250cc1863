//! Decoding of analysis results and landmark normalization.
//!
//! The analysis backend is not consistent about how it encodes landmarks. Depending on the
//! endpoint, a landmark set arrives as
//!
//! - a dense array indexed by [`LandmarkIdx`],
//! - an object keyed by the stringified index (`{"11": {...}}`), or
//! - an object keyed by landmark name (`{"left_shoulder": {...}}`).
//!
//! All three are converted into [`Landmarks`] right here. For object encodings, a numeric key takes
//! precedence over a name key referring to the same landmark. Entries that fail to decode are
//! skipped, as are landmark sets of an unexpected JSON type; neither is an error.
//!
//! Scores come either as a plain number or as `{overall, breakdown}`, and both are accepted.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::body::{Connection, LandmarkIdx, POSE_CONNECTIONS};
use crate::landmark::{Landmark, Landmarks};
use crate::sync::Timestamped;

/// Numeric landmark keys at or above this value are ignored.
const MAX_LANDMARK_INDEX: usize = 256;

#[derive(Deserialize)]
struct RawLandmark {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
    visibility: Option<f32>,
    confidence: Option<f32>,
}

impl From<RawLandmark> for Landmark {
    fn from(raw: RawLandmark) -> Self {
        let visibility = raw.visibility.or(raw.confidence).unwrap_or(0.0);
        Landmark::new([raw.x, raw.y, raw.z]).with_visibility(visibility)
    }
}

/// Converts any accepted landmark encoding into canonical [`Landmarks`].
pub fn normalize(value: &Value) -> Landmarks {
    match value {
        Value::Array(items) => from_dense(items),
        Value::Object(map) => from_keyed(map),
        Value::Null => Landmarks::default(),
        other => {
            log::debug!("ignoring landmark set of unexpected type: {}", other);
            Landmarks::default()
        }
    }
}

fn decode_entry(value: &Value) -> Option<Landmark> {
    if value.is_null() {
        return None;
    }
    match RawLandmark::deserialize(value) {
        Ok(raw) => Some(raw.into()),
        Err(e) => {
            log::trace!("skipping malformed landmark {}: {}", value, e);
            None
        }
    }
}

fn from_dense(items: &[Value]) -> Landmarks {
    let mut landmarks = Landmarks::new(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(lm) = decode_entry(item) {
            landmarks.set(i, lm);
        }
    }
    landmarks
}

fn from_keyed(map: &Map<String, Value>) -> Landmarks {
    let mut by_index = BTreeMap::new();

    for (key, value) in map {
        let Ok(index) = key.parse::<usize>() else {
            continue;
        };
        if index >= MAX_LANDMARK_INDEX {
            log::debug!("ignoring out-of-range landmark key '{}'", key);
            continue;
        }
        if let Some(lm) = decode_entry(value) {
            by_index.insert(index, lm);
        }
    }

    for (key, value) in map {
        let Some(idx) = LandmarkIdx::from_name(key) else {
            continue;
        };
        if by_index.contains_key(&idx.index()) {
            continue;
        }
        if let Some(lm) = decode_entry(value) {
            by_index.insert(idx.index(), lm);
        }
    }

    if by_index.is_empty() {
        return Landmarks::default();
    }
    let mut landmarks = Landmarks::body();
    for (index, lm) in by_index {
        landmarks.set(index, lm);
    }
    landmarks
}

fn landmarks<'de, D: Deserializer<'de>>(de: D) -> Result<Landmarks, D::Error> {
    let value = Value::deserialize(de)?;
    Ok(normalize(&value))
}

/// A pose score, either a bare number or an overall value with a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Value(f32),
    Detailed {
        overall: f32,
        #[serde(default)]
        breakdown: Breakdown,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakdown {
    pub posture: Option<f32>,
    pub balance: Option<f32>,
    pub form: Option<f32>,
}

impl Score {
    /// The overall score, regardless of which shape the score came in.
    pub fn overall(&self) -> f32 {
        match *self {
            Score::Value(v) => v,
            Score::Detailed { overall, .. } => overall,
        }
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        match self {
            Score::Value(_) => None,
            Score::Detailed { breakdown, .. } => Some(breakdown),
        }
    }
}

fn score<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Score>, D::Error> {
    let value = Value::deserialize(de)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Score::deserialize(&value)
        .map_err(|e| log::debug!("ignoring malformed score {}: {}", value, e))
        .ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Warning,
    Error,
    Info,
}

/// A coaching message attached to an analysis or a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedbackRepr {
    Full(Feedback),
    Message(String),
}

fn feedback<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Feedback>, D::Error> {
    let value = Value::deserialize(de)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match FeedbackRepr::deserialize(item) {
            Ok(FeedbackRepr::Full(fb)) => Some(fb),
            Ok(FeedbackRepr::Message(message)) => Some(Feedback {
                kind: FeedbackKind::Info,
                message,
                priority: None,
            }),
            Err(e) => {
                log::trace!("skipping malformed feedback {}: {}", item, e);
                None
            }
        })
        .collect())
}

fn angles<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeMap<String, f32>, D::Error> {
    let value = Value::deserialize(de)?;
    let Value::Object(map) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(name, v)| v.as_f64().map(|v| (name, v as f32)))
        .collect())
}

/// One analysed instant of a video or live stream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "FrameRepr")]
pub struct Frame {
    pub frame_number: Option<u64>,
    /// Seconds since the start of the stream.
    pub timestamp: Option<f64>,
    pub landmarks: Landmarks,
    pub score: Option<Score>,
    pub feedback: Vec<Feedback>,
}

/// Wire layout of [`Frame`]. The frame number may come as `frame_number`, `frame`, or both, in
/// which case `frame_number` wins.
#[derive(Deserialize)]
struct FrameRepr {
    #[serde(default)]
    frame_number: Option<u64>,
    #[serde(default)]
    frame: Option<u64>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default, deserialize_with = "landmarks")]
    landmarks: Landmarks,
    #[serde(default, deserialize_with = "score")]
    score: Option<Score>,
    #[serde(default, deserialize_with = "feedback")]
    feedback: Vec<Feedback>,
}

impl From<FrameRepr> for Frame {
    fn from(repr: FrameRepr) -> Self {
        Self {
            frame_number: repr.frame_number.or(repr.frame),
            timestamp: repr.timestamp,
            landmarks: repr.landmarks,
            score: repr.score,
            feedback: repr.feedback,
        }
    }
}

impl Frame {
    pub fn new(timestamp: Option<f64>, landmarks: Landmarks) -> Self {
        Self {
            timestamp,
            landmarks,
            ..Self::default()
        }
    }

    /// The overall score of this frame, `0.0` if the frame has none.
    pub fn overall_score(&self) -> f32 {
        self.score.map_or(0.0, |s| s.overall())
    }
}

impl Timestamped for Frame {
    fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }
}

/// The result of an image or video analysis.
///
/// The backend wraps image results in a `data` object and returns video results unwrapped; both
/// decode into this type (see [`Analysis::from_json`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "landmarks")]
    pub landmarks: Landmarks,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, deserialize_with = "angles")]
    pub angles: BTreeMap<String, f32>,
    #[serde(default, deserialize_with = "score")]
    pub score: Option<Score>,
    #[serde(default, deserialize_with = "feedback")]
    pub feedback: Vec<Feedback>,
    #[serde(default, alias = "annotated_image")]
    pub visualized_image: Option<String>,
    #[serde(default)]
    pub frames: Vec<Frame>,
    /// Duration of the analysed video, in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Analysis {
    /// Decodes an analysis result from the backend's JSON response.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut value: Value = serde_json::from_str(json).context("invalid analysis JSON")?;

        let status = value.get("status").cloned();
        if let Some(Value::Object(mut data)) = value.get_mut("data").map(Value::take) {
            if let Some(status) = status {
                data.entry("status").or_insert(status);
            }
            value = Value::Object(data);
        }
        if let Value::Object(map) = &mut value {
            if map.contains_key("visualized_image") {
                map.remove("annotated_image");
            }
        }

        Self::deserialize(&value).context("unexpected analysis result layout")
    }

    /// Reads and decodes an analysis result stored in a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to decode '{}'", path.display()))
    }

    /// The skeleton to draw: the one sent along with the result, or [`POSE_CONNECTIONS`].
    pub fn connections(&self) -> &[Connection] {
        if self.connections.is_empty() {
            POSE_CONNECTIONS
        } else {
            &self.connections
        }
    }

    pub fn overall_score(&self) -> Option<f32> {
        self.score.map(|s| s.overall())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn three_encodings_agree() {
        let dense = json!([
            null, null, null, null, null, null, null, null, null, null, null,
            {"x": 0.4, "y": 0.3, "z": 0.0, "visibility": 0.9},
            {"x": 0.6, "y": 0.3, "z": 0.1, "visibility": 0.8},
        ]);
        let by_index = json!({
            "11": {"x": 0.4, "y": 0.3, "z": 0.0, "visibility": 0.9},
            "12": {"x": 0.6, "y": 0.3, "z": 0.1, "visibility": 0.8},
        });
        let by_name = json!({
            "left_shoulder": {"x": 0.4, "y": 0.3, "z": 0.0, "visibility": 0.9},
            "right_shoulder": {"x": 0.6, "y": 0.3, "z": 0.1, "visibility": 0.8},
        });

        let dense = normalize(&dense);
        let by_index = normalize(&by_index);
        let by_name = normalize(&by_name);

        let collect = |lms: &Landmarks| lms.iter().collect::<Vec<_>>();
        assert_eq!(collect(&dense).len(), 2);
        assert_eq!(collect(&dense), collect(&by_index));
        assert_eq!(collect(&dense), collect(&by_name));
        assert_eq!(by_index, by_name);
    }

    #[test]
    fn numeric_key_wins_over_name() {
        let lms = normalize(&json!({
            "left_shoulder": {"x": 0.9, "y": 0.9, "visibility": 0.9},
            "11": {"x": 0.1, "y": 0.1, "visibility": 0.9},
        }));
        let lm = lms.get(11).unwrap();
        assert_eq!((lm.x(), lm.y()), (0.1, 0.1));
    }

    #[test]
    fn name_used_when_numeric_entry_is_broken() {
        let lms = normalize(&json!({
            "11": {"y": 0.1},
            "left_shoulder": {"x": 0.9, "y": 0.9, "visibility": 0.9},
        }));
        assert_eq!(lms.get(11).unwrap().x(), 0.9);
    }

    #[test]
    fn confidence_alias() {
        let lms = normalize(&json!([
            {"x": 0.1, "y": 0.2, "confidence": 0.7},
            {"x": 0.1, "y": 0.2, "visibility": 0.3, "confidence": 0.7},
            {"x": 0.1, "y": 0.2},
        ]));
        assert_eq!(lms.get(0).unwrap().visibility(), 0.7);
        assert_eq!(lms.get(1).unwrap().visibility(), 0.3);
        assert_eq!(lms.get(2).unwrap().visibility(), 0.0);
        assert_eq!(lms.get(2).unwrap().z(), 0.0);
    }

    #[test]
    fn malformed_input_is_tolerated() {
        assert!(normalize(&json!("nope")).is_empty());
        assert!(normalize(&json!(42)).is_empty());
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!({})).is_empty());
        assert!(normalize(&json!({"999999": {"x": 0.0, "y": 0.0}})).is_empty());

        let lms = normalize(&json!([{"x": "left"}, 7, {"x": 0.5, "y": 0.5, "visibility": 1.0}]));
        assert_eq!(lms.len(), 3);
        assert_eq!(lms.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn score_shapes() {
        let flat: Frame = serde_json::from_value(json!({"score": 72.5})).unwrap();
        assert_eq!(flat.overall_score(), 72.5);
        assert!(flat.score.unwrap().breakdown().is_none());

        let nested: Frame = serde_json::from_value(json!({
            "score": {"overall": 88.0, "breakdown": {"posture": 90.0}}
        }))
        .unwrap();
        assert_eq!(nested.overall_score(), 88.0);
        assert_eq!(nested.score.unwrap().breakdown().unwrap().posture, Some(90.0));

        let broken: Frame = serde_json::from_value(json!({"score": "high"})).unwrap();
        assert_eq!(broken.score, None);
        assert_eq!(broken.overall_score(), 0.0);
    }

    #[test]
    fn frame_fields() {
        let frame: Frame = serde_json::from_value(json!({
            "frame": 12,
            "timestamp": 0.4,
            "landmarks": {"nose": {"x": 0.5, "y": 0.1, "visibility": 0.99}},
            "feedback": [
                {"type": "warning", "message": "Keep your back straight", "priority": 2},
                "Nice depth",
                {"type": "shout"}
            ]
        }))
        .unwrap();
        assert_eq!(frame.frame_number, Some(12));
        assert_eq!(frame.timestamp, Some(0.4));
        assert!(frame.landmarks.get_body(LandmarkIdx::Nose).is_some());
        assert_eq!(frame.feedback.len(), 2);
        assert_eq!(frame.feedback[0].kind, FeedbackKind::Warning);
        assert_eq!(frame.feedback[1].kind, FeedbackKind::Info);
        assert_eq!(frame.feedback[1].message, "Nice depth");
    }

    #[test]
    fn duplicate_aliases() {
        let frame: Frame = serde_json::from_value(json!({
            "frame": 3,
            "frame_number": 7,
            "timestamp": 0.1,
        }))
        .unwrap();
        assert_eq!(frame.frame_number, Some(7));

        let frame: Frame = serde_json::from_value(json!({"frame_number": null, "frame": 3})).unwrap();
        assert_eq!(frame.frame_number, Some(3));

        let json = r#"{
            "visualized_image": "a.png",
            "annotated_image": "b.png",
            "frames": [{"frame_number": 1, "frame": 1, "timestamp": 0.0}]
        }"#;
        let analysis = Analysis::from_json(json).unwrap();
        assert_eq!(analysis.frames[0].frame_number, Some(1));
        assert_eq!(analysis.visualized_image.as_deref(), Some("a.png"));
    }

    #[test]
    fn wrapped_image_result() {
        let analysis = Analysis::from_json(
            r#"{
                "status": "success",
                "data": {
                    "landmarks": [{"x": 0.5, "y": 0.5, "z": 0.0, "visibility": 0.9}],
                    "connections": [[0, 1]],
                    "angles": {"left_knee": 91.5, "back": null},
                    "score": {"overall": 81},
                    "feedback": []
                }
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.status.as_deref(), Some("success"));
        assert_eq!(analysis.connections(), &[(0, 1)]);
        assert_eq!(analysis.angles.get("left_knee"), Some(&91.5));
        assert!(!analysis.angles.contains_key("back"));
        assert_eq!(analysis.overall_score(), Some(81.0));
        assert!(analysis.frames.is_empty());
    }

    #[test]
    fn flat_video_result() {
        let analysis = Analysis::from_json(
            r#"{
                "session_id": "abc",
                "status": "completed",
                "frames": [
                    {"frame": 0, "timestamp": 0.0, "score": 70, "feedback": []},
                    {"frame": 1, "timestamp": 0.5, "score": {"overall": 75, "breakdown": {}}}
                ],
                "score": {"overall": 72.5, "breakdown": {}},
                "duration": 1.0
            }"#,
        )
        .unwrap();
        assert_eq!(analysis.session_id.as_deref(), Some("abc"));
        assert_eq!(analysis.frames.len(), 2);
        assert_eq!(analysis.frames[1].overall_score(), 75.0);
        assert_eq!(analysis.duration, Some(1.0));
        assert_eq!(analysis.connections(), POSE_CONNECTIONS);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Analysis::from_json("{").is_err());
        assert!(Analysis::from_json(r#"{"frames": 3}"#).is_err());
    }
}
