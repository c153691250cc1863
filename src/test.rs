use crate::body::LandmarkIdx;
use crate::landmark::{Landmark, Landmarks};

/// A person standing upright in the middle of the frame, every landmark confidently visible.
pub fn standing_pose() -> Landmarks {
    use LandmarkIdx::*;

    let mut landmarks = Landmarks::body();
    for idx in LandmarkIdx::ALL {
        let (x, y) = match idx {
            Nose => (0.50, 0.10),
            LeftEyeInner | LeftEye | LeftEyeOuter | LeftEar => (0.53, 0.08),
            RightEyeInner | RightEye | RightEyeOuter | RightEar => (0.47, 0.08),
            MouthLeft => (0.52, 0.13),
            MouthRight => (0.48, 0.13),
            LeftShoulder => (0.60, 0.25),
            RightShoulder => (0.40, 0.25),
            LeftElbow => (0.63, 0.40),
            RightElbow => (0.37, 0.40),
            LeftWrist => (0.64, 0.52),
            RightWrist => (0.36, 0.52),
            LeftPinky | LeftIndex | LeftThumb => (0.65, 0.55),
            RightPinky | RightIndex | RightThumb => (0.35, 0.55),
            LeftHip => (0.56, 0.55),
            RightHip => (0.44, 0.55),
            LeftKnee => (0.57, 0.73),
            RightKnee => (0.43, 0.73),
            LeftAnkle => (0.57, 0.90),
            RightAnkle => (0.43, 0.90),
            LeftHeel | LeftFootIndex => (0.58, 0.93),
            RightHeel | RightFootIndex => (0.42, 0.93),
        };
        landmarks.set(
            idx.index(),
            Landmark::new([x, y, 0.0]).with_visibility(0.95),
        );
    }
    landmarks
}

/// A video analysis result in the flat layout the backend uses for videos.
pub const VIDEO_RESULT: &str = r#"{
    "session_id": "abc123",
    "status": "completed",
    "duration": 2.0,
    "score": 72.5,
    "feedback": [{"type": "warning", "message": "Keep your back straight", "priority": 1}],
    "frames": [
        {"frame": 0, "timestamp": 0.0, "score": 90, "landmarks": {"11": {"x": 0.4, "y": 0.3, "visibility": 0.9}, "12": {"x": 0.6, "y": 0.3, "visibility": 0.9}}},
        {"frame": 15, "timestamp": 0.5, "score": 75, "landmarks": {"11": {"x": 0.41, "y": 0.3, "visibility": 0.9}, "12": {"x": 0.61, "y": 0.3, "visibility": 0.9}}},
        {"frame": 30, "timestamp": 1.0, "score": 55, "landmarks": {"11": {"x": 0.42, "y": 0.3, "visibility": 0.9}, "12": {"x": 0.62, "y": 0.3, "visibility": 0.9}}},
        {"frame": 45, "timestamp": 1.5, "score": 70, "landmarks": {"11": {"x": 0.43, "y": 0.3, "visibility": 0.9}, "12": {"x": 0.63, "y": 0.3, "visibility": 0.9}}}
    ]
}"#;
