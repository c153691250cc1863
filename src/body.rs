//! The 33-point body landmark taxonomy and its default skeleton.

/// Number of landmarks in the body taxonomy.
pub const NUM_LANDMARKS: usize = 33;

/// A bone of the skeleton, as a pair of landmark indices.
pub type Connection = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIdx {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIdx {
    pub const ALL: [Self; NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Nose,
            LeftEyeInner,
            LeftEye,
            LeftEyeOuter,
            RightEyeInner,
            RightEye,
            RightEyeOuter,
            LeftEar,
            RightEar,
            MouthLeft,
            MouthRight,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftPinky,
            RightPinky,
            LeftIndex,
            RightIndex,
            LeftThumb,
            RightThumb,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
            LeftHeel,
            RightHeel,
            LeftFootIndex,
            RightFootIndex,
        ]
    };

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Looks up a landmark by its semantic name (eg. `"left_shoulder"`).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(Self::from_index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The snake_case name the analysis backend uses for this landmark.
    #[inline]
    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }
}

/// Landmark names, indexed by [`LandmarkIdx`].
pub const NAMES: [&str; NUM_LANDMARKS] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// The default skeleton: shoulders, arms, torso, legs, feet and hands.
pub const POSE_CONNECTIONS: &[Connection] = {
    use LandmarkIdx::*;
    &[
        (LeftShoulder as usize, RightShoulder as usize),
        (LeftShoulder as usize, LeftElbow as usize),
        (LeftElbow as usize, LeftWrist as usize),
        (RightShoulder as usize, RightElbow as usize),
        (RightElbow as usize, RightWrist as usize),
        (LeftShoulder as usize, LeftHip as usize),
        (RightShoulder as usize, RightHip as usize),
        (LeftHip as usize, RightHip as usize),
        (LeftHip as usize, LeftKnee as usize),
        (RightHip as usize, RightKnee as usize),
        (LeftKnee as usize, LeftAnkle as usize),
        (RightKnee as usize, RightAnkle as usize),
        (LeftAnkle as usize, LeftHeel as usize),
        (RightAnkle as usize, RightHeel as usize),
        (LeftHeel as usize, LeftFootIndex as usize),
        (RightHeel as usize, RightFootIndex as usize),
        (LeftWrist as usize, LeftPinky as usize),
        (LeftWrist as usize, LeftIndex as usize),
        (LeftWrist as usize, LeftThumb as usize),
        (RightWrist as usize, RightPinky as usize),
        (RightWrist as usize, RightIndex as usize),
        (RightWrist as usize, RightThumb as usize),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_names() {
        for (i, idx) in LandmarkIdx::ALL.iter().enumerate() {
            assert_eq!(idx.index(), i);
            assert_eq!(LandmarkIdx::from_name(idx.name()), Some(*idx));
        }
        assert_eq!(LandmarkIdx::from_index(NUM_LANDMARKS), None);
        assert_eq!(LandmarkIdx::from_name("tail"), None);
    }

    #[test]
    fn named_lookup() {
        assert_eq!(
            LandmarkIdx::from_name("left_shoulder"),
            Some(LandmarkIdx::LeftShoulder)
        );
        assert_eq!(LandmarkIdx::RightFootIndex.name(), "right_foot_index");
    }

    #[test]
    fn connections_in_range() {
        assert_eq!(POSE_CONNECTIONS.len(), 22);
        for &(a, b) in POSE_CONNECTIONS {
            assert!(a < NUM_LANDMARKS && b < NUM_LANDMARKS);
            assert_ne!(a, b);
        }
        assert_eq!(POSE_CONNECTIONS[0], (11, 12));
        assert_eq!(POSE_CONNECTIONS[21], (16, 22));
    }
}
