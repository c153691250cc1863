//! Client-side scoring: joint angles, a visibility-based fallback score, and coaching feedback
//! derived from a score.
//!
//! The analysis backend normally provides scores and feedback. Live frames do not go through the
//! backend, so they are scored here instead.

use crate::body::LandmarkIdx;
use crate::ingest::{Breakdown, Feedback, FeedbackKind, Score};
use crate::landmark::{Landmark, Landmarks};

/// Returns the angle at `b` formed by the segments `b -> a` and `b -> c`, in degrees.
///
/// Only the X and Y coordinates are used. The result is in range 0 to 180.
pub fn joint_angle(a: Landmark, b: Landmark, c: Landmark) -> f32 {
    let radians = (c.y() - b.y()).atan2(c.x() - b.x()) - (a.y() - b.y()).atan2(a.x() - b.x());
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Computes the angle at joint `b`, if all three landmarks are present.
pub fn angle_at(
    landmarks: &Landmarks,
    a: LandmarkIdx,
    b: LandmarkIdx,
    c: LandmarkIdx,
) -> Option<f32> {
    Some(joint_angle(
        landmarks.get_body(a)?,
        landmarks.get_body(b)?,
        landmarks.get_body(c)?,
    ))
}

/// Scores a landmark set by the share of present landmarks that are visible.
///
/// The overall score is that share as a whole percentage. The breakdown is derived from it:
/// posture is 5 points higher (capped at 100), balance 10 points lower (at least 0), and form is
/// the overall score. An empty landmark set scores 0.
pub fn visibility_score(landmarks: &Landmarks) -> Score {
    let present = landmarks.iter().count();
    let overall = if present == 0 {
        0.0
    } else {
        (landmarks.visible_count() as f32 / present as f32 * 100.0).round()
    };
    Score::Detailed {
        overall,
        breakdown: Breakdown {
            posture: Some((overall + 5.0).min(100.0)),
            balance: Some((overall - 10.0).max(0.0)),
            form: Some(overall),
        },
    }
}

/// Returns the coaching message for a 0-100 score.
///
/// | score  | kind      | priority |
/// |--------|-----------|----------|
/// | >= 90  | success   | 1        |
/// | >= 70  | info      | 2        |
/// | >= 50  | warning   | 3        |
/// | below  | error     | 4        |
pub fn feedback_for(score: f32) -> Feedback {
    let (kind, message, priority) = if score >= 90.0 {
        (FeedbackKind::Success, "Excellent form! Keep it up!", 1.0)
    } else if score >= 70.0 {
        (FeedbackKind::Info, "Good effort! Minor adjustments needed.", 2.0)
    } else if score >= 50.0 {
        (
            FeedbackKind::Warning,
            "Form needs improvement. Check your posture.",
            3.0,
        )
    } else {
        (
            FeedbackKind::Error,
            "Poor form detected. Please review technique.",
            4.0,
        )
    };
    Feedback {
        kind,
        message: message.to_string(),
        priority: Some(priority),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::test::standing_pose;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new([x, y, 0.0])
    }

    #[test]
    fn angles() {
        assert_relative_eq!(
            joint_angle(lm(0.0, 1.0), lm(0.0, 0.0), lm(1.0, 0.0)),
            90.0,
            epsilon = 1e-4
        );
        assert_relative_eq!(
            joint_angle(lm(-1.0, 0.0), lm(0.0, 0.0), lm(1.0, 0.0)),
            180.0,
            epsilon = 1e-4
        );
        assert_relative_eq!(
            joint_angle(lm(1.0, 1.0), lm(0.0, 0.0), lm(1.0, 0.0)),
            45.0,
            epsilon = 1e-4
        );
        // the reflex side is folded back into 0-180
        assert_relative_eq!(
            joint_angle(lm(1.0, -1.0), lm(0.0, 0.0), lm(-1.0, 0.0001)),
            135.0,
            epsilon = 1e-2
        );
    }

    #[test]
    fn angle_needs_all_landmarks() {
        use LandmarkIdx::*;

        let pose = standing_pose();
        let knee = angle_at(&pose, LeftHip, LeftKnee, LeftAnkle).unwrap();
        assert!(knee > 170.0 && knee <= 180.0, "{}", knee);

        let mut partial = Landmarks::body();
        partial.set(LeftHip.index(), lm(0.5, 0.5));
        partial.set(LeftKnee.index(), lm(0.5, 0.7));
        assert_eq!(angle_at(&partial, LeftHip, LeftKnee, LeftAnkle), None);
    }

    #[test]
    fn score_from_visibility() {
        let landmarks: Landmarks = [0.9, 0.9, 0.9, 0.2]
            .into_iter()
            .map(|v| lm(0.5, 0.5).with_visibility(v))
            .collect();
        let score = visibility_score(&landmarks);
        assert_eq!(score.overall(), 75.0);
        assert_eq!(
            score.breakdown(),
            Some(&Breakdown {
                posture: Some(80.0),
                balance: Some(65.0),
                form: Some(75.0),
            })
        );

        let full = visibility_score(&standing_pose());
        assert_eq!(full.overall(), 100.0);
        assert_eq!(full.breakdown().unwrap().posture, Some(100.0));

        let none = visibility_score(&Landmarks::body());
        assert_eq!(none.overall(), 0.0);
        assert_eq!(none.breakdown().unwrap().balance, Some(0.0));
    }

    #[test]
    fn feedback_tiers() {
        let tiers = [95.0, 90.0, 75.0, 50.0, 49.9, 0.0].map(|s| {
            let fb = feedback_for(s);
            (fb.kind, fb.priority)
        });
        assert_eq!(
            tiers,
            [
                (FeedbackKind::Success, Some(1.0)),
                (FeedbackKind::Success, Some(1.0)),
                (FeedbackKind::Info, Some(2.0)),
                (FeedbackKind::Warning, Some(3.0)),
                (FeedbackKind::Error, Some(4.0)),
                (FeedbackKind::Error, Some(4.0)),
            ]
        );
        assert_eq!(feedback_for(72.0).message, "Good effort! Minor adjustments needed.");
    }
}
