use crate::condition::{FaceIdentity, Side};

/// The four face stimuli the task can put on screen.
///
/// Each role maps to exactly one prerendered sprite, resolved once at
/// renderer initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StimulusRole {
    PriorOne,
    PriorTwo,
    GazeLeft,
    GazeRight,
}

impl StimulusRole {
    pub const ALL: [StimulusRole; 4] = [
        StimulusRole::PriorOne,
        StimulusRole::PriorTwo,
        StimulusRole::GazeLeft,
        StimulusRole::GazeRight,
    ];

    pub fn prior(identity: FaceIdentity) -> Self {
        match identity {
            FaceIdentity::One => StimulusRole::PriorOne,
            FaceIdentity::Two => StimulusRole::PriorTwo,
        }
    }

    pub fn gaze(direction: Side) -> Self {
        match direction {
            Side::Left => StimulusRole::GazeLeft,
            Side::Right => StimulusRole::GazeRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_cover_both_identities_and_directions() {
        assert_eq!(StimulusRole::prior(FaceIdentity::One), StimulusRole::PriorOne);
        assert_eq!(StimulusRole::prior(FaceIdentity::Two), StimulusRole::PriorTwo);
        assert_eq!(StimulusRole::gaze(Side::Left), StimulusRole::GazeLeft);
        assert_eq!(StimulusRole::gaze(Side::Right), StimulusRole::GazeRight);
    }
}
