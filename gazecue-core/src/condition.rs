use serde::{Deserialize, Serialize};

/// Identity of the face shown during the prior interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceIdentity {
    One,
    Two,
}

impl FaceIdentity {
    pub const ALL: [FaceIdentity; 2] = [FaceIdentity::One, FaceIdentity::Two];

    /// Numeric code used in exported data
    pub fn code(self) -> u8 {
        match self {
            FaceIdentity::One => 1,
            FaceIdentity::Two => 2,
        }
    }
}

/// Horizontal side, used for gaze direction, target location and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Numeric code used in exported data
    pub fn code(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }
}

/// Whether the cued gaze direction matched the target's actual side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Congruency {
    Congruent,
    Incongruent,
}

impl Congruency {
    /// Numeric code used in exported data
    pub fn code(self) -> u8 {
        match self {
            Congruency::Congruent => 1,
            Congruency::Incongruent => 2,
        }
    }
}

/// One cell of the fully crossed design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub prior: FaceIdentity,
    pub gaze: Side,
    pub target: Side,
}

impl Condition {
    /// All 8 cells, enumerated in prior -> gaze -> target order
    pub fn all() -> Vec<Condition> {
        let mut cells = Vec::with_capacity(8);
        for prior in FaceIdentity::ALL {
            for gaze in Side::ALL {
                for target in Side::ALL {
                    cells.push(Condition {
                        prior,
                        gaze,
                        target,
                    });
                }
            }
        }
        cells
    }

    pub fn congruency(&self) -> Congruency {
        if self.gaze == self.target {
            Congruency::Congruent
        } else {
            Congruency::Incongruent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn full_cross_has_eight_unique_cells() {
        let cells = Condition::all();
        assert_eq!(cells.len(), 8);
        let unique: HashSet<_> = cells.iter().copied().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn congruent_iff_gaze_matches_target() {
        for cell in Condition::all() {
            let expected = if cell.gaze == cell.target {
                Congruency::Congruent
            } else {
                Congruency::Incongruent
            };
            assert_eq!(cell.congruency(), expected);
        }
    }

    #[test]
    fn export_codes() {
        assert_eq!(FaceIdentity::One.code(), 1);
        assert_eq!(FaceIdentity::Two.code(), 2);
        assert_eq!(Side::Left.code(), 1);
        assert_eq!(Side::Right.code(), 2);
        assert_eq!(Congruency::Congruent.code(), 1);
        assert_eq!(Congruency::Incongruent.code(), 2);
    }
}
