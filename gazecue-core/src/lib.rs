pub mod cancel;
pub mod condition;
pub mod phase;
pub mod scene;
pub mod stimulus;
pub mod trial;

pub use cancel::CancelToken;
pub use condition::{Condition, Congruency, FaceIdentity, Side};
pub use phase::SessionPhase;
pub use scene::Scene;
pub use stimulus::StimulusRole;
pub use trial::{TrialRecord, TrialState};
