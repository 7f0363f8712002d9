pub mod identify;
pub mod message;
pub mod pill;
pub mod place;
pub mod prescription;

pub use identify::{Candidate, IdentifyResult};
pub use message::{Message, MessageId, MessageKind, Role};
pub use pill::Pill;
pub use place::{LatLng, Place};
pub use prescription::{AnalysisMode, PrescriptionAnalysis};
