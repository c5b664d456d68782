//! The diagnosis survey: a fixed battery of weighted questions scored into
//! the six-axis health index.

pub mod aggregate;
pub mod axis;
pub mod battery;
pub mod router;
pub mod scoring;
pub mod session;
pub mod service;

pub use aggregate::aggregate;
pub use axis::Axis;
pub use battery::{AnswerKind, BatteryError, DiagnosisBattery, Question};
pub use router::diagnosis_router;
pub use scoring::{score, AnswerValue, NEUTRAL_SCORE, NO_CONCERN_SENTINEL};
pub use service::{DiagnosisError, DiagnosisService};
