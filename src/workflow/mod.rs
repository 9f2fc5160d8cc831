pub mod errors;
pub mod orchestrator;

pub use errors::WorkflowError;
pub use orchestrator::{NegotiationOrchestrator, SignatureUpload, SweepOutcome};
