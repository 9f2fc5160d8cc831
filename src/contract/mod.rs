pub mod stage;
pub mod types;

pub use stage::{ContractStatus, DealStage, ReviewAction, UnknownStage, STAGE_ORDER};
pub use types::{
    Agent, Contract, NewContract, Party, Pitch, PitchStatus, Signature, SignatureSet, Team, Terms,
};
