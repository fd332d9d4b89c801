//! Cross-cluster NetPeering workflow

pub mod names;
pub mod network;
pub mod orchestrator;
pub mod prompt;

pub use names::PeeringNames;
pub use orchestrator::{
    ClusterSelection, CreateOutcome, CreateRequest, CreateState, DeleteOutcome, Fetched,
    NetPeeringOrchestrator, StatusFilter, filter_by_status,
};
pub use prompt::{Confirm, ConfirmStage, StdinConfirm};
