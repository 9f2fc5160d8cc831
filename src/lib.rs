// Dugout Library - Transfer Negotiation Orchestration
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod contract;
pub mod media;
pub mod notify;
pub mod observability;
pub mod shutdown;
pub mod store;
pub mod telemetry;
pub mod timeline;
pub mod workflow;

// Re-export key types for easy access
pub use config::{config, DugoutConfig};
pub use contract::{
    Agent, Contract, ContractStatus, DealStage, NewContract, Party, Pitch, PitchStatus,
    ReviewAction, Signature, SignatureSet, Team, Terms, STAGE_ORDER,
};
pub use media::{HttpMediaStore, MediaStore};
pub use notify::{LogNotifier, Notice, Notifier, WebhookNotifier};
pub use observability::{store_metrics, OperationTimer, StoreApiMetrics};
pub use shutdown::{ShutdownCoordinator, ShutdownHandle};
pub use store::{
    ContractPatch, ContractRow, ContractStore, InMemoryStore, Query, RecordStoreClient, RowPage,
    StoreError,
};
pub use telemetry::{
    create_negotiation_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
pub use timeline::{
    group_by_season, season_key_of, sort_events, SeasonGroup, TimelineEvent, TimelineEventKind,
};
pub use workflow::{NegotiationOrchestrator, SignatureUpload, SweepOutcome, WorkflowError};
