// Seam between the workflow and the record store - one trait, two
// implementations (hosted HTTP client, in-memory store for tests)

use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{Agent, Contract, Pitch, Team};
use crate::timeline::TimelineEvent;

use super::errors::StoreError;
use super::query::Query;
use super::records::ContractPatch;

#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Fetch one contract by id
    async fn fetch_contract(&self, id: Uuid) -> Result<Contract, StoreError>;

    /// Insert a complete contract row
    async fn insert_contract(&self, contract: &Contract) -> Result<Contract, StoreError>;

    /// Apply a partial update to one contract row; the store applies it
    /// atomically and returns the updated row
    async fn update_contract(
        &self,
        id: Uuid,
        patch: &ContractPatch,
    ) -> Result<Contract, StoreError>;

    /// List contracts matching a query
    async fn list_contracts(&self, query: &Query) -> Result<Vec<Contract>, StoreError>;

    /// Fetch one pitch by id
    async fn fetch_pitch(&self, id: Uuid) -> Result<Pitch, StoreError>;

    /// List pitches matching a query
    async fn list_pitches(&self, query: &Query) -> Result<Vec<Pitch>, StoreError>;

    /// Fetch one team profile by id
    async fn fetch_team(&self, id: Uuid) -> Result<Team, StoreError>;

    /// Fetch one agent profile by id
    async fn fetch_agent(&self, id: Uuid) -> Result<Agent, StoreError>;

    /// Append an event to a team's timeline
    async fn append_timeline_event(
        &self,
        event: &TimelineEvent,
    ) -> Result<TimelineEvent, StoreError>;

    /// List timeline events matching a query
    async fn list_timeline_events(&self, query: &Query) -> Result<Vec<TimelineEvent>, StoreError>;
}
