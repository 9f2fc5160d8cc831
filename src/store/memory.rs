// In-memory record store - backs unit and integration tests, no side effects

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{Agent, Contract, DealStage, Pitch, Team};
use crate::timeline::{TimelineEvent, TimelineEventKind};

use super::errors::StoreError;
use super::query::{Query, SortDirection};
use super::records::{ContractPatch, ContractRow};
use super::traits::ContractStore;

/// Operations the store has been asked to perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    FetchContract(Uuid),
    InsertContract(Uuid),
    UpdateContract {
        id: Uuid,
        stage: Option<DealStage>,
    },
    ListContracts(String),
    FetchPitch(Uuid),
    ListPitches(String),
    FetchTeam(Uuid),
    FetchAgent(Uuid),
    AppendTimelineEvent {
        team_id: Uuid,
        kind: TimelineEventKind,
    },
    ListTimelineEvents(String),
}

/// A `ContractStore` holding everything in maps, recording each operation,
/// and applying queries with the same semantics as the hosted API (filters
/// match row fields, sort compares row fields, then limit/offset).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    contracts: Mutex<HashMap<Uuid, Contract>>,
    pitches: Mutex<HashMap<Uuid, Pitch>>,
    teams: Mutex<HashMap<Uuid, Team>>,
    agents: Mutex<HashMap<Uuid, Agent>>,
    timeline: Mutex<Vec<TimelineEvent>>,
    operations: Mutex<Vec<StoreOp>>,
    failures: Mutex<HashMap<&'static str, (u16, String)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_contract(&self, contract: Contract) {
        self.contracts
            .lock()
            .unwrap()
            .insert(contract.id, contract);
    }

    pub fn seed_pitch(&self, pitch: Pitch) {
        self.pitches.lock().unwrap().insert(pitch.id, pitch);
    }

    pub fn seed_team(&self, team: Team) {
        self.teams.lock().unwrap().insert(team.id, team);
    }

    pub fn seed_agent(&self, agent: Agent) {
        self.agents.lock().unwrap().insert(agent.id, agent);
    }

    /// Queue an HTTP-style failure for the next call of `op`
    /// ("update_contract", "insert_contract", ...).
    pub fn fail_next(&self, op: &'static str, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, (status, message.to_string()));
    }

    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().unwrap().clone()
    }

    pub fn clear_operations(&self) {
        self.operations.lock().unwrap().clear();
    }

    /// Direct read for assertions; not recorded as an operation.
    pub fn contract_snapshot(&self, id: Uuid) -> Option<Contract> {
        self.contracts.lock().unwrap().get(&id).cloned()
    }

    pub fn timeline_snapshot(&self) -> Vec<TimelineEvent> {
        self.timeline.lock().unwrap().clone()
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().unwrap().push(op);
    }

    fn take_failure(&self, op: &'static str) -> Result<(), StoreError> {
        if let Some((status, message)) = self.failures.lock().unwrap().remove(op) {
            return Err(StoreError::Http { status, message });
        }
        Ok(())
    }
}

/// Field-by-field equality against a serialized row, matching how the
/// hosted API evaluates `filter=field:value`.
fn row_matches(row: &serde_json::Value, query: &Query) -> bool {
    query.filters().iter().all(|(field, expected)| {
        match row.get(field) {
            Some(serde_json::Value::String(s)) => s == expected,
            Some(serde_json::Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        }
    })
}

fn sort_rows(rows: &mut [(serde_json::Value, usize)], field: &str, direction: SortDirection) {
    rows.sort_by(|(a, _), (b, _)| {
        let left = a.get(field).map(value_sort_key).unwrap_or_default();
        let right = b.get(field).map(value_sort_key).unwrap_or_default();
        match direction {
            SortDirection::Ascending => left.cmp(&right),
            SortDirection::Descending => right.cmp(&left),
        }
    });
}

fn value_sort_key(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Applies filters, sort, and pagination over serialized rows, returning
/// the indices of matching source items in result order.
fn apply_query(rows: Vec<serde_json::Value>, query: &Query) -> Vec<usize> {
    let mut matched: Vec<(serde_json::Value, usize)> = rows
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, query))
        .map(|(idx, row)| (row, idx))
        .collect();

    if let Some((field, direction)) = query.sort_spec() {
        sort_rows(&mut matched, field, direction);
    }

    let (limit, offset) = query.page();
    let start = offset.unwrap_or(0) as usize;
    let end = limit
        .map(|l| start.saturating_add(l as usize))
        .unwrap_or(usize::MAX);

    matched
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(|(_, idx)| idx)
        .collect()
}

#[async_trait]
impl ContractStore for InMemoryStore {
    async fn fetch_contract(&self, id: Uuid) -> Result<Contract, StoreError> {
        self.record(StoreOp::FetchContract(id));
        self.take_failure("fetch_contract")?;
        self.contracts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                table: "contracts",
                id: id.to_string(),
            })
    }

    async fn insert_contract(&self, contract: &Contract) -> Result<Contract, StoreError> {
        self.record(StoreOp::InsertContract(contract.id));
        self.take_failure("insert_contract")?;
        self.contracts
            .lock()
            .unwrap()
            .insert(contract.id, contract.clone());
        Ok(contract.clone())
    }

    async fn update_contract(
        &self,
        id: Uuid,
        patch: &ContractPatch,
    ) -> Result<Contract, StoreError> {
        self.record(StoreOp::UpdateContract {
            id,
            stage: patch.stage(),
        });
        self.take_failure("update_contract")?;
        let mut contracts = self.contracts.lock().unwrap();
        let contract = contracts.get_mut(&id).ok_or(StoreError::NotFound {
            table: "contracts",
            id: id.to_string(),
        })?;
        patch.apply_to(contract);
        Ok(contract.clone())
    }

    async fn list_contracts(&self, query: &Query) -> Result<Vec<Contract>, StoreError> {
        self.record(StoreOp::ListContracts(query.cache_key("contracts")));
        self.take_failure("list_contracts")?;
        let contracts: Vec<Contract> = self.contracts.lock().unwrap().values().cloned().collect();
        let rows: Vec<serde_json::Value> = contracts
            .iter()
            .map(|c| serde_json::to_value(ContractRow::from_contract(c)))
            .collect::<Result<_, _>>()?;
        Ok(apply_query(rows, query)
            .into_iter()
            .map(|idx| contracts[idx].clone())
            .collect())
    }

    async fn fetch_pitch(&self, id: Uuid) -> Result<Pitch, StoreError> {
        self.record(StoreOp::FetchPitch(id));
        self.take_failure("fetch_pitch")?;
        self.pitches
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                table: "pitches",
                id: id.to_string(),
            })
    }

    async fn list_pitches(&self, query: &Query) -> Result<Vec<Pitch>, StoreError> {
        self.record(StoreOp::ListPitches(query.cache_key("pitches")));
        self.take_failure("list_pitches")?;
        let pitches: Vec<Pitch> = self.pitches.lock().unwrap().values().cloned().collect();
        let rows: Vec<serde_json::Value> = pitches
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        Ok(apply_query(rows, query)
            .into_iter()
            .map(|idx| pitches[idx].clone())
            .collect())
    }

    async fn fetch_team(&self, id: Uuid) -> Result<Team, StoreError> {
        self.record(StoreOp::FetchTeam(id));
        self.take_failure("fetch_team")?;
        self.teams
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                table: "teams",
                id: id.to_string(),
            })
    }

    async fn fetch_agent(&self, id: Uuid) -> Result<Agent, StoreError> {
        self.record(StoreOp::FetchAgent(id));
        self.take_failure("fetch_agent")?;
        self.agents
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                table: "agents",
                id: id.to_string(),
            })
    }

    async fn append_timeline_event(
        &self,
        event: &TimelineEvent,
    ) -> Result<TimelineEvent, StoreError> {
        self.record(StoreOp::AppendTimelineEvent {
            team_id: event.team_id,
            kind: event.kind,
        });
        self.take_failure("append_timeline_event")?;
        self.timeline.lock().unwrap().push(event.clone());
        Ok(event.clone())
    }

    async fn list_timeline_events(&self, query: &Query) -> Result<Vec<TimelineEvent>, StoreError> {
        self.record(StoreOp::ListTimelineEvents(
            query.cache_key("timeline_events"),
        ));
        self.take_failure("list_timeline_events")?;
        let events: Vec<TimelineEvent> = self.timeline.lock().unwrap().clone();
        let rows: Vec<serde_json::Value> = events
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()?;
        Ok(apply_query(rows, query)
            .into_iter()
            .map(|idx| events[idx].clone())
            .collect())
    }
}
