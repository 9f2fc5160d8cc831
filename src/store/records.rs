use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::contract::{Contract, ContractStatus, DealStage, SignatureSet, Terms};

use super::errors::StoreError;

/// Wire shape of a row in the `contracts` table.
///
/// The store carries both `deal_stage` and the denormalized `status` column.
/// Only `deal_stage` is authoritative on read; `status` is recomputed from it
/// on every write so older rows heal as they are touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRow {
    pub id: Uuid,
    pub pitch_id: Uuid,
    pub team_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub value_minor: i64,
    pub currency: String,
    pub terms: Terms,
    pub deal_stage: String,
    pub status: String,
    #[serde(default)]
    pub signatures: SignatureSet,
    #[serde(default)]
    pub review_note: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContractRow {
    pub fn from_contract(contract: &Contract) -> Self {
        Self {
            id: contract.id,
            pitch_id: contract.pitch_id,
            team_id: contract.team_id,
            agent_id: contract.agent_id,
            value_minor: contract.value_minor,
            currency: contract.currency.clone(),
            terms: contract.terms.clone(),
            deal_stage: contract.stage.as_str().to_string(),
            status: contract.stage.status().as_str().to_string(),
            signatures: contract.signatures.clone(),
            review_note: contract.review_note.clone(),
            expires_at: contract.expires_at,
            created_at: contract.created_at,
            updated_at: contract.updated_at,
        }
    }

    pub fn into_contract(self) -> Result<Contract, StoreError> {
        let stage: DealStage =
            self.deal_stage
                .parse()
                .map_err(|_| StoreError::InvalidRecord {
                    table: "contracts",
                    id: self.id.to_string(),
                    message: format!("unrecognized deal_stage '{}'", self.deal_stage),
                })?;

        // Stored status can lag the stage (older writers mapped them by hand).
        // The stage wins; the next write rewrites the status column.
        if self.status != stage.status().as_str() {
            warn!(
                contract_id = %self.id,
                stored_status = %self.status,
                derived_status = %stage.status(),
                deal_stage = %stage,
                "status column drifted from deal_stage, using derived value"
            );
        }

        Ok(Contract {
            id: self.id,
            pitch_id: self.pitch_id,
            team_id: self.team_id,
            agent_id: self.agent_id,
            value_minor: self.value_minor,
            currency: self.currency,
            terms: self.terms,
            stage,
            signatures: self.signatures,
            review_note: self.review_note,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// List-endpoint response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowPage<T> {
    pub rows: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Partial update for a contract row, applied atomically by the store.
///
/// Fields are private so the only way to change the stage is
/// [`ContractPatch::stage_change`], which writes `deal_stage` and the derived
/// `status` together. Callers cannot produce a patch where the two disagree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContractPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_stage: Option<DealStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ContractStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signatures: Option<SignatureSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl ContractPatch {
    /// A stage transition: deal_stage, its derived status, and the update
    /// timestamp, together in one write.
    pub fn stage_change(stage: DealStage, now: DateTime<Utc>) -> Self {
        Self {
            deal_stage: Some(stage),
            status: Some(stage.status()),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    /// A non-stage edit; only stamps the update time.
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: Some(now),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent_id: Uuid) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_signatures(mut self, signatures: SignatureSet) -> Self {
        self.signatures = Some(signatures);
        self
    }

    pub fn with_review_note(mut self, note: String) -> Self {
        self.review_note = Some(note);
        self
    }

    pub fn stage(&self) -> Option<DealStage> {
        self.deal_stage
    }

    /// Mirror of the hosted store's patch semantics, used by the in-memory
    /// store so both backends apply updates identically.
    pub fn apply_to(&self, contract: &mut Contract) {
        if let Some(stage) = self.deal_stage {
            contract.stage = stage;
        }
        if let Some(agent_id) = self.agent_id {
            contract.agent_id = Some(agent_id);
        }
        if let Some(signatures) = &self.signatures {
            contract.signatures = signatures.clone();
        }
        if let Some(note) = &self.review_note {
            contract.review_note = Some(note.clone());
        }
        if let Some(at) = self.updated_at {
            contract.updated_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_contract(stage: DealStage) -> Contract {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Contract {
            id: Uuid::new_v4(),
            pitch_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            agent_id: None,
            value_minor: 250_000_00,
            currency: "EUR".to_string(),
            terms: Terms::PlainText("2 year deal".to_string()),
            stage,
            signatures: SignatureSet::default(),
            review_note: None,
            expires_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_row_write_derives_status() {
        let contract = sample_contract(DealStage::Negotiating);
        let row = ContractRow::from_contract(&contract);
        assert_eq!(row.deal_stage, "negotiating");
        assert_eq!(row.status, "active");

        let back = row.into_contract().unwrap();
        assert_eq!(back.stage, DealStage::Negotiating);
        assert_eq!(back.status(), ContractStatus::Active);
    }

    #[test]
    fn test_row_read_prefers_stage_over_drifted_status() {
        let contract = sample_contract(DealStage::UnderReview);
        let mut row = ContractRow::from_contract(&contract);
        row.status = "draft".to_string();

        let back = row.into_contract().unwrap();
        assert_eq!(back.stage, DealStage::UnderReview);
        assert_eq!(back.status(), ContractStatus::Active);
    }

    #[test]
    fn test_row_read_accepts_legacy_stage_spelling() {
        let contract = sample_contract(DealStage::Signed);
        let mut row = ContractRow::from_contract(&contract);
        row.deal_stage = "finalizing".to_string();

        let back = row.into_contract().unwrap();
        assert_eq!(back.stage, DealStage::Signed);
    }

    #[test]
    fn test_row_read_rejects_unknown_stage() {
        let contract = sample_contract(DealStage::Draft);
        let mut row = ContractRow::from_contract(&contract);
        row.deal_stage = "haggling".to_string();

        match row.into_contract() {
            Err(StoreError::InvalidRecord { table, .. }) => assert_eq!(table, "contracts"),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_patch_stage_change_keeps_status_in_step() {
        let now = Utc::now();
        let patch = ContractPatch::stage_change(DealStage::Signed, now);
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body["deal_stage"], "signed");
        assert_eq!(body["status"], "signed");
        assert!(body.get("signatures").is_none());

        let mut contract = sample_contract(DealStage::UnderReview);
        patch.apply_to(&mut contract);
        assert_eq!(contract.stage, DealStage::Signed);
        assert_eq!(contract.updated_at, now);
    }

    #[test]
    fn test_touch_patch_leaves_stage_alone() {
        let now = Utc::now();
        let patch = ContractPatch::touch(now).with_review_note("resend with higher wage".to_string());
        assert_eq!(patch.stage(), None);

        let mut contract = sample_contract(DealStage::Negotiating);
        patch.apply_to(&mut contract);
        assert_eq!(contract.stage, DealStage::Negotiating);
        assert_eq!(
            contract.review_note.as_deref(),
            Some("resend with higher wage")
        );
    }
}
