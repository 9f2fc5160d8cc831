use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::contract::{
    Contract, DealStage, NewContract, Party, Pitch, ReviewAction, Signature, SignatureSet,
};
use crate::media::MediaStore;
use crate::notify::{Notice, Notifier};
use crate::store::{ContractPatch, ContractStore, Query};
use crate::telemetry::{create_negotiation_span, generate_correlation_id};
use crate::timeline::{sort_events, TimelineEvent};

use super::errors::WorkflowError;

/// A signature image handed in by the caller. The bytes go through the media
/// seam; only the resulting URL is persisted on the contract.
#[derive(Debug, Clone)]
pub struct SignatureUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What an expiry sweep did.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub expired: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

/// Drives every contract mutation.
///
/// Each operation loads the current record, validates the request against the
/// stage legality table, performs exactly one contract write, then appends a
/// timeline event and emits a notice. Timeline and notice delivery are best
/// effort; the committed write stands whether or not they land.
pub struct NegotiationOrchestrator {
    store: Arc<dyn ContractStore>,
    notifier: Arc<dyn Notifier>,
    media: Arc<dyn MediaStore>,
}

impl NegotiationOrchestrator {
    pub fn new(
        store: Arc<dyn ContractStore>,
        notifier: Arc<dyn Notifier>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            store,
            notifier,
            media,
        }
    }

    /// Open a Draft negotiation against an open pitch.
    pub async fn create_contract(&self, request: NewContract) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_negotiation_span("create_contract", None, Some(&correlation_id));
        async move {
            if request.value_minor <= 0 {
                return Err(WorkflowError::Precondition(
                    "contract value must be a positive amount in minor units".to_string(),
                ));
            }
            if request.currency.len() != 3 || !request.currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(WorkflowError::Precondition(format!(
                    "'{}' is not an ISO 4217 currency code",
                    request.currency
                )));
            }

            let pitch = self
                .store
                .fetch_pitch(request.pitch_id)
                .await
                .map_err(|e| WorkflowError::from_store("pitch", e))?;
            if !pitch.status.is_open() {
                return Err(WorkflowError::Precondition(format!(
                    "pitch {} is closed and takes no new offers",
                    pitch.id
                )));
            }
            self.store
                .fetch_team(request.team_id)
                .await
                .map_err(|e| WorkflowError::from_store("team", e))?;
            if let Some(agent_id) = request.agent_id {
                self.store
                    .fetch_agent(agent_id)
                    .await
                    .map_err(|e| WorkflowError::from_store("agent", e))?;
            }

            let now = Utc::now();
            let contract = Contract {
                id: Uuid::new_v4(),
                pitch_id: request.pitch_id,
                team_id: request.team_id,
                agent_id: request.agent_id,
                value_minor: request.value_minor,
                currency: request.currency.to_ascii_uppercase(),
                terms: request.terms,
                stage: DealStage::Draft,
                signatures: SignatureSet::default(),
                review_note: None,
                expires_at: request.expires_at,
                created_at: now,
                updated_at: now,
            };
            let created = self.store.insert_contract(&contract).await?;
            info!(
                contract_id = %created.id,
                pitch_id = %created.pitch_id,
                team_id = %created.team_id,
                value = %created.value_display(),
                "Contract drafted"
            );

            self.append_event(TimelineEvent::contract_created(
                created.team_id,
                created.id,
                now,
            ))
            .await;
            self.notifier.notify(&Notice::created(&created)).await;
            Ok(created)
        }
        .instrument(span)
        .await
    }

    /// Attach the counterparty agent while the contract is still a draft.
    pub async fn assign_agent(
        &self,
        contract_id: Uuid,
        agent_id: Uuid,
    ) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_negotiation_span("assign_agent", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            if contract.stage != DealStage::Draft {
                return Err(WorkflowError::Precondition(format!(
                    "agents are assigned while the contract is a draft, not once it is {}",
                    contract.stage
                )));
            }
            let agent = self
                .store
                .fetch_agent(agent_id)
                .await
                .map_err(|e| WorkflowError::from_store("agent", e))?;

            let patch = ContractPatch::touch(Utc::now()).with_agent(agent.id);
            let updated = self.write(contract_id, &patch).await?;
            info!(contract_id = %contract_id, agent_id = %agent.id, "Agent assigned to contract");
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    /// The draft-to-negotiating send. Same edge as
    /// `advance_stage(id, Negotiating)`, named for the CLI.
    pub async fn send_to_agent(&self, contract_id: Uuid) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_negotiation_span("send_to_agent", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            self.transition(&contract, DealStage::Negotiating).await
        }
        .instrument(span)
        .await
    }

    /// Move a contract to `target`, refusing anything the legality table does
    /// not allow for its current stage. The record is untouched on refusal.
    pub async fn advance_stage(
        &self,
        contract_id: Uuid,
        target: DealStage,
    ) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_negotiation_span("advance_stage", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            self.transition(&contract, target).await
        }
        .instrument(span)
        .await
    }

    /// Record one party's signature. The agent signs first, the team
    /// confirms. Filling the second slot moves the contract to `Signed`
    /// through the same legality check every other transition goes through.
    pub async fn sign_contract(
        &self,
        contract_id: Uuid,
        party: Party,
        upload: Option<SignatureUpload>,
    ) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_negotiation_span("sign_contract", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            match contract.stage {
                DealStage::UnderReview | DealStage::Signed => {}
                stage => {
                    return Err(WorkflowError::Precondition(format!(
                        "signatures are collected during review or after acceptance, not while the contract is {stage}"
                    )));
                }
            }
            if party == Party::Team && contract.signatures.agent.is_none() {
                return Err(WorkflowError::SignatureOrder(
                    "the team confirms after the agent has signed, not before".to_string(),
                ));
            }
            if contract.signatures.slot(party).is_some() {
                return Err(WorkflowError::SignatureOrder(format!(
                    "the {party} signature is already recorded"
                )));
            }

            let image_url = match upload {
                Some(upload) => Some(
                    self.media
                        .store_blob(&upload.file_name, &upload.content_type, upload.bytes)
                        .await?,
                ),
                None => None,
            };

            let now = Utc::now();
            let mut signatures = contract.signatures.clone();
            let signature = Signature {
                signed_at: now,
                image_url,
            };
            match party {
                Party::Agent => signatures.agent = Some(signature),
                Party::Team => signatures.team = Some(signature),
            }

            let moves_to_signed =
                signatures.fully_signed() && contract.stage != DealStage::Signed;
            if moves_to_signed {
                Self::guard_transition(&contract, DealStage::Signed)?;
            }
            let patch = if moves_to_signed {
                ContractPatch::stage_change(DealStage::Signed, now).with_signatures(signatures)
            } else {
                ContractPatch::touch(now).with_signatures(signatures)
            };
            let updated = self.write(contract_id, &patch).await?;
            info!(
                contract_id = %contract_id,
                party = %party,
                stage = %updated.stage,
                "Signature recorded"
            );

            self.append_event(TimelineEvent::contract_signed(
                contract.team_id,
                contract_id,
                party,
                now,
            ))
            .await;
            if moves_to_signed {
                self.append_event(TimelineEvent::stage_changed(
                    contract.team_id,
                    contract_id,
                    contract.stage,
                    DealStage::Signed,
                    now,
                ))
                .await;
            }
            self.notifier
                .notify(&Notice::signature_recorded(&updated, party))
                .await;
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    /// The assigned agent's verdict on a contract under review.
    pub async fn review_contract(
        &self,
        contract_id: Uuid,
        reviewer_id: Uuid,
        action: ReviewAction,
        note: Option<String>,
    ) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_negotiation_span("review_contract", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            let target = action.target_stage();
            Self::guard_transition(&contract, target)?;
            if contract.stage != DealStage::UnderReview {
                return Err(WorkflowError::Precondition(format!(
                    "reviews happen while the contract is under review, not while it is {}",
                    contract.stage
                )));
            }
            if contract.agent_id != Some(reviewer_id) {
                return Err(WorkflowError::ReviewNotPermitted {
                    reviewer: reviewer_id,
                });
            }

            let now = Utc::now();
            let mut patch = ContractPatch::stage_change(target, now);
            if let Some(note) = note {
                patch = patch.with_review_note(note);
            }
            let updated = self.write(contract_id, &patch).await?;
            info!(
                contract_id = %contract_id,
                reviewer = %reviewer_id,
                action = action.as_str(),
                to = %target,
                "Contract reviewed"
            );

            self.append_event(TimelineEvent::stage_changed(
                contract.team_id,
                contract_id,
                contract.stage,
                target,
                now,
            ))
            .await;
            self.notifier
                .notify(&Notice::review_recorded(&updated, action))
                .await;
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    /// Manually expire a contract. Legal from every non-terminal stage.
    pub async fn expire_contract(&self, contract_id: Uuid) -> Result<Contract, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span =
            create_negotiation_span("expire_contract", Some(contract_id), Some(&correlation_id));
        async move {
            let contract = self.fetch(contract_id).await?;
            self.transition(&contract, DealStage::Expired).await
        }
        .instrument(span)
        .await
    }

    /// Expire every non-terminal contract whose `expires_at` has passed.
    /// Pages through the store; a failure on one contract is logged and
    /// skipped so the rest of the sweep still runs.
    pub async fn sweep_expired(
        &self,
        now: DateTime<Utc>,
        page_size: u32,
    ) -> Result<SweepOutcome, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_negotiation_span("sweep_expired", None, Some(&correlation_id));
        async move {
            let page_size = page_size.max(1);
            let mut outcome = SweepOutcome::default();
            let mut offset = 0u32;
            loop {
                let query = Query::new()
                    .sort_asc("created_at")
                    .limit(page_size)
                    .offset(offset);
                let batch = self.store.list_contracts(&query).await?;
                let batch_len = batch.len();
                for contract in batch {
                    if !contract.expiry_due(now) {
                        continue;
                    }
                    match self.transition(&contract, DealStage::Expired).await {
                        Ok(_) => outcome.expired.push(contract.id),
                        Err(err) => {
                            warn!(
                                contract_id = %contract.id,
                                error = %err,
                                "Failed to expire contract during sweep"
                            );
                            outcome.failed.push(contract.id);
                        }
                    }
                }
                if batch_len < page_size as usize {
                    break;
                }
                offset += page_size;
            }
            info!(
                expired = outcome.expired.len(),
                failed = outcome.failed.len(),
                "Expiry sweep finished"
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Load one contract, mapping a missing row to the workflow's not-found.
    pub async fn contract(&self, contract_id: Uuid) -> Result<Contract, WorkflowError> {
        self.fetch(contract_id).await
    }

    pub async fn pitch(&self, pitch_id: Uuid) -> Result<Pitch, WorkflowError> {
        self.store
            .fetch_pitch(pitch_id)
            .await
            .map_err(|e| WorkflowError::from_store("pitch", e))
    }

    /// Contracts for a team, optionally narrowed to one stage, newest first.
    pub async fn contracts_for_team(
        &self,
        team_id: Uuid,
        stage: Option<DealStage>,
    ) -> Result<Vec<Contract>, WorkflowError> {
        let mut query = Query::new()
            .filter("team_id", team_id)
            .sort_desc("updated_at");
        if let Some(stage) = stage {
            query = query.filter("deal_stage", stage.as_str());
        }
        Ok(self.store.list_contracts(&query).await?)
    }

    /// Pitches a team is still taking offers on, newest first.
    pub async fn open_pitches_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Pitch>, WorkflowError> {
        let query = Query::new()
            .filter("team_id", team_id)
            .filter("status", "open")
            .sort_desc("created_at");
        Ok(self.store.list_pitches(&query).await?)
    }

    /// A team's timeline, pinned entries first, then newest first.
    pub async fn timeline_for_team(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, WorkflowError> {
        let query = Query::new()
            .filter("team_id", team_id)
            .sort_desc("occurred_at");
        let mut events = self.store.list_timeline_events(&query).await?;
        sort_events(&mut events);
        Ok(events)
    }

    /// The one code path that commits a stage change: legality table, extra
    /// gates, single patch write, timeline append, notice.
    async fn transition(
        &self,
        contract: &Contract,
        target: DealStage,
    ) -> Result<Contract, WorkflowError> {
        Self::guard_transition(contract, target)?;
        Self::guard_extras(contract, target)?;
        let now = Utc::now();
        let patch = ContractPatch::stage_change(target, now);
        let updated = self.write(contract.id, &patch).await?;
        info!(
            contract_id = %contract.id,
            from = %contract.stage,
            to = %target,
            "Contract stage changed"
        );

        self.append_event(TimelineEvent::stage_changed(
            contract.team_id,
            contract.id,
            contract.stage,
            target,
            now,
        ))
        .await;
        self.notifier.notify(&Notice::stage_advanced(&updated)).await;
        Ok(updated)
    }

    fn guard_transition(contract: &Contract, target: DealStage) -> Result<(), WorkflowError> {
        if contract.stage.allows(target) {
            Ok(())
        } else {
            Err(WorkflowError::illegal(contract.stage, target))
        }
    }

    /// Gates beyond pairwise legality, keyed by target so neither the CLI nor
    /// the sweep can reach a stage its record is not ready for.
    fn guard_extras(contract: &Contract, target: DealStage) -> Result<(), WorkflowError> {
        match target {
            DealStage::Negotiating if contract.agent_id.is_none() => {
                Err(WorkflowError::Precondition(
                    "no agent is assigned to this contract; assign one before sending".to_string(),
                ))
            }
            DealStage::UnderReview if contract.agent_id.is_none() => {
                Err(WorkflowError::Precondition(
                    "cannot submit for review without an assigned agent".to_string(),
                ))
            }
            DealStage::Completed if !contract.signatures.fully_signed() => {
                Err(WorkflowError::Precondition(
                    "cannot complete before both parties have signed".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    async fn fetch(&self, contract_id: Uuid) -> Result<Contract, WorkflowError> {
        self.store
            .fetch_contract(contract_id)
            .await
            .map_err(|e| WorkflowError::from_store("contract", e))
    }

    async fn write(
        &self,
        contract_id: Uuid,
        patch: &ContractPatch,
    ) -> Result<Contract, WorkflowError> {
        self.store
            .update_contract(contract_id, patch)
            .await
            .map_err(|e| WorkflowError::from_store("contract", e))
    }

    /// Timeline rows are view data; losing one never fails the operation
    /// that produced it.
    async fn append_event(&self, event: TimelineEvent) {
        if let Err(err) = self.store.append_timeline_event(&event).await {
            warn!(error = %err, kind = %event.kind, "Failed to append timeline event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::contract::Terms;

    fn contract_at(stage: DealStage) -> Contract {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        Contract {
            id: Uuid::new_v4(),
            pitch_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            agent_id: Some(Uuid::new_v4()),
            value_minor: 1_500_000_00,
            currency: "EUR".to_string(),
            terms: Terms::PlainText("3 year deal".to_string()),
            stage,
            signatures: SignatureSet::default(),
            review_note: None,
            expires_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_guard_transition_refuses_off_table_targets() {
        let contract = contract_at(DealStage::Draft);
        match NegotiationOrchestrator::guard_transition(&contract, DealStage::Completed) {
            Err(WorkflowError::IllegalTransition {
                from,
                requested,
                legal,
            }) => {
                assert_eq!(from, DealStage::Draft);
                assert_eq!(requested, DealStage::Completed);
                assert_eq!(legal, DealStage::Draft.legal_actions().to_vec());
            }
            other => panic!("expected IllegalTransition, got {other:?}"),
        }

        let contract = contract_at(DealStage::UnderReview);
        assert!(
            NegotiationOrchestrator::guard_transition(&contract, DealStage::Signed).is_ok()
        );
    }

    #[test]
    fn test_guard_extras_requires_agent_to_send() {
        let mut contract = contract_at(DealStage::Draft);
        contract.agent_id = None;
        assert!(matches!(
            NegotiationOrchestrator::guard_extras(&contract, DealStage::Negotiating),
            Err(WorkflowError::Precondition(_))
        ));

        contract.agent_id = Some(Uuid::new_v4());
        assert!(NegotiationOrchestrator::guard_extras(&contract, DealStage::Negotiating).is_ok());
    }

    #[test]
    fn test_guard_extras_requires_both_signatures_to_complete() {
        let mut contract = contract_at(DealStage::Signed);
        assert!(matches!(
            NegotiationOrchestrator::guard_extras(&contract, DealStage::Completed),
            Err(WorkflowError::Precondition(_))
        ));

        let now = Utc::now();
        contract.signatures.agent = Some(Signature {
            signed_at: now,
            image_url: None,
        });
        contract.signatures.team = Some(Signature {
            signed_at: now,
            image_url: None,
        });
        assert!(NegotiationOrchestrator::guard_extras(&contract, DealStage::Completed).is_ok());
    }
}
