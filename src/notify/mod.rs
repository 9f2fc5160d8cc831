use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[cfg(test)]
use mockall::{automock, predicate::*};

use crate::contract::{Contract, Party, ReviewAction};

/// A user-visible notification produced by the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub contract_id: Uuid,
    pub team_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub headline: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ContractCreated,
    StageAdvanced,
    SignatureRecorded,
    ReviewRecorded,
    ContractExpired,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeKind::ContractCreated => "contract_created",
            NoticeKind::StageAdvanced => "stage_advanced",
            NoticeKind::SignatureRecorded => "signature_recorded",
            NoticeKind::ReviewRecorded => "review_recorded",
            NoticeKind::ContractExpired => "contract_expired",
        };
        write!(f, "{}", label)
    }
}

impl Notice {
    fn base(kind: NoticeKind, contract: &Contract, headline: String) -> Self {
        Self {
            kind,
            contract_id: contract.id,
            team_id: contract.team_id,
            agent_id: contract.agent_id,
            headline,
            detail: None,
        }
    }

    pub fn created(contract: &Contract) -> Self {
        Self::base(
            NoticeKind::ContractCreated,
            contract,
            "Contract drafted".to_string(),
        )
    }

    pub fn stage_advanced(contract: &Contract) -> Self {
        let headline = match contract.stage {
            crate::contract::DealStage::Expired => "Contract expired".to_string(),
            stage => format!("Contract moved to {}", stage.label()),
        };
        let kind = match contract.stage {
            crate::contract::DealStage::Expired => NoticeKind::ContractExpired,
            _ => NoticeKind::StageAdvanced,
        };
        Self::base(kind, contract, headline)
    }

    pub fn signature_recorded(contract: &Contract, party: Party) -> Self {
        Self::base(
            NoticeKind::SignatureRecorded,
            contract,
            format!("Signature recorded for {party}"),
        )
    }

    pub fn review_recorded(contract: &Contract, action: ReviewAction) -> Self {
        Self::base(
            NoticeKind::ReviewRecorded,
            contract,
            format!("Review decision: {action}"),
        )
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Delivery seam for notifications.
///
/// Fire-and-forget: implementations log their own failures and `notify`
/// never returns an error, so a broken notification channel cannot fail a
/// workflow operation that has already committed its write.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice);
}

/// Default notifier: structured log output only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &Notice) {
        info!(
            kind = %notice.kind,
            contract_id = %notice.contract_id,
            team_id = %notice.team_id,
            headline = %notice.headline,
            "notification"
        );
    }
}

/// Posts each notice as JSON to a configured webhook.
#[derive(Debug)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &Notice) {
        let result = self.http.post(&self.url).json(notice).send().await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    status = response.status().as_u16(),
                    kind = %notice.kind,
                    "notification webhook rejected notice"
                );
            }
            Err(err) => {
                warn!(error = %err, kind = %notice.kind, "notification webhook unreachable");
            }
            Ok(_) => {}
        }
    }
}

/// Collects notices for assertions - no side effects
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
