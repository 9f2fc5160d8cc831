use thiserror::Error;
use uuid::Uuid;

use crate::contract::DealStage;
use crate::store::StoreError;

/// Errors raised by negotiation operations.
///
/// Every variant ends the operation that raised it: nothing is retried and no
/// partial write is left behind. `Store` wraps upstream record store
/// failures; the other variants are domain rules.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: String },

    #[error(
        "Illegal transition from {from} to {requested} (legal from {from}: {})",
        format_stages(.legal)
    )]
    IllegalTransition {
        from: DealStage,
        requested: DealStage,
        legal: Vec<DealStage>,
    },

    #[error("Invalid signature order: {0}")]
    SignatureOrder(String),

    #[error("Review not permitted: {reviewer} is not the agent assigned to this contract")]
    ReviewNotPermitted { reviewer: Uuid },

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Record store request failed: {0}")]
    Store(#[from] StoreError),
}

fn format_stages(stages: &[DealStage]) -> String {
    if stages.is_empty() {
        return "none".to_string();
    }
    stages
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl WorkflowError {
    /// The refusal for a target outside `legal_actions(from)`.
    pub fn illegal(from: DealStage, requested: DealStage) -> Self {
        WorkflowError::IllegalTransition {
            from,
            requested,
            legal: from.legal_actions().to_vec(),
        }
    }

    /// Store-level "row missing" becomes the workflow's not-found; everything
    /// else stays an upstream failure.
    pub(crate) fn from_store(entity: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => WorkflowError::NotFound { entity, id },
            other => WorkflowError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_transition_names_the_legal_targets() {
        let err = WorkflowError::illegal(DealStage::Signed, DealStage::Negotiating);
        let text = err.to_string();
        assert!(text.contains("from signed to negotiating"), "{text}");
        assert!(text.contains("completed, rejected, expired"), "{text}");
    }

    #[test]
    fn test_illegal_transition_from_terminal_says_none() {
        let err = WorkflowError::illegal(DealStage::Completed, DealStage::Draft);
        assert!(err.to_string().contains("legal from completed: none"));
    }

    #[test]
    fn test_store_not_found_becomes_workflow_not_found() {
        let store_err = StoreError::NotFound {
            table: "contracts",
            id: "abc".to_string(),
        };
        match WorkflowError::from_store("contract", store_err) {
            WorkflowError::NotFound { entity, id } => {
                assert_eq!(entity, "contract");
                assert_eq!(id, "abc");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        let denied = StoreError::Http {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert!(matches!(
            WorkflowError::from_store("contract", denied),
            WorkflowError::Store(_)
        ));
    }
}
