use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fine-grained negotiation stage of a contract.
///
/// This is the single canonical state field. The coarse `ContractStatus`
/// shown in list views is always derived from it via `DealStage::status`,
/// never stored independently by this crate's write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DealStage {
    /// Created by a team, not yet sent to the agent
    Draft,
    /// Offer is with the agent, terms are being negotiated
    Negotiating,
    /// Agent has submitted the terms for formal review
    UnderReview,
    /// Both parties agreed, signatures being collected
    Signed,
    /// Fully executed, end of the happy path
    Completed,
    /// Turned down by either party (absorbing)
    Rejected,
    /// Offer lapsed before completion (absorbing)
    Expired,
}

/// Coarse display status derived from the deal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContractStatus {
    Draft,
    Active,
    Signed,
    Completed,
    Rejected,
    Expired,
}

/// Decision an agent can record while a contract is under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Accept,
    Modify,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown deal stage '{0}'")]
pub struct UnknownStage(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown contract status '{0}'")]
pub struct UnknownStatus(pub String);

/// The forward progression of a negotiation, in order. Absorbing stages
/// (`Rejected`, `Expired`) sit outside the progression and have no position.
pub const STAGE_ORDER: [DealStage; 5] = [
    DealStage::Draft,
    DealStage::Negotiating,
    DealStage::UnderReview,
    DealStage::Signed,
    DealStage::Completed,
];

impl DealStage {
    /// Position in `STAGE_ORDER`, or `None` for absorbing stages.
    pub fn position(self) -> Option<usize> {
        STAGE_ORDER.iter().position(|&s| s == self)
    }

    /// Whether a further forward step exists from this stage.
    pub fn can_advance(self) -> bool {
        match self.position() {
            Some(idx) => idx + 1 < STAGE_ORDER.len(),
            None => false,
        }
    }

    /// The stage immediately after this one in the progression, if any.
    pub fn next_stage(self) -> Option<DealStage> {
        let idx = self.position()?;
        STAGE_ORDER.get(idx + 1).copied()
    }

    /// The complete set of stages legally reachable from this one.
    ///
    /// Every mutation path (advance, review, expiry sweep) consults this one
    /// table; there is deliberately no other encoding of transition legality
    /// anywhere in the crate.
    pub fn legal_actions(self) -> &'static [DealStage] {
        match self {
            DealStage::Draft => &[
                DealStage::Negotiating,
                DealStage::Rejected,
                DealStage::Expired,
            ],
            DealStage::Negotiating => &[
                DealStage::UnderReview,
                DealStage::Rejected,
                DealStage::Expired,
            ],
            DealStage::UnderReview => &[
                DealStage::Signed,
                DealStage::Negotiating,
                DealStage::Rejected,
                DealStage::Expired,
            ],
            DealStage::Signed => &[
                DealStage::Completed,
                DealStage::Rejected,
                DealStage::Expired,
            ],
            DealStage::Completed | DealStage::Rejected | DealStage::Expired => &[],
        }
    }

    /// True if `target` is a legal transition out of this stage.
    pub fn allows(self, target: DealStage) -> bool {
        self.legal_actions().contains(&target)
    }

    /// Stages with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        self.legal_actions().is_empty()
    }

    /// The fixed stage -> status mapping. This is the only place the coarse
    /// status is computed.
    pub fn status(self) -> ContractStatus {
        match self {
            DealStage::Draft => ContractStatus::Draft,
            DealStage::Negotiating | DealStage::UnderReview => ContractStatus::Active,
            DealStage::Signed => ContractStatus::Signed,
            DealStage::Completed => ContractStatus::Completed,
            DealStage::Rejected => ContractStatus::Rejected,
            DealStage::Expired => ContractStatus::Expired,
        }
    }

    /// Canonical wire spelling, as stored in the record store.
    pub fn as_str(self) -> &'static str {
        match self {
            DealStage::Draft => "draft",
            DealStage::Negotiating => "negotiating",
            DealStage::UnderReview => "under_review",
            DealStage::Signed => "signed",
            DealStage::Completed => "completed",
            DealStage::Rejected => "rejected",
            DealStage::Expired => "expired",
        }
    }

    /// Human-readable label for progress displays.
    pub fn label(self) -> &'static str {
        match self {
            DealStage::Draft => "Draft",
            DealStage::Negotiating => "Negotiating",
            DealStage::UnderReview => "Under review",
            DealStage::Signed => "Signed",
            DealStage::Completed => "Completed",
            DealStage::Rejected => "Rejected",
            DealStage::Expired => "Expired",
        }
    }
}

impl FromStr for DealStage {
    type Err = UnknownStage;

    /// Parses canonical spellings plus the legacy aliases still present in
    /// older records (`sent`, `finalizing`). Aliases are accepted on read
    /// and never written back.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DealStage::Draft),
            "negotiating" | "sent" => Ok(DealStage::Negotiating),
            "under_review" => Ok(DealStage::UnderReview),
            "signed" | "finalizing" => Ok(DealStage::Signed),
            "completed" => Ok(DealStage::Completed),
            "rejected" => Ok(DealStage::Rejected),
            "expired" => Ok(DealStage::Expired),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

impl TryFrom<String> for DealStage {
    type Error = UnknownStage;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DealStage> for String {
    fn from(stage: DealStage) -> Self {
        stage.as_str().to_string()
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Signed => "signed",
            ContractStatus::Completed => "completed",
            ContractStatus::Rejected => "rejected",
            ContractStatus::Expired => "expired",
        }
    }
}

impl FromStr for ContractStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContractStatus::Draft),
            "active" => Ok(ContractStatus::Active),
            "signed" => Ok(ContractStatus::Signed),
            "completed" => Ok(ContractStatus::Completed),
            "rejected" => Ok(ContractStatus::Rejected),
            "expired" => Ok(ContractStatus::Expired),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ContractStatus {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContractStatus> for String {
    fn from(status: ContractStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReviewAction {
    /// The stage a review decision lands the contract in.
    pub fn target_stage(self) -> DealStage {
        match self {
            ReviewAction::Accept => DealStage::Signed,
            ReviewAction::Modify => DealStage::Negotiating,
            ReviewAction::Reject => DealStage::Rejected,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewAction::Accept => "accept",
            ReviewAction::Modify => "modify",
            ReviewAction::Reject => "reject",
        }
    }
}

impl FromStr for ReviewAction {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ReviewAction::Accept),
            "modify" => Ok(ReviewAction::Modify),
            "reject" => Ok(ReviewAction::Reject),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_positions_follow_declared_order() {
        assert_eq!(DealStage::Draft.position(), Some(0));
        assert_eq!(DealStage::Negotiating.position(), Some(1));
        assert_eq!(DealStage::UnderReview.position(), Some(2));
        assert_eq!(DealStage::Signed.position(), Some(3));
        assert_eq!(DealStage::Completed.position(), Some(4));

        // Absorbing stages sit outside the progression
        assert_eq!(DealStage::Rejected.position(), None);
        assert_eq!(DealStage::Expired.position(), None);

        // Strict total order over the progression
        for pair in STAGE_ORDER.windows(2) {
            assert!(pair[0].position().unwrap() < pair[1].position().unwrap());
        }
    }

    #[test]
    fn test_next_stage_walks_the_progression() {
        assert_eq!(DealStage::Draft.next_stage(), Some(DealStage::Negotiating));
        assert_eq!(
            DealStage::Negotiating.next_stage(),
            Some(DealStage::UnderReview)
        );
        assert_eq!(DealStage::UnderReview.next_stage(), Some(DealStage::Signed));
        assert_eq!(DealStage::Signed.next_stage(), Some(DealStage::Completed));
        assert_eq!(DealStage::Completed.next_stage(), None);
        assert_eq!(DealStage::Rejected.next_stage(), None);
        assert_eq!(DealStage::Expired.next_stage(), None);
    }

    #[test]
    fn test_can_advance_false_only_past_the_end() {
        assert!(DealStage::Draft.can_advance());
        assert!(DealStage::Negotiating.can_advance());
        assert!(DealStage::UnderReview.can_advance());
        assert!(DealStage::Signed.can_advance());
        assert!(!DealStage::Completed.can_advance());
        assert!(!DealStage::Rejected.can_advance());
        assert!(!DealStage::Expired.can_advance());
    }

    #[test]
    fn test_legal_actions_table() {
        assert_eq!(
            DealStage::Draft.legal_actions(),
            &[
                DealStage::Negotiating,
                DealStage::Rejected,
                DealStage::Expired
            ]
        );
        assert_eq!(
            DealStage::Negotiating.legal_actions(),
            &[
                DealStage::UnderReview,
                DealStage::Rejected,
                DealStage::Expired
            ]
        );
        assert_eq!(
            DealStage::UnderReview.legal_actions(),
            &[
                DealStage::Signed,
                DealStage::Negotiating,
                DealStage::Rejected,
                DealStage::Expired
            ]
        );
        assert_eq!(
            DealStage::Signed.legal_actions(),
            &[
                DealStage::Completed,
                DealStage::Rejected,
                DealStage::Expired
            ]
        );

        // Terminal stages have no outgoing actions
        assert!(DealStage::Completed.legal_actions().is_empty());
        assert!(DealStage::Rejected.legal_actions().is_empty());
        assert!(DealStage::Expired.legal_actions().is_empty());
    }

    #[test]
    fn test_rejected_and_expired_reachable_from_every_non_terminal() {
        for stage in [
            DealStage::Draft,
            DealStage::Negotiating,
            DealStage::UnderReview,
            DealStage::Signed,
        ] {
            assert!(stage.allows(DealStage::Rejected), "{stage} -> rejected");
            assert!(stage.allows(DealStage::Expired), "{stage} -> expired");
        }
    }

    #[test]
    fn test_skipping_ahead_is_not_legal() {
        assert!(!DealStage::Draft.allows(DealStage::Signed));
        assert!(!DealStage::Draft.allows(DealStage::Completed));
        assert!(!DealStage::Negotiating.allows(DealStage::Completed));
        // Backing out of a signed deal into negotiation is not legal either
        assert!(!DealStage::Signed.allows(DealStage::Negotiating));
    }

    #[test]
    fn test_review_action_targets() {
        assert_eq!(ReviewAction::Accept.target_stage(), DealStage::Signed);
        assert_eq!(ReviewAction::Modify.target_stage(), DealStage::Negotiating);
        assert_eq!(ReviewAction::Reject.target_stage(), DealStage::Rejected);
    }

    #[test]
    fn test_status_mapping_table() {
        assert_eq!(DealStage::Draft.status(), ContractStatus::Draft);
        assert_eq!(DealStage::Negotiating.status(), ContractStatus::Active);
        assert_eq!(DealStage::UnderReview.status(), ContractStatus::Active);
        assert_eq!(DealStage::Signed.status(), ContractStatus::Signed);
        assert_eq!(DealStage::Completed.status(), ContractStatus::Completed);
        assert_eq!(DealStage::Rejected.status(), ContractStatus::Rejected);
        assert_eq!(DealStage::Expired.status(), ContractStatus::Expired);
    }

    #[test]
    fn test_parse_canonical_and_legacy_spellings() {
        assert_eq!("draft".parse(), Ok(DealStage::Draft));
        assert_eq!("under_review".parse(), Ok(DealStage::UnderReview));

        // Legacy spellings from older records
        assert_eq!("sent".parse(), Ok(DealStage::Negotiating));
        assert_eq!("finalizing".parse(), Ok(DealStage::Signed));

        // Aliases are normalized, never round-tripped
        assert_eq!(DealStage::Negotiating.as_str(), "negotiating");
        assert_eq!(DealStage::Signed.as_str(), "signed");

        assert_eq!(
            "garbage".parse::<DealStage>(),
            Err(UnknownStage("garbage".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_wire_spellings() {
        let json = serde_json::to_string(&DealStage::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");

        let stage: DealStage = serde_json::from_str("\"sent\"").unwrap();
        assert_eq!(stage, DealStage::Negotiating);

        let status: ContractStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, ContractStatus::Active);
    }
}
