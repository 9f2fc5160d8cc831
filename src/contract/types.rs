use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::DealStage;

/// Contract terms, tagged at write time.
///
/// Older data stored terms as either a bare string or a loose key/value bag
/// and told them apart by sniffing field names. The tag removes that: the
/// shape is decided when the contract is written and round-trips as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Terms {
    PlainText(String),
    Structured(BTreeMap<String, serde_json::Value>),
}

impl Terms {
    /// Short single-line rendering for list views and logs.
    pub fn summary(&self) -> String {
        match self {
            Terms::PlainText(text) => {
                let mut line: String = text.lines().next().unwrap_or("").to_string();
                if line.chars().count() > 60 {
                    line = line.chars().take(57).collect();
                    line.push_str("...");
                }
                line
            }
            Terms::Structured(map) => format!("{} structured clause(s)", map.len()),
        }
    }
}

/// One of the two signing parties on a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Agent,
    Team,
}

impl Party {
    pub fn as_str(self) -> &'static str {
        match self {
            Party::Agent => "agent",
            Party::Team => "team",
        }
    }
}

impl FromStr for Party {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(Party::Agent),
            "team" => Ok(Party::Team),
            other => Err(format!("unknown party '{other}' (expected agent|team)")),
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded signature for one party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub signed_at: DateTime<Utc>,
    /// URL of the stored signature image, when one was uploaded.
    pub image_url: Option<String>,
}

/// Both signer slots. The agent signs first; team confirmation without a
/// prior agent signature is rejected by the workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureSet {
    pub agent: Option<Signature>,
    pub team: Option<Signature>,
}

impl SignatureSet {
    pub fn slot(&self, party: Party) -> Option<&Signature> {
        match party {
            Party::Agent => self.agent.as_ref(),
            Party::Team => self.team.as_ref(),
        }
    }

    pub fn fully_signed(&self) -> bool {
        self.agent.is_some() && self.team.is_some()
    }
}

/// A transfer negotiation between a team and an agent over one pitch.
///
/// `stage` is the only state field. The coarse status column in the record
/// store is derived from it on every write and never read as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub pitch_id: Uuid,
    pub team_id: Uuid,
    pub agent_id: Option<Uuid>,
    /// Monetary value in minor units (cents, pence).
    pub value_minor: i64,
    /// ISO 4217 code, e.g. "EUR".
    pub currency: String,
    pub terms: Terms,
    pub stage: DealStage,
    #[serde(default)]
    pub signatures: SignatureSet,
    pub review_note: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn status(&self) -> crate::contract::ContractStatus {
        self.stage.status()
    }

    /// True once `expires_at` has passed for a contract still in play.
    pub fn expiry_due(&self, now: DateTime<Utc>) -> bool {
        !self.stage.is_terminal() && self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn value_display(&self) -> String {
        format!("{:.2} {}", self.value_minor as f64 / 100.0, self.currency)
    }
}

/// Fields required to open a negotiation. Everything else starts at its
/// draft-stage default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
    pub pitch_id: Uuid,
    pub team_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub value_minor: i64,
    pub currency: String,
    pub terms: Terms,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A transfer listing a team has put up for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub id: Uuid,
    pub team_id: Uuid,
    pub player_name: String,
    pub position: String,
    pub asking_price_minor: Option<i64>,
    pub currency: String,
    pub summary: Option<String>,
    pub status: PitchStatus,
    pub created_at: DateTime<Utc>,
}

/// Whether a pitch is still taking offers. Closed pitches keep their
/// contracts but accept no new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchStatus {
    Open,
    Closed,
}

impl PitchStatus {
    pub fn is_open(self) -> bool {
        matches!(self, PitchStatus::Open)
    }
}

/// Minimal team profile, enough to resolve references and label output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub country: Option<String>,
}

/// Minimal agent profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub agency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_tag_round_trips() {
        let plain = Terms::PlainText("3 year deal, 2M signing bonus".to_string());
        let json = serde_json::to_value(&plain).unwrap();
        assert_eq!(json["kind"], "plain_text");
        let back: Terms = serde_json::from_value(json).unwrap();
        assert_eq!(back, plain);

        let mut clauses = BTreeMap::new();
        clauses.insert("duration_years".to_string(), serde_json::json!(3));
        clauses.insert("release_clause".to_string(), serde_json::json!("40M"));
        let structured = Terms::Structured(clauses);
        let json = serde_json::to_value(&structured).unwrap();
        assert_eq!(json["kind"], "structured");
        let back: Terms = serde_json::from_value(json).unwrap();
        assert_eq!(back, structured);
    }

    #[test]
    fn test_terms_summary_is_single_line() {
        let terms = Terms::PlainText("first line\nsecond line".to_string());
        assert_eq!(terms.summary(), "first line");

        let long = Terms::PlainText("x".repeat(100));
        assert_eq!(terms.summary().len(), 60);
    }

    #[test]
    fn test_signature_set_slots() {
        let mut sigs = SignatureSet::default();
        assert!(!sigs.fully_signed());
        assert!(sigs.slot(Party::Agent).is_none());

        sigs.agent = Some(Signature {
            signed_at: Utc::now(),
            image_url: None,
        });
        assert!(sigs.slot(Party::Agent).is_some());
        assert!(!sigs.fully_signed());

        sigs.team = Some(Signature {
            signed_at: Utc::now(),
            image_url: Some("https://store.example/sig.png".to_string()),
        });
        assert!(sigs.fully_signed());
    }

    #[test]
    fn test_party_parsing() {
        assert_eq!("agent".parse::<Party>().unwrap(), Party::Agent);
        assert_eq!("team".parse::<Party>().unwrap(), Party::Team);
        assert!("referee".parse::<Party>().is_err());
    }
}
