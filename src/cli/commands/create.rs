use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::config;
use crate::contract::{NewContract, Terms};

use super::{resolve_team, with_orchestrator, Command};

pub struct CreateCommand {
    pub pitch: Uuid,
    pub team: Option<Uuid>,
    pub agent: Option<Uuid>,
    pub value: i64,
    pub currency: String,
    pub terms: Option<String>,
    pub terms_file: Option<PathBuf>,
    pub expires_in_days: Option<u32>,
}

impl Command for CreateCommand {
    async fn execute(&self) -> Result<()> {
        let team_id = resolve_team(self.team)?;
        let terms = self.build_terms()?;

        let expiry_days = self
            .expires_in_days
            .or_else(|| config().ok().and_then(|c| c.workflow.default_expiry_days));
        let expires_at = expiry_days.map(|days| Utc::now() + Duration::days(i64::from(days)));

        let draft = NewContract {
            pitch_id: self.pitch,
            team_id,
            agent_id: self.agent,
            value_minor: self.value,
            currency: self.currency.clone(),
            terms,
            expires_at,
        };

        with_orchestrator(|orchestrator| async move {
            match orchestrator.create_contract(draft).await {
                Ok(contract) => {
                    println!();
                    println!("📝 Drafted contract {}", contract.id);
                    println!("   💰 {}", contract.value_display());
                    if let Some(expires_at) = contract.expires_at {
                        println!("   ⏳ Expires {}", expires_at.format("%Y-%m-%d"));
                    }
                    println!();
                    println!("🎯 NEXT STEPS:");
                    if contract.agent_id.is_none() {
                        println!(
                            "   → Assign the counterparty agent: dugout assign {} --agent <id>",
                            contract.id
                        );
                    }
                    println!("   → Send it to the agent: dugout send {}", contract.id);
                    println!("   → Inspect it any time: dugout show {}", contract.id);
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not draft the contract: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}

impl CreateCommand {
    fn build_terms(&self) -> Result<Terms> {
        if let Some(text) = &self.terms {
            return Ok(Terms::PlainText(text.clone()));
        }
        if let Some(path) = &self.terms_file {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("could not read terms file {}: {e}", path.display()))?;
            let clauses: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
                .map_err(|e| {
                    anyhow!(
                        "terms file {} must hold a JSON object of clauses: {e}",
                        path.display()
                    )
                })?;
            return Ok(Terms::Structured(clauses));
        }
        println!("❌ No terms given");
        println!();
        println!("   → Inline text: dugout create --pitch <id> --value 500000 --terms \"...\"");
        println!("   → Clause file: dugout create --pitch <id> --value 500000 --terms-file terms.json");
        Err(anyhow!("contract terms are required"))
    }
}
