use anyhow::Result;
use uuid::Uuid;

use crate::contract::ReviewAction;

use super::{with_orchestrator, Command};

pub struct ReviewCommand {
    pub contract: Uuid,
    pub action: ReviewAction,
    pub reviewer: Uuid,
    pub note: Option<String>,
}

impl Command for ReviewCommand {
    async fn execute(&self) -> Result<()> {
        let (contract_id, reviewer, action) = (self.contract, self.reviewer, self.action);
        let note = self.note.clone();

        with_orchestrator(|orchestrator| async move {
            match orchestrator
                .review_contract(contract_id, reviewer, action, note)
                .await
            {
                Ok(contract) => {
                    println!();
                    match action {
                        ReviewAction::Accept => {
                            println!("🤝 Offer accepted. Contract {} is signed.", contract.id);
                            println!();
                            println!("🎯 NEXT STEPS:");
                            println!(
                                "   → Collect signatures: dugout sign {} agent",
                                contract.id
                            );
                        }
                        ReviewAction::Modify => {
                            println!(
                                "🔁 Changes requested. Contract {} is back in negotiation.",
                                contract.id
                            );
                            println!();
                            println!("🎯 NEXT STEPS:");
                            println!(
                                "   → Rework terms, then: dugout advance {} under_review",
                                contract.id
                            );
                        }
                        ReviewAction::Reject => {
                            println!("🚫 Offer rejected. Contract {} is closed.", contract.id);
                        }
                    }
                    if let Some(note) = &contract.review_note {
                        println!();
                        println!("📝 Note on file: {note}");
                    }
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not record the review: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}
