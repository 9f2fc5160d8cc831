use anyhow::Result;
use uuid::Uuid;

use crate::contract::DealStage;

use super::{stage_emoji, with_orchestrator, Command};

pub struct AdvanceCommand {
    pub contract: Uuid,
    pub stage: DealStage,
}

impl AdvanceCommand {
    pub fn new(contract: Uuid, stage: DealStage) -> Self {
        Self { contract, stage }
    }
}

impl Command for AdvanceCommand {
    async fn execute(&self) -> Result<()> {
        let (contract_id, target) = (self.contract, self.stage);

        with_orchestrator(|orchestrator| async move {
            match orchestrator.advance_stage(contract_id, target).await {
                Ok(contract) => {
                    println!();
                    println!(
                        "{} Contract {} is now {}",
                        stage_emoji(contract.stage),
                        contract.id,
                        contract.stage.label()
                    );
                    if !contract.stage.legal_actions().is_empty() {
                        println!();
                        println!("   → See what comes next: dugout show {}", contract.id);
                    }
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not move the contract: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}
