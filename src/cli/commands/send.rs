use anyhow::Result;
use uuid::Uuid;

use super::{with_orchestrator, Command};

pub struct SendCommand {
    pub contract: Uuid,
}

impl SendCommand {
    pub fn new(contract: Uuid) -> Self {
        Self { contract }
    }
}

impl Command for SendCommand {
    async fn execute(&self) -> Result<()> {
        let contract_id = self.contract;

        with_orchestrator(|orchestrator| async move {
            match orchestrator.send_to_agent(contract_id).await {
                Ok(contract) => {
                    println!();
                    println!("📨 Contract {} sent to the agent", contract.id);
                    if let Some(agent_id) = contract.agent_id {
                        println!("   👤 Negotiating with {agent_id}");
                    }
                    println!();
                    println!("🎯 NEXT STEPS:");
                    println!(
                        "   → Once talks settle, request review: dugout advance {} under_review",
                        contract.id
                    );
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not send the contract: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}
