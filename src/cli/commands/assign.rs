use anyhow::Result;
use uuid::Uuid;

use super::{with_orchestrator, Command};

pub struct AssignCommand {
    pub contract: Uuid,
    pub agent: Uuid,
}

impl AssignCommand {
    pub fn new(contract: Uuid, agent: Uuid) -> Self {
        Self { contract, agent }
    }
}

impl Command for AssignCommand {
    async fn execute(&self) -> Result<()> {
        let (contract_id, agent_id) = (self.contract, self.agent);

        with_orchestrator(|orchestrator| async move {
            match orchestrator.assign_agent(contract_id, agent_id).await {
                Ok(contract) => {
                    println!();
                    println!("👤 Agent {agent_id} now holds contract {}", contract.id);
                    println!();
                    println!("🎯 NEXT STEPS:");
                    println!("   → Send it over: dugout send {}", contract.id);
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not assign the agent: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }
}
