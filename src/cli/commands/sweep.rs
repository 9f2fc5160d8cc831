use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::config::config;
use crate::observability::OperationTimer;

use super::{with_orchestrator, Command};

pub struct SweepCommand {
    pub contract: Option<Uuid>,
}

impl Command for SweepCommand {
    async fn execute(&self) -> Result<()> {
        match self.contract {
            Some(contract_id) => Self::expire_one(contract_id).await,
            None => Self::sweep_all().await,
        }
    }
}

impl SweepCommand {
    pub fn new(contract: Option<Uuid>) -> Self {
        Self { contract }
    }

    async fn expire_one(contract_id: Uuid) -> Result<()> {
        with_orchestrator(|orchestrator| async move {
            match orchestrator.expire_contract(contract_id).await {
                Ok(contract) => {
                    println!();
                    println!("⌛ Contract {} marked expired", contract.id);
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Could not expire the contract: {e}");
                    Err(e.into())
                }
            }
        })
        .await
    }

    async fn sweep_all() -> Result<()> {
        let page_size = config()
            .map(|c| c.workflow.sweep_page_size)
            .unwrap_or(100);

        with_orchestrator(|orchestrator| async move {
            println!("⌛ Sweeping for overdue contracts...");
            let timer = OperationTimer::new("sweep_expired");
            let outcome = match orchestrator.sweep_expired(Utc::now(), page_size).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    println!("❌ Sweep aborted: {e}");
                    return Err(e.into());
                }
            };
            timer.finish();

            println!();
            if outcome.expired.is_empty() && outcome.failed.is_empty() {
                println!("✨ Nothing was overdue");
                return Ok(());
            }

            if !outcome.expired.is_empty() {
                println!("⌛ Expired {} contract(s):", outcome.expired.len());
                for id in &outcome.expired {
                    println!("   {id}");
                }
            }
            if !outcome.failed.is_empty() {
                println!();
                println!("⚠️  Could not expire {} contract(s):", outcome.failed.len());
                for id in &outcome.failed {
                    println!("   {id}");
                }
                println!("   → Re-run the sweep, or expire one directly: dugout sweep --contract <id>");
            }
            Ok(())
        })
        .await
    }
}
