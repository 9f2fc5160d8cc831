use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use crate::config::config;
use crate::contract::DealStage;
use crate::media::{HttpMediaStore, MediaStore};
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::store::{RecordStoreClient, StoreError};
use crate::workflow::NegotiationOrchestrator;

pub mod advance;
pub mod assign;
pub mod create;
pub mod init;
pub mod review;
pub mod send;
pub mod show;
pub mod sign;
pub mod status;
pub mod sweep;
pub mod timeline;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Wire an orchestrator against the configured store, notifier, and media
/// backend.
pub fn build_orchestrator() -> Result<NegotiationOrchestrator, StoreError> {
    let client = RecordStoreClient::new()?;
    let media: Arc<dyn MediaStore> = Arc::new(HttpMediaStore::new(
        client.base_url(),
        client.token(),
        client.workspace(),
    ));
    let notifier: Arc<dyn Notifier> = match config()
        .ok()
        .filter(|c| c.notifications.enabled)
        .and_then(|c| c.notifications.webhook_url.clone())
    {
        Some(url) => Arc::new(WebhookNotifier::new(url)),
        None => Arc::new(LogNotifier),
    };
    Ok(NegotiationOrchestrator::new(
        Arc::new(client),
        notifier,
        media,
    ))
}

pub async fn with_orchestrator<F, Fut, R>(f: F) -> Result<R>
where
    F: FnOnce(NegotiationOrchestrator) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    print!("🔄 Connecting to record store... ");
    std::io::Write::flush(&mut std::io::stdout()).unwrap();

    match build_orchestrator() {
        Ok(orchestrator) => {
            println!("✅");
            f(orchestrator).await
        }
        Err(e) => {
            println!("❌");
            println!();
            println!("{e}");
            Err(e.into())
        }
    }
}

/// The team a command operates on: explicit flag first, then the configured
/// default.
pub fn resolve_team(explicit: Option<Uuid>) -> Result<Uuid> {
    if let Some(team) = explicit {
        return Ok(team);
    }
    if let Some(team) = config().ok().and_then(|c| c.workflow.team_id) {
        return Ok(team);
    }
    println!("❌ No team given and no default configured");
    println!("   → Pass one: --team <uuid>");
    println!("   → Or set workflow.team_id in dugout.toml");
    Err(anyhow::anyhow!("no team configured"))
}

pub fn stage_emoji(stage: DealStage) -> &'static str {
    match stage {
        DealStage::Draft => "📝",
        DealStage::Negotiating => "💬",
        DealStage::UnderReview => "🧐",
        DealStage::Signed => "🖋️",
        DealStage::Completed => "✅",
        DealStage::Rejected => "🚫",
        DealStage::Expired => "⌛",
    }
}

pub async fn show_welcome() -> Result<()> {
    println!("🏟️  Dugout - Transfer Negotiation Orchestration");
    println!();
    println!("To get started:");
    println!("  📊 dugout status    # Negotiation board for your team");
    println!("  📝 dugout create    # Draft a contract against a pitch");
    println!("  📨 dugout send      # Send a draft to its agent");
    println!("  🔍 dugout show      # Inspect one contract");
    println!();
    println!("Working a deal:");
    println!("  ⏫ dugout advance   # Move a contract through its stages");
    println!("  🧐 dugout review    # Record the agent's verdict");
    println!("  🖋️  dugout sign     # Record a signature");
    println!("  ⌛ dugout sweep     # Expire lapsed contracts");
    println!();
    println!("💡 First time? Run 'dugout init' to write a starter dugout.toml");
    Ok(())
}
