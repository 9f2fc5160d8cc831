//! Workspace setup. Non-destructive: an existing dugout.toml is never
//! overwritten unless `--force` is given, and `--dry-run` only prints what
//! would be written.

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::config::DugoutConfig;
use crate::store::RecordStoreClient;

use super::Command;

const CONFIG_FILE: &str = "dugout.toml";

pub struct InitCommand {
    pub base_url: Option<String>,
    pub workspace: Option<String>,
    pub force: bool,
    pub dry_run: bool,
}

impl InitCommand {
    pub fn new(
        base_url: Option<String>,
        workspace: Option<String>,
        force: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            base_url,
            workspace,
            force,
            dry_run,
        }
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        println!("⚙️  DUGOUT INIT");
        println!("==============");
        println!();

        if Path::new(CONFIG_FILE).exists() && !self.force && !self.dry_run {
            println!("❌ {CONFIG_FILE} already exists");
            println!("   → Overwrite it: dugout init --force");
            println!("   → Preview instead: dugout init --dry-run");
            return Err(anyhow!("refusing to overwrite {CONFIG_FILE}"));
        }

        let mut config = DugoutConfig::default();
        if let Some(base_url) = &self.base_url {
            config.store.base_url = base_url.clone();
        }
        if let Some(workspace) = &self.workspace {
            config.store.workspace = workspace.clone();
        }

        if self.dry_run {
            println!("🔍 DRY RUN - would write {CONFIG_FILE}:");
            println!();
            for line in toml::to_string_pretty(&config)?.lines() {
                println!("   {line}");
            }
            return Ok(());
        }

        config.save_to_file(CONFIG_FILE)?;
        println!("✅ Wrote {CONFIG_FILE}");
        println!("   🌐 Store: {}", config.store.base_url);
        println!("   🗂️  Workspace: {}", config.store.workspace);

        match resolve_token() {
            Some(token) => {
                print!("🌐 Checking the record store... ");
                std::io::Write::flush(&mut std::io::stdout())?;
                let client =
                    RecordStoreClient::from_parts(&config.store.base_url, &token, &config.store.workspace)?;
                match client.health().await {
                    Ok(()) => println!("✅ reachable"),
                    Err(e) => {
                        println!("⚠️  unreachable ({e})");
                        println!("   → Commands will fail until the store is up");
                    }
                }
            }
            None => {
                println!();
                println!("🔑 No store token found");
                println!("   → Export one: export DUGOUT_STORE_TOKEN=<token>");
                println!("   → Or put STORE_TOKEN=<token> in .env");
            }
        }

        println!();
        println!("🎯 NEXT STEPS:");
        println!("   → Set your club: workflow.team_id in {CONFIG_FILE}");
        println!("   → See the board: dugout status");
        Ok(())
    }
}

fn resolve_token() -> Option<String> {
    std::env::var("STORE_TOKEN")
        .or_else(|_| std::env::var("DUGOUT_STORE_TOKEN"))
        .ok()
        .filter(|token| !token.is_empty())
}
