use anyhow::Result;
use uuid::Uuid;

use crate::contract::{Contract, DealStage, STAGE_ORDER};

use super::{resolve_team, stage_emoji, with_orchestrator, Command};

pub struct StatusCommand {
    pub team: Option<Uuid>,
}

impl StatusCommand {
    pub fn new(team: Option<Uuid>) -> Self {
        Self { team }
    }
}

impl Command for StatusCommand {
    async fn execute(&self) -> Result<()> {
        println!("🏟️  DUGOUT NEGOTIATION BOARD");
        println!("============================");
        println!();

        let team = resolve_team(self.team)?;

        with_orchestrator(|orchestrator| async move {
            let contracts = match orchestrator.contracts_for_team(team, None).await {
                Ok(contracts) => contracts,
                Err(e) => {
                    println!("❌ Failed to fetch contracts: {e}");
                    return Err(e.into());
                }
            };
            println!();

            if contracts.is_empty() {
                println!("📭 No contracts for team {team}");
                if let Ok(pitches) = orchestrator.open_pitches_for_team(team).await {
                    if !pitches.is_empty() {
                        println!();
                        println!("🧲 OPEN PITCHES ({}):", pitches.len());
                        for pitch in &pitches {
                            let price = pitch
                                .asking_price_minor
                                .map(|minor| {
                                    format!("{:.2} {}", minor as f64 / 100.0, pitch.currency)
                                })
                                .unwrap_or_else(|| "price on request".to_string());
                            println!(
                                "   {} | {} ({}) | {}",
                                pitch.id, pitch.player_name, pitch.position, price
                            );
                        }
                        println!();
                    }
                }
                println!("   💡 Draft one with: dugout create --pitch <id> --value <minor-units>");
                return Ok(());
            }

            let mut in_play = 0;
            let mut closed = 0;
            for stage in STAGE_ORDER {
                let on_stage: Vec<&Contract> =
                    contracts.iter().filter(|c| c.stage == stage).collect();
                if on_stage.is_empty() {
                    continue;
                }
                if stage.is_terminal() {
                    closed += on_stage.len();
                } else {
                    in_play += on_stage.len();
                }
                print_stage_section(stage, &on_stage);
            }
            for stage in [DealStage::Rejected, DealStage::Expired] {
                let on_stage: Vec<&Contract> =
                    contracts.iter().filter(|c| c.stage == stage).collect();
                if on_stage.is_empty() {
                    continue;
                }
                closed += on_stage.len();
                print_stage_section(stage, &on_stage);
            }

            println!("💼 BOARD OVERVIEW:");
            println!("   📊 Total contracts: {}", contracts.len());
            println!("   🔄 In play: {in_play}");
            println!("   🔒 Closed out: {closed}");
            println!();
            println!("🎯 QUICK ACTIONS:");
            println!("   → dugout show <contract>       # Full detail and legal next moves");
            println!("   → dugout advance <contract> <stage>");
            println!("   → dugout sweep                 # Expire lapsed offers");
            Ok(())
        })
        .await
    }
}

fn print_stage_section(stage: DealStage, contracts: &[&Contract]) {
    let heading = format!(
        "{} {} ({}):",
        stage_emoji(stage),
        stage.label().to_uppercase(),
        contracts.len()
    );
    println!("{heading}");
    println!("{}", "─".repeat(heading.chars().count().saturating_sub(1)));
    for contract in contracts {
        println!(
            "   {} | {} | {}",
            contract.id,
            contract.value_display(),
            contract.terms.summary()
        );
        if let Some(expires_at) = contract.expires_at {
            if !contract.stage.is_terminal() {
                println!("      ⏳ expires {}", expires_at.format("%Y-%m-%d"));
            }
        }
    }
    println!();
}
