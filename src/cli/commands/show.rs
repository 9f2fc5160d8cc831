use anyhow::Result;
use uuid::Uuid;

use crate::contract::{Contract, DealStage, Signature, Terms};

use super::{stage_emoji, with_orchestrator, Command};

pub struct ShowCommand {
    pub contract: Uuid,
}

impl ShowCommand {
    pub fn new(contract: Uuid) -> Self {
        Self { contract }
    }
}

impl Command for ShowCommand {
    async fn execute(&self) -> Result<()> {
        let id = self.contract;

        with_orchestrator(|orchestrator| async move {
            let contract = match orchestrator.contract(id).await {
                Ok(contract) => contract,
                Err(e) => {
                    println!("❌ {e}");
                    println!();
                    println!("   → Check the id: dugout status");
                    return Err(e.into());
                }
            };
            println!();

            println!(
                "{} CONTRACT {} - {}",
                stage_emoji(contract.stage),
                contract.id,
                contract.stage.label()
            );
            println!("─────────────────────────");
            println!("   💰 Value: {}", contract.value_display());
            println!("   🏷️  Status: {}", contract.status());
            println!("   🎽 Pitch: {}", contract.pitch_id);
            match orchestrator.pitch(contract.pitch_id).await {
                Ok(pitch) => {
                    println!("      {} ({})", pitch.player_name, pitch.position);
                }
                Err(_) => {
                    println!("      (pitch details unavailable)");
                }
            }
            println!("   🏟️  Team: {}", contract.team_id);
            match contract.agent_id {
                Some(agent_id) => println!("   👤 Agent: {agent_id}"),
                None => println!("   👤 Agent: not assigned yet"),
            }

            println!();
            print_terms(&contract.terms);

            println!();
            println!("🖋️  SIGNATURES:");
            print_signature("Agent", contract.signatures.agent.as_ref());
            print_signature("Team", contract.signatures.team.as_ref());

            if let Some(note) = &contract.review_note {
                println!();
                println!("📝 REVIEW NOTE:");
                println!("   {note}");
            }

            println!();
            if let Some(expires_at) = contract.expires_at {
                println!("⏳ Expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
            println!("📅 Created: {}", contract.created_at.format("%Y-%m-%d %H:%M UTC"));
            println!("📅 Updated: {}", contract.updated_at.format("%Y-%m-%d %H:%M UTC"));

            println!();
            print_next_moves(&contract);
            Ok(())
        })
        .await
    }
}

fn print_terms(terms: &Terms) {
    println!("📄 TERMS:");
    match terms {
        Terms::PlainText(text) => {
            for line in text.lines() {
                println!("   {line}");
            }
        }
        Terms::Structured(clauses) => {
            for (key, value) in clauses {
                println!("   {key}: {value}");
            }
        }
    }
}

fn print_signature(label: &str, signature: Option<&Signature>) {
    match signature {
        Some(signature) => {
            let image = signature
                .image_url
                .as_deref()
                .unwrap_or("no image on file");
            println!(
                "   ✅ {label}: signed {} ({image})",
                signature.signed_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => println!("   ⬜ {label}: pending"),
    }
}

fn print_next_moves(contract: &Contract) {
    let legal = contract.stage.legal_actions();
    if legal.is_empty() {
        println!("🔒 This contract is closed out; no further moves are legal.");
        return;
    }
    println!("🎯 LEGAL NEXT MOVES:");
    for target in legal {
        let hint = match target {
            DealStage::Negotiating if contract.stage == DealStage::Draft => {
                format!("dugout send {}", contract.id)
            }
            DealStage::Signed if contract.stage == DealStage::UnderReview => {
                format!(
                    "dugout review {} accept --reviewer <agent>",
                    contract.id
                )
            }
            DealStage::Expired => format!("dugout sweep --contract {}", contract.id),
            other => format!("dugout advance {} {}", contract.id, other),
        };
        println!("   {} {} -> {}", stage_emoji(*target), target.label(), hint);
    }
}
