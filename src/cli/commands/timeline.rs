use anyhow::Result;
use uuid::Uuid;

use crate::timeline::{group_by_season, TimelineEventKind};

use super::{resolve_team, with_orchestrator, Command};

pub struct TimelineCommand {
    pub team: Option<Uuid>,
}

impl TimelineCommand {
    pub fn new(team: Option<Uuid>) -> Self {
        Self { team }
    }
}

impl Command for TimelineCommand {
    async fn execute(&self) -> Result<()> {
        let team_id = resolve_team(self.team)?;

        with_orchestrator(|orchestrator| async move {
            let events = match orchestrator.timeline_for_team(team_id).await {
                Ok(events) => events,
                Err(e) => {
                    println!("❌ Could not load the timeline: {e}");
                    return Err(e.into());
                }
            };
            println!();
            println!("🗞️  TRANSFER TIMELINE");
            println!("====================");

            if events.is_empty() {
                println!();
                println!("📭 Nothing on record for this team yet");
                println!("   → Draft something: dugout create --pitch <id> --value <minor-units>");
                return Ok(());
            }

            for group in group_by_season(events) {
                println!();
                let heading = format!("📅 {} SEASON", group.season);
                println!("{heading}");
                println!("{}", "─".repeat(heading.chars().count()));
                for event in &group.events {
                    let pin = if event.pinned { "📌 " } else { "   " };
                    println!(
                        "{pin}{} {} {}",
                        event.occurred_at.format("%Y-%m-%d"),
                        kind_emoji(event.kind),
                        event.title
                    );
                    if let Some(body) = &event.body {
                        println!("      {body}");
                    }
                }
            }
            Ok(())
        })
        .await
    }
}

fn kind_emoji(kind: TimelineEventKind) -> &'static str {
    match kind {
        TimelineEventKind::ContractCreated => "📝",
        TimelineEventKind::StageChanged => "⏫",
        TimelineEventKind::ContractSigned => "🖋️",
        TimelineEventKind::ContractCompleted => "🏆",
        TimelineEventKind::Announcement => "📣",
    }
}
