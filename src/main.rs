use anyhow::Result;
use clap::Parser;

use dugout::cli::commands::advance::AdvanceCommand;
use dugout::cli::commands::assign::AssignCommand;
use dugout::cli::commands::create::CreateCommand;
use dugout::cli::commands::init::InitCommand;
use dugout::cli::commands::review::ReviewCommand;
use dugout::cli::commands::show::ShowCommand;
use dugout::cli::commands::send::SendCommand;
use dugout::cli::commands::show_welcome;
use dugout::cli::commands::sign::SignCommand;
use dugout::cli::commands::Command;
use dugout::cli::commands::status::StatusCommand;
use dugout::cli::commands::sweep::SweepCommand;
use dugout::cli::commands::timeline::TimelineCommand;
use dugout::cli::{Cli, Commands};
use dugout::config::DugoutConfig;
use dugout::shutdown::ShutdownCoordinator;
use dugout::telemetry::{init_telemetry, shutdown_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Runtime::new()?.block_on(async {
        let _ = DugoutConfig::load_env_file();
        init_telemetry()?;

        let coordinator = ShutdownCoordinator::new();
        coordinator.install_signal_handlers()?;
        let handle = coordinator.handle();

        // Interrupts drop the command mid-flight rather than letting a store
        // write race the process teardown.
        let result = match handle.scope(run_command(cli)).await {
            Some(result) => result,
            None => {
                println!();
                println!("🛑 Interrupted, no further store writes were made");
                Ok(())
            }
        };

        coordinator.finalize();
        shutdown_telemetry();
        result
    })
}

async fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        None => show_welcome().await,
        Some(Commands::Status { team }) => StatusCommand::new(team).execute().await,
        Some(Commands::Show { contract }) => ShowCommand::new(contract).execute().await,
        Some(Commands::Create {
            pitch,
            team,
            agent,
            value,
            currency,
            terms,
            terms_file,
            expires_in_days,
        }) => {
            CreateCommand {
                pitch,
                team,
                agent,
                value,
                currency,
                terms,
                terms_file,
                expires_in_days,
            }
            .execute()
            .await
        }
        Some(Commands::Assign { contract, agent }) => {
            AssignCommand::new(contract, agent).execute().await
        }
        Some(Commands::Send { contract }) => SendCommand::new(contract).execute().await,
        Some(Commands::Advance { contract, stage }) => {
            AdvanceCommand::new(contract, stage).execute().await
        }
        Some(Commands::Sign {
            contract,
            party,
            image,
        }) => SignCommand::new(contract, party, image).execute().await,
        Some(Commands::Review {
            contract,
            action,
            reviewer,
            note,
        }) => {
            ReviewCommand {
                contract,
                action,
                reviewer,
                note,
            }
            .execute()
            .await
        }
        Some(Commands::Sweep { contract }) => SweepCommand::new(contract).execute().await,
        Some(Commands::Timeline { team }) => TimelineCommand::new(team).execute().await,
        Some(Commands::Init {
            base_url,
            workspace,
            force,
            dry_run,
        }) => {
            InitCommand::new(base_url, workspace, force, dry_run)
                .execute()
                .await
        }
    }
}
