//! `hoopform` command-line client.

mod cli;
mod commands;
mod replay;

use clap::Parser;
use hoopform_client::{ClientConfig, SequenceLocator};
use hoopform_core::pose::FrameSize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::commands::App;
use crate::replay::ReplayOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hoopform_cli=info,hoopform_client=info,hoopform_player=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    let app = App::new(config)?;

    match cli.command {
        Command::Login { username, password } => commands::login(&app, &username, &password),
        Command::Logout => commands::logout(&app),
        Command::Whoami => commands::whoami(&app),
        Command::Upload {
            file,
            training_type,
            no_wait,
        } => commands::upload(&app, &file, training_type, no_wait).await,
        Command::Status { task_id } => commands::status(&app, &task_id).await,
        Command::Metrics {
            task_id,
            training_type,
        } => commands::metrics(&app, &task_id, training_type).await,
        Command::Analyze {
            task_id,
            training_type,
            summary,
        } => commands::analyze(&app, &task_id, training_type, summary).await,
        Command::Report {
            task_id,
            training_type,
            student,
            send,
        } => commands::report(&app, &task_id, training_type, &student, send).await,
        Command::SendReport { report_id, parent } => {
            commands::send_report(&app, &report_id, &parent).await
        }
        Command::Students { reports } => commands::students(&app, reports).await,
        Command::Replay {
            locator,
            speed,
            tick_rate,
            width,
            height,
        } => {
            let locator = match locator {
                Some(raw) => SequenceLocator::parse(&raw),
                None => SequenceLocator::File(app.config.sample_sequence.clone()),
            };
            let options = ReplayOptions {
                locator,
                speed,
                tick_rate,
                render: FrameSize::new(width, height),
            };
            replay::replay(&app, options).await
        }
    }
}
