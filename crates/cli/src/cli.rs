//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hoopform_core::training::TrainingType;

#[derive(Debug, Parser)]
#[command(name = "hoopform", version, about = "Youth basketball posture training client")]
pub struct Cli {
    /// Override the analysis backend base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a demo account.
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the signed-in user.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Upload a training video and follow processing.
    Upload {
        file: PathBuf,
        #[arg(short, long, value_parser = parse_training_type)]
        training_type: TrainingType,
        /// Return right after the upload instead of polling.
        #[arg(long)]
        no_wait: bool,
    },
    /// Show the processing status of a task.
    Status { task_id: String },
    /// Summarize the per-frame metrics of a processed task.
    Metrics {
        task_id: String,
        #[arg(short, long, value_parser = parse_training_type)]
        training_type: TrainingType,
    },
    /// Request AI coaching feedback for a processed task.
    Analyze {
        task_id: String,
        #[arg(short, long, value_parser = parse_training_type)]
        training_type: TrainingType,
        /// Free-text description passed to the analysis service.
        #[arg(long)]
        summary: Option<String>,
    },
    /// Create a training report for a student.
    Report {
        task_id: String,
        #[arg(short, long, value_parser = parse_training_type)]
        training_type: TrainingType,
        #[arg(short, long)]
        student: String,
        /// Also deliver the report to the student's parent.
        #[arg(long)]
        send: bool,
    },
    /// Deliver a stored report to a parent.
    SendReport {
        report_id: String,
        #[arg(long)]
        parent: String,
    },
    /// List students, optionally with their report history.
    Students {
        #[arg(long)]
        reports: bool,
    },
    /// Replay a pose sequence against a simulated video clock.
    Replay {
        /// URL, `task:<id>` or JSON file. Defaults to the bundled sample.
        locator: Option<String>,
        /// Playback rate multiplier.
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Clock ticks per second.
        #[arg(long, default_value_t = 10)]
        tick_rate: u32,
        /// Render surface width for overlay scaling.
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        /// Render surface height for overlay scaling.
        #[arg(long, default_value_t = 720.0)]
        height: f64,
    },
}

fn parse_training_type(raw: &str) -> Result<TrainingType, String> {
    raw.parse().map_err(|e: hoopform_core::error::CoreError| e.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_upload() {
        let cli = Cli::try_parse_from(["hoopform", "upload", "drill.mp4", "-t", "Shooting"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Upload { training_type: TrainingType::Shooting, no_wait: false, .. }
        );
    }

    #[test]
    fn rejects_unknown_training_type() {
        assert!(Cli::try_parse_from(["hoopform", "metrics", "t1", "-t", "passing"]).is_err());
    }

    #[test]
    fn replay_defaults() {
        let cli = Cli::try_parse_from(["hoopform", "replay"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Replay { locator: None, tick_rate: 10, .. }
        );
    }

    #[test]
    fn send_report_requires_parent() {
        assert!(Cli::try_parse_from(["hoopform", "send-report", "r1"]).is_err());
        assert!(Cli::try_parse_from(["hoopform", "send-report", "r1", "--parent", "parent001"]).is_ok());
    }
}
