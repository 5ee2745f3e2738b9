//! Subcommand handlers.

use std::path::Path;

use anyhow::{bail, Context};
use hoopform_client::api::AnalysisApi;
use hoopform_client::feedback::analyze_or_fallback;
use hoopform_client::poll::{poll_until_settled, PollOutcome};
use hoopform_client::session::SessionStore;
use hoopform_client::students::{load_student_options, StudentOptions};
use hoopform_client::ClientConfig;
use hoopform_core::analysis::{AiAnalysis, AiAnalysisRequest, MetricsFrame};
use hoopform_core::auth::{resolve_route, AuthUser, RouteDecision};
use hoopform_core::metrics::{moving_average, ComplianceTally, MetricsTimeline};
use hoopform_core::report::NewTrainingReport;
use hoopform_core::training::TrainingType;
use tokio_util::sync::CancellationToken;

/// Samples averaged when computing a metric's trend.
const TREND_WINDOW: usize = 5;

/// Page a report-management command belongs to.
const COACH_TRAINING_PATH: &str = "/coach/training";

/// Shared state for one invocation.
pub struct App {
    pub config: ClientConfig,
    pub api: AnalysisApi,
    pub session: SessionStore,
}

impl App {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let api = AnalysisApi::from_config(&config).context("Failed to build HTTP client")?;
        let session = SessionStore::new(config.session_file.clone());
        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// The signed-in user, if allowed to open `path`.
    fn require(&self, path: &str) -> anyhow::Result<AuthUser> {
        let user = self.session.load();
        match resolve_route(user.as_ref(), path) {
            RouteDecision::Allow => user.context("Not signed in"),
            RouteDecision::Redirect(_) if user.is_none() => {
                bail!("Not signed in. Run `hoopform login` first")
            }
            RouteDecision::Redirect(_) => bail!("This command is only available to coaches"),
        }
    }

    /// The signed-in user of any role.
    fn require_user(&self) -> anyhow::Result<AuthUser> {
        self.session
            .load()
            .context("Not signed in. Run `hoopform login` first")
    }
}

// ---- session ----

pub fn login(app: &App, username: &str, password: &str) -> anyhow::Result<()> {
    let user = app.session.login(username, password)?;
    println!("Signed in as {} ({})", user.name, user.role);
    println!("Home: {}", user.role.home_path());
    Ok(())
}

pub fn logout(app: &App) -> anyhow::Result<()> {
    app.session.clear()?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(app: &App) -> anyhow::Result<()> {
    match app.session.load() {
        Some(user) => println!("{} [{}] {} -> {}", user.id, user.role, user.name, user.role.home_path()),
        None => println!("Not signed in"),
    }
    Ok(())
}

// ---- processing ----

pub async fn upload(
    app: &App,
    file: &Path,
    training_type: TrainingType,
    no_wait: bool,
) -> anyhow::Result<()> {
    app.require_user()?;
    let response = app.api.upload_video(file, training_type).await?;
    println!("Uploaded {} as task {}", file.display(), response.task_id);
    if no_wait {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut last_progress = -1;
    let outcome = poll_until_settled(
        &app.api,
        &response.task_id,
        app.config.poll_interval,
        &cancel,
        |status| {
            if status.progress != last_progress {
                last_progress = status.progress;
                println!("{:?}: {}%", status.status, status.progress);
            }
        },
    )
    .await;

    match outcome {
        PollOutcome::Completed(_) => {
            println!("Processing complete. Video: {}", app.api.video_url(&response.task_id));
            Ok(())
        }
        PollOutcome::Failed(error) => bail!("Processing failed: {error}"),
        PollOutcome::Cancelled => {
            println!("Stopped waiting; task {} keeps processing", response.task_id);
            Ok(())
        }
    }
}

pub async fn status(app: &App, task_id: &str) -> anyhow::Result<()> {
    let status = app.api.task_status(task_id).await?;
    println!("{task_id}: {:?} {}%", status.status, status.progress);
    if let Some(error) = status.error {
        println!("error: {error}");
    }
    Ok(())
}

async fn fetch_metrics(app: &App, task_id: &str) -> anyhow::Result<Vec<MetricsFrame>> {
    let result = app
        .api
        .analysis_result(task_id)
        .await
        .with_context(|| format!("Failed to fetch metrics for task {task_id}"))?;
    Ok(result.metrics)
}

pub async fn metrics(app: &App, task_id: &str, training_type: TrainingType) -> anyhow::Result<()> {
    let timeline = MetricsTimeline::new(fetch_metrics(app, task_id).await?);
    if timeline.is_empty() {
        println!("No metrics recorded for task {task_id}");
        return Ok(());
    }

    let mut tally = ComplianceTally::new();
    for metrics in timeline.frames().iter().filter_map(MetricsFrame::first_person) {
        tally.record(training_type, metrics);
    }

    let summary = timeline.summary();
    println!("{} metrics over {} frames", training_type.label(), timeline.frames().len());
    for spec in training_type.metrics() {
        let Some(stats) = summary.get(spec.key) else {
            continue;
        };
        let rate = tally
            .success_rate(spec.key)
            .map(|r| format!("{r:.0}%"))
            .unwrap_or_else(|| "-".to_string());
        let values: Vec<f64> = timeline.series(spec.key).into_iter().map(|(_, v)| v).collect();
        let smoothed = moving_average(&values, TREND_WINDOW);
        let trend = match (smoothed.first(), smoothed.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        println!(
            "  {:<28} mean {:>8.2}{} (min {:.2}, max {:.2}, trend {:+.2})  standard {}",
            spec.label, stats.mean, spec.unit, stats.min, stats.max, trend, rate
        );
    }
    Ok(())
}

fn print_analysis(analysis: &AiAnalysis) {
    println!(
        "Overall score: {:.0} ({})",
        analysis.overall_score,
        analysis.band().label()
    );
    println!("{}", analysis.summary);
    for (title, items) in [
        ("Strengths", &analysis.strengths),
        ("Improvement areas", &analysis.improvement_areas),
        ("Suggestions", &analysis.suggestions),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("{title}:");
        for item in items {
            println!("  - {item}");
        }
    }
}

async fn request_feedback(
    app: &App,
    training_type: TrainingType,
    metrics: Vec<MetricsFrame>,
    video_summary: Option<String>,
) -> AiAnalysis {
    let request = AiAnalysisRequest {
        training_type,
        metrics,
        video_summary,
    };
    let feedback = analyze_or_fallback(&app.api, &request).await;
    if let Some(reason) = &feedback.degraded {
        eprintln!("AI analysis unavailable: {reason}");
    }
    feedback.analysis
}

pub async fn analyze(
    app: &App,
    task_id: &str,
    training_type: TrainingType,
    summary: Option<String>,
) -> anyhow::Result<()> {
    app.require_user()?;
    let metrics = fetch_metrics(app, task_id).await?;
    let analysis = request_feedback(app, training_type, metrics, summary).await;
    print_analysis(&analysis);
    Ok(())
}

// ---- reports ----

pub async fn report(
    app: &App,
    task_id: &str,
    training_type: TrainingType,
    student_id: &str,
    send: bool,
) -> anyhow::Result<()> {
    app.require(COACH_TRAINING_PATH)?;

    let options = load_student_options(&app.api).await;
    let student = match &options {
        StudentOptions::Ready(_) => options
            .find(student_id)
            .cloned()
            .with_context(|| format!("Unknown student '{student_id}'"))?,
        StudentOptions::Unavailable(message) => bail!("{message}"),
    };

    let metrics = fetch_metrics(app, task_id).await?;
    let analysis = request_feedback(app, training_type, metrics.clone(), None).await;

    let new_report = NewTrainingReport {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        training_type,
        analysis_result: analysis,
        metrics,
    };
    new_report.validate()?;

    let report = app.api.create_report(&new_report).await?;
    tracing::info!(report_id = %report.id, student_id = %student.id, "Training report created");
    println!("Report {} created for {}", report.id, student.name);
    print_analysis(&report.analysis_result);

    if send {
        deliver(app, &report.id, &student.parent_id).await?;
    }
    Ok(())
}

async fn deliver(app: &App, report_id: &str, parent_id: &str) -> anyhow::Result<()> {
    let response = app.api.send_report_to_parent(report_id, parent_id).await?;
    if !response.success {
        bail!("Report was not delivered: {}", response.message);
    }
    println!("Report {report_id} sent to {parent_id}");
    Ok(())
}

pub async fn send_report(app: &App, report_id: &str, parent_id: &str) -> anyhow::Result<()> {
    app.require(COACH_TRAINING_PATH)?;
    deliver(app, report_id, parent_id).await
}

pub async fn students(app: &App, with_reports: bool) -> anyhow::Result<()> {
    app.require(COACH_TRAINING_PATH)?;

    let students = match load_student_options(&app.api).await {
        StudentOptions::Ready(students) => students,
        StudentOptions::Unavailable(message) => bail!("{message}"),
    };

    for student in &students {
        println!("{:<12} {:<20} parent {}", student.id, student.name, student.parent_id);
        if !with_reports {
            continue;
        }
        for report in app.api.student_reports(&student.id).await? {
            let date = report
                .created_at()
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or(report.timestamp.clone());
            println!(
                "    {} {} {:<10} score {:.0}{}",
                report.id,
                date,
                report.training_type,
                report.analysis_result.overall_score,
                if report.sent_to_parent { " (sent)" } else { "" }
            );
        }
    }
    Ok(())
}
