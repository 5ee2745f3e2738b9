mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use hoopform_client::feedback::analyze_or_fallback;
use hoopform_client::poll::{poll_until_settled, PollOutcome};
use hoopform_client::source::DefaultPoseSource;
use hoopform_client::students::{load_student_options, StudentOptions, ROSTER_UNAVAILABLE};
use hoopform_client::{ApiError, PoseSequenceSource, SequenceLocator, SourceError};
use hoopform_core::analysis::{AiAnalysis, AiAnalysisRequest, TaskState};
use hoopform_core::report::NewTrainingReport;
use hoopform_core::training::TrainingType;
use tokio_util::sync::CancellationToken;

use common::spawn_backend;

#[tokio::test]
async fn upload_sends_multipart_fields() {
    let backend = spawn_backend(false).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drill.mp4");
    std::fs::write(&path, vec![1u8; 2048]).unwrap();

    let response = backend.api.upload_video(&path, TrainingType::Shooting).await.unwrap();
    assert_eq!(response.task_id, "task-1");

    let uploads = backend.state.uploads.lock().unwrap();
    assert_eq!(uploads.as_slice(), &[("drill.mp4".to_string(), "shooting".to_string(), 2048)]);
}

#[tokio::test]
async fn upload_streams_large_file_intact() {
    let backend = spawn_backend(false).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.MOV");
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &content).unwrap();

    backend.api.upload_video(&path, TrainingType::Defense).await.unwrap();

    let bodies = backend.state.upload_bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0] == content, "uploaded bytes differ from the file");
}

#[tokio::test]
async fn upload_rejects_unsupported_file_without_request() {
    let backend = spawn_backend(false).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();

    assert_matches!(
        backend.api.upload_video(&path, TrainingType::Dribbling).await,
        Err(ApiError::InvalidUpload(_))
    );
    assert!(backend.state.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_task_status_is_api_error() {
    let backend = spawn_backend(false).await;
    assert_matches!(
        backend.api.task_status("missing").await,
        Err(ApiError::ApiError { status: 404, .. })
    );
}

#[tokio::test]
async fn polling_reaches_completed() {
    let backend = spawn_backend(false).await;
    let mut progress = Vec::new();
    let outcome = poll_until_settled(
        &backend.api,
        "task-1",
        Duration::from_millis(5),
        &CancellationToken::new(),
        |s| progress.push(s.progress),
    )
    .await;

    assert_matches!(outcome, PollOutcome::Completed(s) if s.status == TaskState::Completed);
    assert_eq!(progress, vec![0, 60, 100]);
}

#[tokio::test]
async fn polling_reports_backend_failure() {
    let backend = spawn_backend(false).await;
    let outcome = poll_until_settled(
        &backend.api,
        "task-bad",
        Duration::from_millis(5),
        &CancellationToken::new(),
        |_| {},
    )
    .await;
    assert_eq!(outcome, PollOutcome::Failed("No person detected".into()));
}

#[tokio::test]
async fn result_accepts_wrapped_and_bare_payloads() {
    let backend = spawn_backend(false).await;

    let wrapped = backend.api.analysis_result("task-1").await.unwrap();
    assert_eq!(wrapped.metrics.len(), 2);
    assert_eq!(wrapped.task_id.as_deref(), Some("task-1"));

    let bare = backend.api.analysis_result("task-bare").await.unwrap();
    assert_eq!(bare.metrics.len(), 2);
    assert_eq!(bare.task_id.as_deref(), Some("task-bare"));
    assert_eq!(bare.metrics[1].first_person().unwrap()["dribble_frequency"], 2.7);
}

#[tokio::test]
async fn download_video_streams_to_file() {
    let backend = spawn_backend(false).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.mp4");

    let written = backend.api.download_video("task-1", &dest).await.unwrap();
    assert_eq!(written, 4096);
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 4096);

    assert_matches!(
        backend.api.download_video("nope", &dir.path().join("x.mp4")).await,
        Err(ApiError::ApiError { status: 404, .. })
    );
}

#[tokio::test]
async fn pose_source_resolves_task_and_url() {
    let backend = spawn_backend(false).await;
    let source = DefaultPoseSource::new(std::sync::Arc::new(backend.api.clone()));

    let by_task = source.fetch(&SequenceLocator::Task("task-1".into())).await.unwrap();
    assert_eq!(by_task.frames.len(), 3);

    let url = format!("{}/pose-sequence/task-1", backend.base_url);
    let by_url = source.fetch(&SequenceLocator::parse(&url)).await.unwrap();
    assert_eq!(by_url, by_task);

    assert_matches!(
        source.fetch(&SequenceLocator::Task("unknown".into())).await,
        Err(SourceError::Api(ApiError::ApiError { status: 404, .. }))
    );
}

#[tokio::test]
async fn analysis_and_report_flow() {
    let backend = spawn_backend(false).await;
    let metrics = backend.api.analysis_result("task-1").await.unwrap().metrics;
    let request = AiAnalysisRequest {
        training_type: TrainingType::Dribbling,
        metrics: metrics.clone(),
        video_summary: None,
    };

    let feedback = analyze_or_fallback(&backend.api, &request).await;
    assert!(!feedback.is_fallback());
    assert_eq!(feedback.analysis.overall_score, 82.0);
    assert_eq!(feedback.analysis.summary, "Analyzed 2 frames of dribbling");

    let report = backend
        .api
        .create_report(&NewTrainingReport {
            student_id: "student-01".into(),
            student_name: "Li Ming".into(),
            training_type: TrainingType::Dribbling,
            analysis_result: feedback.analysis,
            metrics,
        })
        .await
        .unwrap();
    assert_eq!(report.id, "report-1");
    assert!(!report.sent_to_parent);

    let sent = backend.api.send_report_to_parent(&report.id, "parent001").await.unwrap();
    assert!(sent.success);
    let bodies = backend.state.sent_reports.lock().unwrap();
    assert_eq!(bodies[0]["reportId"], "report-1");
    assert_eq!(bodies[0]["parentId"], "parent001");
}

#[tokio::test]
async fn analysis_falls_back_when_service_fails() {
    let backend = spawn_backend(true).await;
    let request = AiAnalysisRequest {
        training_type: TrainingType::Defense,
        metrics: vec![],
        video_summary: Some("short clip".into()),
    };

    let feedback = analyze_or_fallback(&backend.api, &request).await;
    assert!(feedback.is_fallback());
    assert_eq!(feedback.analysis, AiAnalysis::unavailable());
    assert_eq!(feedback.analysis.overall_score, 0.0);
}

#[tokio::test]
async fn student_roster_loads() {
    let backend = spawn_backend(false).await;
    let options = load_student_options(&backend.api).await;
    assert!(options.is_enabled());
    assert_eq!(options.options().len(), 2);
    assert_eq!(options.find("student-02").unwrap().parent_id, "parent002");
}

#[tokio::test]
async fn student_roster_failure_disables_selector() {
    let backend = spawn_backend(true).await;
    assert_eq!(
        load_student_options(&backend.api).await,
        StudentOptions::Unavailable(ROSTER_UNAVAILABLE.into())
    );
}

#[tokio::test]
async fn student_reports_treat_errors_as_empty() {
    let backend = spawn_backend(false).await;

    let history = backend.api.student_reports("student-01").await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].sent_to_parent);

    assert!(backend.api.student_reports("student-99").await.unwrap().is_empty());
}
