//! In-process stub of the analysis backend.
//!
//! Serves canned responses on `127.0.0.1:0` so client tests exercise
//! real HTTP round trips without a running backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use hoopform_client::AnalysisApi;

/// What the stub has observed so far.
#[derive(Default)]
pub struct StubState {
    pub status_calls: AtomicU32,
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    /// Raw bytes of every uploaded `video` part.
    pub upload_bodies: Mutex<Vec<Vec<u8>>>,
    pub sent_reports: Mutex<Vec<Value>>,
    /// When set, `/students` and `/ai-analysis` answer 500.
    pub degraded: bool,
}

pub struct StubBackend {
    pub api: AnalysisApi,
    pub base_url: String,
    pub state: Arc<StubState>,
}

/// Start the stub and return a client pointed at it.
pub async fn spawn_backend(degraded: bool) -> StubBackend {
    let state = Arc::new(StubState {
        degraded,
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/upload", post(upload))
        .route("/api/status/{task_id}", get(status))
        .route("/api/result/{task_id}", get(result))
        .route("/api/video/{task_id}", get(video))
        .route("/api/pose-sequence/{task_id}", get(pose_sequence))
        .route("/api/ai-analysis", post(ai_analysis))
        .route("/api/training-reports", post(create_report))
        .route("/api/send-report-to-parent", post(send_report))
        .route("/api/students", get(students))
        .route("/api/students/{id}/reports", get(student_reports))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{addr}/api");
    StubBackend {
        api: AnalysisApi::new(base_url.clone()),
        base_url,
        state,
    }
}

pub fn sample_sequence() -> Value {
    json!({
        "videoSource": "dribble_demo.mp4",
        "frameRate": 30,
        "size": { "width": 640, "height": 480 },
        "frames": [
            { "time": 0.0, "keypoints": [{ "name": "颈部", "x": 320, "y": 100, "confidence": 0.95 }],
              "metrics": { "dribble_frequency": 2.5 } },
            { "time": 1.0, "keypoints": [{ "name": "颈部", "x": 322, "y": 102, "confidence": 0.93 }] },
            { "time": 2.0, "keypoints": [{ "name": "颈部", "x": 324, "y": 104, "confidence": 0.91 }] }
        ]
    })
}

async fn upload(State(state): State<Arc<StubState>>, mut multipart: Multipart) -> impl IntoResponse {
    let mut file_name = String::new();
    let mut training_type = String::new();
    let mut size = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("video") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                size = bytes.len();
                state.upload_bodies.lock().unwrap().push(bytes.to_vec());
            }
            Some("training_type") => training_type = field.text().await.unwrap(),
            _ => {}
        }
    }
    state.uploads.lock().unwrap().push((file_name, training_type, size));
    Json(json!({ "task_id": "task-1", "message": "Video uploaded" }))
}

/// `task-1` progresses uploaded -> processing -> completed; `task-bad`
/// fails; anything else is unknown.
async fn status(State(state): State<Arc<StubState>>, Path(task_id): Path<String>) -> impl IntoResponse {
    match task_id.as_str() {
        "task-1" => {
            let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
            let body = match call {
                0 => json!({ "task_id": "task-1", "status": "uploaded", "progress": 0 }),
                1 => json!({ "task_id": "task-1", "status": "processing", "progress": 60 }),
                _ => json!({ "task_id": "task-1", "status": "completed", "progress": 100 }),
            };
            (StatusCode::OK, Json(body))
        }
        "task-bad" => (
            StatusCode::OK,
            Json(json!({ "status": "failed", "progress": 30, "error": "No person detected" })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "Task not found" }))),
    }
}

async fn result(Path(task_id): Path<String>) -> impl IntoResponse {
    let frames = json!([
        { "frame": 0, "timestamp": 0.0, "people": [{ "person_id": 0, "metrics": { "dribble_frequency": 2.5 } }] },
        { "frame": 1, "timestamp": 0.033, "people": [{ "person_id": 0, "metrics": { "dribble_frequency": 2.7 } }] }
    ]);
    if task_id == "task-bare" {
        return Json(frames);
    }
    Json(json!({ "task_id": task_id, "metrics": frames }))
}

async fn video(Path(task_id): Path<String>) -> impl IntoResponse {
    if task_id != "task-1" {
        return (StatusCode::NOT_FOUND, Vec::new());
    }
    (StatusCode::OK, vec![7u8; 4096])
}

async fn pose_sequence(Path(task_id): Path<String>) -> impl IntoResponse {
    if task_id == "task-1" {
        (StatusCode::OK, Json(sample_sequence()))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Pose sequence not found" })))
    }
}

async fn ai_analysis(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> impl IntoResponse {
    if state.degraded {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "model offline" })));
    }
    let frames = body["metrics"].as_array().map(Vec::len).unwrap_or(0);
    (
        StatusCode::OK,
        Json(json!({
            "summary": format!("Analyzed {frames} frames of {}", body["trainingType"].as_str().unwrap_or("?")),
            "suggestions": ["Keep the dribble below the waist"],
            "improvementAreas": ["Rhythm"],
            "strengths": ["Stable stance"],
            "overallScore": 82
        })),
    )
}

async fn create_report(Json(body): Json<Value>) -> impl IntoResponse {
    let mut stored = body;
    stored["id"] = json!("report-1");
    stored["timestamp"] = json!("2026-03-01T08:30:00Z");
    stored["sentToParent"] = json!(false);
    Json(stored)
}

async fn send_report(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.sent_reports.lock().unwrap().push(body);
    Json(json!({ "success": true, "message": "Report sent" }))
}

async fn students(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    if state.degraded {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" })));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": "student-01", "name": "Li Ming", "parentId": "parent001" },
            { "id": "student-02", "name": "Wang Fang", "parentId": "parent002" }
        ])),
    )
}

async fn student_reports(Path(id): Path<String>) -> impl IntoResponse {
    if id != "student-01" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Student not found" })));
    }
    (
        StatusCode::OK,
        Json(json!([{
            "id": "report-1",
            "studentId": "student-01",
            "studentName": "Li Ming",
            "trainingType": "dribbling",
            "analysisResult": {
                "summary": "Good control",
                "suggestions": [],
                "improvementAreas": [],
                "strengths": [],
                "overallScore": 82
            },
            "metrics": [],
            "timestamp": "2026-03-01T08:30:00Z",
            "sentToParent": true
        }])),
    )
}
