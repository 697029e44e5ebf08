use std::path::Path;
use std::time::{Duration as StdDuration, Instant};

use border0_core::session_logs::{load_output, JobOptions, RunState, SessionLogJob};
use border0_core::{ApiClient, Credentials};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "session-token";

// ── Helpers ──────────────────────────────────────────────────────────

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        &format!("{}/api/v1", server.uri()),
        Credentials::AccessToken(TOKEN.to_string()),
    )
    .unwrap()
}

fn options(dir: &Path) -> JobOptions {
    JobOptions {
        state_file: dir.join("app_state.json"),
        output_file: dir.join("processed_sessions.json"),
        workers: 2,
        ..JobOptions::default()
    }
}

fn listing() -> Value {
    json!({
        "session_logs": [
            {
                "session_id": "s-1",
                "socket_id": "sock-1",
                "start_time": "2024-03-15T08:00:00Z",
                "end_time": "2024-03-15T08:10:00Z",
                "recordings": [
                    {"recording_id": "r-1", "recording_type": "asciinema"}
                ]
            },
            {
                "session_id": "s-2",
                "socket_id": "sock-2",
                "start_time": "2024-03-15T09:00:00Z",
                "recordings": [
                    {"recording_id": "r-2", "recording_type": "http"}
                ]
            }
        ]
    })
}

async fn mount_listing(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .and(header("x-access-token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn one_failing_recording_does_not_drop_other_sessions() {
    let server = MockServer::start().await;
    mount_listing(&server, listing()).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session/sock-1/s-1/session_log"))
        .and(query_param("recording_id", "r-1"))
        .and(query_param("format", "text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("$ ls\r\nREADME.md\r\n")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session/sock-2/s-2/session_log"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(client(&server), options(dir.path()));
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let report = job.run_at(now).await.unwrap();

    assert_eq!(report.listed, 2);
    assert_eq!(report.new_sessions, 2);
    assert_eq!(report.output_total, Some(2));
    assert_eq!(report.window_start, "2024-03-14T12:00:00Z");
    assert_eq!(report.window_end, "2024-03-15T12:00:00Z");

    let mut stored = load_output(&dir.path().join("processed_sessions.json"));
    stored.sort_by(|a, b| a["session_id"].as_str().cmp(&b["session_id"].as_str()));
    assert_eq!(stored[0]["session_log_type"], "session_completed");
    assert_eq!(
        stored[0]["recordings"][0]["recording_data"],
        "$ ls\r\nREADME.md\r\n"
    );
    assert_eq!(stored[1]["session_log_type"], "session_started");
    assert_eq!(stored[1]["recordings"][0]["recording_data"], json!([]));

    let state = RunState::load(dir.path().join("app_state.json"));
    assert!(state.is_processed("s-1"));
    assert!(state.is_processed("s-2"));
    assert_eq!(state.last_run_time(), Some(now));
}

#[tokio::test]
async fn second_run_skips_processed_sessions() {
    let server = MockServer::start().await;
    mount_listing(&server, listing()).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session/sock-1/s-1/session_log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("text replay")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session/sock-2/s-2/session_log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            "{\"t\":0.1,\"method\":\"GET\"}\n{\"t\":0.2,\"status\":200}\n"
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(client(&server), options(dir.path()));

    let first_at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let first = job.run_at(first_at).await.unwrap();
    assert_eq!(first.new_sessions, 2);

    let second_at = first_at + Duration::minutes(15);
    let second = job.run_at(second_at).await.unwrap();
    assert_eq!(second.listed, 2);
    assert_eq!(second.already_processed, 2);
    assert_eq!(second.new_sessions, 0);
    assert_eq!(second.output_total, None);
    assert_eq!(second.window_start, "2024-03-15T12:00:00Z");

    let stored = load_output(&dir.path().join("processed_sessions.json"));
    assert_eq!(stored.len(), 2);
    let http = stored
        .iter()
        .find(|s| s["session_id"] == "s-2")
        .unwrap();
    assert_eq!(http["recordings"][0]["recording_data"][1]["status"], 200);

    let state = RunState::load(dir.path().join("app_state.json"));
    assert_eq!(state.processed_count(), 2);
    assert_eq!(state.last_run_time(), Some(second_at));
}

#[tokio::test]
async fn no_sessions_leaves_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(client(&server), options(dir.path()));
    let report = job.run().await.unwrap();

    assert_eq!(report.listed, 0);
    assert_eq!(report.output_total, None);
    assert!(!dir.path().join("app_state.json").exists());
    assert!(!dir.path().join("processed_sessions.json").exists());
}

#[tokio::test]
async fn listing_errors_fail_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(client(&server), options(dir.path()));
    let err = job.run().await.unwrap_err();
    assert!(err.to_string().contains("db down"), "{err}");
    assert!(!dir.path().join("app_state.json").exists());
}

#[tokio::test]
async fn recording_fetches_respect_worker_limit() {
    let server = MockServer::start().await;
    let sessions: Vec<Value> = (1..=4)
        .map(|i| {
            json!({
                "session_id": format!("s-{i}"),
                "socket_id": "sock-1",
                "start_time": "2024-03-15T08:00:00Z",
                "end_time": "2024-03-15T08:10:00Z",
                "recordings": [{"recording_id": format!("r-{i}"), "recording_type": "http"}]
            })
        })
        .collect();
    mount_listing(&server, json!({ "session_logs": sessions })).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/session/sock-1/s-\d/session_log$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(StdDuration::from_millis(250)),
        )
        .expect(4)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(
        client(&server),
        JobOptions {
            workers: 2,
            ..options(dir.path())
        },
    );
    let started = Instant::now();
    let report = job.run().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.new_sessions, 4);
    // Four fetches through two slots take at least two delay rounds.
    assert!(elapsed >= StdDuration::from_millis(500), "{elapsed:?}");
}

#[tokio::test]
async fn listing_follows_pages_until_a_short_page() {
    let server = MockServer::start().await;
    let session = |id: &str| {
        json!({
            "session_id": id,
            "socket_id": "sock-1",
            "start_time": "2024-03-15T08:00:00Z",
            "recordings": []
        })
    };
    for (page, ids) in [("1", vec!["s-1", "s-2"]), ("2", vec!["s-3"])] {
        let body = json!({ "session_logs": ids.iter().map(|id| session(*id)).collect::<Vec<_>>() });
        Mock::given(method("GET"))
            .and(path("/api/v1/sessions"))
            .and(query_param("page", page))
            .and(query_param("page_size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let job = SessionLogJob::new(
        client(&server),
        JobOptions {
            page_size: 2,
            ..options(dir.path())
        },
    );
    let report = job.run().await.unwrap();

    assert_eq!(report.listed, 3);
    assert_eq!(report.new_sessions, 3);
    let state = RunState::load(dir.path().join("app_state.json"));
    assert!(state.is_processed("s-3"));
}
