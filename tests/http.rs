use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct RoutineSummary {
    id: String,
    name: String,
    discipline: String,
    attempts: usize,
    successes: usize,
    misses: usize,
    accuracy: u8,
}

#[derive(Debug, Deserialize)]
struct DisciplineGroup {
    discipline: String,
    routines: Vec<RoutineSummary>,
}

#[derive(Debug, Deserialize)]
struct DailyRate {
    attempts: usize,
    rate: u8,
}

#[derive(Debug, Deserialize)]
struct RoutineDetail {
    accuracy: u8,
    daily_series: Vec<DailyRate>,
    recent_attempts: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Streaks {
    current: u32,
    longest: u32,
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    total_attempts: usize,
    total_successes: usize,
    total_misses: usize,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    overall: Aggregate,
    streaks: Streaks,
}

#[derive(Debug, Deserialize)]
struct Heatmap {
    weeks: Vec<Vec<Option<serde_json::Value>>>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("routine_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/analytics")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_routine_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_routine(client: &Client, base_url: &str, name: &str, discipline: &str) -> RoutineSummary {
    let response = client
        .post(format!("{base_url}/api/routines"))
        .json(&serde_json::json!({ "name": name, "discipline": discipline }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn log(client: &Client, base_url: &str, id: &str, outcome: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/routines/{id}/attempts"))
        .json(&serde_json::json!({ "outcome": outcome }))
        .send()
        .await
        .unwrap()
}

async fn analytics(client: &Client, base_url: &str) -> AnalyticsResponse {
    client
        .get(format!("{base_url}/api/analytics"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_logging_attempts_updates_routine_and_analytics() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = analytics(&client, &server.base_url).await;
    let routine = create_routine(&client, &server.base_url, "Figure eight", "Nunchucks").await;
    assert_eq!(routine.discipline, "Nunchucks");
    assert_eq!(routine.attempts, 0);

    for outcome in ["success", "success", "miss", "success"] {
        let response = log(&client, &server.base_url, &routine.id, outcome).await;
        assert!(response.status().is_success());
    }

    let detail: RoutineDetail = client
        .get(format!("{}/api/routines/{}", server.base_url, routine.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.accuracy, 75);
    assert_eq!(detail.recent_attempts.len(), 4);
    assert_eq!(detail.daily_series.iter().map(|d| d.attempts).sum::<usize>(), 4);
    assert!(detail.daily_series.iter().all(|d| d.rate <= 100));

    let after = analytics(&client, &server.base_url).await;
    assert_eq!(after.overall.total_attempts, before.overall.total_attempts + 4);
    assert_eq!(after.overall.total_successes, before.overall.total_successes + 3);
    assert_eq!(after.overall.total_misses, before.overall.total_misses + 1);
    assert!(after.streaks.current >= 1);
    assert!(after.streaks.longest >= after.streaks.current);
}

#[tokio::test]
async fn http_rejects_blank_name_and_bad_outcome() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/routines", server.base_url))
        .json(&serde_json::json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let routine = create_routine(&client, &server.base_url, "Spin", "Bo Staff").await;
    let response = log(&client, &server.base_url, &routine.id, "sometimes").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_attempt_for_deleted_routine_is_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let routine = create_routine(&client, &server.base_url, "Hook", "Kama").await;
    let response = client
        .delete(format!("{}/api/routines/{}", server.base_url, routine.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let before = analytics(&client, &server.base_url).await;
    let response = log(&client, &server.base_url, &routine.id, "success").await;
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.is_null());

    let after = analytics(&client, &server.base_url).await;
    assert_eq!(after.overall.total_attempts, before.overall.total_attempts);

    let response = client
        .get(format!("{}/api/routines/{}", server.base_url, routine.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_routines_are_grouped_by_discipline() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_routine(&client, &server.base_url, "Zigzag", "Open Hand").await;
    create_routine(&client, &server.base_url, "Block", "Open Hand").await;

    let groups: Vec<DisciplineGroup> = client
        .get(format!("{}/api/routines", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let disciplines: Vec<&str> = groups.iter().map(|g| g.discipline.as_str()).collect();
    let mut sorted = disciplines.clone();
    sorted.sort();
    assert_eq!(disciplines, sorted);

    let open_hand = groups.iter().find(|g| g.discipline == "Open Hand").unwrap();
    let names: Vec<&str> = open_hand.routines.iter().map(|r| r.name.as_str()).collect();
    let block = names.iter().position(|n| *n == "Block").unwrap();
    let zigzag = names.iter().position(|n| *n == "Zigzag").unwrap();
    assert!(block < zigzag);
    assert!(open_hand.routines.iter().all(|r| r.successes + r.misses == r.attempts));
    assert!(open_hand.routines.iter().all(|r| r.accuracy <= 100));
}

#[tokio::test]
async fn http_heatmap_calendar_and_report() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let heatmap: Heatmap = client
        .get(format!("{}/api/heatmap?weeks=4", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(heatmap.weeks.len(), 4);
    assert!(heatmap.weeks.iter().all(|row| row.len() == 7));

    let response = client
        .get(format!("{}/api/calendar?month=2026-02", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let calendar: serde_json::Value = response.json().await.unwrap();
    assert_eq!(calendar["month"], "2026-02");

    for month in ["%2B262142-12", "-262143-01"] {
        let response = client
            .get(format!("{}/api/calendar?month={month}", server.base_url))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success(), "month {month}");
    }

    let response = client
        .get(format!("{}/api/calendar?month=february", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let report = client
        .get(format!("{}/api/report", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(report.starts_with("MARTIAL ARTS TRAINING REPORT"));
    assert!(report.contains("OVERALL PERFORMANCE"));
    assert!(report.contains("PRACTICE STREAKS"));
    assert!(report.ends_with("Generated by Martial Arts Tracker"));
}
