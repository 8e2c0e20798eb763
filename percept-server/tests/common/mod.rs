//! Shared test utilities for percept-server integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use percept_core::QuizConfig;
use percept_server::{AppState, PerceptServer, ServerConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Writes a small dataset: `categories` directories with `per_category` items each
pub fn write_dataset(root: &Path, categories: &[&str], per_category: usize) {
    for category in categories {
        let dir = root.join(category);
        std::fs::create_dir_all(&dir).unwrap();

        let mut entries = Vec::new();
        for n in 0..per_category {
            let id = format!("{}_{}.png", category, n);
            std::fs::write(dir.join(&id), b"\x89PNG").unwrap();
            entries.push(format!(
                "\"{}\": {{\"question\": \"Question {}\", \"answer\": \"(B)\"}}",
                id, n
            ));
        }
        std::fs::write(
            dir.join("annotations.json"),
            format!("{{{}}}", entries.join(",")),
        )
        .unwrap();
    }
}

/// Quiz config rooted in `temp`, with plain `answer` fields everywhere
pub fn test_config(temp: &TempDir) -> QuizConfig {
    QuizConfig {
        dataset_root: temp.path().join("dataset"),
        tracking_file: temp.path().join("user_image_tracking.json"),
        results_file: temp.path().join("detailed_results.csv"),
        answer_fields: Default::default(),
        ..Default::default()
    }
}

/// Creates a test server over a fresh dataset, returns state and address
#[allow(dead_code)]
pub async fn create_test_server(temp: &TempDir) -> (Arc<AppState>, SocketAddr) {
    write_dataset(&temp.path().join("dataset"), &["color", "spatial"], 4);
    create_test_server_with_config(test_config(temp)).await
}

/// Creates a test server with custom quiz config
pub async fn create_test_server_with_config(config: QuizConfig) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::load(config).await.unwrap());
    let server = PerceptServer::new(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: PerceptServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}

/// POSTs an urlencoded form body
pub async fn post_form(
    client: &reqwest::Client,
    url: String,
    fields: &[(&str, &str)],
) -> reqwest::Response {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    client
        .post(url)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap()
}
