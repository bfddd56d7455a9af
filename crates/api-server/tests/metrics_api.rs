use api_server::{AppState, Authenticator, CorsConfig, metrics::init_metrics, run_api_server};
use reqwest::{Client, StatusCode};
use std::{net::TcpListener, time::Duration};
use storage::{LocalCache, MemoryStore, Storage};

async fn spawn_server() -> String {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let storage = Storage::new(MemoryStore::new().into(), LocalCache::new().into());
    let state = AppState::new(
        storage,
        Authenticator::shared_secret(b"metrics-secret", None),
        CorsConfig::default(),
    );
    tokio::spawn(async move { run_api_server(addr, state).await });

    let base = format!("http://{addr}");
    let client = Client::new();
    for _ in 0..100 {
        if client.get(format!("{base}/metrics")).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    base
}

#[tokio::test]
async fn test_metrics_endpoint_reports_requests() {
    assert!(init_metrics());
    let base = spawn_server().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/recipes")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    for id in ["644bd54a533f211534d730b8", "not-an-id"] {
        client
            .get(format!("{base}/recipes/{id}"))
            .send()
            .await
            .unwrap();
    }

    let resp = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();

    assert!(body.contains(r#"http_requests_total{path="/recipes"} 1"#), "{body}");
    assert!(body.contains(r#"http_requests_total{path="/recipes/{id}"} 2"#), "{body}");
    assert!(body.contains(r#"http_methods_total{method="GET"}"#), "{body}");
    assert!(body.contains("http_response_time_seconds"), "{body}");
    assert!(body.contains("recipes_cache_misses_total 1"), "{body}");
    assert!(!body.contains("not-an-id"), "{body}");
}
