//! Integration tests for the entity and library endpoints.

use harbor_api::config::AppConfig;
use harbor_api::server::create_app;
use tokio::net::TcpListener;

/// Spawn the app on an ephemeral port and return its base URL.
async fn spawn_app(config: AppConfig) -> String {
    let app = create_app(config).await.expect("Failed to create app");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://127.0.0.1:{port}")
}

fn chat_body(id: &str, channel: &str, user: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "channel": channel,
        "userUuid": user,
        "data": { "text": "hello" },
        "timestamp": 1_700_000_000_000_i64,
    })
}

#[tokio::test]
async fn health_endpoint_responds() {
    let base = spawn_app(AppConfig::default()).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn append_returns_record_with_server_timestamp() {
    let base = spawn_app(AppConfig::default()).await;
    let client = reqwest::Client::new();
    let user = uuid::Uuid::new_v4().to_string();

    let before = chrono::Utc::now().timestamp_millis();
    let resp = client
        .post(format!("{base}/api/v1/entities/chats"))
        .json(&chat_body("m1", "room-1", &user))
        .send()
        .await
        .unwrap();
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let record: serde_json::Value = resp.json().await.unwrap();
    let server_ts = record["serverTimestamp"].as_i64().unwrap();
    assert!(server_ts >= before);
    assert!(server_ts <= after + 1);
    assert_eq!(record["id"], "m1");
    assert_eq!(record["userUuid"], user.as_str());
}

#[tokio::test]
async fn queries_are_scoped_by_kind_channel_and_user() {
    let base = spawn_app(AppConfig::default()).await;
    let client = reqwest::Client::new();

    for (kind, id, user) in [
        ("chats", "m1", "alice"),
        ("chats", "m2", "bob"),
        ("documents", "d1", "alice"),
    ] {
        client
            .post(format!("{base}/api/v1/entities/{kind}"))
            .json(&chat_body(id, "room-1", user))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
    }

    // Chats in room-1, ascending by serverTimestamp.
    let chats: Vec<serde_json::Value> = client
        .get(format!("{base}/api/v1/entities/chats?channel=room-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chats.len(), 2);
    assert!(
        chats[0]["serverTimestamp"].as_i64().unwrap()
            < chats[1]["serverTimestamp"].as_i64().unwrap()
    );

    // Documents are a disjoint namespace.
    let docs: Vec<serde_json::Value> = client
        .get(format!("{base}/api/v1/entities/documents?channel=room-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);

    // Actor filter.
    let bobs: Vec<serde_json::Value> = client
        .get(format!(
            "{base}/api/v1/entities/chats?channel=room-1&userUuid=bob"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0]["id"], "m2");

    // Incremental sync with strict since filtering.
    let pivot = chats[0]["serverTimestamp"].as_i64().unwrap();
    let newer: Vec<serde_json::Value> = client
        .get(format!(
            "{base}/api/v1/entities/chats?channel=room-1&since={pivot}"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(newer.len(), 1);
    assert_eq!(newer[0]["id"], "m2");
}

#[tokio::test]
async fn invalid_append_is_rejected() {
    let base = spawn_app(AppConfig::default()).await;
    let client = reqwest::Client::new();

    let mut missing_channel = chat_body("m1", "room-1", "alice");
    missing_channel.as_object_mut().unwrap().remove("channel");

    let resp = client
        .post(format!("{base}/api/v1/entities/chats"))
        .json(&missing_channel)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Field 'channel' is required");

    // Nothing was written.
    let chats: Vec<serde_json::Value> = client
        .get(format!("{base}/api/v1/entities/chats?channel=room-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(chats.is_empty());
}

#[tokio::test]
async fn unknown_kind_is_not_found() {
    let base = spawn_app(AppConfig::default()).await;
    let resp = reqwest::get(format!("{base}/api/v1/entities/widgets?channel=room-1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn library_publish_rejects_duplicates_and_lists_in_order() {
    let base = spawn_app(AppConfig::default()).await;
    let client = reqwest::Client::new();

    let item = |uuid: &str, name: &str, ts: i64| {
        serde_json::json!({
            "uuid": uuid,
            "data": {
                "name": name,
                "description": "A shareable item",
                "image": "https://example.com/img.png",
            },
            "timestamp": ts,
        })
    };

    for (uuid, name, ts) in [("a", "A", 100), ("b", "B", 200)] {
        let resp = client
            .post(format!("{base}/api/v1/library"))
            .json(&item(uuid, name, ts))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    }

    // Duplicate uuid fails; the first item remains unchanged.
    let resp = client
        .post(format!("{base}/api/v1/library"))
        .json(&item("a", "Impostor", 300))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);

    // Vote and list by votes descending.
    let resp = client
        .post(format!("{base}/api/v1/library/a/votes"))
        .json(&serde_json::json!({ "delta": 3 }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let voted: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(voted["data"]["votes"], 3);
    assert_eq!(voted["data"]["name"], "A");

    let items: Vec<serde_json::Value> = client
        .get(format!("{base}/api/v1/library?orderBy=votes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items[0]["uuid"], "a");

    let by_time: Vec<serde_json::Value> = client
        .get(format!("{base}/api/v1/library?orderBy=timestamp"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_time[0]["uuid"], "b");

    // Unknown uuid is a 404.
    let resp = client
        .post(format!("{base}/api/v1/library/nope/copies"))
        .json(&serde_json::json!({ "delta": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
