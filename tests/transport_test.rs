//! Integration tests for the transport envelope and session tokens:
//! idempotent token issuance, session isolation, silent drops on
//! undecryptable bodies, and token invalidation on session loss.

use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use pastebox_server::crypto::transport;
use pastebox_server::session::new_session_map;
use pastebox_server::state::AppState;
use pastebox_server::{routes, store};

async fn start_test_server() -> (String, AppState) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = store::init_db(&data_dir).expect("Failed to init store");

    let state = AppState {
        db,
        sessions: new_session_map(),
        token_ttl_secs: 300,
        max_paste_bytes: 1024 * 1024,
    };

    let app = routes::build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
        let _keep = tmp_dir;
    });

    (format!("http://{}", addr), state)
}

fn new_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

async fn fetch_token_hex(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .get(format!("{base}/api/token"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["key"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn token_is_idempotent_within_its_validity_window() {
    let (base, _state) = start_test_server().await;
    let client = new_client();

    let first = fetch_token_hex(&client, &base).await;
    let second = fetch_token_hex(&client, &base).await;
    assert_eq!(first, second);
    assert_eq!(first.len(), transport::KEY_BYTES * 2);
}

#[tokio::test]
async fn distinct_sessions_get_distinct_tokens() {
    let (base, _state) = start_test_server().await;

    let token_a = fetch_token_hex(&new_client(), &base).await;
    let token_b = fetch_token_hex(&new_client(), &base).await;
    assert_ne!(token_a, token_b);
}

#[tokio::test]
async fn untokened_caller_is_silently_dropped() {
    let (base, _state) = start_test_server().await;
    let client = new_client();

    // Never fetched a token: any body, sealed or not, yields an empty 204.
    let resp = client
        .post(format!("{base}/api/read"))
        .body("whatever")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
    assert_eq!(resp.text().await.unwrap(), "");
}

#[tokio::test]
async fn corrupted_envelope_is_silently_dropped() {
    let (base, _state) = start_test_server().await;
    let client = new_client();
    let key: [u8; transport::KEY_BYTES] = hex::decode(fetch_token_hex(&client, &base).await)
        .unwrap()
        .try_into()
        .unwrap();

    let sealed = transport::seal(
        &serde_json::to_vec(&json!({ "id": "some-paste-11", "pass": "" })).unwrap(),
        &key,
    );

    // An on-path tamperer flips ciphertext: never a crash, never plaintext,
    // just an empty response.
    let mut corrupted = sealed.into_bytes();
    let middle = corrupted.len() / 2;
    corrupted[middle] = if corrupted[middle] == b'A' { b'B' } else { b'A' };
    let resp = client
        .post(format!("{base}/api/read"))
        .body(corrupted)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
    assert_eq!(resp.text().await.unwrap(), "");
}

#[tokio::test]
async fn plaintext_json_body_is_silently_dropped() {
    let (base, _state) = start_test_server().await;
    let client = new_client();
    let _ = fetch_token_hex(&client, &base).await;

    // A valid session but an unwrapped body: still dropped.
    let resp = client
        .post(format!("{base}/api/read"))
        .body(r#"{"id":"some-paste-11","pass":""}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}

#[tokio::test]
async fn quoted_envelope_bodies_are_accepted() {
    let (base, _state) = start_test_server().await;
    let client = new_client();
    let key: [u8; transport::KEY_BYTES] = hex::decode(fetch_token_hex(&client, &base).await)
        .unwrap()
        .try_into()
        .unwrap();

    // Clients that JSON.stringify the sealed string send it quoted.
    let sealed = transport::seal(
        &serde_json::to_vec(
            &json!({ "expiry": 3600, "passProtect": false, "pass": "", "pasteText": "quoted" }),
        )
        .unwrap(),
        &key,
    );
    let resp = client
        .post(format!("{base}/api/submit"))
        .body(format!("\"{sealed}\""))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
}

#[tokio::test]
async fn session_loss_invalidates_cached_tokens_until_refetch() {
    let (base, state) = start_test_server().await;
    let client = new_client();
    let key: [u8; transport::KEY_BYTES] = hex::decode(fetch_token_hex(&client, &base).await)
        .unwrap()
        .try_into()
        .unwrap();

    // Simulate session loss (server restart): all sessions vanish.
    state.sessions.clear();

    let sealed = transport::seal(
        &serde_json::to_vec(&json!({ "id": "some-paste-11", "pass": "" })).unwrap(),
        &key,
    );
    let resp = client
        .post(format!("{base}/api/read"))
        .body(sealed)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    // Client treats that as "re-fetch token and retry once".
    let new_key: [u8; transport::KEY_BYTES] = hex::decode(fetch_token_hex(&client, &base).await)
        .unwrap()
        .try_into()
        .unwrap();
    assert_ne!(key, new_key);

    let sealed = transport::seal(
        &serde_json::to_vec(&json!({ "id": "some-paste-11", "pass": "" })).unwrap(),
        &new_key,
    );
    let resp = client
        .post(format!("{base}/api/read"))
        .body(sealed)
        .send()
        .await
        .unwrap();
    // Decryptable again; the paste simply doesn't exist.
    assert_eq!(resp.status().as_u16(), 404);
}
