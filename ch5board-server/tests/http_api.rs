//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ch5board_core::{BoardSeed, IdentityHasher, IdentitySalts, PostingRules};
use ch5board_server::{build_router, create_memory_pool, run_migrations, AppState};
use ch5board_server::db::BoardRepo;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_with(rules: PostingRules) -> Router {
    let pool = create_memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    BoardRepo::new(&pool)
        .provision(&[
            BoardSeed {
                id: "news".into(),
                name: "ニュース速報".into(),
                category: "ニュース".into(),
                description: Some("最新ニュース".into()),
            },
            BoardSeed {
                id: "zatsudan".into(),
                name: "雑談".into(),
                category: "雑談".into(),
                description: None,
            },
        ])
        .await
        .unwrap();

    let state = AppState::new(pool, rules, IdentityHasher::new(IdentitySalts::default()));
    build_router(Arc::new(state), false)
}

async fn app() -> Router {
    app_with(PostingRules::default()).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "198.51.100.7");
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_thread(app: &Router, title: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/threads",
        Some(json!({"boardId": "news", "title": title, "body": "スレ立てました"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn reply(app: &Router, thread_id: i64, payload: Value) -> (StatusCode, Value) {
    let mut payload = payload;
    payload["threadId"] = json!(thread_id);
    send(app, Method::POST, "/api/responses", Some(payload)).await
}

#[tokio::test]
async fn health_reports_version() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn boards_are_listed_in_envelope() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/boards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/api/boards/news", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "ニュース速報");

    let (status, body) = send(&app, Method::GET, "/api/boards/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn thread_creation_and_detail() {
    let app = app().await;
    let thread_id = create_thread(&app, "初スレ").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["resCount"], 1);
    assert_eq!(data["isActive"], true);
    assert_eq!(data["boardName"], "ニュース速報");
    assert_eq!(data["responses"][0]["resNumber"], 1);
    assert_eq!(data["responses"][0]["name"], "名無しさん");
    assert_eq!(data["responses"][0]["userId"].as_str().unwrap().len(), 8);
    assert!(data["responses"][0].get("ipHash").is_none());
}

#[tokio::test]
async fn thread_creation_validates_before_writing() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/threads",
        Some(json!({"boardId": "news", "title": "あ".repeat(49), "body": "本文"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/threads",
        Some(json!({"boardId": "ghost", "title": "t", "body": "本文"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/boards/news", None).await;
    assert_eq!(body["data"]["threadCount"], 0);
}

#[tokio::test]
async fn reply_increments_count_and_number() {
    let app = app().await;
    let thread_id = create_thread(&app, "レス番テスト").await;

    let (status, body) = reply(&app, thread_id, json!({"name": "VIPPER", "body": "2get"})).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["response"]["resNumber"], 2);
    assert_eq!(body["data"]["response"]["name"], "VIPPER");
    assert_eq!(body["data"]["resCount"], 2);
    assert_eq!(body["data"]["threadActive"], true);

    let (_, body) = reply(&app, thread_id, json!({"body": "3"})).await;
    assert_eq!(body["data"]["response"]["resNumber"], 3);
}

#[tokio::test]
async fn sage_reply_does_not_bump() {
    let app = app().await;
    let thread_id = create_thread(&app, "sage").await;
    let (_, before) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;

    let (status, _) = reply(&app, thread_id, json!({"mail": "SaGe", "body": "下げ"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, after) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(after["data"]["updatedAt"], before["data"]["updatedAt"]);
    assert_eq!(after["data"]["resCount"], 2);
    assert_eq!(after["data"]["responses"][1]["mail"], "SaGe");
}

#[tokio::test]
async fn ceiling_closes_thread_with_conflict() {
    let app = app_with(PostingRules {
        max_responses: 2,
        ..PostingRules::default()
    })
    .await;
    let thread_id = create_thread(&app, "短命").await;

    let (status, body) = reply(&app, thread_id, json!({"body": "最後"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["threadActive"], false);

    let (status, body) = reply(&app, thread_id, json!({"body": "遅かった"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "thread_closed");

    let (_, detail) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(detail["data"]["resCount"], 2);
    assert_eq!(detail["data"]["isActive"], false);
}

#[tokio::test]
async fn invalid_bodies_leave_thread_untouched() {
    let app = app().await;
    let thread_id = create_thread(&app, "validation").await;

    let (status, body) = reply(&app, thread_id, json!({"body": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "body cannot be empty");

    let (status, _) = reply(&app, thread_id, json!({"body": "x".repeat(2001)})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = reply(&app, thread_id, json!({"body": "ok", "ipHash": "spoof"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(detail["data"]["resCount"], 1);
    assert_eq!(detail["data"]["responses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_json_is_validation_error() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/responses")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn reply_to_missing_thread_is_404() {
    let app = app().await;
    let (status, body) = reply(&app, 9999, json!({"body": "誰もいない"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn thread_listing_sorts_and_paginates() {
    let app = app().await;
    let first = create_thread(&app, "first").await;
    let second = create_thread(&app, "second").await;
    reply(&app, first, json!({"body": "bump"})).await;

    let (status, body) = send(&app, Method::GET, "/api/threads?boardId=news", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], first);
    assert_eq!(items[1]["id"], second);
    assert!(items[0]["momentum"].is_number());
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = send(&app, Method::GET, "/api/threads?boardId=news&sort=created", None).await;
    assert_eq!(body["data"]["items"][0]["id"], second);

    let (_, body) = send(&app, Method::GET, "/api/threads?boardId=news&page=2&per_page=1", None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["perPage"], 1);
}

#[tokio::test]
async fn thread_listing_rejects_bad_queries() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/threads", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "boardId cannot be empty");

    let (status, _) = send(&app, Method::GET, "/api/threads?boardId=news&sort=hot", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/threads?boardId=ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_endpoint_paginates() {
    let app = app().await;
    let thread_id = create_thread(&app, "pages").await;
    for n in 0..3 {
        reply(&app, thread_id, json!({"body": format!("レス{n}")})).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/threads/{thread_id}/responses?page=2&per_page=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<i64> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["resNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![3, 4]);
    assert_eq!(body["data"]["total"], 4);

    let (status, _) = send(&app, Method::GET, "/api/threads/abc/responses", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn poster_id_comes_from_forwarded_address() {
    let app = app().await;
    let thread_id = create_thread(&app, "ids").await;
    let (_, body) = reply(&app, thread_id, json!({"body": "同じ人"})).await;

    let (_, detail) = send(&app, Method::GET, &format!("/api/threads/{thread_id}"), None).await;
    assert_eq!(
        detail["data"]["responses"][0]["userId"],
        body["data"]["response"]["userId"]
    );
}
