use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use marquee_core::{identity::IdentityId, store::EventStore as _, subject::SubjectId};
use marquee_engine::EngagementService;
use marquee_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

const SUBJECT: &str = "65f0c2a1b3d4e5f60718293a";

struct Harness {
  state: ApiState<SqliteStore>,
  token: String,
}

async fn harness() -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .add_subject(&SubjectId::parse(SUBJECT).unwrap(), "Alien")
    .await
    .unwrap();
  let identity = IdentityId::new("u1").unwrap();
  store.add_identity(&identity).await.unwrap();
  let token = store.issue_session(&identity).await.unwrap();

  Harness { state: Arc::new(EngagementService::new(Arc::new(store))), token }
}

async fn send(
  h: &Harness,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
  }
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = api_router(h.state.clone()).oneshot(req).await.unwrap();
  read(resp).await
}

async fn read(resp: Response) -> (StatusCode, Value) {
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn rating_uri(id: &str) -> String { format!("/subjects/{id}/rating") }

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let h = harness().await;
  let (status, body) = send(&h, "GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

// ── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_event_is_created() {
  let h = harness().await;
  let body = json!({ "subjectId": SUBJECT, "eventType": "view" });
  let (status, resp) = send(&h, "POST", "/events", None, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(resp, json!({ "ok": true }));
  assert_eq!(h.state.store().count_events().await.unwrap(), 1);
}

#[tokio::test]
async fn invalid_event_is_rejected_with_code() {
  let h = harness().await;
  let body = json!({ "subjectId": SUBJECT, "eventType": "share" });
  let (status, resp) = send(&h, "POST", "/events", None, Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(resp["error"]["code"], "invalid_input");
  assert!(resp["error"]["message"].is_string());
}

#[tokio::test]
async fn malformed_event_body_is_bad_request() {
  let h = harness().await;
  let (status, resp) = send(&h, "POST", "/events", None, Some(json!({ "eventType": 1 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(resp["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn event_for_unknown_subject_is_not_found() {
  let h = harness().await;
  let body = json!({ "subjectId": "ffffffffffffffffffffffff", "eventType": "view" });
  let (status, resp) = send(&h, "POST", "/events", None, Some(body)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(resp["error"]["code"], "not_found");
}

// ── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_rating_submission_is_unauthorized() {
  let h = harness().await;
  let (status, resp) =
    send(&h, "POST", &rating_uri(SUBJECT), None, Some(json!({ "rating": 4 }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(resp["error"]["code"], "unauthorized");

  // An unknown token is anonymous too.
  let (status, _) =
    send(&h, "POST", &rating_uri(SUBJECT), Some("nope"), Some(json!({ "rating": 4 }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rating_round_trip_through_http() {
  let h = harness().await;
  let token = h.token.as_str();

  let (status, resp) =
    send(&h, "POST", &rating_uri(SUBJECT), Some(token), Some(json!({ "rating": "4.7" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    resp,
    json!({
      "subjectId": SUBJECT,
      "averageRating": 5.0,
      "ratingCount": 1,
      "userRating": 5,
    })
  );

  let (status, resp) = send(&h, "GET", &rating_uri(SUBJECT), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp["ratingCount"], 1);
  assert_eq!(resp["userRating"], Value::Null);

  let (_, resp) = send(&h, "GET", &rating_uri(SUBJECT), Some(token), None).await;
  assert_eq!(resp["userRating"], 5);
}

#[tokio::test]
async fn out_of_range_rating_is_bad_request() {
  let h = harness().await;
  let (status, resp) = send(
    &h,
    "POST",
    &rating_uri(SUBJECT),
    Some(h.token.as_str()),
    Some(json!({ "rating": 6 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(resp["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn rating_for_malformed_id_is_bad_request() {
  let h = harness().await;
  let (status, _) = send(&h, "GET", &rating_uri("xyz"), None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_defaults_on_a_fresh_store() {
  let h = harness().await;
  let (status, resp) = send(&h, "GET", "/dashboard", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp["granularity"], "day");
  assert_eq!(resp["timeline"].as_array().unwrap().len(), 30);
  assert_eq!(resp["hotSubjects"], json!([]));
  assert_eq!(resp["summary"]["totalSubjects"], 1);
  assert_eq!(resp["summary"]["totalViews"], 0);
}

#[tokio::test]
async fn dashboard_parameters_are_lenient() {
  let h = harness().await;

  let (_, resp) = send(&h, "GET", "/dashboard?granularity=month&limit=500", None, None).await;
  assert_eq!(resp["granularity"], "month");
  assert_eq!(resp["timeline"].as_array().unwrap().len(), 36);

  let (status, resp) =
    send(&h, "GET", "/dashboard?granularity=week&limit=abc", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp["granularity"], "day");
  assert_eq!(resp["timeline"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn dashboard_reflects_recorded_events() {
  let h = harness().await;
  for event_type in ["view", "view", "favorite"] {
    let body = json!({ "subjectId": SUBJECT, "eventType": event_type });
    let (status, _) = send(&h, "POST", "/events", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (_, resp) = send(&h, "GET", "/dashboard?limit=1", None, None).await;
  assert_eq!(resp["summary"]["totalViews"], 2);
  assert_eq!(resp["summary"]["totalLikes"], 1);

  let today = &resp["timeline"][0];
  assert_eq!(today["views"], 2);
  assert_eq!(today["likes"], 1);

  let hot = &resp["hotSubjects"][0];
  assert_eq!(hot["subjectId"], SUBJECT);
  assert_eq!(hot["title"], "Alien");
  assert_eq!(hot["score"], 6);
}
