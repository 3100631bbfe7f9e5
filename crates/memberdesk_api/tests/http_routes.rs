use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use memberdesk_api::{build_router, AppState};
use memberdesk_core::Database;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

struct TestServer {
    _dir: TempDir,
    router: Router,
}

impl TestServer {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("memberdesk.db")).unwrap();
        Self {
            _dir: dir,
            router: build_router(AppState::new(db)),
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_location(&self) -> String {
        let (status, body) = self
            .send("POST", "/api/locations", Some(json!({ "name": "Riverside" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_account(&self) -> String {
        let location = self.create_location().await;
        let (status, body) = self
            .send(
                "POST",
                "/api/accounts",
                Some(account_body(&location, "2024-01-31T00:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_member(&self, account: &str, first_name: &str, primary: bool) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/members",
                Some(json!({
                    "accountGuid": account,
                    "firstName": first_name,
                    "lastName": "Example",
                    "primary": primary,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn account_members(&self, account: &str) -> Vec<Value> {
        let (status, body) = self
            .send("GET", &format!("/api/accounts/{account}/members"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

fn account_body(location: &str, period_start: &str) -> Value {
    json!({
        "locationGuid": location,
        "accountType": "FAMILY",
        "paymentAmount": "25.50",
        "periodStartUtc": period_start,
        "periodEndUtc": "2025-01-31T00:00:00Z",
    })
}

fn parse_time(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let server = TestServer::new();
    let (status, body) = server.send("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], memberdesk_core::core_version());
}

#[tokio::test]
async fn created_account_reads_back_green_with_camel_case_fields() {
    let server = TestServer::new();
    let account = server.create_account().await;

    let (status, body) = server
        .send("GET", &format!("/api/accounts/{account}"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["guid"], account.as_str());
    assert_eq!(body["status"], "GREEN");
    assert_eq!(body["accountType"], "FAMILY");
    assert_eq!(body["pendCancel"], false);
    assert_eq!(
        parse_time(&body["nextBillingUtc"]),
        Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
    );

    let (status, list) = server.send("GET", "/api/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_account_for_unknown_location_is_not_found() {
    let server = TestServer::new();
    let (status, body) = server
        .send(
            "POST",
            "/api/accounts",
            Some(account_body(&Uuid::new_v4().to_string(), "2024-01-01T00:00:00Z")),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn invalid_account_input_reports_the_offending_field() {
    let server = TestServer::new();
    let location = server.create_location().await;
    let mut input = account_body(&location, "2024-01-01T00:00:00Z");
    input["paymentAmount"] = json!("-5");

    let (status, body) = server.send("POST", "/api/accounts", Some(input)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "paymentAmount");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = TestServer::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/accounts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = server.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn non_uuid_ids_match_no_resource() {
    let server = TestServer::new();

    for (method, uri) in [
        ("GET", "/api/accounts/not-a-uuid"),
        ("DELETE", "/api/accounts/42/members"),
        ("DELETE", "/api/members/not-a-uuid"),
    ] {
        let (status, body) = server.send(method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "not_found");
    }
}

#[tokio::test]
async fn unknown_account_is_not_found_for_get_and_update() {
    let server = TestServer::new();
    let missing = Uuid::new_v4();

    let (status, _) = server
        .send("GET", &format!("/api/accounts/{missing}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server
        .send(
            "PUT",
            &format!("/api/accounts/{missing}"),
            Some(json!({
                "status": "RED",
                "accountType": "INDIVIDUAL",
                "paymentAmount": "0",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn update_account_returns_no_content_and_applies_changes() {
    let server = TestServer::new();
    let account = server.create_account().await;

    let (status, body) = server
        .send(
            "PUT",
            &format!("/api/accounts/{account}"),
            Some(json!({
                "status": "YELLOW",
                "accountType": "BUSINESS",
                "paymentAmount": "99.00",
                "pendCancel": true,
                "pendCancelDateUtc": "2024-06-01T00:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, body) = server
        .send("GET", &format!("/api/accounts/{account}"), None)
        .await;
    assert_eq!(body["status"], "YELLOW");
    assert_eq!(body["accountType"], "BUSINESS");
    assert_eq!(body["pendCancel"], true);
    assert!(body["updatedUtc"].is_string());
}

#[tokio::test]
async fn second_primary_member_is_a_conflict() {
    let server = TestServer::new();
    let account = server.create_account().await;
    server.create_member(&account, "Ada", true).await;

    let (status, body) = server
        .send(
            "POST",
            "/api/members",
            Some(json!({
                "accountGuid": account,
                "firstName": "Grace",
                "lastName": "Hopper",
                "primary": true,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(server.account_members(&account).await.len(), 1);
}

#[tokio::test]
async fn member_for_unknown_account_is_not_found() {
    let server = TestServer::new();
    let (status, _) = server
        .send(
            "POST",
            "/api/members",
            Some(json!({
                "accountGuid": Uuid::new_v4(),
                "firstName": "Ada",
                "lastName": "Lovelace",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_last_member_is_rejected() {
    let server = TestServer::new();
    let account = server.create_account().await;
    let only = server.create_member(&account, "Ada", true).await;

    let (status, body) = server
        .send("DELETE", &format!("/api/members/{only}"), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invariant_violation");
    let members = server.account_members(&account).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["primary"], true);
}

#[tokio::test]
async fn deleting_primary_promotes_next_member() {
    let server = TestServer::new();
    let account = server.create_account().await;
    let m1 = server.create_member(&account, "Ada", true).await;
    let m2 = server.create_member(&account, "Grace", false).await;
    let m3 = server.create_member(&account, "Alan", false).await;

    let (status, _) = server
        .send("DELETE", &format!("/api/members/{m1}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let members = server.account_members(&account).await;
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["guid"], m2.as_str());
    assert_eq!(members[0]["primary"], true);
    assert_eq!(members[1]["guid"], m3.as_str());
    assert_eq!(members[1]["primary"], false);
}

#[tokio::test]
async fn deleting_unknown_member_is_not_found() {
    let server = TestServer::new();
    let (status, body) = server
        .send("DELETE", &format!("/api/members/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn delete_non_primary_members_keeps_primary() {
    let server = TestServer::new();
    let account = server.create_account().await;
    let primary = server.create_member(&account, "Ada", true).await;
    server.create_member(&account, "Grace", false).await;

    let (status, _) = server
        .send("DELETE", &format!("/api/accounts/{account}/members"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let members = server.account_members(&account).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["guid"], primary.as_str());

    let (status, _) = server
        .send(
            "DELETE",
            &format!("/api/accounts/{}/members", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_account_succeeds_once_then_fails() {
    let server = TestServer::new();
    let account = server.create_account().await;

    let (status, _) = server
        .send("DELETE", &format!("/api/accounts/{account}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .send("DELETE", &format!("/api/accounts/{account}"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "write_failed");
}

#[tokio::test]
async fn locations_are_listed_after_creation() {
    let server = TestServer::new();
    let id = server.create_location().await;

    let (status, body) = server.send("GET", "/api/locations", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["guid"], id.as_str());
    assert_eq!(items[0]["name"], "Riverside");
}
