//! Authorization recovery across the full client

use futures::future::join_all;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use monay_sdk::{
    Credentials, Currency, FailureKind, Monay, PaymentIntent, PaymentStatus, RailKind,
    SessionEvent,
};

const INSTANT_DEPOSIT: &str = "/api/payment-rails/transfer/deposit";

fn instant(key: &str) -> PaymentIntent {
    PaymentIntent::builder("wallet_1", "bank_1", 5000, Currency::USD)
        .idempotency_key(key)
        .rail(RailKind::InstantPayment)
        .build()
}

async fn mount_rail(server: &MockServer, token: &str, status: u16, expected: u64) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "transactionId": "instant_1",
            "amount": 5000
        }))
    } else {
        ResponseTemplate::new(status)
    };

    Mock::given(method("POST"))
        .and(path(INSTANT_DEPOSIT))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(template)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn expired_token_is_refreshed_and_retried_once() {
    let server = MockServer::start().await;
    mount_rail(&server, "stale", 401, 1).await;
    mount_rail(&server, "fresh", 200, 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "fresh",
            "refreshToken": "refresh-2",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let monay = Monay::builder()
        .endpoint(server.uri())
        .credentials(Credentials::new("stale", Some("refresh-1".into())))
        .build()
        .unwrap();

    let result = monay.submit(instant("abc")).await.unwrap();

    assert_eq!(result.status, PaymentStatus::Completed);
    let credentials = monay.store().get().unwrap();
    assert_eq!(credentials.access_token, "fresh");
    assert_eq!(credentials.refresh_token.as_deref(), Some("refresh-2"));
    assert!(credentials.expires_at.is_some());
}

#[tokio::test]
async fn missing_refresh_token_terminates_the_session() {
    let server = MockServer::start().await;
    mount_rail(&server, "stale", 401, 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let monay = Monay::builder()
        .endpoint(server.uri())
        .credentials(Credentials::new("stale", None))
        .build()
        .unwrap();
    let mut session = monay.subscribe_session();

    let result = monay.submit(instant("abc")).await.unwrap();

    assert_eq!(result.status, PaymentStatus::Failed);
    assert_eq!(result.failure_kind, Some(FailureKind::Unauthenticated));
    assert!(!monay.is_authenticated());
    assert!(matches!(session.try_recv(), Ok(SessionEvent::Terminated { .. })));
}

#[tokio::test]
async fn rejected_refresh_terminates_the_session() {
    let server = MockServer::start().await;
    mount_rail(&server, "stale", 401, 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh token revoked"))
        .expect(1)
        .mount(&server)
        .await;

    let monay = Monay::builder()
        .endpoint(server.uri())
        .credentials(Credentials::new("stale", Some("refresh-1".into())))
        .build()
        .unwrap();
    let mut session = monay.subscribe_session();

    let result = monay.submit(instant("abc")).await.unwrap();

    assert_eq!(result.failure_kind, Some(FailureKind::Unauthenticated));
    assert!(result.failure_reason.unwrap().contains("revoked"));
    assert!(!monay.is_authenticated());
    assert!(session.try_recv().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let server = MockServer::start().await;
    // Calls that start before the refresh lands present the stale token
    Mock::given(method("POST"))
        .and(path(INSTANT_DEPOSIT))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_rail(&server, "fresh", 200, 8).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "accessToken": "fresh" }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let monay = Monay::builder()
        .endpoint(server.uri())
        .credentials(Credentials::new("stale", Some("refresh-1".into())))
        .build()
        .unwrap();

    let submissions = (0..8).map(|i| {
        let monay = monay.clone();
        tokio::spawn(async move { monay.submit(instant(&format!("key-{}", i))).await })
    });
    let results = join_all(submissions).await;

    for result in results {
        assert_eq!(result.unwrap().unwrap().status, PaymentStatus::Completed);
    }
    assert_eq!(monay.store().access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn expiring_token_is_refreshed_before_dispatch() {
    let server = MockServer::start().await;
    mount_rail(&server, "stale", 401, 0).await;
    mount_rail(&server, "fresh", 200, 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let expiring = Credentials::new("stale", Some("refresh-1".into()))
        .with_expires_at(chrono::Utc::now() + chrono::Duration::seconds(5));
    let monay = Monay::builder()
        .endpoint(server.uri())
        .credentials(expiring)
        .build()
        .unwrap();

    let result = monay.submit(instant("abc")).await.unwrap();
    assert_eq!(result.status, PaymentStatus::Completed);
}
