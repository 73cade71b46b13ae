use std::time::Duration;

use application::{config, router};
use axum::{
    body::{self, Body},
    Router,
};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use service::{
    infra::{postgres, Postgres, PubSub},
    Service,
};
use tower::ServiceExt as _;

/// Builds a [`Router`] over a [`Postgres`] nobody listens for.
fn app() -> Router {
    app_with_timeout(Duration::from_secs(10))
}

fn app_with_timeout(request_timeout: Duration) -> Router {
    let postgres = Postgres::new(&postgres::Config {
        host: Some("127.0.0.1".to_owned()),
        port: Some(1),
        user: Some("postgres".to_owned()),
        dbname: Some("postgres".to_owned()),
        ..postgres::Config::default()
    })
    .unwrap();
    let (service, _) = Service::new(
        config::Service::default().into_config(config::Pool::default()),
        postgres,
        None::<PubSub>,
    );
    router(service, request_timeout)
}

async fn call(
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let resp = app().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn user(email: &str) -> Value {
    json!({
        "first_name": "John",
        "last_name": "Doe",
        "nickname": "jd",
        "password": "qwerty",
        "email": email,
        "country": "UK",
    })
}

#[tokio::test]
async fn rejects_invalid_email() {
    let (status, body) =
        call(Method::POST, "/users", Some(user("invalid-mail-format"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_EMAIL");

    let (status, body) = call(
        Method::PUT,
        "/users/6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69",
        Some(user("Test@Faceit.com")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_EMAIL");
}

#[tokio::test]
async fn rejects_malformed_body() {
    let mut empty_nickname = user("test@faceit.com");
    empty_nickname["nickname"] = json!("");
    let mut no_country = user("test@faceit.com");
    _ = no_country.as_object_mut().unwrap().remove("country");

    for body in [empty_nickname, no_country, json!([1, 2, 3])] {
        let (status, resp) = call(Method::POST, "/users", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn rejects_malformed_id() {
    let (status, body) =
        call(Method::PUT, "/users/42", Some(user("test@faceit.com"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = call(Method::DELETE, "/users/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn rejects_both_page_tokens() {
    let (status, body) =
        call(Method::GET, "/users?previous_page=a.b&next_page=c.d", None)
            .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AMBIGUOUS_PAGINATION");
}

#[tokio::test]
async fn rejects_invalid_page_token() {
    let (status, body) =
        call(Method::GET, "/users?next_page=garbage", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CURSOR");
}

#[tokio::test]
async fn rejects_invalid_limit() {
    for uri in ["/users?limit=-1", "/users?limit=many"] {
        let (status, body) = call(Method::GET, uri, None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn reports_database_failures() {
    for (method, uri, body) in [
        (Method::GET, "/users?country=UK", None),
        (Method::POST, "/users", Some(user("test@faceit.com"))),
        (
            Method::DELETE,
            "/users/6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69",
            None,
        ),
    ] {
        let (status, resp) = call(method, uri, body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(resp["code"], "INTERNAL_SERVER_ERROR");
        assert!(!resp["message"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn times_out_slow_requests() {
    let req = Request::builder()
        .method(Method::GET)
        .uri("/users")
        .body(Body::empty())
        .unwrap();

    let resp = app_with_timeout(Duration::ZERO).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
}
