#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Days, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use eventhub_server::routes::create_routes;
use eventhub_server::store::MemoryStore;
use eventhub_server::{AppState, Config};

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    pub fn error_message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Config::with_secret("integration-test-secret"),
        );
        Self {
            router: create_routes(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, cookie, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, cookie, None).await
    }

    /// Signs up and logs in; returns the `token=...` cookie pair.
    pub async fn register(&self, name: &str, role: &str) -> String {
        let email = format!("{}@example.com", name.to_lowercase());
        let signup = self
            .post(
                "/api/auth/signup",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "password": "password123",
                    "confirmPassword": "password123",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);

        let login = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        let set_cookie = login.set_cookie.expect("login sets the session cookie");
        set_cookie
            .split(';')
            .next()
            .unwrap()
            .trim()
            .to_string()
    }

    pub async fn create_event(&self, cookie: &str, title: &str) -> String {
        let response = self
            .post(
                "/api/events",
                Some(cookie),
                json!({
                    "title": title,
                    "description": "A test event",
                    "date": future_date(30),
                    "time": "18:00",
                    "location": "Main hall",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_str().unwrap().to_string()
    }

    pub async fn create_ticket(
        &self,
        cookie: &str,
        event_id: &str,
        kind: &str,
        price: &str,
        quantity: i32,
    ) -> String {
        let response = self
            .post(
                &format!("/api/events/{event_id}/tickets"),
                Some(cookie),
                json!({ "type": kind, "price": price, "quantity": quantity }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_str().unwrap().to_string()
    }

    pub async fn ticket_quantity(&self, event_id: &str, ticket_id: &str) -> i64 {
        let response = self
            .get(&format!("/api/events/{event_id}/tickets"), None)
            .await;
        response
            .data()
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["id"] == ticket_id)
            .and_then(|t| t["quantity"].as_i64())
            .unwrap()
    }

    pub async fn rsvp(&self, cookie: &str, event_id: &str, ticket_id: &str) -> TestResponse {
        self.post(
            "/api/rsvps",
            Some(cookie),
            json!({ "event_id": event_id, "ticket_id": ticket_id }),
        )
        .await
    }
}

pub fn future_date(days: u64) -> String {
    (Utc::now().date_naive() + Days::new(days))
        .format("%Y-%m-%d")
        .to_string()
}
