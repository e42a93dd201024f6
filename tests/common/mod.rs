// tests/common/mod.rs

#![allow(dead_code)]

use dada_backend::{config::Config, db, routes, state::AppState};
use serde_json::Value;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub const ADMIN_USERNAME: &str = "admin_root";
pub const ADMIN_PASSWORD: &str = "admin_password";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection that never recycles keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        port: 0,
    };

    db::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

pub fn unique_username() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Value {
        let mut request = self.client.post(format!("{}{}", self.address, path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "envelope is always HTTP 200");
        response.json().await.expect("Response is not JSON")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Value {
        let mut request = self.client.get(format!("{}{}", self.address, path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "envelope is always HTTP 200");
        response.json().await.expect("Response is not JSON")
    }

    pub async fn login(&self, username: &str, password: &str) -> (i64, String) {
        let body = self
            .post(
                "/api/user/login",
                None,
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(body["code"], 0, "login failed: {}", body);
        let token = body["data"]["token"].as_str().expect("token").to_string();
        let id = body["data"]["user"]["id"].as_i64().expect("user id");
        (id, token)
    }

    /// Registers a fresh user and logs in. Returns (user id, token).
    pub async fn new_user(&self) -> (i64, String) {
        let username = unique_username();
        let body = self
            .post(
                "/api/user/register",
                None,
                serde_json::json!({
                    "username": username,
                    "password": PASSWORD,
                    "check_password": PASSWORD
                }),
            )
            .await;
        assert_eq!(body["code"], 0, "register failed: {}", body);
        self.login(&username, PASSWORD).await
    }

    pub async fn admin(&self) -> (i64, String) {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}
