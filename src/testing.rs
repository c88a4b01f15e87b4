use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;

use crate::config::{AuthConfig, Config};
use crate::error::AuthError;
use crate::mailer::Mailer;
use crate::migrations::Migrator;
use crate::models::user;
use crate::storage::LocalStorage;

/// A test application builder for integration testing.
///
/// Spins up a Warden server with an in-memory SQLite database.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_register() {
///     let app = TestApp::new().await;
///     let res = app.post("/api/auth/register", r#"{...}"#).await;
///     assert_eq!(res.status, 201);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database and a
    /// capturing mailer.
    pub async fn new() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            upload_dir: format!("/tmp/warden-test-uploads-{}", uuid::Uuid::new_v4()),
            max_avatar_size: 2_097_152,
            auth: AuthConfig::default(),
        };

        Self::with_config(config).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_config(config.clone())
            .await
            .expect("Failed to create test app");

        let mailer = Arc::new(CapturingMailer::default());
        let storage = Arc::new(LocalStorage::new(&config.upload_dir));
        let router = app.router_with(storage, mailer.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
            mailer,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a user and return the created user JSON.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> serde_json::Value {
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/register"), &body.to_string())
            .await;

        assert_eq!(res.status, 201, "Register failed: {}", res.body);
        res.data()
    }

    /// Login and return `(access_token, refresh_token)`.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        let data = res.data();
        (
            data["token"].as_str().unwrap().to_string(),
            data["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

/// Connect an in-memory SQLite database with migrations applied, for tests
/// that exercise the token modules directly.
pub async fn test_db() -> DatabaseConnection {
    // Single connection: a pooled in-memory SQLite database is per-connection.
    let mut opts = sea_orm::ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1);
    let db = sea_orm::Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Test mailer that captures reset tokens instead of sending them.
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<(String, String)>>, // (email, token)
}

impl CapturingMailer {
    /// The most recently captured reset token, if any.
    pub fn last_reset_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, token)| token.clone())
    }

    /// Number of reset emails captured.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Mailer for CapturingMailer {
    async fn send_password_reset(
        &self,
        user: &user::Model,
        token: &str,
    ) -> Result<(), AuthError> {
        self.sent
            .lock()
            .unwrap()
            .push((user.email.clone(), token.to_string()));
        Ok(())
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self.inner.get(url).send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with an auth token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with auth token and JSON body.
    pub async fn post_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a PUT request with auth token and a multipart form.
    pub async fn put_multipart_with_auth(
        &self,
        url: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> TestResponse {
        let res = self
            .inner
            .put(url)
            .header("Authorization", format!("Bearer {}", token))
            .multipart(form)
            .send()
            .await
            .expect("PUT request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        TestResponse { status, body }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.json()["status"].as_bool().unwrap_or(false)
    }

    /// Get the data field from the envelope.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the errors field from the envelope.
    pub fn errors(&self) -> serde_json::Value {
        self.json()["errors"].clone()
    }
}
