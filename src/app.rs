use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::Config;
use crate::controllers::AppState;
use crate::mailer::{Mailer, TracingMailer};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;
use crate::routing;
use crate::storage::{LocalStorage, StorageBackend};

/// The Warden application.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
}

impl App {
    /// Create a new application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create a new application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        // Run pending migrations automatically on startup
        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        Ok(App { config, db })
    }

    /// Build the Axum router with the default collaborators
    /// (local filesystem storage, tracing mailer).
    pub fn router(&self) -> Router {
        self.router_with(
            Arc::new(LocalStorage::new(&self.config.upload_dir)),
            Arc::new(TracingMailer),
        )
    }

    /// Build the Axum router with explicit storage and mailer collaborators.
    pub fn router_with(
        &self,
        storage: Arc<dyn StorageBackend>,
        mailer: Arc<dyn Mailer>,
    ) -> Router {
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: Arc::new(self.config.clone()),
            storage,
            mailer,
        };

        let mut router = Router::new()
            .route("/", get(welcome))
            .merge(routing::build_routes().with_state(state))
            .merge(Scalar::with_url("/api-docs", ApiDoc::openapi()))
            .layer(CorsLayer::permissive());

        // Only add the tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse};
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        tracing::info!("Warden server running on http://{}", addr);
        tracing::info!("API docs at http://{}/api-docs", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down Warden server...");
}

#[derive(Serialize)]
struct WelcomeMessage {
    message: &'static str,
    docs: &'static str,
    status: &'static str,
}

/// Welcome page at `/`.
async fn welcome() -> impl IntoResponse {
    axum::Json(WelcomeMessage {
        message: "Welcome to Warden",
        docs: "/api-docs",
        status: "running",
    })
}
