use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use blog_service::config::{Config, StoreBackend};
use blog_service::db::{self, BlogStore, InMemoryBlogStore, PgBlogStore};
use blog_service::handlers::{self, BlogState};
use blog_service::middleware::MetricsMiddleware;
use chrono::Utc;
use crypto_core::jwt;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct HealthState {
    db_pool: Option<PgPool>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    /// `Ok` when there is no database to check.
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ()),
            None => Ok(()),
        }
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();
    let mut ready = true;

    if state.db_pool.is_some() {
        let start = Instant::now();
        let pg_result = state.check_postgres().await;
        let latency_ms = Some(start.elapsed().as_millis() as u64);
        let postgres_check = match pg_result {
            Ok(_) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "PostgreSQL connection successful".to_string(),
                latency_ms,
            },
            Err(e) => {
                ready = false;
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: format!("PostgreSQL connection failed: {}", e),
                    latency_ms,
                }
            }
        };
        checks.insert("postgresql".to_string(), postgres_check);
    }

    let jwt_check = if jwt::is_initialized() {
        ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "JWT validation key loaded".to_string(),
            latency_ms: None,
        }
    } else {
        ready = false;
        ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: "JWT validation key missing".to_string(),
            latency_ms: None,
        }
    };
    checks.insert("jwt".to_string(), jwt_check);

    let status = if ready {
        ComponentStatus::Healthy
    } else {
        ComponentStatus::Unhealthy
    };

    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!("SIGTERM handler unavailable: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Pick the repository backend. The pool is returned for health checks.
async fn build_store(config: &Config) -> anyhow::Result<(Arc<dyn BlogStore>, Option<PgPool>)> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok((Arc::new(InMemoryBlogStore::new()), None))
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.database.url)
                .await
                .context("Failed to create database pool")?;

            if config.database.run_migrations {
                db::run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            tracing::info!(
                max_connections = config.database.max_connections,
                "Connected to PostgreSQL"
            );
            Ok((Arc::new(PgBlogStore::new(pool.clone())), Some(pool)))
        }
    }
}

/// Blog Service
///
/// Posts, comments, category and profile feeds behind a single
/// visibility and ownership policy.
///
/// # Routes
///
/// - `/api/v1/posts/*` - Index feed, post detail and author-only edits
/// - `/api/v1/posts/{post_id}/comments/*` - Comments on visible posts
/// - `/api/v1/categories/{slug}/posts` - Category feed
/// - `/api/v1/profile/*` - Profile feed and own profile edit
///
/// Runs on port 8085 by default (configurable via BLOG_SERVICE_PORT).
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Support container healthchecks via CLI subcommand
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" {
                let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8085".into());
                let url = format!("http://127.0.0.1:{}/api/v1/health", port);
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log.json);

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    match jwt::load_validation_key() {
        Ok(public_key) => {
            if let Err(err) = jwt::initialize_jwt_validation_only(&public_key) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to initialize JWT keys: {err}"),
                ));
            }
        }
        Err(err) => {
            tracing::warn!(
                "JWT public key not configured ({err}); every bearer token will be rejected"
            );
        }
    }

    let (store, db_pool) = match build_store(&config).await {
        Ok(built) => built,
        Err(e) => {
            tracing::error!("Store initialization failed: {:#}", e);
            eprintln!("ERROR: Failed to initialize store: {:#}", e);
            std::process::exit(1);
        }
    };

    let blog_state = web::Data::new(BlogState::new(store, config.feed.page_size));
    let health_state = web::Data::new(HealthState { db_pool });

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_config.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(blog_state.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(MetricsMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(blog_service::metrics::serve_metrics),
            )
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure)
    })
    .bind(&http_bind_address)?
    .workers(4)
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = tokio::select! {
        joined = server_task => match joined {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        },
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            Ok(())
        }
    };

    tracing::info!("blog-service shutting down");
    result
}
