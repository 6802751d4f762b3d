//! IBBS API Server
//!
//! Backend of the Internet Bulletin Board Service: short text posts with
//! likes, user profiles and AI writing helpers.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod integration_tests;

use adapters::{
    DisabledAiClient, DisabledDirectory, GraphDirectoryClient, MongoKnowledgeBaseRepository,
    OpenAiCompatibleClient, PostgresAiUsageRepository, PostgresPostRatingRepository,
    PostgresPostRepository, PostgresQueryRunner, PostgresUserRepository,
};
use app::{
    AiService, BulletinService, CacheService, ConfigurationService, PostRatingService,
    PostService, ProfileService, UserService,
};
use auth::JwtValidator;
use config::Config;
use domain::ports::{AiClient, UserDirectory};
use handlers::envelope::ApiResponse;

const CACHE_CAPACITY: u64 = 10_000;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService<PostgresPostRepository, dyn AiClient>>,
    pub rating_service:
        Arc<PostRatingService<PostgresPostRepository, PostgresPostRatingRepository>>,
    pub profile_service: Arc<
        ProfileService<
            PostgresUserRepository,
            PostgresPostRepository,
            PostgresPostRatingRepository,
            PostgresAiUsageRepository,
        >,
    >,
    pub user_service: Arc<UserService<PostgresUserRepository, dyn UserDirectory>>,
    pub ai_service: Arc<
        AiService<
            PostgresAiUsageRepository,
            MongoKnowledgeBaseRepository,
            PostgresQueryRunner,
            dyn AiClient,
        >,
    >,
    pub bulletin_service: Arc<BulletinService<MongoKnowledgeBaseRepository>>,
    pub configuration_service: Arc<ConfigurationService>,
    pub cache: Arc<CacheService>,
    pub jwt: Arc<JwtValidator>,
}

impl AppState {
    /// Wire adapters and services from configuration
    pub fn build(
        config: &Config,
        db: DatabaseConnection,
        mongo: &mongodb::Database,
    ) -> anyhow::Result<Self> {
        let cache = Arc::new(CacheService::new(
            Duration::from_secs(config.cache_ttl_secs),
            CACHE_CAPACITY,
        ));

        // Create adapters
        let post_repo = Arc::new(PostgresPostRepository::new(db.clone()));
        let rating_repo = Arc::new(PostgresPostRatingRepository::new(db.clone()));
        let user_repo = Arc::new(PostgresUserRepository::new(db.clone()));
        let usage_repo = Arc::new(PostgresAiUsageRepository::new(db.clone()));
        let query_runner = Arc::new(PostgresQueryRunner::new(db));
        let knowledge_repo = Arc::new(MongoKnowledgeBaseRepository::new(mongo));

        let ai: Arc<dyn AiClient> = match config.ai_api_key {
            Some(ref key) => Arc::new(OpenAiCompatibleClient::new(
                config.ai_api_url.clone(),
                key.clone(),
                config.ai_model.clone(),
            )),
            None => {
                tracing::warn!("AI_API_KEY not set, AI features are disabled");
                Arc::new(DisabledAiClient)
            }
        };

        let directory: Arc<dyn UserDirectory> = match (
            &config.graph_tenant_id,
            &config.graph_client_id,
            &config.graph_client_secret,
        ) {
            (Some(tenant), Some(client_id), Some(secret)) => Arc::new(GraphDirectoryClient::new(
                tenant.clone(),
                client_id.clone(),
                secret.clone(),
            )),
            _ => {
                tracing::warn!("Graph credentials not set, directory search is disabled");
                Arc::new(DisabledDirectory)
            }
        };

        let moderator = (config.ai_enabled() && config.moderate_posts).then(|| ai.clone());

        let jwt = Arc::new(
            JwtValidator::from_config(config).context("Failed to load JWT validation key")?,
        );

        // Create application services
        let post_service = Arc::new(PostService::new(
            post_repo.clone(),
            moderator,
            cache.clone(),
        ));

        let rating_service = Arc::new(PostRatingService::new(
            post_repo.clone(),
            rating_repo.clone(),
            cache.clone(),
        ));

        let profile_service = Arc::new(ProfileService::new(
            user_repo.clone(),
            post_repo,
            rating_repo,
            usage_repo.clone(),
            cache.clone(),
        ));

        let user_service = Arc::new(UserService::new(user_repo, directory, cache.clone()));

        let ai_service = Arc::new(AiService::new(
            usage_repo,
            knowledge_repo.clone(),
            query_runner,
            ai,
            cache.clone(),
            config.ai_daily_limit,
        ));

        let bulletin_service = Arc::new(BulletinService::new(knowledge_repo, cache.clone()));
        let configuration_service = Arc::new(ConfigurationService::new(config));

        Ok(Self {
            post_service,
            rating_service,
            profile_service,
            user_service,
            ai_service,
            bulletin_service,
            configuration_service,
            cache,
            jwt,
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router
///
/// AI routes are rate limited per peer IP when `rate_limit` is set, which
/// requires serving with `into_make_service_with_connect_info`.
pub fn router(state: AppState, rate_limit: bool) -> anyhow::Result<Router> {
    let auth_layer = middleware::from_fn_with_state(state.jwt.clone(), auth::require_auth);

    // AI helpers (auth, optionally rate limited)
    let mut ai_routes = Router::new()
        .route("/api/ai/rewrite", post(handlers::ai::rewrite))
        .route("/api/ai/tag", post(handlers::ai::tag))
        .route("/api/ai/moderate", post(handlers::ai::moderate))
        .route("/api/ai/chat", post(handlers::ai::chat))
        .layer(auth_layer.clone());

    if rate_limit {
        // 1 req/sec sustained, burst of 5
        // PeerIpKeyExtractor reads the client IP from the socket connection
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(1)
                .burst_size(5)
                .finish()
                .context("Failed to build governor config")?,
        );
        ai_routes = ai_routes.layer(GovernorLayer {
            config: governor_config,
        });
    }

    // Protected routes
    let protected_routes = Router::new()
        .route("/api/bulletin/about-us", axum::routing::put(handlers::update_about_us))
        .route("/api/posts", post(handlers::create_post))
        .route(
            "/api/posts/:id",
            axum::routing::put(handlers::update_post).delete(handlers::delete_post),
        )
        .route(
            "/api/posts/:id/rating",
            get(handlers::get_rating).post(handlers::toggle_rating),
        )
        .route("/api/profiles/me", get(handlers::get_my_profile))
        .route("/api/users/me", get(handlers::get_me))
        .route("/api/users/search", get(handlers::search_users))
        .route(
            "/api/users/:id",
            get(handlers::get_user).delete(handlers::deactivate_user),
        )
        .route("/api/ai/usage", get(handlers::ai::usage))
        .route("/api/cache", delete(handlers::clear_cache))
        .layer(auth_layer);

    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public endpoints
        .route("/api/configuration", get(handlers::get_configuration))
        .route("/api/bulletin/about-us", get(handlers::get_about_us))
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/:id", get(handlers::get_post))
        .route("/api/posts/user/:user_id", get(handlers::list_user_posts))
        .route("/api/profiles/:user_id", get(handlers::get_profile))
        .merge(protected_routes)
        .merge(ai_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ibbs_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting IBBS API...");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Connect to MongoDB (knowledge base)
    let mongo = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("Failed to create MongoDB client")?
        .database(&config.mongodb_database);

    let state = AppState::build(&config, db, &mongo)?;
    let app = router(state, true)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
