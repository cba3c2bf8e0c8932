/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use fieldbook_api::{app::AppState, config::Config};
/// use fieldbook_shared::{db::pool::{create_pool, DatabaseConfig}, mail::LogMailer, repository::Repositories};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig { url: config.database.url.clone(), ..Default::default() }).await?;
/// let state = AppState::new(Repositories::postgres(pool), config, Arc::new(LogMailer));
/// let app = fieldbook_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use fieldbook_shared::{auth::middleware::authenticate, mail::Mailer, repository::Repositories};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    error::ApiError,
    middleware::roles::{require_admin, require_client},
};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Every
/// field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage
    pub repos: Repositories,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound email
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(repos: Repositories, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            repos,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── /health                         public
/// ├── /auth/*                         public
/// ├── /clients                        token
/// ├── /dashboard                      token
/// ├── /farmhealth/my-farms            token
/// ├── /events                         token
/// ├── /admin/profile                  token, admin checked in handler
/// ├── /clientFarms, /clientCrops      token + client
/// └── /adminFarms, /admin/*, /logs    token + admin
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Bearer authentication (protected routes only)
/// 4. Role gate (client and admin groups only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/forgot-password", post(routes::password::forgot_password))
        .route("/auth/reset-password", post(routes::password::reset_password));

    // Any authenticated user
    let user_routes = Router::new()
        .route(
            "/clients",
            get(routes::clients::get_profile).put(routes::clients::update_profile),
        )
        .route(
            "/admin/profile",
            get(routes::admin_users::get_profile).put(routes::admin_users::update_profile),
        )
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route("/farmhealth/my-farms", get(routes::farm_health::my_farms))
        .route(
            "/events",
            get(routes::events::list_events).post(routes::events::create_event),
        );

    let client_routes = Router::new()
        .route(
            "/clientFarms",
            get(routes::client_farms::list_farms).post(routes::client_farms::create_farm),
        )
        .route(
            "/clientFarms/:id",
            put(routes::client_farms::update_farm).delete(routes::client_farms::delete_farm),
        )
        .route("/clientCrops", get(routes::client_crops::list_crops))
        .route("/clientCrops/:id", put(routes::client_crops::update_crop))
        .route("/clientCrops/:id/crops", post(routes::client_crops::add_crop))
        .route(
            "/clientCrops/:id/crops/:crop_id",
            axum::routing::delete(routes::client_crops::delete_crop),
        )
        .route_layer(middleware::from_fn(require_client));

    let admin_routes = Router::new()
        .route(
            "/adminFarms",
            get(routes::admin_farms::list_farms).post(routes::admin_farms::create_farm),
        )
        .route(
            "/adminFarms/:id",
            put(routes::admin_farms::update_farm).delete(routes::admin_farms::delete_farm),
        )
        .route("/admin", get(routes::admin_users::list_users))
        .route("/admin/register", post(routes::admin_users::register_user))
        .route(
            "/admin/:id",
            put(routes::admin_users::update_user).delete(routes::admin_users::delete_user),
        )
        .route(
            "/admin/dashboard",
            get(routes::admin_dashboard::list_dashboards)
                .post(routes::admin_dashboard::create_dashboard),
        )
        .route(
            "/admin/dashboard/:id",
            put(routes::admin_dashboard::update_dashboard)
                .delete(routes::admin_dashboard::delete_dashboard),
        )
        .route(
            "/admin/farmhealth",
            post(routes::admin_farm_health::create_farm_health),
        )
        .route(
            "/admin/farmhealth/:id",
            get(routes::admin_farm_health::get_farm_health)
                .put(routes::admin_farm_health::update_farm_health)
                .delete(routes::admin_farm_health::delete_farm_health),
        )
        .route("/logs", get(routes::logs::list_logs))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(client_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Resolves the bearer token to its stored user, then injects the
/// resulting `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context =
        authenticate(state.repos.users.as_ref(), state.jwt_secret(), req.headers()).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
