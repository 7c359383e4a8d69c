use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{seed_reference_data, DatabaseManager, EntityStore, MemoryStore, PgStore};
use crate::handlers::reference::{DeviceTypes, Offices, Roles, Statuses};
use crate::handlers::{protected, public};
use crate::middleware::require_user;
use crate::state::AppState;

/// Full HTTP surface with state attached.
pub fn app(state: AppState) -> Router {
    let security = &state.config.security;
    let cors = cors_layer(security.enable_cors, &security.cors_origins);
    let request_logging = state.config.api.enable_request_logging;

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state);

    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    if request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use public::{auth, reference, service};

    Router::new()
        .route("/", get(service::root))
        .route("/health", get(service::health))
        .route("/login", post(auth::login))
        // Reference reads
        .route("/offices", get(reference::list::<Offices>))
        .route("/offices/:id", get(reference::get::<Offices>))
        .route("/user-roles", get(reference::list::<Roles>))
        .route("/user-roles/:id", get(reference::get::<Roles>))
        .route("/incident-statuses", get(reference::list::<Statuses>))
        .route("/incident-statuses/:id", get(reference::get::<Statuses>))
        .route("/device-types", get(reference::list::<DeviceTypes>))
        .route("/device-types/:id", get(reference::get::<DeviceTypes>))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::{post, put};
    use protected::{devices, incidents, me, offices, reference, users};

    Router::new()
        .route("/me", get(me::me))
        // Users (administrators)
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        // Incidents
        .route("/incidents", get(incidents::list).post(incidents::create))
        .route(
            "/incidents/:id",
            get(incidents::get).put(incidents::update).delete(incidents::delete),
        )
        .route("/incidents/:id/history", get(incidents::history))
        .route("/offices/:id/incidents", get(offices::incidents))
        // Devices
        .route("/devices", get(devices::list).post(devices::create))
        .route(
            "/devices/:id",
            get(devices::get).put(devices::update).delete(devices::delete),
        )
        // Reference writes (administrators)
        .route("/offices", post(reference::create::<Offices>))
        .route(
            "/offices/:id",
            put(reference::update::<Offices>).delete(reference::delete::<Offices>),
        )
        .route("/user-roles", post(reference::create::<Roles>))
        .route(
            "/user-roles/:id",
            put(reference::update::<Roles>).delete(reference::delete::<Roles>),
        )
        .route("/incident-statuses", post(reference::create::<Statuses>))
        .route(
            "/incident-statuses/:id",
            put(reference::update::<Statuses>).delete(reference::delete::<Statuses>),
        )
        .route("/device-types", post(reference::create::<DeviceTypes>))
        .route(
            "/device-types/:id",
            put(reference::update::<DeviceTypes>)
                .delete(reference::delete::<DeviceTypes>),
        )
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

fn cors_layer(enabled: bool, origins: &[String]) -> Option<CorsLayer> {
    if !enabled {
        return None;
    }
    if origins.iter().any(|origin| origin == "*") {
        return Some(CorsLayer::permissive());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Opens the configured backend and makes sure its schema exists.
pub async fn open_store(config: &AppConfig, in_memory: bool) -> anyhow::Result<Arc<dyn EntityStore>> {
    if in_memory {
        warn!("Using the in-memory store; all data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to the database")?;
    manager.ensure_schema().await.context("applying the schema")?;
    Ok(Arc::new(PgStore::new(manager.pool().clone())))
}

/// Seeds reference data and, when configured, the bootstrap administrator.
pub async fn bootstrap(state: &AppState) -> anyhow::Result<()> {
    seed_reference_data(state.store.as_ref())
        .await
        .context("seeding reference data")?;

    let bootstrap = &state.config.bootstrap;
    if let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) {
        state
            .users
            .ensure_admin(email, password, &bootstrap.admin_first_name, &bootstrap.admin_last_name)
            .await
            .context("creating the bootstrap administrator")?;
    }
    Ok(())
}

/// Open the store, bootstrap, and serve until the process is stopped.
pub async fn serve(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    config.validate()?;
    info!("Starting Incident API in {:?} mode", config.environment);

    let store = open_store(&config, in_memory).await?;
    let port = config.api.port;
    let state = AppState::new(config, store)?;
    bootstrap(&state).await?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Incident API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
