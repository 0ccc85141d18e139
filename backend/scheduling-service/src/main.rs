/// Scheduling service entry point.
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use scheduling_service::authz;
use scheduling_service::config::Config;
use scheduling_service::db::PgStore;
use scheduling_service::routes::configure_routes;
use scheduling_service::security::jwt;
use scheduling_service::services::{AppointmentService, UserService};
use scheduling_service::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        "starting scheduling-service on {}:{}",
        config.app.host,
        config.app.port
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!("database migrations applied");

    jwt::initialize(&config.jwt.secret);

    let policy = authz::policy_from_name(&config.policy.variant).with_context(|| {
        format!("unknown SCHEDULING_POLICY variant: {}", config.policy.variant)
    })?;
    tracing::info!(policy = policy.name(), "authorization policy selected");

    let store = Arc::new(PgStore::new(pool));
    let state = AppState {
        users: UserService::new(store.clone(), policy.clone()),
        appointments: AppointmentService::new(store, policy),
    };

    let bind_addr = (config.app.host.clone(), config.app.port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
