use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    plan_sync::{
        AppState,
        domain::{clock::SystemClock, signature::SignatureVerifier},
        infra::postgres::{
            claims_repo::PgClaimsPropagator, entitlement_store::PgEntitlementStore,
            identity_repo::PgIdentityProvider,
        },
        services::activation_pipeline::ActivationPipeline,
    },
    sqlx::postgres::PgPoolOptions,
    std::{env, sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let webhook_secret =
        env::var("GATEWAY_WEBHOOK_SECRET").expect("GATEWAY_WEBHOOK_SECRET must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    let pipeline = ActivationPipeline::new(
        Arc::new(PgEntitlementStore::new(pool.clone())),
        Arc::new(PgIdentityProvider::new(pool.clone())),
        Arc::new(PgClaimsPropagator::new(pool)),
        Arc::new(SystemClock),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        verifier: Arc::new(SignatureVerifier::new(webhook_secret)),
    };

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/webhook",
            post(plan_sync::adapters::webhook::gateway_webhook_handler),
        )
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB — gateway events are typically <20 KB
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("listening on 0.0.0.0:3000");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
