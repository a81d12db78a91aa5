use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use credential_service::config::Config;
use credential_service::credential::ports::CredentialServicePort;
use credential_service::credential::service::CredentialService;
use credential_service::inbound::http::router::create_router;
use credential_service::mail::HttpMailer;
use credential_service::repositories::PostgresResetRecordRepository;
use credential_service::repositories::PostgresSubjectRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_minutes = config.jwt.access_token_minutes,
        refresh_token_days = config.jwt.refresh_token_days,
        reset_ttl_minutes = config.reset.ttl_minutes,
        mail_relay = %config.mail.base_url,
        "Configuration loaded"
    );

    // Misconfigured secrets or cost parameters abort startup.
    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let token_codec = TokenCodec::new(config.jwt.secret.as_bytes(), config.token_lifetimes()?)?;
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_codec));

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let subject_repository = Arc::new(PostgresSubjectRepository::new(pg_pool.clone()));
    let reset_repository = Arc::new(PostgresResetRecordRepository::new(pg_pool));
    let mailer = Arc::new(HttpMailer::new(&config.mail)?);

    let credential_service: Arc<dyn CredentialServicePort> = Arc::new(CredentialService::new(
        subject_repository,
        reset_repository,
        mailer,
        authenticator,
        config.reset_settings()?,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(credential_service)).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
