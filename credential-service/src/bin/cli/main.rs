//! Operator commands for the credential service.
//!
//! Superusers cannot register over HTTP; they are created here, against the
//! same database and configuration the server uses.

use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::TokenCodec;
use clap::Parser;
use clap::Subcommand;
use credential_service::config::Config;
use credential_service::credential::provisioning::SubjectProvisioner;
use credential_service::repositories::PostgresSubjectRepository;
use credential_service::subject::models::EmailAddress;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Credential service operator tool
#[derive(Parser)]
#[command(name = "credential-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an active subject
    CreateSubject {
        /// Login email address
        #[arg(long)]
        email: String,

        /// Plaintext password, hashed before it is stored
        #[arg(long)]
        password: String,

        /// Grant elevated privileges
        #[arg(long)]
        superuser: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::CreateSubject {
            email,
            password,
            superuser,
        } => create_subject(&config, email, &password, superuser).await,
    }
}

async fn create_subject(
    config: &Config,
    email: String,
    password: &str,
    superuser: bool,
) -> Result<(), anyhow::Error> {
    let email = EmailAddress::new(email)?;

    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let token_codec = TokenCodec::new(config.jwt.secret.as_bytes(), config.token_lifetimes()?)?;
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_codec));

    let pg_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    let provisioner = SubjectProvisioner::new(
        Arc::new(PostgresSubjectRepository::new(pg_pool)),
        authenticator,
    );
    let subject = provisioner.create(email, password, superuser).await?;

    if subject.is_superuser {
        println!("Superuser {} created with id {}", subject.email, subject.id);
    } else {
        println!("Subject {} created with id {}", subject.email, subject.id);
    }
    Ok(())
}
