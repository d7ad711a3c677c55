//! Creates an ADMIN superuser account.

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::error;
use tracing_subscriber::EnvFilter;

use foodbank::database::{self, schema};
use foodbank::services::password_service::Argon2Hasher;
use foodbank::services::superuser_service;

#[derive(Parser, Debug)]
#[command(name = "create_superuser")]
#[command(about = "Creates a superuser account", long_about = None)]
struct Args {
    /// Email address, used as the login identifier
    #[arg(long, value_name = "EMAIL")]
    email: String,

    /// Password; without one the account cannot log in
    #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Role discriminator; defaults to ADMIN, any other value is rejected
    #[arg(long, value_name = "USER_TYPE")]
    user_type: Option<String>,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://foodbank.db")]
    database: String,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let pool = match database::connect(&args.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("could not open {}: {}", args.database, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = schema::migrate(&pool).await {
        error!("schema setup failed: {}", e);
        std::process::exit(1);
    }

    match superuser_service::create_superuser(
        &pool,
        Arc::new(Argon2Hasher::new()),
        &args.email,
        args.password.as_deref(),
        args.user_type.as_deref(),
    )
    .await
    {
        Ok(user) => println!("Superuser created: {} (id {})", user.email, user.id),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
