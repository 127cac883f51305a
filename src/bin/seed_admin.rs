//! Creates the first SuperAdmin account.
//!
//! Run with: cargo run --bin seed-admin -- --username admin --email admin@example.com

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use repairshop_api::{
    config, db,
    entities::user::UserRole,
    services::users::{CreateUserInput, UserService},
};

#[derive(Parser, Debug)]
#[command(name = "seed-admin", about = "Create a SuperAdmin account")]
struct Cli {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    /// Read from the environment so it does not end up in shell history
    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    full_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        db::run_migrations(&pool).await?;
    }
    let db_arc = Arc::new(pool);
    let users = UserService::new(db_arc.clone());

    let admins = users.repository().find_active_admins().await?;
    if admins.iter().any(|admin| admin.role == UserRole::SuperAdmin) {
        warn!("An active SuperAdmin already exists; creating another one");
    }

    let admin = users
        .create_user(CreateUserInput {
            username: cli.username,
            email: cli.email,
            password: cli.password,
            role: UserRole::SuperAdmin,
            full_name: cli.full_name,
            phone: None,
        })
        .await?;

    info!(user_id = admin.id, username = %admin.username, "SuperAdmin created");
    Ok(())
}
