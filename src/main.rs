use dotenvy::dotenv;
use terraloom_core::{
    config::{auth::AuthConfig, catalog, database},
    core::product,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Token settings are required by the account surface
    let auth = AuthConfig::from_env()
        .inspect_err(|e| error!("Failed to load auth configuration: {}", e))?;
    info!("Auth configuration loaded: {:?}", auth);

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the catalog, if one is configured
    match catalog::load_default_catalog() {
        Ok(config) => {
            let created = product::seed_catalog(&db, &config)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
            info!("Catalog seeded: {} new product(s).", created);
        }
        Err(e) => warn!("No catalog seeded: {}", e),
    }

    info!("Terraloom store ready.");
    Ok(())
}
