// src/main.rs

use dotenvy::dotenv;
use lms_backend::config::{Config, SeedAccount};
use lms_backend::db;
use lms_backend::models::user::Role;
use lms_backend::routes;
use lms_backend::state::AppState;
use lms_backend::store::{self, users::NewUser};
use lms_backend::utils::hash::hash_password;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let connect_options =
        db::connect_options(&config.database_url).expect("DATABASE_URL must be a valid SQLite URL");

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(connect_options.clone())
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to open database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Seed Instructor Account
    if let Some(seed) = &config.seed_instructor {
        if let Err(e) = seed_instructor(&pool, seed).await {
            tracing::error!("Failed to seed instructor: {:?}", e);
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Create the Axum application router
    let app = routes::create_router(AppState::new(pool, config));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

/// Inserts the configured instructor with a real Argon2 hash, once.
async fn seed_instructor(
    pool: &SqlitePool,
    seed: &SeedAccount,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = pool.acquire().await?;

    if store::users::find_by_email(&mut conn, &seed.email).await?.is_none() {
        tracing::info!("Seeding instructor: {}", seed.email);
        let hashed_password = hash_password(&seed.password)?;

        store::users::insert(
            &mut conn,
            NewUser {
                name: &seed.name,
                email: &seed.email,
                password_hash: &hashed_password,
                role: Role::Instructor,
                avatar: None,
            },
        )
        .await?;
        tracing::info!("Instructor created successfully.");
    }
    Ok(())
}
