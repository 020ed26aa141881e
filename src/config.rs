// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub port: u16,
    pub log_dir: String,
    /// Origins allowed by the CORS layer (the single-page client).
    pub cors_origins: Vec<String>,
    /// Optional instructor account provisioned at startup.
    pub seed_instructor: Option<SeedAccount>,
}

/// Credentials for an account inserted by the startup seeding step.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let seed_instructor = match (
            env::var("SEED_INSTRUCTOR_EMAIL"),
            env::var("SEED_INSTRUCTOR_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SeedAccount {
                name: env::var("SEED_INSTRUCTOR_NAME").unwrap_or_else(|_| "Instructor".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Self {
            database_url,
            rust_log,
            port,
            log_dir,
            cors_origins,
            seed_instructor,
        }
    }
}
