// src/handlers/mod.rs

pub mod courses;
pub mod paths;
pub mod progress;
pub mod users;
