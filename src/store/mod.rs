// src/store/mod.rs

//! Persistence for the identity, catalog and progress stores.
//!
//! Every function takes `&mut SqliteConnection`, so callers can pass either a
//! pooled connection or an open transaction.

pub mod courses;
pub mod paths;
pub mod progress;
pub mod users;
