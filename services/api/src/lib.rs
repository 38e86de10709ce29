//! Veloce1600 inventory API
//!
//! CRUD over cars, owners, sales and users, backed either by PostgreSQL or by
//! an in-memory store. The binary in `main.rs` wires [`config::Settings`],
//! [`state::AppState`] and [`routes::create_router`] together.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod serializers;
pub mod state;
pub mod validation;

pub use state::AppState;
