//! TourSync: property-tour scheduling backend.
//!
//! The core of the crate is [`scheduling`], a pure and deterministic slot
//! validator parameterized by [`scheduling::SchedulingPolicy`]. Around it sit
//! typed domain models, a repository layer with in-memory and Postgres
//! backends, and an axum REST API (feature `http-server`).
//!
//! Feature flags:
//! - `local-repo` (default): in-memory repository for development and tests.
//! - `postgres-repo`: diesel/r2d2 Postgres repository with embedded
//!   migrations.
//! - `http-server` (default): axum REST layer and the `toursync-server`
//!   binary.

pub mod config;
pub mod db;
pub mod models;
pub mod scheduling;

#[cfg(feature = "http-server")]
pub mod http;
