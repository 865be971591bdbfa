//! Library exports for salondesk, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod guard;
pub mod metrics;
pub mod models;
pub mod profile;
pub mod roster;
pub mod routes;
pub mod session_store;
pub mod startup;
pub mod state;
pub mod storage;
pub mod store;
pub mod subscription;
pub mod utils;
pub mod views;
