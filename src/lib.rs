//! Administrative web interface for user records kept by a REST backend.

pub mod api;
pub mod config;
pub mod form;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod templates;
pub mod utils;
pub mod validation;
