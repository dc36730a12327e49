//! Folio Books storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused:
//!
//! - [`db`] - Storage traits with `PostgreSQL` and in-memory stores
//! - [`services`] - Catalog and review accessors and the cart merge engine
//! - [`routes`] - JSON API, HTML pages, and [`routes::build_router`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
