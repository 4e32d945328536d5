//! Longbox Storefront library.
//!
//! This crate provides the catalog API as a library, allowing it to be tested
//! against an in-memory store and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
