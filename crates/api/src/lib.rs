//! Storekeep API library.
//!
//! This crate provides the API service as a library, allowing it to be
//! tested in-process and driven by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use routes::app;
