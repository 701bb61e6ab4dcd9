//! Pastebox server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod config;
pub mod crypto;
pub mod error;
pub mod paste;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
