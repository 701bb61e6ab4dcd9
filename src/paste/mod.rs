//! Paste lifecycle: creation, retrieval, and the access-control decision.

pub mod handlers;
pub mod id;
pub mod model;
