//! Property-management work orders on a single table.
//!
//! [`domain`] declares the entities and their keys, [`patterns`] every
//! read they support, [`service`] the operations and [`api`] the HTTP
//! boundary.

pub mod api;
pub mod config;
pub mod domain;
pub mod patterns;
pub mod service;

pub use config::{Config, StoreBackend};
pub use service::Service;
