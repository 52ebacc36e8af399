//! Room coordination core: membership, a shared track queue and the
//! now-playing pointer, kept consistent under concurrent writers by
//! optimistic compare-and-swap saves.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use config::Config;
pub use error::{Error, Result};
