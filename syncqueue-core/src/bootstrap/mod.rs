//! Bootstrap module for starting SyncQueue
//!
//! This module handles:
//! - Configuration loading
//! - Database initialization
//! - Room store selection and service wiring

pub mod config;
pub mod database;
pub mod services;

pub use config::load_config;
pub use database::init_database;
pub use services::{init_services, Services};
