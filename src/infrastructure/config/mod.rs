//! Infrastructure configuration modules.

pub mod auth;
pub mod database;
pub mod logging;
pub mod settings;
