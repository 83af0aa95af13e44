//! CLI module graph.

pub mod auth;
pub mod command;
pub mod exchange;
pub mod listing;
pub mod output;
pub mod run;
pub mod stock;
