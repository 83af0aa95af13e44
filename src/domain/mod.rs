//! Storage-agnostic domain types.
//!
//! - [`stock`], [`exchange`], [`listing`] - the catalog and its listing relation
//! - [`user`] - accounts, authorities, registration and login requests
//! - [`page`] - pagination and sort keys
//! - [`id`] - identifier newtypes
//! - [`error`] - validation errors raised by `try_new` constructors

pub mod error;
pub mod exchange;
pub mod id;
pub mod listing;
pub mod page;
pub mod stock;
pub mod user;
