//! Workboard: a single-user release and feature-area work tracker.
//!
//! - [`import`] turns a CSV board export into a [`models::Document`].
//! - [`board`] edits one release, feature area or task at a time.
//! - [`view`] filters, sorts and groups tasks for display.
//! - [`client`] loads and saves the document through the HTTP store served by
//!   [`api`], which persists it with [`store`].

pub mod api;
pub mod board;
pub mod client;
pub mod color;
pub mod config;
pub mod dates;
pub mod import;
pub mod models;
pub mod store;
pub mod view;
