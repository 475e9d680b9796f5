//! Bookmark lists: bookmark categories of a map application.
//!
//! A SQLite-backed category store, the section/row presentation model of
//! the lists screen, and a JSON-RPC surface for hosting it from a UI shell.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod presentation;
pub mod rpc_handler;
pub mod services;
pub mod types;
