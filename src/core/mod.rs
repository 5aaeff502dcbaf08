//! Core business logic module - Framework-agnostic store operations.
//!
//! Everything in here takes a database connection and returns plain data, so
//! the same functions serve the bot, the dashboard, and the tests. No module
//! in `core` knows about Telegram or HTTP.

pub mod activity;
pub mod catalog;
pub mod identity;
pub mod inventory;
pub mod order;
pub mod report;
pub mod users;
