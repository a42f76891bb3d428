//! SQLite backend for the reconciliation engine.
//!
//! A single database file holds both the reconciled payment records and the transfer request cache.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
