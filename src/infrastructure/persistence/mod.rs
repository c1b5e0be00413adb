//! Persistence adapters. `sqlite` holds the one implementation of every
//! domain repository trait backed by the `sqlx` SQLite pool.

pub mod sqlite;
