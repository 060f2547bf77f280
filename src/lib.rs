//! Weekly training program, workout logging and progress metrics.
//!
//! The pure core ([`metrics`], [`history`], [`program`], [`session`],
//! [`views`]) works on already-loaded data. Storage sits behind
//! [`repository::Repository`], implemented over SQLite in [`db`].

pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod metrics;
pub mod models;
pub mod program;
pub mod repository;
pub mod session;
pub mod storage;
pub mod types;
pub mod views;
