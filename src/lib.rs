//! internscout - internship posting acquisition and tracking system.
//!
//! Discovers job postings through a third-party dataset API, normalizes
//! them into one canonical schema, filters them for relevance,
//! deduplicates them against prior storage, and keeps them in a local
//! SQLite table for browsing and application tracking.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod repository;
pub mod sources;
