//! Job posting lifecycle and report moderation for a listings platform.
//!
//! The [`moderation`] module holds the status machine, the report ledger and the
//! read-only aggregator that feeds the administrator dashboard. Storage, identity and
//! notification delivery are collaborators supplied by the embedding service.

pub mod config;
pub mod error;
pub mod moderation;
pub mod telemetry;
