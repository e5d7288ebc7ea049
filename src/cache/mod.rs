//! Cache module for persisting API payloads to disk
//!
//! This module provides a whole-file JSON cache store shared by all market
//! endpoints. Each entry records the last fetched payload together with its
//! creation time, so callers can decide whether an entry is still fresh.
//! Corrupt entries degrade to cache misses rather than errors.

mod store;

pub use store::{CacheEntry, CacheError, CacheStore};
