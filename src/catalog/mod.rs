//! Token catalog domain models and repository
//!
//! This module contains the catalogued token and its blockchain-platform
//! addresses, the drafts and patches used for create/update operations, and
//! the `TokenRepository` storage seam. The bundled implementation is the
//! in-memory [`MemoryCatalog`]; a relational store can replace it without
//! touching callers.

pub mod memory;

pub use memory::{ImportSummary, MemoryCatalog};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A blockchain platform on which a token is deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAddress {
    /// Platform name, e.g. `ethereum`
    pub platform: String,
    /// Contract address of the token on that platform
    pub address: String,
}

/// A catalogued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Catalog-assigned identifier
    pub id: u64,
    /// Ticker symbol; unique within the catalog (case-insensitive)
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Logo image URL, if known
    pub logo_url: Option<String>,
    /// Platform addresses where the token is deployed
    pub platforms: Vec<PlatformAddress>,
    /// When this record was created or last modified
    pub last_updated: DateTime<Utc>,
}

/// Fields required to create a token
#[derive(Debug, Clone, Default)]
pub struct TokenDraft {
    /// Ticker symbol (required, unique)
    pub symbol: String,
    /// Display name (required)
    pub name: String,
    /// Logo image URL
    pub logo_url: Option<String>,
    /// Platform addresses
    pub platforms: Vec<PlatformAddress>,
}

/// Partial update for an existing token
///
/// `None` fields are left untouched. `logo_url` is doubly optional so a
/// patch can distinguish "leave as is" (`None`) from "clear the logo"
/// (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct TokenPatch {
    /// New ticker symbol
    pub symbol: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New logo URL, or `Some(None)` to clear it
    pub logo_url: Option<Option<String>>,
    /// Replacement platform addresses
    pub platforms: Option<Vec<PlatformAddress>>,
}

/// Errors raised by catalog operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A token with the same symbol already exists
    #[error("a token with symbol '{0}' already exists")]
    DuplicateSymbol(String),

    /// No token carries the given id
    #[error("no token with id {0}")]
    NotFound(u64),

    /// A required field was empty
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Storage seam for the token catalog
pub trait TokenRepository {
    /// All tokens ordered by symbol (case-insensitive)
    fn list(&self) -> Vec<&Token>;

    /// Looks up a token by id
    fn get(&self, id: u64) -> Option<&Token>;

    /// Looks up a token by symbol (case-insensitive)
    fn find_by_symbol(&self, symbol: &str) -> Option<&Token>;

    /// Tokens whose name contains `query` (case-insensitive), ordered like
    /// [`list`](Self::list)
    fn search(&self, query: &str) -> Vec<&Token>;

    /// Adds a token, returning its assigned id
    fn insert(&mut self, draft: TokenDraft) -> Result<u64, CatalogError>;

    /// Applies a partial update to the token with `id`
    fn update(&mut self, id: u64, patch: TokenPatch) -> Result<(), CatalogError>;

    /// Removes and returns the token with `id`
    fn remove(&mut self, id: u64) -> Result<Token, CatalogError>;

    /// Number of catalogued tokens
    fn len(&self) -> usize;

    /// Whether the catalog is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_serialization_roundtrip() {
        let token = Token {
            id: 1,
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            logo_url: Some("https://example.com/btc.png".to_string()),
            platforms: vec![PlatformAddress {
                platform: "ethereum".to_string(),
                address: "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599".to_string(),
            }],
            last_updated: Utc::now(),
        };

        let json = serde_json::to_string(&token).expect("Failed to serialize Token");
        let deserialized: Token = serde_json::from_str(&json).expect("Failed to deserialize Token");

        assert_eq!(deserialized.id, 1);
        assert_eq!(deserialized.symbol, "BTC");
        assert_eq!(deserialized.name, "Bitcoin");
        assert_eq!(deserialized.platforms, token.platforms);
    }

    #[test]
    fn test_catalog_error_messages_name_the_subject() {
        assert_eq!(
            CatalogError::DuplicateSymbol("btc".to_string()).to_string(),
            "a token with symbol 'btc' already exists"
        );
        assert_eq!(CatalogError::NotFound(7).to_string(), "no token with id 7");
        assert_eq!(
            CatalogError::EmptyField("symbol").to_string(),
            "symbol must not be empty"
        );
    }
}
