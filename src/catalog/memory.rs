//! In-memory token repository
//!
//! The placeholder store behind [`TokenRepository`]: a plain vector with
//! catalog-assigned ids. Also hosts the listing import used by the
//! CoinGecko sync.

use chrono::Utc;
use tracing::info;

use crate::market::{CoinListing, MarketSnapshot};

use super::{CatalogError, PlatformAddress, Token, TokenDraft, TokenPatch, TokenRepository};

/// Outcome of a listing import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Tokens newly added to the catalog
    pub added: usize,
    /// Listings skipped because their symbol was already catalogued or the
    /// listing was unusable
    pub skipped: usize,
}

/// In-memory implementation of [`TokenRepository`]
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tokens: Vec<Token>,
    next_id: u64,
}

impl MemoryCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports fetched listings, skipping symbols already catalogued
    ///
    /// Platform entries without an address are dropped. When a market
    /// snapshot matches a listing's coin id, its image URL becomes the
    /// token's logo.
    pub fn import_listings(
        &mut self,
        listings: &[CoinListing],
        snapshots: &[MarketSnapshot],
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for listing in listings {
            if self.find_by_symbol(&listing.symbol).is_some() {
                summary.skipped += 1;
                continue;
            }

            let logo_url = snapshots
                .iter()
                .find(|snapshot| snapshot.id == listing.id)
                .and_then(|snapshot| snapshot.image.clone());

            let platforms = listing
                .platforms
                .iter()
                .filter_map(|(platform, address)| {
                    address
                        .as_ref()
                        .filter(|address| !address.is_empty())
                        .map(|address| PlatformAddress {
                            platform: platform.clone(),
                            address: address.clone(),
                        })
                })
                .collect();

            let draft = TokenDraft {
                symbol: listing.symbol.clone(),
                name: listing.name.clone(),
                logo_url,
                platforms,
            };
            match self.insert(draft) {
                Ok(_) => summary.added += 1,
                Err(_) => summary.skipped += 1,
            }
        }

        info!(
            added = summary.added,
            skipped = summary.skipped,
            "imported token listings"
        );
        summary
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tokens.iter().position(|token| token.id == id)
    }
}

impl TokenRepository for MemoryCatalog {
    fn list(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.tokens.iter().collect();
        tokens.sort_by_key(|token| token.symbol.to_lowercase());
        tokens
    }

    fn get(&self, id: u64) -> Option<&Token> {
        self.position(id).map(|index| &self.tokens[index])
    }

    fn find_by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }

    fn search(&self, query: &str) -> Vec<&Token> {
        let needle = query.to_lowercase();
        let mut tokens: Vec<&Token> = self
            .tokens
            .iter()
            .filter(|token| token.name.to_lowercase().contains(&needle))
            .collect();
        tokens.sort_by_key(|token| token.symbol.to_lowercase());
        tokens
    }

    fn insert(&mut self, draft: TokenDraft) -> Result<u64, CatalogError> {
        let symbol = draft.symbol.trim().to_string();
        let name = draft.name.trim().to_string();
        if symbol.is_empty() {
            return Err(CatalogError::EmptyField("symbol"));
        }
        if name.is_empty() {
            return Err(CatalogError::EmptyField("name"));
        }
        if self.find_by_symbol(&symbol).is_some() {
            return Err(CatalogError::DuplicateSymbol(symbol));
        }

        self.next_id += 1;
        let id = self.next_id;
        self.tokens.push(Token {
            id,
            symbol,
            name,
            logo_url: draft.logo_url,
            platforms: draft.platforms,
            last_updated: Utc::now(),
        });
        Ok(id)
    }

    fn update(&mut self, id: u64, patch: TokenPatch) -> Result<(), CatalogError> {
        let index = self.position(id).ok_or(CatalogError::NotFound(id))?;

        if let Some(symbol) = &patch.symbol {
            let symbol = symbol.trim();
            if symbol.is_empty() {
                return Err(CatalogError::EmptyField("symbol"));
            }
            // Changing the symbol must not collide with another token
            if let Some(existing) = self.find_by_symbol(symbol) {
                if existing.id != id {
                    return Err(CatalogError::DuplicateSymbol(symbol.to_string()));
                }
            }
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyField("name"));
            }
        }

        let token = &mut self.tokens[index];
        if let Some(symbol) = patch.symbol {
            token.symbol = symbol.trim().to_string();
        }
        if let Some(name) = patch.name {
            token.name = name.trim().to_string();
        }
        if let Some(logo_url) = patch.logo_url {
            token.logo_url = logo_url;
        }
        if let Some(platforms) = patch.platforms {
            token.platforms = platforms;
        }
        token.last_updated = Utc::now();
        Ok(())
    }

    fn remove(&mut self, id: u64) -> Result<Token, CatalogError> {
        let index = self.position(id).ok_or(CatalogError::NotFound(id))?;
        Ok(self.tokens.remove(index))
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}
