//! Application state management for Qrypt
//!
//! This module contains the main application state, handling keyboard input,
//! catalog CRUD flows, the CoinGecko sync, and state transitions between the
//! list, detail, and form views.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;
use tracing::warn;

use crate::catalog::{
    MemoryCatalog, PlatformAddress, Token, TokenDraft, TokenPatch, TokenRepository,
};
use crate::cli::StartupConfig;
use crate::config::CoinGeckoConfig;
use crate::market::{CoinGeckoAdapter, MarketSnapshot};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial state while the startup sync is running
    Loading,
    /// List view showing the catalogued tokens
    TokenList,
    /// Detail view for a single token
    TokenDetail(u64),
    /// Add or edit form
    TokenForm(FormMode),
}

/// Whether the token form creates a new token or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

/// Transient message shown in the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// Which form field currently has focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Symbol,
    Name,
    LogoUrl,
    PlatformName,
    PlatformAddress,
}

impl FormField {
    /// Focus order used by Tab
    const ORDER: [FormField; 5] = [
        FormField::Symbol,
        FormField::Name,
        FormField::LogoUrl,
        FormField::PlatformName,
        FormField::PlatformAddress,
    ];

    fn next(self) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(index + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(index + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Editable buffer backing the token form
///
/// The form edits the first platform address directly; any further platform
/// entries of an edited token are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenForm {
    pub symbol: String,
    pub name: String,
    pub logo_url: String,
    pub platform_name: String,
    pub platform_address: String,
    pub focus: FormField,
    /// Platform entries beyond the first, preserved across an edit
    rest_platforms: Vec<PlatformAddress>,
}

impl TokenForm {
    /// Pre-fills the form from an existing token
    pub fn from_token(token: &Token) -> Self {
        let (first, rest) = match token.platforms.split_first() {
            Some((first, rest)) => (Some(first), rest.to_vec()),
            None => (None, Vec::new()),
        };
        Self {
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            logo_url: token.logo_url.clone().unwrap_or_default(),
            platform_name: first.map(|p| p.platform.clone()).unwrap_or_default(),
            platform_address: first.map(|p| p.address.clone()).unwrap_or_default(),
            focus: FormField::default(),
            rest_platforms: rest,
        }
    }

    /// Builds the create draft from the current buffer
    pub fn draft(&self) -> TokenDraft {
        TokenDraft {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            logo_url: blank_to_none(&self.logo_url),
            platforms: self.platforms(),
        }
    }

    /// Builds the update patch from the current buffer
    pub fn patch(&self) -> TokenPatch {
        TokenPatch {
            symbol: Some(self.symbol.clone()),
            name: Some(self.name.clone()),
            logo_url: Some(blank_to_none(&self.logo_url)),
            platforms: Some(self.platforms()),
        }
    }

    fn platforms(&self) -> Vec<PlatformAddress> {
        let mut platforms = Vec::new();
        if !self.platform_name.trim().is_empty() && !self.platform_address.trim().is_empty() {
            platforms.push(PlatformAddress {
                platform: self.platform_name.trim().to_string(),
                address: self.platform_address.trim().to_string(),
            });
        }
        platforms.extend(self.rest_platforms.iter().cloned());
        platforms
    }

    /// Appends a character to the focused field
    pub fn insert_char(&mut self, c: char) {
        self.focused_field_mut().push(c);
    }

    /// Removes the last character of the focused field
    pub fn backspace(&mut self) {
        self.focused_field_mut().pop();
    }

    fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Symbol => &mut self.symbol,
            FormField::Name => &mut self.name,
            FormField::LogoUrl => &mut self.logo_url,
            FormField::PlatformName => &mut self.platform_name,
            FormField::PlatformAddress => &mut self.platform_address,
        }
    }
}

/// `None` for blank input, `Some(trimmed)` otherwise
fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of the currently selected token within the visible list
    pub selected_index: usize,
    /// First visible row in the list view (maintained by the renderer)
    pub list_offset: usize,
    /// Active name filter; empty means no filter
    pub search_query: String,
    /// Whether keystrokes currently edit the search filter
    pub search_active: bool,
    /// Token id awaiting delete confirmation
    pub confirm_delete: Option<u64>,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Transient status line content
    pub status: Option<StatusMessage>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a CoinGecko sync has been requested
    pub sync_requested: bool,
    /// Timestamp of the last completed sync
    pub last_sync: Option<DateTime<Local>>,
    /// Latest market snapshots keyed by lowercase symbol
    pub market_data: HashMap<String, MarketSnapshot>,
    /// The token catalog
    pub catalog: MemoryCatalog,
    /// Comparison currency used for market data display
    pub vs_currency: String,
    /// Buffer backing the token form
    pub form: TokenForm,
    /// CoinGecko client; absent in offline mode
    adapter: Option<CoinGeckoAdapter>,
}

impl App {
    /// Creates a new App instance from the adapter configuration
    ///
    /// Starts in `Loading` when a startup sync will run, otherwise directly
    /// in the list view.
    pub fn new(config: CoinGeckoConfig, startup: &StartupConfig) -> Self {
        let adapter = if startup.offline {
            None
        } else {
            Some(CoinGeckoAdapter::new(&config))
        };
        Self {
            state: if startup.offline {
                AppState::TokenList
            } else {
                AppState::Loading
            },
            selected_index: 0,
            list_offset: 0,
            search_query: String::new(),
            search_active: false,
            confirm_delete: None,
            show_help: false,
            status: None,
            should_quit: false,
            sync_requested: false,
            last_sync: None,
            market_data: HashMap::new(),
            catalog: MemoryCatalog::new(),
            vs_currency: config.vs_currency,
            form: TokenForm::default(),
            adapter,
        }
    }

    /// Creates an offline App instance without an adapter (for testing)
    #[cfg(test)]
    pub fn offline() -> Self {
        Self {
            state: AppState::TokenList,
            selected_index: 0,
            list_offset: 0,
            search_query: String::new(),
            search_active: false,
            confirm_delete: None,
            show_help: false,
            status: None,
            should_quit: false,
            sync_requested: false,
            last_sync: None,
            market_data: HashMap::new(),
            catalog: MemoryCatalog::new(),
            vs_currency: "usd".to_string(),
            form: TokenForm::default(),
            adapter: None,
        }
    }

    /// Tokens currently visible in the list view, filter applied
    pub fn visible_tokens(&self) -> Vec<&Token> {
        if self.search_query.is_empty() {
            self.catalog.list()
        } else {
            self.catalog.search(&self.search_query)
        }
    }

    /// Returns the currently selected token, if any
    pub fn selected_token(&self) -> Option<&Token> {
        self.visible_tokens().get(self.selected_index).copied()
    }

    /// Market snapshot for a token, matched by symbol
    pub fn snapshot_for(&self, token: &Token) -> Option<&MarketSnapshot> {
        self.market_data.get(&token.symbol.to_lowercase())
    }

    /// Pulls listings and market data from CoinGecko and imports them
    ///
    /// Listings are mandatory for the import; market data only enriches it,
    /// so a market-data failure degrades to an import without prices.
    pub async fn sync_catalog(&mut self) {
        let Some(adapter) = &self.adapter else {
            self.status = Some(StatusMessage::Error(
                "Offline mode: sync is disabled".to_string(),
            ));
            self.finish_loading();
            return;
        };

        let (listings, snapshots) = futures::future::join(
            adapter.fetch_coins_list(),
            adapter.fetch_coins_markets(),
        )
        .await;

        match listings {
            Ok(listings) => {
                let snapshots = match snapshots {
                    Ok(snapshots) => snapshots,
                    Err(err) => {
                        warn!(%err, "market data unavailable; importing listings without prices");
                        Vec::new()
                    }
                };
                let summary = self.catalog.import_listings(&listings, &snapshots);
                self.market_data = snapshots
                    .into_iter()
                    .map(|snapshot| (snapshot.symbol.to_lowercase(), snapshot))
                    .collect();
                self.last_sync = Some(Local::now());
                self.status = Some(StatusMessage::Info(format!(
                    "Imported {} tokens from CoinGecko ({} skipped)",
                    summary.added, summary.skipped
                )));
            }
            Err(err) => {
                self.status = Some(StatusMessage::Error(format!("Sync failed: {err}")));
            }
        }

        self.finish_loading();
        self.clamp_selection();
    }

    /// Leaves the loading state once the startup sync has finished
    fn finish_loading(&mut self) {
        if self.state == AppState::Loading {
            self.state = AppState::TokenList;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (list view; in the form it types the letter)
    /// - `Up`/`k`, `Down`/`j`: Move selection in list view
    /// - `Enter`: Open token detail
    /// - `a`: Add a token, `e`: Edit, `d` then `y`: Delete
    /// - `/`: Filter by name, `s`: Sync with CoinGecko
    /// - `?`: Toggle help, `Esc`: Go back / close / clear filter
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys while shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Pending delete confirmation intercepts all keys
        if let Some(id) = self.confirm_delete {
            self.confirm_delete = None;
            if matches!(key_event.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.delete_token(id);
            }
            return;
        }

        if self.search_active {
            self.handle_search_key(key_event);
            return;
        }

        match self.state.clone() {
            AppState::Loading => {
                // Only quit is allowed while the startup sync runs
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::TokenList => self.handle_list_key(key_event),
            AppState::TokenDetail(id) => self.handle_detail_key(id, key_event),
            AppState::TokenForm(mode) => self.handle_form_key(mode, key_event),
        }
    }

    /// Keys while the search filter is being edited
    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                self.search_active = false;
                self.search_query.clear();
                self.selected_index = 0;
            }
            KeyCode::Enter => {
                self.search_active = false;
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.selected_index = 0;
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.selected_index = 0;
            }
            _ => {}
        }
    }

    /// Keys in the token list view
    fn handle_list_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.search_query.is_empty() {
                    self.should_quit = true;
                } else {
                    self.search_query.clear();
                    self.selected_index = 0;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            KeyCode::Enter => {
                if let Some(token) = self.selected_token() {
                    self.state = AppState::TokenDetail(token.id);
                }
            }
            KeyCode::Char('a') => {
                self.form = TokenForm::default();
                self.state = AppState::TokenForm(FormMode::Create);
            }
            KeyCode::Char('e') => {
                if let Some(token) = self.selected_token() {
                    let id = token.id;
                    self.form = TokenForm::from_token(token);
                    self.state = AppState::TokenForm(FormMode::Edit(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(token) = self.selected_token() {
                    self.confirm_delete = Some(token.id);
                }
            }
            KeyCode::Char('/') => {
                self.search_active = true;
            }
            KeyCode::Char('s') => {
                self.sync_requested = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Keys in the token detail view
    fn handle_detail_key(&mut self, id: u64, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('h') => {
                self.state = AppState::TokenList;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('e') => {
                if let Some(token) = self.catalog.get(id) {
                    self.form = TokenForm::from_token(token);
                    self.state = AppState::TokenForm(FormMode::Edit(id));
                }
            }
            KeyCode::Char('d') => {
                self.confirm_delete = Some(id);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Keys in the token form; printable characters go into the focused field
    fn handle_form_key(&mut self, mode: FormMode, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => {
                self.state = match mode {
                    FormMode::Create => AppState::TokenList,
                    FormMode::Edit(id) => AppState::TokenDetail(id),
                };
            }
            KeyCode::Tab => {
                self.form.focus = self.form.focus.next();
            }
            KeyCode::BackTab => {
                self.form.focus = self.form.focus.prev();
            }
            KeyCode::Enter => self.submit_form(mode),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) => self.form.insert_char(c),
            _ => {}
        }
    }

    /// Persists the form buffer into the catalog
    fn submit_form(&mut self, mode: FormMode) {
        match mode {
            FormMode::Create => match self.catalog.insert(self.form.draft()) {
                Ok(_) => {
                    self.status = Some(StatusMessage::Info(format!(
                        "Added {}",
                        self.form.symbol.trim()
                    )));
                    self.state = AppState::TokenList;
                    self.clamp_selection();
                }
                Err(err) => {
                    self.status = Some(StatusMessage::Error(err.to_string()));
                }
            },
            FormMode::Edit(id) => match self.catalog.update(id, self.form.patch()) {
                Ok(()) => {
                    self.status = Some(StatusMessage::Info(format!(
                        "Updated {}",
                        self.form.symbol.trim()
                    )));
                    self.state = AppState::TokenDetail(id);
                }
                Err(err) => {
                    self.status = Some(StatusMessage::Error(err.to_string()));
                }
            },
        }
    }

    /// Removes a token after confirmation
    fn delete_token(&mut self, id: u64) {
        match self.catalog.remove(id) {
            Ok(token) => {
                self.status = Some(StatusMessage::Info(format!("Deleted {}", token.symbol)));
                if self.state == AppState::TokenDetail(id) {
                    self.state = AppState::TokenList;
                }
                self.clamp_selection();
            }
            Err(err) => {
                self.status = Some(StatusMessage::Error(err.to_string()));
            }
        }
    }

    /// Moves the list selection up by one
    fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Moves the list selection down by one
    fn move_selection_down(&mut self) {
        let count = self.visible_tokens().len();
        if count > 0 && self.selected_index < count - 1 {
            self.selected_index += 1;
        }
    }

    /// Keeps the selection within the visible list after mutations
    fn clamp_selection(&mut self) {
        let count = self.visible_tokens().len();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }
}
