//! UI rendering module for Qrypt
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod help_overlay;
pub mod token_detail;
pub mod token_form;
pub mod token_list;

pub use help_overlay::render as render_help_overlay;
pub use token_detail::render as render_token_detail;
pub use token_form::render as render_token_form;
pub use token_list::render as render_token_list;
