//! Pinpad TUI Library
//!
//! Terminal host for the pinpad overlay: file-backed PIN storage, SHA-256
//! hashing, a simulated biometric sensor and ratatui screens for every
//! overlay mode.

pub mod app;
pub mod auth;
pub mod cli;
pub mod ui;

pub use app::App;
