//! # Gemlet
//!
//! An interactive, line-oriented terminal client for the Gemini protocol.
//!
//! ## Architecture
//!
//! Every page transition runs through the same pipeline:
//!
//! ```text
//! prompt → resolver → nav (fetcher) → render → pager → prompt
//! ```
//!
//! - [`resolver`]: turns typed or linked references into absolute URLs
//! - [`nav`]: follows input prompts and redirects until a page renders
//! - [`fetcher`]: one request and one response over TLS
//! - [`render`]: gemtext to styled, wrapped lines plus a link table
//! - [`pager`]: shows output a screen at a time
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the configured homepage
//! gemlet
//!
//! # Open a capsule directly
//! gemlet geminiprotocol.net/docs/
//! ```
//!
//! At the prompt, type a link number, a URL, or `help`.

/// Application context, error types and the interactive prompt.
///
/// The [`AppContext`](app::AppContext) struct wires together the
/// configuration, fetcher, terminal and style table.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Commands available at the prompt and while paging.
///
/// quit, reload, back, home, ls, printurl, saveurl, inspect, help.
pub mod commands;

/// Configuration loaded from `~/.config/gemlet/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Link`](domain::Link): a numbered link on the current page
/// - [`Session`](domain::Session): history, redirect counters and the current page
pub mod domain;

/// Gemini transport.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for a single request
/// - [`GeminiFetcher`](fetcher::gemini::GeminiFetcher): tokio + rustls implementation
pub mod fetcher;

/// Navigation state machine: input prompts, redirects and history.
pub mod nav;

/// Paged output with inline commands.
pub mod pager;

/// Gemtext rendering, word wrap and terminal styles.
pub mod render;

/// Relative and user-typed URL resolution.
pub mod resolver;

/// Line-oriented terminal I/O behind a trait.
pub mod terminal;
