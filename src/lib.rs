//! Tuneport Playlist Converter Library
//!
//! This library converts playlists from a source catalog (Apple Music or a
//! JSON export) into Spotify playlists. Every source track is resolved to a
//! Spotify track with a bounded number of concurrent searches, the matches are
//! kept in source order, and the result is written to a newly created playlist
//! in batches of at most 100 items.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The error taxonomy shared by all operations
//! - `logging` - Diagnostic log file setup
//! - `management` - User token caching
//! - `retry` - Bounded retry policies with exponential backoff
//! - `server` - Local HTTP server for OAuth callbacks
//! - `source` - Source playlist readers
//! - `spotify` - Spotify Web API client implementation
//! - `sync` - Concurrent track resolution and the end-to-end conversion
//! - `types` - Data structures and type definitions
//! - `utils` - Query sanitizing and other helpers
//!
//! # Example
//!
//! ```
//! use tuneport::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> tuneport::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod retry;
pub mod server;
pub mod source;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// Result alias for the CLI layer and other places where the concrete error
/// type does not matter to the caller.
///
/// Library operations that callers branch on return
/// [`error::SyncResult`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line prefixed with a blue `o`.
///
/// ```
/// info!("Resolving {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line prefixed with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red error line and terminates the process with exit code 1.
///
/// Only for failures the command cannot continue from, such as missing
/// credentials or a rejected consent. The expression has type `!`, so it can
/// be used in any match arm.
///
/// ```
/// let settings = match Settings::from_env() {
///     Ok(settings) => settings,
///     Err(e) => error!("{}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow warning line. Execution continues.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
