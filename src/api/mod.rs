//! # API Module
//!
//! HTTP endpoints of the local server that runs while the user grants access
//! in the browser.
//!
//! - [`callback`] - Receives the OAuth redirect, checks the `state` parameter
//!   and stores the authorization code for the waiting consent flow.
//! - [`health`] - Returns status and version; handy to check that the
//!   listener is up before opening the browser.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use tuneport::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
