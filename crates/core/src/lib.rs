#![warn(clippy::all, missing_docs)]

//! Core library for the itch.io jam tracker.
//!
//! Everything that is not terminal rendering lives here: the jam model and
//! its date-window classification, the shared filtered repository, pagination,
//! calendar scraping, the background fetch task, preference persistence, and
//! configuration loading. Front ends drive the repository and subscribe to
//! selection changes.

pub mod config;
pub mod fetch;
pub mod list;
pub mod models;
pub mod pagination;
pub mod parser;
pub mod prefs;

pub use config::AppConfig;
pub use fetch::{FetchCommand, FetchEvent, JamFetcher};
pub use list::JamList;
pub use models::{GameJam, JamCategory, JamStatus};
pub use pagination::Paginator;
pub use prefs::{FilePrefs, MemoryPrefs, PrefStore};
