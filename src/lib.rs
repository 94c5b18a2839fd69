//! Core library surface for the book library catalog.
//!
//! The `bin` target and the integration tests both go through the same
//! modules: `catalog` for every operation, `db` for the individual queries,
//! and `ui` for the interactive terminal front end.
pub mod catalog;
pub mod cli;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod seed;
pub mod ui;

pub use catalog::{parse_publication_date, Catalog};
pub use error::{CatalogError, Result};
pub use models::{Author, Book, BookRecord, Genre, NewBook, SearchQuery, UserProfile};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
