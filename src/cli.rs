//! Non-interactive command line. Each subcommand maps onto one catalog call
//! and prints its outcome; expected failures are printed rather than raised.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use crate::catalog::{parse_publication_date, Catalog};
use crate::db::default_db_path;
use crate::error::CatalogError;
use crate::models::{BookRecord, NewBook, SearchQuery};
use crate::seed::{seed_catalog, SeedPlan};

#[derive(Parser, Debug)]
#[command(
    name = "book-library",
    about = "Manage a small catalog of books, authors, and genres",
    version
)]
pub struct Cli {
    /// SQLite database file (defaults to ~/.book-library/book_library.sqlite)
    #[arg(long, env = "BOOK_LIBRARY_DB", global = true)]
    pub database: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to run; without one the interactive shell starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a book to the catalog
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author_id: i64,
        #[arg(long)]
        genre_id: Option<i64>,
        /// Publication date in YYYY-MM-DD format
        #[arg(long)]
        publication_date: String,
        #[arg(long)]
        isbn: String,
    },
    /// Search books by id, author name, or genre name
    Search {
        /// Exact author name; takes priority over --genre
        #[arg(long)]
        author: Option<String>,
        /// Exact genre name
        #[arg(long)]
        genre: Option<String>,
        /// Book id; takes priority over every other filter
        #[arg(long)]
        book_id: Option<i64>,
    },
    /// Delete a book by id
    DeleteBook {
        #[arg(long)]
        book_id: i64,
    },
    /// Add an author
    AddAuthor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Add a genre
    AddGenre {
        #[arg(long)]
        name: String,
    },
    /// Link an additional genre to a book
    Tag {
        #[arg(long)]
        book_id: i64,
        #[arg(long)]
        genre_id: i64,
    },
    /// List every book
    List,
    /// List every author
    Authors,
    /// List every genre
    Genres,
    /// Create a user profile with a hashed password
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Fill the catalog with demo data
    Seed {
        #[arg(long, default_value_t = 10)]
        authors: usize,
        #[arg(long, default_value_t = 20)]
        books: usize,
        /// Fixed random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create the database and its tables
    Init,
}

impl Cli {
    /// Database location from the flag or environment, else the default file
    /// under the home directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Run one subcommand against `catalog`, writing user-facing output to `out`.
/// Validation, not-found, and constraint errors are printed and swallowed;
/// storage errors are returned.
pub fn execute(catalog: &mut Catalog, command: Command, out: &mut impl Write) -> Result<()> {
    match dispatch(catalog, command, out)? {
        Ok(()) => Ok(()),
        Err(err) if err.is_expected() => {
            writeln!(out, "{err}").context("failed to write output")?;
            Ok(())
        }
        Err(err) => Err(err).context("catalog storage failure"),
    }
}

/// The outer `Result` carries output failures, the inner one catalog failures.
fn dispatch(
    catalog: &mut Catalog,
    command: Command,
    out: &mut impl Write,
) -> Result<Result<(), CatalogError>> {
    let outcome = match command {
        Command::AddBook {
            title,
            author_id,
            genre_id,
            publication_date,
            isbn,
        } => {
            let publication_date = match parse_publication_date(&publication_date) {
                Ok(date) => date,
                Err(err) => return Ok(Err(err)),
            };
            catalog
                .add_book(NewBook {
                    title,
                    author_id,
                    genre_id,
                    publication_date,
                    isbn,
                })
                .map(|book| vec![format!("Book added successfully (id {}).", book.id)])
        }
        Command::Search {
            author,
            genre,
            book_id,
        } => catalog
            .search(&SearchQuery {
                author,
                genre,
                book_id,
            })
            .map(|books| render_records(&Catalog::format_for_display(&books))),
        Command::DeleteBook { book_id } => catalog.delete_book(book_id).map(|deleted| {
            if deleted {
                vec!["Book deleted successfully.".to_string()]
            } else {
                vec!["Book not found with the provided ID.".to_string()]
            }
        }),
        Command::AddAuthor { name, bio } => catalog
            .add_author(&name, bio.as_deref())
            .map(|author| vec![format!("Author added (id {}).", author.id)]),
        Command::AddGenre { name } => catalog
            .add_genre(&name)
            .map(|genre| vec![format!("Genre added (id {}).", genre.id)]),
        Command::Tag { book_id, genre_id } => {
            catalog.tag_book(book_id, genre_id).map(|book| {
                vec![format!("{} is now tagged: {}", book.title, book.genre_names())]
            })
        }
        Command::List => catalog
            .list_books()
            .map(|books| render_records(&Catalog::format_for_display(&books))),
        Command::Authors => catalog.list_authors().map(|authors| {
            if authors.is_empty() {
                return vec!["No authors found.".to_string()];
            }
            authors
                .iter()
                .map(|author| match &author.bio {
                    Some(bio) => format!("{}. {} - {}", author.id, author.name, bio),
                    None => format!("{}. {}", author.id, author.name),
                })
                .collect()
        }),
        Command::Genres => catalog.list_genres().map(|genres| {
            if genres.is_empty() {
                return vec!["No genres found.".to_string()];
            }
            genres
                .iter()
                .map(|genre| format!("{}. {}", genre.id, genre.name))
                .collect()
        }),
        Command::AddUser { username, password } => catalog
            .add_user(&username, &password)
            .map(|user| vec![format!("User {} created.", user.username)]),
        Command::Seed {
            authors,
            books,
            seed,
        } => seed_catalog(
            catalog,
            SeedPlan {
                authors,
                books,
                seed,
            },
        )
        .map(|report| {
            let mut lines = vec![format!(
                "Seeded {} genre(s), {} author(s), {} book(s).",
                report.genres, report.authors, report.books
            )];
            if report.skipped > 0 {
                lines.push(format!(
                    "Skipped {} book(s) with duplicate ISBNs.",
                    report.skipped
                ));
            }
            lines
        }),
        Command::Init => catalog
            .initialize_schema()
            .map(|()| vec!["Catalog tables are ready.".to_string()]),
    };

    match outcome {
        Ok(lines) => {
            for line in lines {
                writeln!(out, "{line}").context("failed to write output")?;
            }
            Ok(Ok(()))
        }
        Err(err) => Ok(Err(err)),
    }
}

/// Numbered listing followed by the remaining fields of each record.
pub fn render_records(records: &[BookRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No books found.".to_string()];
    }

    let mut lines = vec!["Books found:".to_string()];
    for (index, record) in records.iter().enumerate() {
        lines.push(format!(
            "{}. {} by {}",
            index + 1,
            record.title,
            record.author_name
        ));
        lines.push(format!(
            "   id: {} | genre: {} | published: {} | isbn: {}",
            record.id, record.genre_names, record.publication_date, record.isbn
        ));
    }
    lines
}
