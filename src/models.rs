//! Domain models that mirror the SQLite schema. These stay light-weight data
//! holders; the catalog layer hydrates them and the front ends only read them.

use std::fmt;

use chrono::NaiveDate;

/// A person credited with one or more books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    /// Free-text biography. Absent for authors created without one.
    pub bio: Option<String>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A book together with the rows it references. Genres come from the
/// `book_genres` association table, ordered by when each link was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Author,
    pub genres: Vec<Genre>,
    pub publication_date: NaiveDate,
    pub isbn: String,
}

impl Book {
    /// The first linked genre, if any. Stands in for the single "genre" column
    /// older catalogs carried next to the association table.
    pub fn primary_genre(&self) -> Option<&Genre> {
        self.genres.first()
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|genre| genre.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author.name)
    }
}

/// Input for inserting a book. `genre_id`, when present, becomes the first
/// association link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: i64,
    pub genre_id: Option<i64>,
    pub publication_date: NaiveDate,
    pub isbn: String,
}

/// Account row. Only the salted hash is ever held in memory or on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Display-ready projection of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    /// Genre names joined with `", "`; empty when the book has none.
    pub genre_names: String,
    /// `YYYY-MM-DD`.
    pub publication_date: String,
    pub isbn: String,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author_name: book.author.name.clone(),
            genre_names: book.genre_names(),
            publication_date: book.publication_date.format("%Y-%m-%d").to_string(),
            isbn: book.isbn.clone(),
        }
    }
}

/// Filters accepted by a catalog search. See `Catalog::search` for precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub book_id: Option<i64>,
}

impl SearchQuery {
    pub fn by_author(name: impl Into<String>) -> Self {
        Self {
            author: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_genre(name: impl Into<String>) -> Self {
        Self {
            genre: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_id(book_id: i64) -> Self {
        Self {
            book_id: Some(book_id),
            ..Self::default()
        }
    }
}
