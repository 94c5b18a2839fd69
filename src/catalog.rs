//! The catalog service: every read and write the front ends perform goes
//! through [`Catalog`], which owns its connection so each instance (and each
//! test) talks to its own store.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::Connection;

use crate::db;
use crate::error::{CatalogError, Result};
use crate::models::{Author, Book, BookRecord, Genre, NewBook, SearchQuery, UserProfile};
use crate::password::{hash_password, verify_password};

/// Format accepted for publication dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Wrap an already prepared connection (foreign keys on, schema present).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the database file at `path`, creating it and its tables if needed.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = db::open_database(path)
            .with_context(|| format!("failed to open catalog at {}", path.display()))?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    /// Re-run schema creation. Safe on an initialised store.
    pub fn initialize_schema(&self) -> Result<()> {
        db::initialize_schema(&self.conn)
    }

    /// Persist a new book and, when `genre_id` is set, its first genre link.
    /// Both rows are written in one transaction.
    pub fn add_book(&mut self, book: NewBook) -> Result<Book> {
        let book = NewBook {
            title: required(&book.title, "Title")?,
            isbn: required(&book.isbn, "ISBN")?,
            ..book
        };

        let tx = self.conn.transaction()?;
        let id = db::insert_book(&tx, &book).map_err(|err| describe_book_write(err, &book))?;
        tx.commit()?;
        info!("added book {id} ({:?}, isbn {})", book.title, book.isbn);

        self.search_by_id(id)
    }

    pub fn search_by_id(&self, book_id: i64) -> Result<Book> {
        db::fetch_book(&self.conn, book_id)?.ok_or(CatalogError::NotFound {
            entity: "Book",
            id: book_id,
        })
    }

    /// Exact, case-sensitive match on the author's name.
    pub fn search_by_author_name(&self, name: &str) -> Result<Vec<Book>> {
        db::fetch_books_by_author_name(&self.conn, name)
    }

    /// Books linked to a genre with exactly this name.
    pub fn search_by_genre_name(&self, name: &str) -> Result<Vec<Book>> {
        db::fetch_books_by_genre_name(&self.conn, name)
    }

    /// Dispatch a search. A book id wins over everything else; otherwise the
    /// author filter wins and any genre filter is ignored. With no filters
    /// every book is returned. An unknown book id yields an empty list.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Book>> {
        debug!("search {query:?}");
        if let Some(book_id) = query.book_id {
            return match self.search_by_id(book_id) {
                Ok(book) => Ok(vec![book]),
                Err(err) if err.is_not_found() => Ok(Vec::new()),
                Err(err) => Err(err),
            };
        }

        match (supplied(&query.author), supplied(&query.genre)) {
            (Some(author), _) => self.search_by_author_name(author),
            (None, Some(genre)) => self.search_by_genre_name(genre),
            (None, None) => self.list_books(),
        }
    }

    pub fn list_books(&self) -> Result<Vec<Book>> {
        db::fetch_all_books(&self.conn)
    }

    /// Delete a book. Returns `false` when no book had that id.
    pub fn delete_book(&mut self, book_id: i64) -> Result<bool> {
        let deleted = db::delete_book(&self.conn, book_id)? > 0;
        if deleted {
            info!("deleted book {book_id}");
        }
        Ok(deleted)
    }

    pub fn count_books_with_isbn(&self, isbn: &str) -> Result<i64> {
        db::count_books_with_isbn(&self.conn, isbn)
    }

    /// Project books into display records. Touches no storage.
    pub fn format_for_display(books: &[Book]) -> Vec<BookRecord> {
        books.iter().map(BookRecord::from).collect()
    }

    pub fn add_author(&mut self, name: &str, bio: Option<&str>) -> Result<Author> {
        let name = required(name, "Author name")?;
        let bio = bio.map(str::trim).filter(|bio| !bio.is_empty());
        let author = db::create_author(&self.conn, &name, bio)?;
        info!("added author {} ({})", author.id, author.name);
        Ok(author)
    }

    pub fn list_authors(&self) -> Result<Vec<Author>> {
        db::fetch_authors(&self.conn)
    }

    /// Remove an author with no books. Authors that still have books are kept
    /// and the call fails with a constraint violation.
    pub fn delete_author(&mut self, id: i64) -> Result<bool> {
        let deleted = db::delete_author(&self.conn, id).map_err(|err| match err {
            CatalogError::ConstraintViolation(_) => CatalogError::ConstraintViolation(format!(
                "Author {id} still has books and cannot be deleted."
            )),
            other => other,
        })?;
        Ok(deleted > 0)
    }

    pub fn add_genre(&mut self, name: &str) -> Result<Genre> {
        let name = required(name, "Genre name")?;
        let genre = db::create_genre(&self.conn, &name)?;
        info!("added genre {} ({})", genre.id, genre.name);
        Ok(genre)
    }

    /// Return the oldest genre with this name, creating it when missing.
    pub fn find_or_create_genre(&mut self, name: &str) -> Result<Genre> {
        let name = required(name, "Genre name")?;
        match db::find_genre_by_name(&self.conn, &name)? {
            Some(genre) => Ok(genre),
            None => self.add_genre(&name),
        }
    }

    pub fn list_genres(&self) -> Result<Vec<Genre>> {
        db::fetch_genres(&self.conn)
    }

    /// Same restrict policy as [`Catalog::delete_author`].
    pub fn delete_genre(&mut self, id: i64) -> Result<bool> {
        let deleted = db::delete_genre(&self.conn, id).map_err(|err| match err {
            CatalogError::ConstraintViolation(_) => CatalogError::ConstraintViolation(format!(
                "Genre {id} is still linked to books and cannot be deleted."
            )),
            other => other,
        })?;
        Ok(deleted > 0)
    }

    /// Link an additional genre to a book. Linking twice is harmless.
    pub fn tag_book(&mut self, book_id: i64, genre_id: i64) -> Result<Book> {
        let book = self.search_by_id(book_id)?;
        db::link_genre(&self.conn, book.id, genre_id).map_err(|err| match err {
            CatalogError::ConstraintViolation(_) => {
                CatalogError::ConstraintViolation(format!("Genre {genre_id} does not exist."))
            }
            other => other,
        })?;
        self.search_by_id(book_id)
    }

    pub fn add_user(&mut self, username: &str, password: &str) -> Result<UserProfile> {
        let username = required(username, "Username")?;
        if password.is_empty() {
            return Err(CatalogError::validation("Password is required."));
        }
        let hash = hash_password(password).map_err(|err| {
            CatalogError::validation(format!("Password could not be hashed: {err}"))
        })?;
        let user = db::create_user(&self.conn, &username, &hash).map_err(|err| match err {
            CatalogError::ConstraintViolation(_) => CatalogError::ConstraintViolation(format!(
                "Username {username} already exists."
            )),
            other => other,
        })?;
        info!("added user {}", user.username);
        Ok(user)
    }

    /// Whether the username exists and the password matches its stored hash.
    pub fn verify_user(&self, username: &str, password: &str) -> Result<bool> {
        Ok(db::fetch_user_by_username(&self.conn, username)?
            .map(|user| verify_password(password, &user.password_hash))
            .unwrap_or(false))
    }
}

/// Parse a `YYYY-MM-DD` publication date.
pub fn parse_publication_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        CatalogError::validation("Invalid date format. Please use YYYY-MM-DD format.")
    })
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CatalogError::validation(format!("{field} is required.")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// A filter counts as supplied unless it is absent or empty. Whitespace-only
/// text is still a filter, so it matches nothing rather than falling through.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Replace SQLite's wording with a message naming the offending input.
fn describe_book_write(err: CatalogError, book: &NewBook) -> CatalogError {
    let CatalogError::ConstraintViolation(detail) = err else {
        return err;
    };
    let message = if detail.contains("books.isbn") {
        format!("A book with ISBN {} already exists.", book.isbn)
    } else if detail.contains("FOREIGN KEY") {
        match book.genre_id {
            Some(genre_id) => format!(
                "Author {} or genre {genre_id} does not exist.",
                book.author_id
            ),
            None => format!("Author {} does not exist.", book.author_id),
        }
    } else {
        detail
    };
    CatalogError::ConstraintViolation(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_publication_date("2001-09-30").unwrap(),
            NaiveDate::from_ymd_opt(2001, 9, 30).unwrap()
        );
        assert_eq!(
            parse_publication_date(" 1999-01-02 ").unwrap(),
            NaiveDate::from_ymd_opt(1999, 1, 2).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        for raw in ["2020-13-01", "01/02/2020", "2020-02-30", "", "yesterday"] {
            let err = parse_publication_date(raw).unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{raw} accepted");
        }
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        assert!(matches!(
            required("   ", "Title"),
            Err(CatalogError::Validation(message)) if message == "Title is required."
        ));
        assert_eq!(required("  Dune ", "Title").unwrap(), "Dune");
    }
}
