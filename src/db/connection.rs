use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use directories::BaseDirs;
use log::debug;
use rusqlite::Connection;

use crate::error::Result;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-library";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "book_library.sqlite";

/// Every table and index the catalog needs. Each statement is guarded with
/// `IF NOT EXISTS` so the batch can run on every start.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        bio TEXT
    );

    CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0)
    );

    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(trim(title)) > 0),
        author_id INTEGER NOT NULL,
        publication_date TEXT NOT NULL,
        isbn TEXT NOT NULL UNIQUE CHECK (length(trim(isbn)) > 0),
        FOREIGN KEY(author_id) REFERENCES authors(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS book_genres (
        book_id INTEGER NOT NULL,
        genre_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, genre_id),
        FOREIGN KEY(book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY(genre_id) REFERENCES genres(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS user_profiles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE CHECK (length(trim(username)) > 0),
        password_hash TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_books_author ON books(author_id);
    CREATE INDEX IF NOT EXISTS idx_book_genres_genre ON book_genres(genre_id);
    CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(name);
    CREATE INDEX IF NOT EXISTS idx_genres_name ON genres(name);
";

/// Create any missing tables. Running it against an already initialised
/// database changes nothing.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open (creating if needed) the database file at `path`, turn on foreign key
/// enforcement, and make sure the schema exists.
pub fn open_database(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    debug!("opening catalog database at {}", path.display());
    let conn = Connection::open(path).context("failed to open SQLite database")?;
    prepare(&conn)?;
    Ok(conn)
}

/// Same as [`open_database`] but backed by a private in-memory database.
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;
    initialize_schema(conn).context("failed to create catalog tables")?;
    Ok(())
}

/// Resolve the default database location inside the user's home directory.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = open_in_memory().unwrap();
        let names = table_names(&conn);
        for expected in ["authors", "book_genres", "books", "genres", "user_profiles"] {
            assert!(names.iter().any(|name| name == expected), "missing {expected}");
        }
    }

    #[test]
    fn schema_initialisation_is_idempotent() {
        let conn = open_in_memory().unwrap();
        conn.execute("INSERT INTO authors (name) VALUES ('Jane Doe')", [])
            .unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
