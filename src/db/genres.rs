use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::Genre;

pub fn fetch_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name, id")?;

    let genres = stmt
        .query_map([], |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(genres)
}

/// First genre (lowest id) carrying exactly `name`. Genre names are not unique
/// in the schema, so callers that need one row get the oldest.
pub fn find_genre_by_name(conn: &Connection, name: &str) -> Result<Option<Genre>> {
    let genre = conn
        .query_row(
            "SELECT id, name FROM genres WHERE name = ?1 ORDER BY id LIMIT 1",
            params![name],
            |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(genre)
}

pub fn create_genre(conn: &Connection, name: &str) -> Result<Genre> {
    conn.execute("INSERT INTO genres (name) VALUES (?1)", params![name])?;

    Ok(Genre {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Genres linked to a book, in the order the links were created. The
/// association table keeps its implicit rowid, which grows with each insert.
pub fn fetch_genres_for_book(conn: &Connection, book_id: i64) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM genres g
         INNER JOIN book_genres bg ON bg.genre_id = g.id
         WHERE bg.book_id = ?1
         ORDER BY bg.rowid",
    )?;

    let genres = stmt
        .query_map([book_id], |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(genres)
}

/// Link a genre to a book. Repeating an existing link is a no-op, which keeps
/// tagging idempotent.
pub fn link_genre(conn: &Connection, book_id: i64, genre_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?1, ?2)",
        params![book_id, genre_id],
    )?;
    Ok(())
}

/// Remove a genre row. Refused by SQLite while books are still linked to it.
pub fn delete_genre(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM genres WHERE id = ?1", params![id])?;
    Ok(deleted)
}
