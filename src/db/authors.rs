use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::Author;

/// Every author ordered by name, then id so namesakes keep a stable order.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn.prepare("SELECT id, name, bio FROM authors ORDER BY name, id")?;

    let authors = stmt
        .query_map([], |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
                bio: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(authors)
}

/// Insert a new author and echo the hydrated row back to the caller.
pub fn create_author(conn: &Connection, name: &str, bio: Option<&str>) -> Result<Author> {
    conn.execute(
        "INSERT INTO authors (name, bio) VALUES (?1, ?2)",
        params![name, bio],
    )?;

    Ok(Author {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        bio: bio.map(str::to_string),
    })
}

/// Remove an author. Returns how many rows went away; SQLite refuses the
/// delete while any book still points at the author.
pub fn delete_author(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM authors WHERE id = ?1", params![id])?;
    Ok(deleted)
}
