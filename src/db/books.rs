use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use crate::error::Result;
use crate::models::{Author, Book, NewBook};

use super::genres::{fetch_genres_for_book, link_genre};

/// Columns selected by every book query, joined with the owning author.
/// `book_from_row` depends on this exact order.
const BOOK_SELECT: &str = "SELECT b.id, b.title, b.publication_date, b.isbn, a.id, a.name, a.bio
     FROM books b
     INNER JOIN authors a ON a.id = b.author_id";

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        publication_date: row.get(2)?,
        isbn: row.get(3)?,
        author: Author {
            id: row.get(4)?,
            name: row.get(5)?,
            bio: row.get(6)?,
        },
        genres: Vec::new(),
    })
}

/// Run a book query and attach each book's genres.
fn query_books<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare(sql)?;
    let mut books = stmt
        .query_map(params, book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for book in &mut books {
        book.genres = fetch_genres_for_book(conn, book.id)?;
    }
    debug!("book query returned {} row(s)", books.len());
    Ok(books)
}

pub fn fetch_book(conn: &Connection, id: i64) -> Result<Option<Book>> {
    let sql = format!("{BOOK_SELECT} WHERE b.id = ?1");
    let book = conn.query_row(&sql, params![id], book_from_row).optional()?;

    match book {
        Some(mut book) => {
            book.genres = fetch_genres_for_book(conn, book.id)?;
            Ok(Some(book))
        }
        None => Ok(None),
    }
}

pub fn fetch_all_books(conn: &Connection) -> Result<Vec<Book>> {
    let sql = format!("{BOOK_SELECT} ORDER BY b.id");
    query_books(conn, &sql, [])
}

/// Books whose author's name equals `name` exactly (case-sensitive).
pub fn fetch_books_by_author_name(conn: &Connection, name: &str) -> Result<Vec<Book>> {
    let sql = format!("{BOOK_SELECT} WHERE a.name = ?1 ORDER BY b.id");
    query_books(conn, &sql, params![name])
}

/// Books linked through `book_genres` to any genre named exactly `name`.
pub fn fetch_books_by_genre_name(conn: &Connection, name: &str) -> Result<Vec<Book>> {
    let sql = format!(
        "{BOOK_SELECT}
         WHERE EXISTS (
             SELECT 1 FROM book_genres bg
             INNER JOIN genres g ON g.id = bg.genre_id
             WHERE bg.book_id = b.id AND g.name = ?1
         )
         ORDER BY b.id"
    );
    query_books(conn, &sql, params![name])
}

/// Insert the book row plus its first genre link. Callers wrap this in a
/// transaction so a rejected link also discards the book.
pub fn insert_book(conn: &Connection, book: &NewBook) -> Result<i64> {
    conn.execute(
        "INSERT INTO books (title, author_id, publication_date, isbn)
         VALUES (?1, ?2, ?3, ?4)",
        params![book.title, book.author_id, book.publication_date, book.isbn],
    )?;
    let id = conn.last_insert_rowid();

    if let Some(genre_id) = book.genre_id {
        link_genre(conn, id, genre_id)?;
    }
    Ok(id)
}

pub fn count_books_with_isbn(conn: &Connection, isbn: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM books WHERE isbn = ?1",
        params![isbn],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete a book by id. The schema cascades to `book_genres`.
pub fn delete_book(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
    Ok(deleted)
}
