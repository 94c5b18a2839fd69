//! Persistence module split across logical submodules. Every function takes a
//! borrowed connection so it works the same on a plain connection or inside a
//! transaction.

mod authors;
mod books;
mod connection;
mod genres;
mod users;

pub use authors::{create_author, delete_author, fetch_authors};
pub use books::{
    count_books_with_isbn, delete_book, fetch_all_books, fetch_book, fetch_books_by_author_name,
    fetch_books_by_genre_name, insert_book,
};
pub use connection::{default_db_path, initialize_schema, open_database, open_in_memory};
pub use genres::{
    create_genre, delete_genre, fetch_genres, fetch_genres_for_book, find_genre_by_name,
    link_genre,
};
pub use users::{create_user, fetch_user_by_username};
