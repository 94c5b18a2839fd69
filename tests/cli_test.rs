use book_library::cli::{execute, Command};
use book_library::Catalog;
use pretty_assertions::assert_eq;

fn run(catalog: &mut Catalog, command: Command) -> String {
    let mut out = Vec::new();
    execute(catalog, command, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn add_book(title: &str, date: &str, isbn: &str) -> Command {
    Command::AddBook {
        title: title.to_string(),
        author_id: 1,
        genre_id: Some(1),
        publication_date: date.to_string(),
        isbn: isbn.to_string(),
    }
}

fn prepared_catalog() -> Catalog {
    let mut catalog = Catalog::open_in_memory().unwrap();
    run(
        &mut catalog,
        Command::AddAuthor {
            name: "Jane Doe".to_string(),
            bio: None,
        },
    );
    run(
        &mut catalog,
        Command::AddGenre {
            name: "Mystery".to_string(),
        },
    );
    catalog
}

#[test]
fn add_then_search_prints_results() {
    let mut catalog = prepared_catalog();
    assert_eq!(
        run(&mut catalog, add_book("The Case", "2001-02-03", "111")),
        "Book added successfully (id 1).\n"
    );

    let output = run(
        &mut catalog,
        Command::Search {
            author: Some("Jane Doe".to_string()),
            genre: None,
            book_id: None,
        },
    );
    assert_eq!(
        output,
        "Books found:\n\
         1. The Case by Jane Doe\n   \
         id: 1 | genre: Mystery | published: 2001-02-03 | isbn: 111\n"
    );
}

#[test]
fn bad_date_is_reported_not_raised() {
    let mut catalog = prepared_catalog();
    assert_eq!(
        run(&mut catalog, add_book("The Case", "03/02/2001", "111")),
        "Invalid date format. Please use YYYY-MM-DD format.\n"
    );
    assert!(catalog.list_books().unwrap().is_empty());
}

#[test]
fn duplicate_isbn_is_reported() {
    let mut catalog = prepared_catalog();
    run(&mut catalog, add_book("The Case", "2001-02-03", "111"));
    assert_eq!(
        run(&mut catalog, add_book("Copy", "2001-02-03", "111")),
        "A book with ISBN 111 already exists.\n"
    );
}

#[test]
fn delete_reports_both_outcomes() {
    let mut catalog = prepared_catalog();
    run(&mut catalog, add_book("The Case", "2001-02-03", "111"));

    assert_eq!(
        run(&mut catalog, Command::DeleteBook { book_id: 1 }),
        "Book deleted successfully.\n"
    );
    assert_eq!(
        run(&mut catalog, Command::DeleteBook { book_id: 1 }),
        "Book not found with the provided ID.\n"
    );
}

#[test]
fn empty_search_says_no_books() {
    let mut catalog = prepared_catalog();
    let output = run(
        &mut catalog,
        Command::Search {
            author: None,
            genre: Some("Romance".to_string()),
            book_id: None,
        },
    );
    assert_eq!(output, "No books found.\n");
}

#[test]
fn seed_fills_the_catalog() {
    let mut catalog = Catalog::open_in_memory().unwrap();
    let output = run(
        &mut catalog,
        Command::Seed {
            authors: 3,
            books: 5,
            seed: None,
        },
    );
    assert!(output.starts_with("Seeded 10 genre(s), 3 author(s), "), "{output}");
    assert_eq!(catalog.list_authors().unwrap().len(), 3);
}

#[test]
fn seeded_runs_repeat_with_the_same_seed() {
    let seeded = |seed| {
        let mut catalog = Catalog::open_in_memory().unwrap();
        run(
            &mut catalog,
            Command::Seed {
                authors: 2,
                books: 4,
                seed: Some(seed),
            },
        );
        run(&mut catalog, Command::List)
    };
    assert_eq!(seeded(99), seeded(99));
    assert_ne!(seeded(99), seeded(100));
}

#[test]
fn listings_name_each_row() {
    let mut catalog = prepared_catalog();
    assert_eq!(run(&mut catalog, Command::Authors), "1. Jane Doe\n");
    assert_eq!(run(&mut catalog, Command::Genres), "1. Mystery\n");
    assert_eq!(run(&mut catalog, Command::List), "No books found.\n");
}
