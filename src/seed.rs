//! Demo data generator. Fills an empty (or existing) catalog with genres,
//! authors, and books that satisfy every schema constraint.

use chrono::{Duration, NaiveDate};
use log::{info, warn};
use rand::prelude::*;

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::models::{Author, Genre, NewBook};

pub const GENRES: &[&str] = &[
    "Mystery",
    "Science Fiction",
    "Fantasy",
    "Romance",
    "Thriller",
    "Non-Fiction",
    "Historical Fiction",
    "Biography",
    "Self-Help",
    "Cooking",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Clara", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Ines", "Jonah", "Keiko",
    "Luis", "Mira", "Nils", "Olga", "Priya", "Quentin", "Rosa", "Samir", "Tess",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Baptiste", "Castell", "Delacroix", "Eklund", "Ferreira", "Garber", "Holloway",
    "Ibarra", "Jansen", "Kowalski", "Lindqvist", "Moreau", "Novak", "Okafor", "Pereira",
];

const TITLE_OPENERS: &[&str] = &[
    "The Silent", "A Distant", "The Last", "Beyond the", "The Hidden", "Under a", "The Broken",
    "Return of the", "The Midnight", "A Quiet",
];

const TITLE_SUBJECTS: &[&str] = &[
    "Harbor", "Orchard", "Cipher", "Lantern", "Frontier", "Garden", "Archive", "Kingdom",
    "Meridian", "Compass", "Winter", "Tide",
];

const BIO_TOPICS: &[&str] = &[
    "coastal towns",
    "family secrets",
    "forgotten wars",
    "quiet kitchens",
    "distant planets",
    "old libraries",
];

/// How much data a seeding run should add. A fixed `seed` makes the run
/// reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub authors: usize,
    pub books: usize,
    pub seed: Option<u64>,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            authors: 10,
            books: 20,
            seed: None,
        }
    }
}

/// What a seeding run actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub genres: usize,
    pub authors: usize,
    pub books: usize,
    pub skipped: usize,
}

/// Add demo genres, authors, and books. Existing genres with the standard
/// names are reused so repeated runs do not duplicate them.
pub fn seed_catalog(catalog: &mut Catalog, plan: SeedPlan) -> Result<SeedReport> {
    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    seed_catalog_with(catalog, plan, &mut rng)
}

/// Same as [`seed_catalog`] but draws from the caller's generator.
pub fn seed_catalog_with(
    catalog: &mut Catalog,
    plan: SeedPlan,
    rng: &mut StdRng,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let before = catalog.list_genres()?.len();
    let genres = GENRES
        .iter()
        .map(|name| catalog.find_or_create_genre(name))
        .collect::<Result<Vec<Genre>>>()?;
    report.genres = catalog.list_genres()?.len() - before;

    let mut authors: Vec<Author> = Vec::with_capacity(plan.authors);
    for _ in 0..plan.authors {
        let name = format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
        let bio = format!(
            "{} writes about {} and {}.",
            name,
            pick(rng, BIO_TOPICS),
            pick(rng, BIO_TOPICS)
        );
        authors.push(catalog.add_author(&name, Some(&bio))?);
        report.authors += 1;
    }

    if authors.is_empty() {
        authors = catalog.list_authors()?;
    }

    for _ in 0..plan.books {
        let (Some(author), Some(genre)) = (authors.choose(rng), genres.choose(rng)) else {
            return Err(CatalogError::validation(
                "Cannot seed books without at least one author.",
            ));
        };
        let book = NewBook {
            title: format!("{} {}", pick(rng, TITLE_OPENERS), pick(rng, TITLE_SUBJECTS)),
            author_id: author.id,
            genre_id: Some(genre.id),
            publication_date: random_date(rng),
            isbn: random_isbn13(rng),
        };

        match catalog.add_book(book) {
            Ok(_) => report.books += 1,
            Err(CatalogError::ConstraintViolation(message)) => {
                warn!("skipping seeded book: {message}");
                report.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "seeded {} genre(s), {} author(s), {} book(s)",
        report.genres, report.authors, report.books
    );
    Ok(report)
}

fn pick(rng: &mut StdRng, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}

/// A date between 1925-01-01 and the end of 2007.
fn random_date(rng: &mut StdRng) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(1925, 1, 1).unwrap_or_default();
    start + Duration::days(rng.gen_range(0..83 * 365))
}

/// A "978"-prefixed ISBN-13 with a correct check digit.
fn random_isbn13(rng: &mut StdRng) -> String {
    let mut digits: Vec<u32> = vec![9, 7, 8];
    for _ in 0..9 {
        digits.push(rng.gen_range(0..10));
    }
    digits.push(isbn13_check_digit(&digits));
    digits.iter().filter_map(|digit| char::from_digit(*digit, 10)).collect()
}

fn isbn13_check_digit(first_twelve: &[u32]) -> u32 {
    let sum: u32 = first_twelve
        .iter()
        .enumerate()
        .map(|(idx, digit)| if idx % 2 == 0 { *digit } else { digit * 3 })
        .sum();
    (10 - sum % 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn check_digit_matches_known_isbn() {
        // 978-0-306-40615-7
        let digits = [9, 7, 8, 0, 3, 0, 6, 4, 0, 6, 1, 5];
        assert_eq!(isbn13_check_digit(&digits), 7);
    }

    #[test]
    fn generated_isbns_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let isbn = random_isbn13(&mut rng);
            assert_eq!(isbn.len(), 13);
            assert!(isbn.starts_with("978"));
            let digits: Vec<u32> = isbn.chars().filter_map(|c| c.to_digit(10)).collect();
            assert_eq!(isbn13_check_digit(&digits[..12]), digits[12]);
        }
    }

    #[test]
    fn generated_dates_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let earliest = NaiveDate::from_ymd_opt(1925, 1, 1).unwrap();
        let latest = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        for _ in 0..100 {
            let date = random_date(&mut rng);
            assert!(date >= earliest && date < latest, "{date} out of range");
        }
    }

    #[test]
    fn every_isbn_digit_position_varies() {
        let mut rng = StdRng::seed_from_u64(3);
        let isbns: Vec<String> = (0..200).map(|_| random_isbn13(&mut rng)).collect();
        for position in 3..12 {
            let mut seen: Vec<char> = isbns
                .iter()
                .filter_map(|isbn| isbn.chars().nth(position))
                .collect();
            seen.sort_unstable();
            seen.dedup();
            assert!(seen.len() >= 8, "position {position} only saw {seen:?}");
        }
    }

    #[test]
    fn generated_dates_cover_the_whole_span() {
        let mut rng = StdRng::seed_from_u64(5);
        let years: Vec<i32> = (0..500).map(|_| random_date(&mut rng).year()).collect();
        assert!(years.iter().any(|year| *year < 1945));
        assert!(years.iter().any(|year| *year > 1985));
    }

    #[test]
    fn same_seed_reproduces_the_same_catalog() {
        let plan = SeedPlan {
            authors: 3,
            books: 6,
            seed: Some(42),
        };
        let mut first = Catalog::open_in_memory().unwrap();
        let mut second = Catalog::open_in_memory().unwrap();
        seed_catalog(&mut first, plan).unwrap();
        seed_catalog(&mut second, plan).unwrap();

        let books = |catalog: &Catalog| -> Vec<(String, String, String)> {
            catalog
                .list_books()
                .unwrap()
                .into_iter()
                .map(|book| (book.title, book.author.name, book.isbn))
                .collect()
        };
        assert_eq!(books(&first), books(&second));
    }

    #[test]
    fn books_without_authors_are_rejected() {
        let mut catalog = Catalog::open_in_memory().unwrap();
        let plan = SeedPlan {
            authors: 0,
            books: 1,
            seed: Some(1),
        };
        let err = seed_catalog(&mut catalog, plan).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn seeding_populates_every_table() {
        let mut catalog = Catalog::open_in_memory().unwrap();
        let report = seed_catalog(&mut catalog, SeedPlan::default()).unwrap();

        assert_eq!(report.genres, GENRES.len());
        assert_eq!(report.authors, 10);
        assert_eq!(report.books + report.skipped, 20);
        assert_eq!(catalog.list_books().unwrap().len(), report.books);
        assert!(catalog
            .list_books()
            .unwrap()
            .iter()
            .all(|book| book.genres.len() == 1));
    }

    #[test]
    fn reseeding_reuses_standard_genres() {
        let mut catalog = Catalog::open_in_memory().unwrap();
        seed_catalog(&mut catalog, SeedPlan { authors: 1, books: 1, seed: None }).unwrap();
        let report = seed_catalog(&mut catalog, SeedPlan { authors: 1, books: 1, seed: None }).unwrap();
        assert_eq!(report.genres, 0);
        assert_eq!(catalog.list_genres().unwrap().len(), GENRES.len());
    }
}
