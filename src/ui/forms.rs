use ratatui::text::Line;

use crate::catalog::parse_publication_date;
use crate::error::{CatalogError, Result};
use crate::models::{BookRecord, NewBook, SearchQuery};

use super::helpers::form_line;

/// Fields of the "add book" form, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    AuthorId,
    GenreId,
    PublicationDate,
    Isbn,
}

impl BookField {
    pub(crate) const ALL: [BookField; 5] = [
        BookField::Title,
        BookField::AuthorId,
        BookField::GenreId,
        BookField::PublicationDate,
        BookField::Isbn,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::AuthorId => "Author ID",
            BookField::GenreId => "Genre ID",
            BookField::PublicationDate => "Publication Date",
            BookField::Isbn => "ISBN",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            BookField::GenreId => "<optional>",
            BookField::PublicationDate => "<YYYY-MM-DD>",
            _ => "<required>",
        }
    }

    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::AuthorId,
            BookField::AuthorId => BookField::GenreId,
            BookField::GenreId => BookField::PublicationDate,
            BookField::PublicationDate => BookField::Isbn,
            BookField::Isbn => BookField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookField::Title => BookField::Isbn,
            BookField::AuthorId => BookField::Title,
            BookField::GenreId => BookField::AuthorId,
            BookField::PublicationDate => BookField::GenreId,
            BookField::Isbn => BookField::PublicationDate,
        }
    }

    /// Id fields only take digits; the date field only digits and dashes.
    fn accepts(self, ch: char) -> bool {
        match self {
            BookField::AuthorId | BookField::GenreId => ch.is_ascii_digit(),
            BookField::PublicationDate => ch.is_ascii_digit() || ch == '-',
            BookField::Title | BookField::Isbn => !ch.is_control(),
        }
    }
}

/// Internal representation of the "add book" form.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author_id: String,
    pub(crate) genre_id: String,
    pub(crate) publication_date: String,
    pub(crate) isbn: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::AuthorId => &self.author_id,
            BookField::GenreId => &self.genre_id,
            BookField::PublicationDate => &self.publication_date,
            BookField::Isbn => &self.isbn,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::AuthorId => &mut self.author_id,
            BookField::GenreId => &mut self.genre_id,
            BookField::PublicationDate => &mut self.publication_date,
            BookField::Isbn => &mut self.isbn,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    /// Append a character to the active field if the field allows it.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let field = self.active;
        if field.accepts(ch) {
            self.value_mut(field).push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs and return a book ready for the catalog.
    pub(crate) fn parse_inputs(&self) -> Result<NewBook> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CatalogError::validation("Title is required."));
        }
        let author_id = parse_id(&self.author_id, "Author ID")?
            .ok_or_else(|| CatalogError::validation("Author ID is required."))?;
        let genre_id = parse_id(&self.genre_id, "Genre ID")?;
        let publication_date = parse_publication_date(&self.publication_date)?;
        let isbn = self.isbn.trim();
        if isbn.is_empty() {
            return Err(CatalogError::validation("ISBN is required."));
        }

        Ok(NewBook {
            title: title.to_string(),
            author_id,
            genre_id,
            publication_date,
            isbn: isbn.to_string(),
        })
    }

    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        form_line(
            field.label(),
            self.value(field),
            field.placeholder(),
            self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the search form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum SearchField {
    #[default]
    Author,
    Genre,
    BookId,
}

impl SearchField {
    pub(crate) const ALL: [SearchField; 3] =
        [SearchField::Author, SearchField::Genre, SearchField::BookId];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SearchField::Author => "Author",
            SearchField::Genre => "Genre",
            SearchField::BookId => "Book ID",
        }
    }
}

/// Search form. Every field is optional; leaving all blank lists every book.
#[derive(Default, Clone, Debug)]
pub(crate) struct SearchForm {
    pub(crate) author: String,
    pub(crate) genre: String,
    pub(crate) book_id: String,
    pub(crate) active: SearchField,
    pub(crate) error: Option<String>,
}

impl SearchForm {
    pub(crate) fn value(&self, field: SearchField) -> &str {
        match field {
            SearchField::Author => &self.author,
            SearchField::Genre => &self.genre,
            SearchField::BookId => &self.book_id,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SearchField::Author => SearchField::Genre,
            SearchField::Genre => SearchField::BookId,
            SearchField::BookId => SearchField::Author,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            SearchField::BookId if !ch.is_ascii_digit() => false,
            _ if ch.is_control() => false,
            SearchField::Author => {
                self.author.push(ch);
                true
            }
            SearchField::Genre => {
                self.genre.push(ch);
                true
            }
            SearchField::BookId => {
                self.book_id.push(ch);
                true
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SearchField::Author => {
                self.author.pop();
            }
            SearchField::Genre => {
                self.genre.pop();
            }
            SearchField::BookId => {
                self.book_id.pop();
            }
        }
    }

    /// Build the query. Names are matched exactly, so only surrounding
    /// whitespace is dropped.
    pub(crate) fn parse_inputs(&self) -> Result<SearchQuery> {
        let text = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Ok(SearchQuery {
            author: text(&self.author),
            genre: text(&self.genre),
            book_id: parse_id(&self.book_id, "Book ID")?,
        })
    }

    pub(crate) fn build_line(&self, field: SearchField) -> Line<'static> {
        form_line(
            field.label(),
            self.value(field),
            "<any>",
            self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: SearchField) -> usize {
        self.value(field).chars().count()
    }
}

/// Single-field form asking which book id to delete.
#[derive(Default, Clone, Debug)]
pub(crate) struct DeleteForm {
    pub(crate) book_id: String,
    pub(crate) error: Option<String>,
}

impl DeleteForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() {
            self.book_id.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.book_id.pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<i64> {
        parse_id(&self.book_id, "Book ID")?
            .ok_or_else(|| CatalogError::validation("Book ID is required."))
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        form_line("Book ID", &self.book_id, "<required>", true)
    }
}

/// Pending deletion of a book picked from the results list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_name: String,
}

impl From<&BookRecord> for ConfirmBookDelete {
    fn from(record: &BookRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            author_name: record.author_name.clone(),
        }
    }
}

/// Blank means "not given"; anything else must be a whole number.
fn parse_id(raw: &str, field: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| CatalogError::validation(format!("{field} must be a whole number.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn filled_form() -> BookForm {
        BookForm {
            title: " The Case ".to_string(),
            author_id: "1".to_string(),
            genre_id: String::new(),
            publication_date: "2001-02-03".to_string(),
            isbn: "111".to_string(),
            ..BookForm::default()
        }
    }

    #[test]
    fn book_form_parses_complete_input() {
        let book = filled_form().parse_inputs().unwrap();
        assert_eq!(book.title, "The Case");
        assert_eq!(book.author_id, 1);
        assert_eq!(book.genre_id, None);
        assert_eq!(
            book.publication_date,
            NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()
        );
    }

    #[test]
    fn book_form_reports_bad_dates() {
        let form = BookForm {
            publication_date: "2001-2-30".to_string(),
            ..filled_form()
        };
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid date format. Please use YYYY-MM-DD format."
        );
    }

    #[test]
    fn book_form_requires_author() {
        let form = BookForm {
            author_id: String::new(),
            ..filled_form()
        };
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Author ID is required."
        );
    }

    #[test]
    fn id_fields_reject_letters() {
        let mut form = BookForm {
            active: BookField::AuthorId,
            ..BookForm::default()
        };
        assert!(!form.push_char('x'));
        assert!(form.push_char('4'));
        assert_eq!(form.author_id, "4");
    }

    #[test]
    fn tab_order_wraps_both_ways() {
        let mut form = BookForm::default();
        for _ in BookField::ALL {
            form.next_field();
        }
        assert_eq!(form.active, BookField::Title);
        form.previous_field();
        assert_eq!(form.active, BookField::Isbn);
    }

    #[test]
    fn search_form_keeps_both_filters() {
        let form = SearchForm {
            author: "Jane Doe ".to_string(),
            genre: "Mystery".to_string(),
            ..SearchForm::default()
        };
        let query = form.parse_inputs().unwrap();
        assert_eq!(query.author.as_deref(), Some("Jane Doe"));
        assert_eq!(query.genre.as_deref(), Some("Mystery"));
        assert_eq!(query.book_id, None);
    }

    #[test]
    fn delete_form_needs_an_id() {
        assert!(DeleteForm::default().parse_inputs().is_err());
        let mut form = DeleteForm::default();
        form.push_char('7');
        assert_eq!(form.parse_inputs().unwrap(), 7);
    }
}
