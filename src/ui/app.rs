use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::models::SearchQuery;

use super::forms::{BookField, BookForm, ConfirmBookDelete, DeleteForm, SearchField, SearchForm};
use super::helpers::{centered_rect, record_detail_lines};
use super::screens::{MenuItem, ResultsScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows the selection jumps on PageUp / PageDown.
const PAGE_STEP: isize = 5;

/// Top-level views.
enum Screen {
    Menu,
    Results(ResultsScreen),
}

/// Modal state layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    Searching(SearchForm),
    DeletingBook(DeleteForm),
    ConfirmBookDelete(ConfirmBookDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the interactive shell.
pub struct App {
    catalog: Catalog,
    menu_selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            menu_selected: 0,
            screen: Screen::Menu,
            mode: Mode::Normal,
            status: Some(StatusMessage {
                text: "Welcome to the Book Library!".to_string(),
                kind: StatusKind::Info,
            }),
        }
    }

    /// Process one key press. Returns `true` once the user asked to quit.
    /// Only storage failures escape as errors; everything the user can fix is
    /// shown in the footer or on the open form.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::Searching(form) => self.handle_search(code, form)?,
            Mode::DeletingBook(form) => self.handle_delete_by_id(code, form)?,
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Menu => {
                let chosen = match code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(MenuItem::Quit),
                    KeyCode::Up => {
                        self.menu_selected = self.menu_selected.saturating_sub(1);
                        None
                    }
                    KeyCode::Down => {
                        let last = MenuItem::ALL.len() - 1;
                        self.menu_selected = (self.menu_selected + 1).min(last);
                        None
                    }
                    KeyCode::Enter => MenuItem::ALL.get(self.menu_selected).copied(),
                    KeyCode::Char(ch) if ch.is_ascii_digit() => {
                        let item = MenuItem::from_digit(ch);
                        if item.is_none() {
                            self.set_status(
                                "Invalid choice. Please select 1, 2, 3, or 4.",
                                StatusKind::Error,
                            );
                        }
                        item
                    }
                    _ => None,
                };

                match chosen {
                    Some(item) => Ok(self.open_menu_item(item, exit)),
                    None => Ok(Mode::Normal),
                }
            }
            Screen::Results(ref mut results) => {
                let mut back_to_menu = false;
                let mut status_to_set: Option<(String, StatusKind)> = None;

                match code {
                    KeyCode::Char('q') => *exit = true,
                    KeyCode::Esc => back_to_menu = true,
                    KeyCode::Up => results.move_selection(-1),
                    KeyCode::Down => results.move_selection(1),
                    KeyCode::PageUp => results.move_selection(-PAGE_STEP),
                    KeyCode::PageDown => results.move_selection(PAGE_STEP),
                    KeyCode::Home => results.select_first(),
                    KeyCode::End => results.select_last(),
                    KeyCode::Enter => {
                        if let Some(record) = results.current_record() {
                            status_to_set = Some((
                                format!(
                                    "Selected Book: {} by {}",
                                    record.title, record.author_name
                                ),
                                StatusKind::Info,
                            ));
                        }
                    }
                    KeyCode::Char('f') | KeyCode::Char('/') => {
                        self.clear_status();
                        return Ok(Mode::Searching(SearchForm::default()));
                    }
                    KeyCode::Char('-') | KeyCode::Delete => {
                        if let Some(record) = results.current_record() {
                            let confirm = ConfirmBookDelete::from(record);
                            self.clear_status();
                            return Ok(Mode::ConfirmBookDelete(confirm));
                        }
                        status_to_set =
                            Some(("No book selected to delete.".to_string(), StatusKind::Error));
                    }
                    _ => {}
                }

                if back_to_menu {
                    self.screen = Screen::Menu;
                    self.clear_status();
                } else if let Some((text, kind)) = status_to_set {
                    self.set_status(text, kind);
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn open_menu_item(&mut self, item: MenuItem, exit: &mut bool) -> Mode {
        if let Some(index) = MenuItem::ALL.iter().position(|entry| *entry == item) {
            self.menu_selected = index;
        }
        self.clear_status();
        match item {
            MenuItem::AddBook => Mode::AddingBook(BookForm::default()),
            MenuItem::Search => Mode::Searching(SearchForm::default()),
            MenuItem::DeleteBook => Mode::DeletingBook(DeleteForm::default()),
            MenuItem::Quit => {
                *exit = true;
                Mode::Normal
            }
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let outcome = form
                    .parse_inputs()
                    .and_then(|book| self.catalog.add_book(book));
                match outcome {
                    Ok(book) => {
                        self.set_status(
                            format!("Book added successfully (id {}).", book.id),
                            StatusKind::Info,
                        );
                        return Ok(Mode::Normal);
                    }
                    Err(err) => form.error = Some(expected_message(err)?),
                }
                return Ok(Mode::AddingBook(form));
            }
            _ => {}
        }
        form.error = None;
        Ok(Mode::AddingBook(form))
    }

    fn handle_search(&mut self, code: KeyCode, mut form: SearchForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let outcome = form.parse_inputs().and_then(|query| {
                    let books = self.catalog.search(&query)?;
                    Ok((query, books))
                });
                match outcome {
                    Ok((query, books)) => {
                        let records = Catalog::format_for_display(&books);
                        if records.is_empty() {
                            self.set_status("No books found.", StatusKind::Error);
                        } else {
                            self.set_status(
                                format!("Books found: {}", records.len()),
                                StatusKind::Info,
                            );
                        }
                        self.screen =
                            Screen::Results(ResultsScreen::new(records, describe_query(&query)));
                        return Ok(Mode::Normal);
                    }
                    Err(err) => form.error = Some(expected_message(err)?),
                }
                return Ok(Mode::Searching(form));
            }
            _ => {}
        }
        form.error = None;
        Ok(Mode::Searching(form))
    }

    fn handle_delete_by_id(&mut self, code: KeyCode, mut form: DeleteForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            KeyCode::Enter => {
                let outcome = form
                    .parse_inputs()
                    .and_then(|book_id| Ok((book_id, self.catalog.delete_book(book_id)?)));
                match outcome {
                    Ok((book_id, deleted)) => {
                        self.report_delete(book_id, deleted);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => form.error = Some(expected_message(err)?),
                }
                return Ok(Mode::DeletingBook(form));
            }
            _ => {}
        }
        form.error = None;
        Ok(Mode::DeletingBook(form))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.catalog.delete_book(confirm.id) {
                    Ok(deleted) => self.report_delete(confirm.id, deleted),
                    Err(err) => {
                        let message = expected_message(err)?;
                        self.set_status(message, StatusKind::Error);
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Delete cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmBookDelete(confirm)),
        }
    }

    fn report_delete(&mut self, book_id: i64, deleted: bool) {
        if deleted {
            if let Screen::Results(results) = &mut self.screen {
                results.remove(book_id);
            }
            self.set_status("Book deleted successfully.", StatusKind::Info);
        } else {
            self.set_status("Book not found with the provided ID.", StatusKind::Error);
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Menu => self.draw_menu(frame, content_area),
            Screen::Results(results) => self.draw_results(frame, content_area, results),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::Searching(form) => self.draw_search_form(frame, area, form),
            Mode::DeletingBook(form) => self.draw_delete_form(frame, area, form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Book Library")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let items: Vec<ListItem> = MenuItem::ALL
            .iter()
            .enumerate()
            .map(|(idx, item)| ListItem::new(format!("{}. {}", idx + 1, item.label())))
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.menu_selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect, results: &ResultsScreen) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let list_block = Block::default()
            .title(format!("Books ({})", results.heading))
            .borders(Borders::ALL);
        let inner = list_block.inner(columns[0]);
        frame.render_widget(list_block, columns[0]);

        if results.records.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                "No books found.",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(paragraph, inner);
        } else {
            let items: Vec<ListItem> = results
                .records
                .iter()
                .enumerate()
                .map(|(idx, record)| {
                    ListItem::new(format!(
                        "{}. {} by {}",
                        idx + 1,
                        record.title,
                        record.author_name
                    ))
                })
                .collect();

            let list = List::new(items)
                .highlight_style(Style::default().fg(Color::Yellow))
                .highlight_symbol("> ");
            let mut list_state = ListState::default();
            list_state.select(Some(results.selected));
            frame.render_stateful_widget(list, inner, &mut list_state);
        }

        let detail_block = Block::default().title("Details").borders(Borders::ALL);
        let detail_lines = results
            .current_record()
            .map(record_detail_lines)
            .unwrap_or_default();
        let details = Paragraph::new(detail_lines)
            .block(detail_block)
            .wrap(Wrap { trim: true });
        frame.render_widget(details, columns[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) | (_, Mode::Searching(_)) => &[
                ("[Tab]", " next field  "),
                ("[Enter]", " submit  "),
                ("[Esc]", " cancel"),
            ],
            (_, Mode::DeletingBook(_)) => &[("[Enter]", " delete  "), ("[Esc]", " cancel")],
            (_, Mode::ConfirmBookDelete(_)) => &[("[Y]", " confirm  "), ("[N]", " cancel")],
            (Screen::Menu, Mode::Normal) => &[
                ("[1-4]", " choose  "),
                ("[↑↓]", " move  "),
                ("[Enter]", " open  "),
                ("[q]", " quit"),
            ],
            (Screen::Results(_), Mode::Normal) => &[
                ("[↑↓]", " move  "),
                ("[Enter]", " select  "),
                ("[-]", " delete  "),
                ("[f]", " search  "),
                ("[Esc]", " menu  "),
                ("[q]", " quit"),
            ],
        };

        Line::from(
            pairs
                .iter()
                .flat_map(|(key, action)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(action.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(
            form.error.as_deref(),
            "Enter to save • Tab to switch • Esc to cancel",
        ));

        frame.render_widget(Paragraph::new(lines), inner);

        let row = BookField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_search_form(&self, frame: &mut Frame, area: Rect, form: &SearchForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Search Books").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = SearchField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(
            form.error.as_deref(),
            "Author wins over genre • blank lists every book",
        ));

        frame.render_widget(Paragraph::new(lines), inner);

        let row = SearchField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let prefix = format!("{}: ", form.active.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_delete_form(&self, frame: &mut Frame, area: Rect, form: &DeleteForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(),
            Line::from(""),
            form_hint(form.error.as_deref(), "Enter to delete • Esc to cancel"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        let prefix = "Book ID: ".len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.book_id.chars().count() as u16,
            inner.y,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Delete")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete \"{}\" by {} (id {})?",
                confirm.title, confirm.author_name, confirm.id
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    #[cfg(test)]
    fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }
}

/// Error line when the form holds one, otherwise the usage hint.
fn form_hint(error: Option<&str>, hint: &str) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )),
    }
}

/// Message for an error the user can act on; storage failures propagate.
fn expected_message(err: CatalogError) -> Result<String> {
    if err.is_expected() {
        Ok(err.to_string())
    } else {
        Err(err.into())
    }
}

fn describe_query(query: &SearchQuery) -> String {
    if let Some(book_id) = query.book_id {
        format!("id {book_id}")
    } else if let Some(author) = &query.author {
        format!("author {author}")
    } else if let Some(genre) = &query.genre {
        format!("genre {genre}")
    } else {
        "all".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use chrono::NaiveDate;

    fn seeded_app() -> App {
        let mut catalog = Catalog::open_in_memory().unwrap();
        let author = catalog.add_author("Jane Doe", None).unwrap();
        let genre = catalog.add_genre("Mystery").unwrap();
        catalog
            .add_book(NewBook {
                title: "The Case".to_string(),
                author_id: author.id,
                genre_id: Some(genre.id),
                publication_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
                isbn: "111".to_string(),
            })
            .unwrap();
        App::new(catalog)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn quit_from_menu() {
        let mut app = seeded_app();
        assert!(app.handle_key(KeyCode::Char('4')).unwrap());
    }

    #[test]
    fn invalid_menu_digit_reports_error() {
        let mut app = seeded_app();
        assert!(!app.handle_key(KeyCode::Char('9')).unwrap());
        assert_eq!(
            app.status_text(),
            Some("Invalid choice. Please select 1, 2, 3, or 4.")
        );
    }

    #[test]
    fn search_by_author_opens_results() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        type_text(&mut app, "Jane Doe");
        app.handle_key(KeyCode::Enter).unwrap();

        let Screen::Results(results) = &app.screen else {
            panic!("expected results screen");
        };
        assert_eq!(results.records.len(), 1);
        assert_eq!(results.records[0].genre_names, "Mystery");

        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.status_text(), Some("Selected Book: The Case by Jane Doe"));
    }

    #[test]
    fn bad_date_keeps_form_open_with_error() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('1')).unwrap();
        type_text(&mut app, "Another");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "1");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "2001-99-99");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "222");
        app.handle_key(KeyCode::Enter).unwrap();

        let Mode::AddingBook(form) = &app.mode else {
            panic!("form should stay open");
        };
        assert_eq!(
            form.error.as_deref(),
            Some("Invalid date format. Please use YYYY-MM-DD format.")
        );
        assert_eq!(app.catalog.list_books().unwrap().len(), 1);
    }

    #[test]
    fn delete_from_results_after_confirmation() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();

        assert_eq!(app.status_text(), Some("Book deleted successfully."));
        assert!(app.catalog.list_books().unwrap().is_empty());
    }

    #[test]
    fn deleting_unknown_id_reports_not_found() {
        let mut app = seeded_app();
        app.handle_key(KeyCode::Char('3')).unwrap();
        type_text(&mut app, "42");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(
            app.status_text(),
            Some("Book not found with the provided ID.")
        );
    }
}
