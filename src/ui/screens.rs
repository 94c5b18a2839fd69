use crate::models::BookRecord;

/// Entries of the main menu, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MenuItem {
    AddBook,
    Search,
    DeleteBook,
    Quit,
}

impl MenuItem {
    pub(crate) const ALL: [MenuItem; 4] = [
        MenuItem::AddBook,
        MenuItem::Search,
        MenuItem::DeleteBook,
        MenuItem::Quit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuItem::AddBook => "Add a book",
            MenuItem::Search => "Search for a book",
            MenuItem::DeleteBook => "Delete a book",
            MenuItem::Quit => "Quit",
        }
    }

    /// Menu entry for a 1-based shortcut digit.
    pub(crate) fn from_digit(ch: char) -> Option<Self> {
        let index = ch.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Search results plus the highlighted row.
pub(crate) struct ResultsScreen {
    pub(crate) records: Vec<BookRecord>,
    pub(crate) selected: usize,
    /// Short description of the search that produced these rows.
    pub(crate) heading: String,
}

impl ResultsScreen {
    pub(crate) fn new(records: Vec<BookRecord>, heading: String) -> Self {
        Self {
            records,
            selected: 0,
            heading,
        }
    }

    pub(crate) fn current_record(&self) -> Option<&BookRecord> {
        self.records.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let len = self.records.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.records.len().saturating_sub(1);
    }

    /// Drop a deleted book from the list and keep the selection in range.
    pub(crate) fn remove(&mut self, book_id: i64) {
        self.records.retain(|record| record.id != book_id);
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> BookRecord {
        BookRecord {
            id,
            title: format!("Book {id}"),
            author_name: "Jane Doe".to_string(),
            genre_names: String::new(),
            publication_date: "2000-01-01".to_string(),
            isbn: id.to_string(),
        }
    }

    #[test]
    fn selection_is_clamped() {
        let mut screen = ResultsScreen::new(vec![record(1), record(2), record(3)], String::new());
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.move_selection(-10);
        assert_eq!(screen.selected, 0);
        screen.select_last();
        assert_eq!(screen.current_record().map(|r| r.id), Some(3));
    }

    #[test]
    fn removing_last_row_moves_selection_back() {
        let mut screen = ResultsScreen::new(vec![record(1), record(2)], String::new());
        screen.select_last();
        screen.remove(2);
        assert_eq!(screen.selected, 0);
        screen.remove(1);
        assert!(screen.current_record().is_none());
    }

    #[test]
    fn digits_map_to_menu_entries() {
        assert_eq!(MenuItem::from_digit('1'), Some(MenuItem::AddBook));
        assert_eq!(MenuItem::from_digit('4'), Some(MenuItem::Quit));
        assert_eq!(MenuItem::from_digit('0'), None);
        assert_eq!(MenuItem::from_digit('5'), None);
    }
}
