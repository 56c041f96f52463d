//! Per-screen state container: the authoritative collection for that screen,
//! a free-text filter, and the open/closed state of its one record editor.
//!
//! Screens own their collection exclusively; there is no cross-screen shared
//! mutable state, so handlers mutate through `&mut` and nothing else.

use crate::model::{ClassInfo, Grade, Student, Teacher};

pub trait Listed {
    fn entity_id(&self) -> i64;
    /// Fields the text filter matches against, fixed per entity type.
    fn search_fields(&self) -> Vec<&str>;
}

impl Listed for Teacher {
    fn entity_id(&self) -> i64 {
        self.id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.designation, &self.department]
    }
}

impl Listed for Student {
    fn entity_id(&self) -> i64 {
        self.id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.student_no, &self.grade, &self.section]
    }
}

impl Listed for ClassInfo {
    fn entity_id(&self) -> i64 {
        self.id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.section]
    }
}

impl Listed for Grade {
    fn entity_id(&self) -> i64 {
        self.id
    }
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.student_name, &self.subject, &self.assessment]
    }
}

/// Record editor lifecycle. Closed -> Creating / Editing(entity) -> Closed.
/// The editor holds no state across opens; reopening resets it entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState<T> {
    Closed,
    Creating,
    Editing(T),
}

impl<T> EditorState<T> {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }
}

#[derive(Debug)]
pub struct ListScreen<T> {
    items: Vec<T>,
    query: String,
    editor: EditorState<T>,
}

impl<T> Default for ListScreen<T> {
    fn default() -> Self {
        ListScreen {
            items: Vec::new(),
            query: String::new(),
            editor: EditorState::Closed,
        }
    }
}

impl<T: Listed + Clone> ListScreen<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection after a fetch. A failed fetch never reaches
    /// this point, so the screen shows either fresh data or nothing.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Case-insensitive substring match across the entity's search fields.
    /// An empty query yields the whole collection.
    pub fn filtered(&self) -> Vec<&T> {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| {
                item.search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|i| i.entity_id() == id)
    }

    pub fn editor(&self) -> &EditorState<T> {
        &self.editor
    }

    pub fn open_editor_create(&mut self) {
        self.editor = EditorState::Creating;
    }

    /// Opens the editor on an existing row. The entity must be present in
    /// the collection.
    pub fn open_editor_edit(&mut self, id: i64) -> bool {
        match self.find(id).cloned() {
            Some(entity) => {
                self.editor = EditorState::Editing(entity);
                true
            }
            None => false,
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// Merges a persisted entity back into the collection: replace by id on
    /// update, append on create. Closes the editor; called only after the
    /// save succeeded.
    pub fn apply_saved(&mut self, entity: T) {
        let id = entity.entity_id();
        match self.items.iter_mut().find(|i| i.entity_id() == id) {
            Some(slot) => *slot = entity,
            None => self.items.push(entity),
        }
        self.editor = EditorState::Closed;
    }

    /// Removes a row after the backend confirmed the delete. Returns false
    /// if the row was not present.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.entity_id() != id);
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: String,
        email: String,
    }

    impl Listed for Row {
        fn entity_id(&self) -> i64 {
            self.id
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.name, &self.email]
        }
    }

    fn row(id: i64, name: &str, email: &str) -> Row {
        Row {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn screen() -> ListScreen<Row> {
        let mut s = ListScreen::new();
        s.set_items(vec![
            row(1, "Sarah Johnson", "sarah@school.edu"),
            row(2, "Mike Chen", "mike@school.edu"),
            row(3, "Aisha Khan", "aisha.khan@school.edu"),
        ]);
        s
    }

    #[test]
    fn empty_query_returns_full_collection() {
        let mut s = screen();
        s.set_query("   ");
        assert_eq!(s.filtered().len(), 3);
    }

    #[test]
    fn filter_is_case_insensitive_substring_over_all_fields() {
        let mut s = screen();
        s.set_query("KHAN");
        let hits = s.filtered();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 3);
        // Matches the email field too.
        s.set_query("mike@");
        assert_eq!(s.filtered().len(), 1);
        s.set_query("zzz");
        assert!(s.filtered().is_empty());
    }

    #[test]
    fn filter_recomputes_when_collection_changes() {
        let mut s = screen();
        s.set_query("school.edu");
        assert_eq!(s.filtered().len(), 3);
        s.set_items(vec![row(9, "New Person", "new@other.org")]);
        assert!(s.filtered().is_empty());
    }

    #[test]
    fn editor_resets_on_each_open() {
        let mut s = screen();
        assert!(s.open_editor_edit(2));
        assert_eq!(
            s.editor(),
            &EditorState::Editing(row(2, "Mike Chen", "mike@school.edu"))
        );
        s.open_editor_create();
        assert_eq!(s.editor(), &EditorState::Creating);
        assert!(!s.open_editor_edit(42));
        s.close_editor();
        assert!(!s.editor().is_open());
    }

    #[test]
    fn apply_saved_replaces_by_id_or_appends() {
        let mut s = screen();
        s.open_editor_edit(2);
        s.apply_saved(row(2, "Mike C.", "mike@school.edu"));
        assert_eq!(s.find(2).expect("row").name, "Mike C.");
        assert_eq!(s.len(), 3);
        assert!(!s.editor().is_open());

        s.open_editor_create();
        s.apply_saved(row(4, "Dana Ortiz", "dana@school.edu"));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn remove_only_drops_the_confirmed_row() {
        let mut s = screen();
        assert!(s.remove(1));
        assert_eq!(s.len(), 2);
        assert!(!s.remove(1));
    }
}
