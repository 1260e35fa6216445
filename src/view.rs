//! List view state: the fetched collection, the active criteria, the visible
//! subset and the row selection used for bulk actions.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::filter::Criteria;
use crate::models::Record;

pub struct ListView<T: Record, C: Criteria<T>> {
    records: Vec<T>,
    criteria: C,
    visible: Vec<usize>,
    /// Ids in the order they were selected.
    selected: Vec<T::Id>,
    diagnostics: Diagnostics,
}

impl<T: Record, C: Criteria<T>> ListView<T, C> {
    pub fn new(records: Vec<T>, criteria: C) -> Self {
        let mut view = Self {
            records,
            criteria,
            visible: Vec::new(),
            selected: Vec::new(),
            diagnostics: Diagnostics::new(),
        };
        view.refresh();
        view
    }

    /// Full re-scan of the source collection.
    fn refresh(&mut self) {
        self.diagnostics.clear();
        self.visible = crate::filter::filter_indices(&self.records, &self.criteria, &mut self.diagnostics);
    }

    pub fn criteria(&self) -> &C {
        &self.criteria
    }

    /// Replace the criteria. The selection is cleared.
    pub fn set_criteria(&mut self, criteria: C) {
        self.criteria = criteria;
        self.selected.clear();
        self.refresh();
    }

    /// Edit the criteria in place. The selection is cleared.
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut C)) {
        edit(&mut self.criteria);
        self.selected.clear();
        self.refresh();
    }

    /// Swap in a re-fetched collection. The selection is cleared.
    pub fn replace_records(&mut self, records: Vec<T>) {
        self.records = records;
        self.selected.clear();
        self.refresh();
    }

    /// Drop one record after it was deleted remotely. Other selections survive.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let pos = self.records.iter().position(|r| r.id() == id)?;
        let removed = self.records.remove(pos);
        self.selected.retain(|s| *s != id);
        self.refresh();
        Some(removed)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn visible(&self) -> Vec<&T> {
        self.visible.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Aggregates over the visible rows only.
    pub fn summary(&self) -> C::Summary {
        C::summarize(&self.visible())
    }

    /// Select every visible row, or clear the selection.
    pub fn select_all(&mut self, on: bool) {
        self.selected.clear();
        if on {
            self.selected = self.visible.iter().map(|&i| self.records[i].id()).collect();
        }
    }

    /// Flip one visible row. Returns false, leaving the selection untouched,
    /// when `id` is not in the current view.
    pub fn toggle(&mut self, id: T::Id) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
        true
    }

    pub fn is_visible(&self, id: T::Id) -> bool {
        self.visible.iter().any(|&i| self.records[i].id() == id)
    }

    pub fn is_selected(&self, id: T::Id) -> bool {
        self.selected.contains(&id)
    }

    /// True only when something is visible and every visible row is selected.
    pub fn all_selected(&self) -> bool {
        !self.visible.is_empty()
            && self
                .visible
                .iter()
                .all(|&i| self.selected.contains(&self.records[i].id()))
    }

    pub fn selected_ids(&self) -> &[T::Id] {
        &self.selected
    }

    /// Loaded records for the selection, in selection order. Ids whose record is
    /// gone are skipped and noted in `diagnostics`.
    pub fn selected_records(&self, diagnostics: &mut Diagnostics) -> Vec<&T> {
        self.selected
            .iter()
            .filter_map(|id| {
                let found = self.records.iter().find(|r| r.id() == *id);
                if found.is_none() {
                    diagnostics.record(Diagnostic::SelectionSkipped { id: id.to_string() });
                }
                found
            })
            .collect()
    }
}
