// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Unselected,
    PartiallySelected,
    AllSelected,
}

/// Row selection tracked against the list currently on screen.
///
/// The selected set is always a subset of the displayed identifiers. Every
/// call to [`Selection::replace_list`] starts a new generation and drops the
/// selection, even when the new list carries the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<Id: Ord + Clone> {
    displayed: Vec<Id>,
    selected: BTreeSet<Id>,
    generation: u64,
}

impl<Id: Ord + Clone> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            displayed: Vec::new(),
            selected: BTreeSet::new(),
            generation: 0,
        }
    }
}

impl<Id: Ord + Clone> Selection<Id> {
    pub fn replace_list(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.displayed = ids.into_iter().collect();
        self.selected.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Flips membership of `id`. Ids that are not on screen are ignored.
    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: &Id) -> bool {
        if !self.displayed.contains(id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.displayed.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn displayed(&self) -> &[Id] {
        &self.displayed
    }

    pub fn selected(&self) -> &BTreeSet<Id> {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    pub fn all_selected(&self) -> bool {
        self.phase() == SelectionPhase::AllSelected
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.selected.is_empty() {
            SelectionPhase::Unselected
        } else if self.selected.len() == self.distinct_displayed() {
            SelectionPhase::AllSelected
        } else {
            SelectionPhase::PartiallySelected
        }
    }

    fn distinct_displayed(&self) -> usize {
        self.displayed.iter().collect::<BTreeSet<_>>().len()
    }
}

/// Order view gate. Once engaged it stays engaged for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterLatch {
    #[default]
    ShowingAll,
    ShowingFiltered,
}

impl FilterLatch {
    pub fn engage(&mut self) {
        *self = Self::ShowingFiltered;
    }

    pub const fn is_engaged(self) -> bool {
        matches!(self, Self::ShowingFiltered)
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterLatch, Selection, SelectionPhase};

    fn selection_of(ids: &[&str]) -> Selection<String> {
        let mut selection = Selection::default();
        selection.replace_list(ids.iter().map(|id| (*id).to_owned()));
        selection
    }

    #[test]
    fn toggle_moves_through_phases() {
        let mut selection = selection_of(&["a", "b"]);
        assert_eq!(selection.phase(), SelectionPhase::Unselected);

        assert!(selection.toggle(&"a".to_owned()));
        assert_eq!(selection.phase(), SelectionPhase::PartiallySelected);

        assert!(selection.toggle(&"b".to_owned()));
        assert_eq!(selection.phase(), SelectionPhase::AllSelected);
        assert!(selection.all_selected());

        assert!(!selection.toggle(&"a".to_owned()));
        assert_eq!(selection.phase(), SelectionPhase::PartiallySelected);
        assert!(!selection.is_selected(&"a".to_owned()));
        assert!(selection.is_selected(&"b".to_owned()));
    }

    #[test]
    fn toggle_ignores_ids_not_on_screen() {
        let mut selection = selection_of(&["a"]);
        assert!(!selection.toggle(&"ghost".to_owned()));
        assert_eq!(selection.selected_count(), 0);
    }

    #[test]
    fn replacement_clears_even_when_ids_repeat() {
        let mut selection = selection_of(&["a", "b"]);
        selection.select_all();
        let before = selection.generation();

        selection.replace_list(["a".to_owned(), "b".to_owned()]);
        assert_eq!(selection.selected_count(), 0);
        assert_eq!(selection.phase(), SelectionPhase::Unselected);
        assert_eq!(selection.generation(), before + 1);
    }

    #[test]
    fn replacement_never_leaves_stale_ids() {
        let mut selection = selection_of(&["a", "b", "c"]);
        selection.toggle(&"c".to_owned());
        selection.replace_list(["a".to_owned()]);
        assert!(
            selection
                .selected()
                .iter()
                .all(|id| selection.displayed().contains(id))
        );
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn select_all_then_clear_returns_to_unselected_for_any_size() {
        for ids in [&[][..], &["a"][..], &["a", "b", "c"][..]] {
            let mut selection = selection_of(ids);
            selection.select_all();
            assert_eq!(selection.selected_count(), ids.len());
            selection.clear();
            assert_eq!(selection.phase(), SelectionPhase::Unselected);
            assert!(selection.selected().is_empty());
        }
    }

    #[test]
    fn empty_list_is_never_all_selected() {
        let mut selection = selection_of(&[]);
        selection.select_all();
        assert!(!selection.all_selected());
        assert_eq!(selection.phase(), SelectionPhase::Unselected);
    }

    #[test]
    fn latch_only_moves_forward() {
        let mut latch = FilterLatch::default();
        assert!(!latch.is_engaged());
        latch.engage();
        assert!(latch.is_engaged());
        latch.engage();
        assert_eq!(latch, FilterLatch::ShowingFiltered);
    }
}
