use std::collections::BTreeSet;

use crate::{error::Result, store::CropStore};

/// New membership of an id after [`SelectionSet::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// Per-id outcome of a batch delete.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub outcomes: Vec<(String, Result<()>)>,
}

impl DeleteReport {
    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.deleted()
    }

    pub fn deleted_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| id.as_str())
    }
}

/// Saved-crop identifiers marked for deletion.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    selected: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) -> Toggle {
        if self.selected.remove(id) {
            Toggle::Deselected
        } else {
            self.selected.insert(id.to_string());
            Toggle::Selected
        }
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Drops ids that no longer exist in `ids`.
    pub fn retain_existing(&mut self, ids: &[String]) {
        self.selected.retain(|id| ids.contains(id));
    }

    /// Deletes every selected crop from `store`, carrying on past failures.
    /// The selection is empty afterwards whatever the outcome.
    pub fn apply_delete<S: CropStore + ?Sized>(&mut self, store: &mut S) -> DeleteReport {
        let mut report = DeleteReport::default();
        for id in std::mem::take(&mut self.selected) {
            let result = store.delete(&id);
            match &result {
                Ok(()) => log::info!("Deleted {id}"),
                Err(err) => log::warn!("{err}"),
            }
            report.outcomes.push((id, result));
        }
        report
    }
}
