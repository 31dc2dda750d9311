//! Inline editing of display sequences.
//!
//! ## Summary
//! A row shows its sequence until the user starts editing it. While editing,
//! the raw text is kept per record. Committing (blur or Enter) validates the
//! text: anything but a positive integer silently reverts to the shown value
//! with no call issued. A valid value is written through the store, after
//! which the family table and, for sub-families, the owning family's child
//! view are refetched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{ChildCache, FamilyTable};
use crate::error::ServiceResult;
use crate::model::SequenceTarget;
use crate::store::FamilyStore;
use crate::sync::lock;

/// Result of [`SequenceEditor::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The record was not being edited.
    NotEditing,
    /// Invalid input; the row shows `value` again and nothing was sent.
    Reverted { value: u32 },
    /// `value` was written.
    Committed { value: u32 },
}

#[derive(Debug, Clone)]
struct SequenceEdit {
    original: u32,
    raw: String,
}

/// Parses sequence input: ASCII digits only, value at least 1.
#[must_use]
pub fn parse_sequence(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|value| *value >= 1)
}

pub struct SequenceEditor {
    store: Arc<dyn FamilyStore>,
    families: Arc<FamilyTable>,
    children: Arc<ChildCache>,
    edits: Mutex<HashMap<SequenceTarget, SequenceEdit>>,
}

impl SequenceEditor {
    #[must_use]
    pub fn new(
        store: Arc<dyn FamilyStore>,
        families: Arc<FamilyTable>,
        children: Arc<ChildCache>,
    ) -> Self {
        Self {
            store,
            families,
            children,
            edits: Mutex::new(HashMap::new()),
        }
    }

    /// Starts editing `target`, whose row currently shows `current`.
    pub fn begin(&self, target: SequenceTarget, current: u32) {
        lock(&self.edits).insert(
            target,
            SequenceEdit {
                original: current,
                raw: current.to_string(),
            },
        );
    }

    /// Replaces the raw text being edited. Returns `false` if `target` is
    /// not being edited.
    pub fn change(&self, target: SequenceTarget, raw_input: &str) -> bool {
        lock(&self.edits).get_mut(&target).is_some_and(|edit| {
            raw_input.clone_into(&mut edit.raw);
            true
        })
    }

    /// Raw text of an edit in progress.
    #[must_use]
    pub fn editing(&self, target: SequenceTarget) -> Option<String> {
        lock(&self.edits).get(&target).map(|edit| edit.raw.clone())
    }

    /// Abandons the edit (Escape). Returns the value the row shows again.
    pub fn cancel(&self, target: SequenceTarget) -> Option<u32> {
        lock(&self.edits).remove(&target).map(|edit| edit.original)
    }

    /// ## Summary
    /// Ends the edit of `target` (blur or Enter).
    ///
    /// Invalid or empty input reverts without a call. Valid input is
    /// reflected in the cached row at once, then written with exactly one
    /// `update_sequence` call.
    ///
    /// ## Side Effects
    /// - Refetches the family table
    /// - Refetches the owning family's child view for sub-family targets
    ///
    /// ## Errors
    /// Returns the update error. The affected views are refetched so the
    /// locally applied value does not outlive a rejected update.
    #[tracing::instrument(skip(self))]
    pub async fn commit(&self, target: SequenceTarget) -> ServiceResult<CommitOutcome> {
        let edit = lock(&self.edits).remove(&target);
        let Some(edit) = edit else {
            return Ok(CommitOutcome::NotEditing);
        };

        let Some(value) = parse_sequence(&edit.raw) else {
            tracing::debug!(raw = %edit.raw, original = edit.original, "Invalid sequence input, reverting");
            return Ok(CommitOutcome::Reverted {
                value: edit.original,
            });
        };

        self.apply_locally(target, value);

        if let Err(e) = self.store.update_sequence(target, value).await {
            tracing::warn!(error = %e, value, "Sequence update failed, restoring views");
            self.refresh(target).await;
            return Err(e);
        }

        tracing::debug!(value, "Sequence updated");
        self.refresh(target).await;
        Ok(CommitOutcome::Committed { value })
    }

    fn apply_locally(&self, target: SequenceTarget, value: u32) {
        match target {
            SequenceTarget::Family(id) => {
                self.families.apply_local_sequence(id, value);
            }
            SequenceTarget::SubFamily { parent_id, id } => {
                self.children.apply_local_sequence(parent_id, id, value);
            }
        }
    }

    /// Refetch failures leave the previous rows displayed; they are logged by
    /// the cache and do not fail the commit.
    async fn refresh(&self, target: SequenceTarget) {
        if let Err(e) = self.families.invalidate().await {
            tracing::warn!(error = %e, "Family table refresh failed");
        }
        if let SequenceTarget::SubFamily { parent_id, .. } = target
            && let Err(e) = self.children.invalidate(parent_id).await
        {
            tracing::warn!(error = %e, %parent_id, "Child view refresh failed");
        }
    }
}
