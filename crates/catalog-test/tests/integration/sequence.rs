#![allow(clippy::expect_used)]
//! Tests for inline sequence editing.
//!
//! Verifies revert on invalid input, single update per commit, and view
//! refresh for family and sub-family rows.

use catalog_test::service::model::SequenceTarget;

use super::helpers::*;

fn updates(harness: &Harness) -> Vec<Call> {
    harness
        .store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::UpdateSequence { .. }))
        .collect()
}

fn family_names(harness: &Harness) -> Vec<String> {
    harness
        .catalog
        .families()
        .view()
        .map(|v| v.items.into_iter().map(|f| f.name).collect())
        .unwrap_or_default()
}

/// ## Summary
/// Non-numeric input reverts to the previous value and issues no call.
#[test_log::test(tokio::test)]
async fn invalid_input_reverts_without_call() {
    let harness = Harness::new();
    let family = harness.seed_family("iPhone", 1).await;
    harness
        .catalog
        .families()
        .ensure_loaded()
        .await
        .expect("Failed to load");
    harness.store.clear_calls();

    let editor = harness.catalog.sequences();
    let target = SequenceTarget::Family(family.id);
    editor.begin(target, 1);
    assert!(editor.change(target, "abc"));
    assert_eq!(editor.editing(target).as_deref(), Some("abc"));

    let outcome = editor.commit(target).await.expect("Commit failed");

    assert_eq!(outcome, CommitOutcome::Reverted { value: 1 });
    assert!(harness.store.calls().is_empty());
    assert!(editor.editing(target).is_none());
}

/// ## Summary
/// Empty and zero input revert as well.
#[test_log::test(tokio::test)]
async fn empty_and_zero_revert() {
    let harness = Harness::new();
    let family = harness.seed_family("iPhone", 4).await;
    harness.store.clear_calls();

    let editor = harness.catalog.sequences();
    let target = SequenceTarget::Family(family.id);
    for raw in ["", "0", "-2", "1.5"] {
        editor.begin(target, 4);
        editor.change(target, raw);
        let outcome = editor.commit(target).await.expect("Commit failed");
        assert_eq!(outcome, CommitOutcome::Reverted { value: 4 }, "{raw:?}");
    }
    assert!(updates(&harness).is_empty());
}

/// ## Summary
/// A valid value issues exactly one update and the table is re-sorted.
#[test_log::test(tokio::test)]
async fn valid_family_sequence_updates_once() {
    let harness = Harness::new();
    let iphone = harness.seed_family("iPhone", 1).await;
    harness.seed_family("iPad", 2).await;
    harness.seed_family("Mac", 3).await;
    harness
        .catalog
        .families()
        .ensure_loaded()
        .await
        .expect("Failed to load");
    harness.store.clear_calls();

    let editor = harness.catalog.sequences();
    let target = SequenceTarget::Family(iphone.id);
    editor.begin(target, 1);
    editor.change(target, "3");
    let outcome = editor.commit(target).await.expect("Commit failed");

    assert_eq!(outcome, CommitOutcome::Committed { value: 3 });
    assert_eq!(
        updates(&harness),
        vec![Call::UpdateSequence {
            target,
            sequence: 3,
        }]
    );
    // iPhone and Mac share 3; iPhone was created first.
    assert_eq!(family_names(&harness), vec!["iPad", "iPhone", "Mac"]);
    assert_eq!(
        harness.catalog.families().row(iphone.id).map(|f| f.sequence),
        Some(3)
    );
}

/// ## Summary
/// A sub-family edit refetches both the family table and the owning child view.
#[test_log::test(tokio::test)]
async fn sub_family_sequence_refreshes_child_view() {
    let harness = Harness::new();
    let family = harness.seed_family("iPhone", 1).await;
    let ids = harness.seed_children(&family, "Model", 3).await;
    harness
        .catalog
        .families()
        .ensure_loaded()
        .await
        .expect("Failed to load");
    harness
        .catalog
        .children()
        .expand(family.id)
        .await
        .expect("Failed to expand");
    harness.store.clear_calls();

    let editor = harness.catalog.sequences();
    let target = SequenceTarget::SubFamily {
        parent_id: family.id,
        id: ids[0],
    };
    editor.begin(target, 1);
    editor.change(target, "9");
    let outcome = editor.commit(target).await.expect("Commit failed");

    assert_eq!(outcome, CommitOutcome::Committed { value: 9 });
    assert_eq!(updates(&harness).len(), 1);
    assert_eq!(
        harness
            .store
            .count(|c| matches!(c, Call::ListFamilies { .. })),
        1
    );
    assert_eq!(harness.store.child_fetches().len(), 1);
    assert_eq!(
        harness.child_names(family.id),
        vec!["Model 2", "Model 3", "Model 1"]
    );
}

/// ## Summary
/// Cancelling restores the shown value without a call.
#[test_log::test(tokio::test)]
async fn cancel_restores_value() {
    let harness = Harness::new();
    let family = harness.seed_family("iPhone", 2).await;
    harness.store.clear_calls();

    let editor = harness.catalog.sequences();
    let target = SequenceTarget::Family(family.id);
    editor.begin(target, 2);
    editor.change(target, "7");

    assert_eq!(editor.cancel(target), Some(2));
    assert_eq!(
        editor.commit(target).await.expect("Commit failed"),
        CommitOutcome::NotEditing
    );
    assert!(harness.store.calls().is_empty());
}

/// ## Summary
/// A rejected update surfaces the error and the refetch puts the stored
/// value back on display.
#[test_log::test(tokio::test)]
async fn failed_update_restores_view() {
    let harness = Harness::new();
    let iphone = harness.seed_family("iPhone", 1).await;
    harness.seed_family("iPad", 2).await;
    harness
        .catalog
        .families()
        .ensure_loaded()
        .await
        .expect("Failed to load");

    harness.store.fail_sequences(1);
    let editor = harness.catalog.sequences();
    let target = SequenceTarget::Family(iphone.id);
    editor.begin(target, 1);
    editor.change(target, "5");

    let err = editor.commit(target).await.expect_err("Update should fail");

    assert!(err.is_transient());
    assert_eq!(family_names(&harness), vec!["iPhone", "iPad"]);
    assert_eq!(
        harness.catalog.families().row(iphone.id).map(|f| f.sequence),
        Some(1)
    );
}
