//! Create-or-update reconciliation against a directory.

use std::future::Future;

use crate::mapper::{AttributeMap, MappedEntry};

/// Result of creating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateResult {
    Created,
    AlreadyExists,
    Failed(String),
}

/// Result of replacing attributes on an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    Updated,
    Failed(String),
}

/// Directory operations used by the reconciler.
///
/// Implementations fold transport errors into the `Failed` variants; neither
/// call returns an error of its own.
pub trait Directory {
    /// Adds a new entry with the full attribute set.
    fn create(
        &mut self,
        dn: &str,
        attributes: &AttributeMap,
    ) -> impl Future<Output = CreateResult> + Send;

    /// Replaces each listed attribute on an existing entry.
    fn update(
        &mut self,
        dn: &str,
        changeset: &AttributeMap,
    ) -> impl Future<Output = UpdateResult> + Send;
}

/// Final state of one reconciled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Added,
    /// `replaced` counts the attributes sent in the modify request.
    Updated { replaced: usize },
    UpdateFailed(String),
    Failed(String),
}

/// ## Summary
/// Creates the entry, falling back to an attribute replace when it already
/// exists.
///
/// Nothing is retried; every failure is returned as a [`Reconciled`] state.
#[tracing::instrument(skip(directory, entry), fields(dn = %entry.dn))]
pub async fn reconcile<D: Directory>(directory: &mut D, entry: &MappedEntry) -> Reconciled {
    match directory.create(&entry.dn, &entry.attributes).await {
        CreateResult::Created => Reconciled::Added,
        CreateResult::Failed(reason) => Reconciled::Failed(reason),
        CreateResult::AlreadyExists => {
            let changeset = entry.changeset();
            if changeset.is_empty() {
                tracing::debug!("Entry exists and has nothing to replace");
                return Reconciled::Updated { replaced: 0 };
            }

            match directory.update(&entry.dn, &changeset).await {
                UpdateResult::Updated => Reconciled::Updated {
                    replaced: changeset.len(),
                },
                UpdateResult::Failed(reason) => Reconciled::UpdateFailed(reason),
            }
        }
    }
}
