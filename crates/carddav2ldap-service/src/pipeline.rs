//! Batch synchronization of address books into the directory.

use std::collections::HashMap;

use crate::contact::ContactRecord;
use crate::extract::{Extractor, SkipReason};
use crate::mapper::map_contact;
use crate::policy::{FilterPolicy, Rejection};
use crate::reconcile::{Directory, Reconciled, reconcile};

/// vCard blobs fetched from one address book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBookBatch {
    pub id: String,
    pub blobs: Vec<String>,
}

impl AddressBookBatch {
    #[must_use]
    pub fn new(id: impl Into<String>, blobs: Vec<String>) -> Self {
        Self {
            id: id.into(),
            blobs,
        }
    }
}

/// What happened to one blob or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added,
    Updated { replaced: usize },
    Rejected(Rejection),
    Skipped(SkipReason),
    UpdateFailed(String),
    Failed(String),
}

/// Outcome of one contact, named for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Contact name, or a placeholder for blobs that never became a record.
    pub name: String,
    pub address_book: String,
    pub outcome: Outcome,
}

/// Counts of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records successfully extracted.
    pub parsed: usize,
    pub added: usize,
    pub updated: usize,
    /// Rejected by policy or skipped (parse errors, empty blobs, duplicates).
    pub skipped: usize,
    /// Create or update failures.
    pub failed: usize,
    pub outcomes: Vec<RecordOutcome>,
}

impl SyncReport {
    fn record(&mut self, name: String, address_book: &str, outcome: Outcome) {
        match &outcome {
            Outcome::Added => {
                self.added += 1;
                tracing::info!(contact = %name, address_book, "Added contact");
            }
            Outcome::Updated { replaced } => {
                self.updated += 1;
                tracing::info!(contact = %name, address_book, replaced, "Updated contact");
            }
            Outcome::Rejected(reason) => {
                self.skipped += 1;
                tracing::info!(contact = %name, address_book, %reason, "Contact rejected by filter");
            }
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                tracing::warn!(contact = %name, address_book, %reason, "Skipping contact");
            }
            Outcome::UpdateFailed(reason) => {
                self.failed += 1;
                tracing::error!(contact = %name, address_book, %reason, "Failed to update contact");
            }
            Outcome::Failed(reason) => {
                self.failed += 1;
                tracing::error!(contact = %name, address_book, %reason, "Failed to add contact");
            }
        }

        self.outcomes.push(RecordOutcome {
            name,
            address_book: address_book.to_string(),
            outcome,
        });
    }
}

/// Drives extraction, filtering, mapping and reconciliation for a run.
pub struct SyncPipeline<'a, D> {
    directory: &'a mut D,
    policy: &'a FilterPolicy,
    extractor: Extractor,
    base_dn: &'a str,
}

impl<'a, D: Directory> SyncPipeline<'a, D> {
    #[must_use]
    pub fn new(
        directory: &'a mut D,
        policy: &'a FilterPolicy,
        extractor: Extractor,
        base_dn: &'a str,
    ) -> Self {
        Self {
            directory,
            policy,
            extractor,
            base_dn,
        }
    }

    /// ## Summary
    /// Processes every blob of every address book in order.
    ///
    /// Records are handled one at a time; each directory call completes
    /// before the next record starts. No failure aborts the batch.
    #[tracing::instrument(skip_all, fields(books = books.len()))]
    pub async fn run(&mut self, books: Vec<AddressBookBatch>) -> SyncReport {
        let mut report = SyncReport::default();
        // Normalized DN -> address book of the record that claimed it
        let mut claimed: HashMap<String, String> = HashMap::new();

        for book in books {
            tracing::debug!(address_book = %book.id, blobs = book.blobs.len(), "Processing address book");

            for blob in &book.blobs {
                match self.extractor.extract(&book.id, blob) {
                    Ok(records) => {
                        report.parsed += records.len();
                        for record in records {
                            self.process(record, &mut claimed, &mut report).await;
                        }
                    }
                    Err(reason) => {
                        let preview: String = blob.chars().take(100).collect();
                        tracing::debug!(address_book = %book.id, %preview, "Unusable vCard blob");
                        report.record(format!("<blob in {}>", book.id), &book.id, Outcome::Skipped(reason));
                    }
                }
            }
        }

        tracing::info!(
            parsed = report.parsed,
            added = report.added,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            "Parsed {} contacts in total",
            report.parsed
        );

        report
    }

    async fn process(
        &mut self,
        record: ContactRecord,
        claimed: &mut HashMap<String, String>,
        report: &mut SyncReport,
    ) {
        if let Err(rejection) = self.policy.admit(&record) {
            report.record(record.full_name, &record.address_book, Outcome::Rejected(rejection));
            return;
        }

        let entry = map_contact(&record, self.base_dn);

        let key = claim_key(&entry.dn);
        if let Some(first_address_book) = claimed.get(&key) {
            tracing::warn!(
                contact = %record.full_name,
                first = %first_address_book,
                second = %record.address_book,
                "Two contacts share a name; keeping the first"
            );
            let reason = SkipReason::DuplicateName {
                first_address_book: first_address_book.clone(),
            };
            report.record(record.full_name, &record.address_book, Outcome::Skipped(reason));
            return;
        }
        claimed.insert(key, record.address_book.clone());

        let outcome = match reconcile(self.directory, &entry).await {
            Reconciled::Added => Outcome::Added,
            Reconciled::Updated { replaced } => Outcome::Updated { replaced },
            Reconciled::UpdateFailed(reason) => Outcome::UpdateFailed(reason),
            Reconciled::Failed(reason) => Outcome::Failed(reason),
        };
        report.record(record.full_name, &record.address_book, outcome);
    }
}

/// Directory servers compare `cn` case-insensitively, so `Jane Doe` and
/// `JANE  DOE` land on the same entry.
fn claim_key(dn: &str) -> String {
    dn.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
