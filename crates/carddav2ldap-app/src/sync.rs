//! One synchronization run.

use carddav2ldap_core::config::Settings;
use carddav2ldap_service::carddav::CardDavClient;
use carddav2ldap_service::extract::Extractor;
use carddav2ldap_service::ldap::LdapDirectory;
use carddav2ldap_service::pipeline::{SyncPipeline, SyncReport};
use carddav2ldap_service::policy::FilterPolicy;

use crate::error::{AppError, AppResult};

/// ## Summary
/// Fetches every admitted address book and reconciles its contacts into
/// the directory.
///
/// ## Side Effects
/// - Issues `PROPFIND` requests against the `CardDAV` server
/// - Adds and modifies entries below the configured base DN
///
/// ## Errors
/// Returns an error if the client cannot be built, discovery fails or the
/// initial LDAP connection or bind fails. Per-record and per-book failures
/// are reported in the [`SyncReport`] instead.
#[tracing::instrument(skip(settings), fields(base_dn = %settings.ldap_base_dn))]
pub async fn run(settings: &Settings) -> AppResult<SyncReport> {
    let policy = FilterPolicy::from_settings(settings);
    let client = CardDavClient::new(settings)?;

    let books = client.collect(&policy).await.map_err(AppError::Discovery)?;
    tracing::info!(address_books = books.len(), "Fetched address books");

    let mut directory = LdapDirectory::connect(settings)
        .await
        .map_err(AppError::LdapConnect)?;

    let report = SyncPipeline::new(
        &mut directory,
        &policy,
        Extractor::new(settings.import_photos),
        &settings.ldap_base_dn,
    )
    .run(books)
    .await;

    if let Err(e) = directory.unbind().await {
        tracing::warn!(error = %e, "LDAP unbind failed");
    }

    Ok(report)
}
