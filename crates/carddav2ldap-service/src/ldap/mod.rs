//! LDAP directory backed by an `ldap3` async session.

use std::collections::HashSet;
use std::time::Duration;

use carddav2ldap_core::config::Settings;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod};

use crate::error::ServiceResult;
use crate::mapper::AttributeMap;
use crate::reconcile::{CreateResult, Directory, UpdateResult};

/// `entryAlreadyExists` (RFC 4511 §4.1.9).
pub const RC_ENTRY_ALREADY_EXISTS: u32 = 68;
const RC_SUCCESS: u32 = 0;

/// A bound LDAP session, reused for every record of a run.
pub struct LdapDirectory {
    ldap: Ldap,
}

impl LdapDirectory {
    /// ## Summary
    /// Connects to the configured server and performs a simple bind.
    ///
    /// ## Errors
    /// Returns an error if the connection cannot be established within the
    /// configured timeout or the bind is refused.
    #[tracing::instrument(skip(settings), fields(server = %settings.ldap_server, user = %settings.ldap_user))]
    pub async fn connect(settings: &Settings) -> ServiceResult<Self> {
        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(settings.ldap_timeout_secs));

        let (conn, mut ldap) =
            LdapConnAsync::with_settings(conn_settings, &settings.ldap_server).await?;
        ldap3::drive!(conn);

        ldap.simple_bind(&settings.ldap_user, &settings.ldap_password)
            .await?
            .success()?;

        tracing::info!("Bound to LDAP server");
        Ok(Self { ldap })
    }

    /// ## Summary
    /// Ends the session.
    ///
    /// ## Errors
    /// Returns an error if the unbind request cannot be sent.
    pub async fn unbind(mut self) -> ServiceResult<()> {
        self.ldap.unbind().await?;
        tracing::info!("Disconnected from LDAP server");
        Ok(())
    }
}

impl Directory for LdapDirectory {
    async fn create(&mut self, dn: &str, attributes: &AttributeMap) -> CreateResult {
        match self.ldap.add(dn, add_request(attributes)).await {
            Ok(result) => create_result(&result),
            Err(e) => CreateResult::Failed(e.to_string()),
        }
    }

    async fn update(&mut self, dn: &str, changeset: &AttributeMap) -> UpdateResult {
        match self.ldap.modify(dn, replace_mods(changeset)).await {
            Ok(result) if result.rc == RC_SUCCESS => UpdateResult::Updated,
            Ok(result) => UpdateResult::Failed(describe(&result)),
            Err(e) => UpdateResult::Failed(e.to_string()),
        }
    }
}

/// Classifies the result of an add operation.
#[must_use]
pub fn create_result(result: &LdapResult) -> CreateResult {
    match result.rc {
        RC_SUCCESS => CreateResult::Created,
        RC_ENTRY_ALREADY_EXISTS => CreateResult::AlreadyExists,
        _ => CreateResult::Failed(describe(result)),
    }
}

fn describe(result: &LdapResult) -> String {
    if result.text.is_empty() {
        format!("result code {}", result.rc)
    } else {
        format!("result code {}: {}", result.rc, result.text)
    }
}

fn add_request(attributes: &AttributeMap) -> Vec<(Vec<u8>, HashSet<Vec<u8>>)> {
    attributes
        .iter()
        .map(|(name, values)| (name.as_bytes().to_vec(), values.iter().cloned().collect()))
        .collect()
}

fn replace_mods(changeset: &AttributeMap) -> Vec<Mod<Vec<u8>>> {
    changeset
        .iter()
        .map(|(name, values)| Mod::Replace(name.as_bytes().to_vec(), values.iter().cloned().collect()))
        .collect()
}
