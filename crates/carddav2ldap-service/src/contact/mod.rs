//! Normalized contact record built from one vCard.

mod phone;

pub use phone::{PhoneCategory, PhoneNumber, Phones, clean_phone};

use carddav2ldap_core::constants::UNKNOWN_CONTACT;

/// Decoded JPEG payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("len", &self.data.len())
            .finish()
    }
}

/// First postal address of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postal {
    pub street: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
}

/// Organization name and unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationInfo {
    pub name: Option<String>,
    pub unit: Option<String>,
}

/// A contact normalized for directory mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    /// Identifier of the source address book.
    pub address_book: String,
    /// vCard UID, if any.
    pub uid: Option<String>,
    /// Display name; never empty.
    pub full_name: String,
    pub given_name: String,
    /// Never empty once extraction completes.
    pub surname: String,
    /// Trimmed, non-empty email addresses in source order.
    pub emails: Vec<String>,
    pub phones: Phones,
    pub postal: Postal,
    pub organization: OrganizationInfo,
    pub job_title: Option<String>,
    /// Trimmed, non-empty categories without duplicates, in source order.
    pub categories: Vec<String>,
    pub photo: Option<Photo>,
}

impl ContactRecord {
    /// Creates an empty record named after the default display name.
    #[must_use]
    pub fn new(address_book: impl Into<String>) -> Self {
        Self {
            address_book: address_book.into(),
            uid: None,
            full_name: UNKNOWN_CONTACT.to_string(),
            given_name: String::new(),
            surname: String::new(),
            emails: Vec::new(),
            phones: Phones::default(),
            postal: Postal::default(),
            organization: OrganizationInfo::default(),
            job_title: None,
            categories: Vec::new(),
            photo: None,
        }
    }

    /// Whether the display name fell back to the default.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.full_name == UNKNOWN_CONTACT
    }

    /// Domain part (after the last `@`) of every email that has one.
    pub fn email_domains(&self) -> impl Iterator<Item = &str> {
        self.emails
            .iter()
            .filter_map(|email| email.rsplit_once('@').map(|(_, domain)| domain.trim()))
            .filter(|domain| !domain.is_empty())
    }
}
