//! vCard field extraction.
//!
//! Turns one `address-data` blob into normalized [`ContactRecord`]s.

mod photo;

pub use photo::{PhotoError, decode_photo};

use carddav2ldap_core::constants::{SURNAME_PLACEHOLDER, UNKNOWN_CONTACT};
use carddav2ldap_rfc::vcard::{self, Property, VCard};

use crate::contact::{ContactRecord, OrganizationInfo, PhoneCategory, Postal, clean_phone};

/// Why a blob or record produced no directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The blob is not a valid vCard document.
    Parse(String),
    /// The blob holds no vCard.
    Empty,
    /// Another record of this run already resolved to the same DN.
    DuplicateName { first_address_book: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "parse error: {message}"),
            Self::Empty => write!(f, "no vCard in blob"),
            Self::DuplicateName { first_address_book } => {
                write!(f, "name already synced from address book {first_address_book}")
            }
        }
    }
}

/// Builds [`ContactRecord`]s from raw vCard text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    import_photos: bool,
}

impl Extractor {
    #[must_use]
    pub const fn new(import_photos: bool) -> Self {
        Self { import_photos }
    }

    /// ## Summary
    /// Parses one blob and normalizes every vCard it holds.
    ///
    /// ## Errors
    /// Returns [`SkipReason::Parse`] if the blob is malformed and
    /// [`SkipReason::Empty`] if it contains no vCard.
    #[tracing::instrument(skip(self, blob), fields(blob_len = blob.len()))]
    pub fn extract(&self, address_book: &str, blob: &str) -> Result<Vec<ContactRecord>, SkipReason> {
        let cards = vcard::parse(blob).map_err(|e| SkipReason::Parse(e.to_string()))?;
        if cards.is_empty() {
            return Err(SkipReason::Empty);
        }

        Ok(cards
            .iter()
            .map(|card| self.extract_card(address_book, card))
            .collect())
    }

    /// Normalizes a single parsed vCard.
    #[must_use]
    pub fn extract_card(&self, address_book: &str, card: &VCard) -> ContactRecord {
        let mut record = ContactRecord::new(address_book);
        record.uid = card.uid().as_deref().and_then(non_empty);

        let (given_name, surname) = card
            .name()
            .map(|n| (n.given, n.family))
            .unwrap_or_default();
        record.full_name =
            resolve_full_name(card.formatted_name().as_deref(), &given_name, &surname);
        record.surname = backfill_surname(&record.full_name, surname);
        record.given_name = given_name;

        record.emails = card
            .emails()
            .iter()
            .filter_map(|email| non_empty(email))
            .collect();

        for prop in card.telephones() {
            add_phone(&mut record, prop);
        }

        if let Some(adr) = card.addresses().first() {
            record.postal = Postal {
                street: non_empty(&adr.street),
                locality: non_empty(&adr.locality),
                postal_code: non_empty(&adr.postal_code),
            };
        }

        if let Some(org) = card.organization() {
            record.organization = OrganizationInfo {
                name: non_empty(&org.name),
                unit: org.units.first().and_then(|unit| non_empty(unit)),
            };
        }

        record.job_title = card.title().as_deref().and_then(non_empty);

        for category in card.categories() {
            let category = category.trim();
            if !category.is_empty() && !record.categories.iter().any(|c| c == category) {
                record.categories.push(category.to_string());
            }
        }

        if self.import_photos
            && let Some(prop) = card.photo()
        {
            match decode_photo(prop) {
                Ok(photo) => record.photo = Some(photo),
                Err(e) => {
                    tracing::warn!(contact = %record.full_name, error = %e, "Skipping photo");
                }
            }
        }

        record
    }
}

/// Picks the display name: FN, then the N components, then the default.
#[must_use]
pub fn resolve_full_name(formatted: Option<&str>, given_name: &str, surname: &str) -> String {
    if let Some(name) = formatted.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    match (given_name.is_empty(), surname.is_empty()) {
        (false, false) => format!("{given_name} {surname}"),
        (false, true) => given_name.to_string(),
        (true, false) => surname.to_string(),
        (true, true) => UNKNOWN_CONTACT.to_string(),
    }
}

/// Fills an empty surname from the display name.
#[must_use]
pub fn backfill_surname(full_name: &str, surname: String) -> String {
    if !surname.is_empty() {
        return surname;
    }

    let derived = if full_name == UNKNOWN_CONTACT {
        ""
    } else {
        full_name.split_whitespace().last().unwrap_or(full_name)
    };

    if derived.trim().is_empty() {
        SURNAME_PLACEHOLDER.to_string()
    } else {
        derived.to_string()
    }
}

fn add_phone(record: &mut ContactRecord, prop: &Property) {
    let raw = prop.text();

    let Some(number) = clean_phone(&raw) else {
        tracing::debug!(contact = %record.full_name, raw, "Discarding phone without digits");
        return;
    };

    let mut categories: Vec<PhoneCategory> = prop
        .types()
        .flat_map(|value| value.split(','))
        .filter_map(PhoneCategory::from_type)
        .collect();
    if categories.is_empty() {
        categories.push(PhoneCategory::Other);
    }

    record.phones.insert(number, &categories);
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
