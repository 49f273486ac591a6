//! Contact to directory entry mapping.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::contact::{ContactRecord, PhoneCategory};

pub mod attr {
    pub const OBJECT_CLASS: &str = "objectClass";
    pub const CN: &str = "cn";
    pub const SN: &str = "sn";
    pub const GIVEN_NAME: &str = "givenName";
    pub const MAIL: &str = "mail";
    pub const TELEPHONE_NUMBER: &str = "telephoneNumber";
    pub const MOBILE: &str = "mobile";
    pub const HOME_PHONE: &str = "homePhone";
    pub const FACSIMILE: &str = "facsimileTelephoneNumber";
    pub const STREET: &str = "street";
    pub const LOCALITY: &str = "l";
    pub const POSTAL_CODE: &str = "postalCode";
    pub const ORGANIZATION: &str = "o";
    pub const ORGANIZATIONAL_UNIT: &str = "ou";
    pub const TITLE: &str = "title";
    pub const BUSINESS_CATEGORY: &str = "businessCategory";
    pub const JPEG_PHOTO: &str = "jpegPhoto";
}

/// Object classes of every created entry.
pub const OBJECT_CLASSES: [&str; 4] = ["inetOrgPerson", "organizationalPerson", "person", "top"];

/// Attributes never reissued on modify.
const IDENTITY_ATTRIBUTES: [&str; 3] = [attr::OBJECT_CLASS, attr::CN, attr::SN];

static EMAIL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .inspect_err(|err| {
            tracing::error!(%err, "Email pattern failed to compile; every email will be dropped");
        })
        .ok()
});

/// Attribute name to values, in a stable order.
pub type AttributeMap = BTreeMap<String, Vec<Vec<u8>>>;

/// A directory entry ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedEntry {
    pub dn: String,
    pub attributes: AttributeMap,
}

impl MappedEntry {
    /// Replacements for an existing entry: every attribute except the
    /// identity ones.
    #[must_use]
    pub fn changeset(&self) -> AttributeMap {
        self.attributes
            .iter()
            .filter(|(name, _)| !IDENTITY_ATTRIBUTES.contains(&name.as_str()))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect()
    }

    /// Text values of an attribute, for diagnostics and tests.
    #[must_use]
    pub fn text_values(&self, name: &str) -> Vec<String> {
        self.attributes
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builds the DN of a contact: `cn=<escaped full name>,<base_dn>`.
#[must_use]
pub fn entry_dn(full_name: &str, base_dn: &str) -> String {
    format!("cn={},{}", ldap3::dn_escape(full_name), base_dn)
}

/// Whether an email looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.as_ref().is_some_and(|re| re.is_match(email))
}

/// ## Summary
/// Maps a record onto `inetOrgPerson` attributes.
///
/// Empty values are never emitted. Only the first email is considered for
/// `mail`; a malformed one is dropped with a warning.
#[must_use]
pub fn map_contact(record: &ContactRecord, base_dn: &str) -> MappedEntry {
    let mut builder = AttributeBuilder::default();

    builder.texts(attr::OBJECT_CLASS, OBJECT_CLASSES);
    builder.text(attr::CN, &record.full_name);
    builder.text(attr::SN, &record.surname);
    builder.text(attr::GIVEN_NAME, &record.given_name);

    if let Some(email) = record.emails.first() {
        if is_valid_email(email) {
            builder.text(attr::MAIL, email);
        } else {
            tracing::warn!(contact = %record.full_name, email, "Dropping malformed email");
        }
    }

    builder.texts(attr::TELEPHONE_NUMBER, record.phones.voice());
    builder.texts(attr::MOBILE, record.phones.in_category(PhoneCategory::Mobile));
    builder.texts(attr::HOME_PHONE, record.phones.in_category(PhoneCategory::Home));
    builder.texts(attr::FACSIMILE, record.phones.in_category(PhoneCategory::Fax));

    builder.optional(attr::STREET, record.postal.street.as_deref());
    builder.optional(attr::LOCALITY, record.postal.locality.as_deref());
    builder.optional(attr::POSTAL_CODE, record.postal.postal_code.as_deref());

    builder.optional(attr::ORGANIZATION, record.organization.name.as_deref());
    builder.optional(attr::ORGANIZATIONAL_UNIT, record.organization.unit.as_deref());
    builder.optional(attr::TITLE, record.job_title.as_deref());

    builder.texts(
        attr::BUSINESS_CATEGORY,
        record.categories.iter().map(String::as_str),
    );

    if let Some(photo) = &record.photo {
        builder.binary(attr::JPEG_PHOTO, photo.data.clone());
    }

    MappedEntry {
        dn: entry_dn(&record.full_name, base_dn),
        attributes: builder.attributes,
    }
}

#[derive(Default)]
struct AttributeBuilder {
    attributes: AttributeMap,
}

impl AttributeBuilder {
    fn text(&mut self, name: &str, value: &str) {
        self.texts(name, [value]);
    }

    fn optional(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(name, value);
        }
    }

    fn texts<'a>(&mut self, name: &str, values: impl IntoIterator<Item = &'a str>) {
        let mut encoded: Vec<Vec<u8>> = Vec::new();
        for value in values {
            let bytes = value.trim().as_bytes().to_vec();
            if !bytes.is_empty() && !encoded.contains(&bytes) {
                encoded.push(bytes);
            }
        }

        if !encoded.is_empty() {
            self.attributes.insert(name.to_string(), encoded);
        }
    }

    fn binary(&mut self, name: &str, value: Vec<u8>) {
        if !value.is_empty() {
            self.attributes.insert(name.to_string(), vec![value]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Photo;

    const BASE_DN: &str = "ou=contacts,dc=example,dc=com";

    fn jane() -> ContactRecord {
        let mut record = ContactRecord::new("contacts");
        record.full_name = "Jane Doe".into();
        record.surname = "Doe".into();
        record.emails = vec!["jane@example.com".into()];
        record
            .phones
            .insert("+15550100".into(), &[PhoneCategory::Mobile]);
        record
    }

    #[test]
    fn maps_jane_doe() {
        let entry = map_contact(&jane(), BASE_DN);

        assert_eq!(entry.dn, "cn=Jane Doe,ou=contacts,dc=example,dc=com");
        assert_eq!(entry.text_values(attr::CN), vec!["Jane Doe"]);
        assert_eq!(entry.text_values(attr::SN), vec!["Doe"]);
        assert_eq!(entry.text_values(attr::MAIL), vec!["jane@example.com"]);
        assert_eq!(entry.text_values(attr::TELEPHONE_NUMBER), vec!["+15550100"]);
        assert_eq!(entry.text_values(attr::MOBILE), vec!["+15550100"]);
        assert_eq!(entry.text_values(attr::OBJECT_CLASS), OBJECT_CLASSES.to_vec());
        assert!(!entry.attributes.contains_key(attr::GIVEN_NAME));
        assert!(!entry.attributes.contains_key(attr::FACSIMILE));
    }

    #[test]
    fn changeset_excludes_identity_attributes() {
        let changeset = map_contact(&jane(), BASE_DN).changeset();

        assert!(!changeset.contains_key(attr::OBJECT_CLASS));
        assert!(!changeset.contains_key(attr::CN));
        assert!(!changeset.contains_key(attr::SN));
        assert!(changeset.contains_key(attr::MAIL));
        assert!(changeset.contains_key(attr::TELEPHONE_NUMBER));
    }

    #[test_log::test]
    fn malformed_first_email_is_dropped() {
        let mut record = jane();
        record.emails = vec!["not-an-email".into(), "jane@example.com".into()];

        let entry = map_contact(&record, BASE_DN);
        assert!(!entry.attributes.contains_key(attr::MAIL));
    }

    #[test]
    fn email_shape() {
        assert!(EMAIL_SHAPE.is_some());
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("jane.doe+tag@mail.example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("jane@localhost"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn home_fax_phone_appears_once_in_each_attribute() {
        let mut record = jane();
        record.phones = crate::contact::Phones::default();
        record.phones.insert(
            "+15550199".into(),
            &[PhoneCategory::Home, PhoneCategory::Fax],
        );

        let entry = map_contact(&record, BASE_DN);
        assert_eq!(entry.text_values(attr::TELEPHONE_NUMBER), vec!["+15550199"]);
        assert_eq!(entry.text_values(attr::FACSIMILE), vec!["+15550199"]);
        assert_eq!(entry.text_values(attr::HOME_PHONE), vec!["+15550199"]);
    }

    #[test]
    fn optional_attributes() {
        let mut record = jane();
        record.given_name = "Jane".into();
        record.postal.street = Some("123 Main St".into());
        record.postal.locality = Some("Anytown".into());
        record.postal.postal_code = Some("12345".into());
        record.organization.name = Some("Acme".into());
        record.organization.unit = Some("Engineering".into());
        record.job_title = Some("Engineer".into());
        record.categories = vec!["Work".into(), "VIP".into()];

        let entry = map_contact(&record, BASE_DN);
        assert_eq!(entry.text_values(attr::GIVEN_NAME), vec!["Jane"]);
        assert_eq!(entry.text_values(attr::STREET), vec!["123 Main St"]);
        assert_eq!(entry.text_values(attr::LOCALITY), vec!["Anytown"]);
        assert_eq!(entry.text_values(attr::POSTAL_CODE), vec!["12345"]);
        assert_eq!(entry.text_values(attr::ORGANIZATION), vec!["Acme"]);
        assert_eq!(entry.text_values(attr::ORGANIZATIONAL_UNIT), vec!["Engineering"]);
        assert_eq!(entry.text_values(attr::TITLE), vec!["Engineer"]);
        assert_eq!(entry.text_values(attr::BUSINESS_CATEGORY), vec!["Work", "VIP"]);
    }

    #[test]
    fn photo_bytes_pass_through() {
        let mut record = jane();
        let data = vec![0xFF, 0xD8, 0x00, 0xFF];
        record.photo = Some(Photo { data: data.clone() });

        let entry = map_contact(&record, BASE_DN);
        assert_eq!(entry.attributes[attr::JPEG_PHOTO], vec![data]);
    }

    #[test]
    fn dn_value_is_escaped() {
        let dn = entry_dn("Doe, Jane", BASE_DN);
        assert!(dn.starts_with("cn=Doe\\"));
        assert!(dn.ends_with(" Jane,ou=contacts,dc=example,dc=com"));
        assert_ne!(dn, "cn=Doe, Jane,ou=contacts,dc=example,dc=com");
    }

    #[test]
    fn text_values_are_utf8() {
        let mut record = jane();
        record.full_name = "Jürgen Müller".into();
        let entry = map_contact(&record, BASE_DN);
        assert_eq!(entry.attributes[attr::CN], vec!["Jürgen Müller".as_bytes().to_vec()]);
    }
}
