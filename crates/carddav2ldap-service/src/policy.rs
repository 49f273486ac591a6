//! Whitelist/blacklist admission rules.

use carddav2ldap_core::config::Settings;

use crate::contact::ContactRecord;

/// Reason a record was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmailNotWhitelisted,
    EmailBlacklisted,
    CategoryNotWhitelisted,
    CategoryBlacklisted,
}

impl Rejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailNotWhitelisted => "EMAIL_NOT_WHITELISTED",
            Self::EmailBlacklisted => "EMAIL_BLACKLISTED",
            Self::CategoryNotWhitelisted => "CATEGORY_NOT_WHITELISTED",
            Self::CategoryBlacklisted => "CATEGORY_BLACKLISTED",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One whitelist/blacklist pair.
///
/// Entries are trimmed and compared ASCII case-insensitively. An empty list
/// places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPair {
    whitelist: Vec<String>,
    blacklist: Vec<String>,
}

impl ListPair {
    #[must_use]
    pub fn new(whitelist: &[String], blacklist: &[String]) -> Self {
        Self {
            whitelist: normalize(whitelist),
            blacklist: normalize(blacklist),
        }
    }

    /// Whether the whitelist is set and no value is on it.
    pub fn misses_whitelist<'a>(&self, mut values: impl Iterator<Item = &'a str>) -> bool {
        !self.whitelist.is_empty() && !values.any(|v| contains(&self.whitelist, v))
    }

    /// Whether any value is on the blacklist.
    pub fn hits_blacklist<'a>(&self, mut values: impl Iterator<Item = &'a str>) -> bool {
        !self.blacklist.is_empty() && values.any(|v| contains(&self.blacklist, v))
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.whitelist.is_empty() && self.blacklist.is_empty()
    }
}

/// Admission rules for address books and records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    pub email_domains: ListPair,
    pub categories: ListPair,
    pub address_books: ListPair,
}

impl FilterPolicy {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            email_domains: ListPair::new(
                &settings.email_domain_whitelist,
                &settings.email_domain_blacklist,
            ),
            categories: ListPair::new(&settings.category_whitelist, &settings.category_blacklist),
            address_books: ListPair::new(
                &settings.addressbook_whitelist,
                &settings.addressbook_blacklist,
            ),
        }
    }

    /// ## Summary
    /// Applies the email-domain and category rules to one record.
    ///
    /// Checks run in a fixed order and stop at the first rejection.
    ///
    /// ## Errors
    /// Returns the [`Rejection`] of the first failing check.
    pub fn admit(&self, record: &ContactRecord) -> Result<(), Rejection> {
        if self.email_domains.misses_whitelist(record.email_domains()) {
            return Err(Rejection::EmailNotWhitelisted);
        }
        if self.email_domains.hits_blacklist(record.email_domains()) {
            return Err(Rejection::EmailBlacklisted);
        }

        let categories = || record.categories.iter().map(String::as_str);
        if self.categories.misses_whitelist(categories()) {
            return Err(Rejection::CategoryNotWhitelisted);
        }
        if self.categories.hits_blacklist(categories()) {
            return Err(Rejection::CategoryBlacklisted);
        }

        Ok(())
    }

    /// Whether an address book may be fetched at all.
    ///
    /// Either its identifier or its display name may match a list entry.
    #[must_use]
    pub fn admit_address_book(&self, id: &str, display_name: Option<&str>) -> bool {
        let names = || std::iter::once(id).chain(display_name);
        !self.address_books.misses_whitelist(names())
            && !self.address_books.hits_blacklist(names())
    }
}

fn normalize(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn contains(list: &[String], value: &str) -> bool {
    let value = value.trim();
    list.iter().any(|entry| entry.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn record(emails: &[&str], categories: &[&str]) -> ContactRecord {
        let mut record = ContactRecord::new("contacts");
        record.full_name = "Jane Doe".into();
        record.emails = list(emails);
        record.categories = list(categories);
        record
    }

    fn email_policy(whitelist: &[&str], blacklist: &[&str]) -> FilterPolicy {
        FilterPolicy {
            email_domains: ListPair::new(&list(whitelist), &list(blacklist)),
            ..FilterPolicy::default()
        }
    }

    fn category_policy(whitelist: &[&str], blacklist: &[&str]) -> FilterPolicy {
        FilterPolicy {
            categories: ListPair::new(&list(whitelist), &list(blacklist)),
            ..FilterPolicy::default()
        }
    }

    #[test]
    fn no_lists_admit_everything() {
        let policy = FilterPolicy::default();
        assert_eq!(policy.admit(&record(&[], &[])), Ok(()));
        assert!(policy.admit_address_book("anything", None));
    }

    #[test]
    fn blacklisted_domain_with_empty_whitelist_is_rejected() {
        let policy = email_policy(&[], &["spam.example"]);
        assert_eq!(
            policy.admit(&record(&["x@spam.example"], &[])),
            Err(Rejection::EmailBlacklisted)
        );
    }

    #[test]
    fn whitelisted_and_not_blacklisted_is_admitted() {
        let policy = email_policy(&["example.com"], &["spam.example"]);
        assert_eq!(policy.admit(&record(&["jane@example.com"], &[])), Ok(()));
    }

    #[test]
    fn whitelist_miss_rejects_regardless_of_blacklist() {
        let policy = email_policy(&["example.com"], &["spam.example"]);
        assert_eq!(
            policy.admit(&record(&["jane@other.example"], &[])),
            Err(Rejection::EmailNotWhitelisted)
        );
    }

    #[test]
    fn whitelist_rejects_records_without_email() {
        let policy = email_policy(&["example.com"], &[]);
        assert_eq!(
            policy.admit(&record(&[], &[])),
            Err(Rejection::EmailNotWhitelisted)
        );
    }

    #[test]
    fn any_blacklisted_domain_rejects() {
        let policy = email_policy(&["example.com"], &["spam.example"]);
        assert_eq!(
            policy.admit(&record(&["jane@example.com", "jane@spam.example"], &[])),
            Err(Rejection::EmailBlacklisted)
        );
    }

    #[test]
    fn domain_matching_ignores_case_and_whitespace() {
        let policy = email_policy(&[" Example.COM "], &[]);
        assert_eq!(policy.admit(&record(&["jane@EXAMPLE.com"], &[])), Ok(()));
    }

    #[test]
    fn category_rules() {
        let policy = category_policy(&["Work"], &["Private"]);
        assert_eq!(policy.admit(&record(&[], &["work"])), Ok(()));
        assert_eq!(
            policy.admit(&record(&[], &["Family"])),
            Err(Rejection::CategoryNotWhitelisted)
        );
        assert_eq!(
            policy.admit(&record(&[], &["Work", "Private"])),
            Err(Rejection::CategoryBlacklisted)
        );
    }

    #[test]
    fn email_checks_run_before_category_checks() {
        let policy = FilterPolicy {
            email_domains: ListPair::new(&[], &list(&["spam.example"])),
            categories: ListPair::new(&list(&["Work"]), &[]),
            ..FilterPolicy::default()
        };
        assert_eq!(
            policy.admit(&record(&["x@spam.example"], &["Family"])),
            Err(Rejection::EmailBlacklisted)
        );
    }

    #[test]
    fn address_book_by_id_or_display_name() {
        let policy = FilterPolicy {
            address_books: ListPair::new(&list(&["Contacts"]), &list(&["shared"])),
            ..FilterPolicy::default()
        };

        assert!(policy.admit_address_book("/dav/contacts/", Some("Contacts")));
        assert!(policy.admit_address_book("contacts", None));
        assert!(!policy.admit_address_book("/dav/other/", Some("Other")));
        assert!(!policy.admit_address_book("shared", Some("Contacts")));
    }

    #[test]
    fn rejection_tags() {
        assert_eq!(Rejection::EmailNotWhitelisted.to_string(), "EMAIL_NOT_WHITELISTED");
        assert_eq!(Rejection::CategoryBlacklisted.as_str(), "CATEGORY_BLACKLISTED");
    }
}
