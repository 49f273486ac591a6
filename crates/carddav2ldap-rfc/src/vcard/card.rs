use super::property::Property;
use super::structured::{Address, Organization, StructuredName};

const FN: &str = "FN";
const N: &str = "N";
const UID: &str = "UID";
const EMAIL: &str = "EMAIL";
const TEL: &str = "TEL";
const ADR: &str = "ADR";
const ORG: &str = "ORG";
const TITLE: &str = "TITLE";
const CATEGORIES: &str = "CATEGORIES";
const PHOTO: &str = "PHOTO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// vCard 2.1 (versit).
    V2_1,
    /// RFC 2426.
    V3,
    /// RFC 6350.
    V4,
}

impl Version {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "2.1" => Some(Self::V2_1),
            "3.0" => Some(Self::V3),
            "4.0" => Some(Self::V4),
            _ => None,
        }
    }
}

/// One `BEGIN:VCARD` .. `END:VCARD` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VCard {
    /// `None` when the card has no `VERSION` line.
    pub version: Option<Version>,
    /// Every property except `VERSION`, in source order.
    pub properties: Vec<Property>,
}

impl VCard {
    /// Properties named `name`, compared case-insensitively. The yielded
    /// properties borrow only the card, never `name`.
    pub fn all<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Property> + use<'a, 'n> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn first(&self, name: &str) -> Option<&Property> {
        self.all(name).next()
    }

    #[must_use]
    pub fn formatted_name(&self) -> Option<String> {
        self.first(FN).map(Property::text)
    }

    #[must_use]
    pub fn name(&self) -> Option<StructuredName> {
        self.first(N)
            .map(|p| StructuredName::from_components(&p.components()))
    }

    #[must_use]
    pub fn uid(&self) -> Option<String> {
        self.first(UID).map(Property::text)
    }

    #[must_use]
    pub fn emails(&self) -> Vec<String> {
        self.all(EMAIL).map(Property::text).collect()
    }

    /// `TEL` properties with their parameters, which carry the phone type.
    pub fn telephones(&self) -> impl Iterator<Item = &Property> {
        self.all(TEL)
    }

    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        self.all(ADR)
            .map(|p| Address::from_components(&p.components()))
            .collect()
    }

    #[must_use]
    pub fn organization(&self) -> Option<Organization> {
        self.first(ORG).map(|p| Organization::from_fields(p.fields()))
    }

    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.first(TITLE).map(Property::text)
    }

    /// Categories of every `CATEGORIES` line, untrimmed.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.all(CATEGORIES).flat_map(Property::list).collect()
    }

    #[must_use]
    pub fn photo(&self) -> Option<&Property> {
        self.first(PHOTO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(properties: Vec<Property>) -> VCard {
        VCard {
            version: Some(Version::V4),
            properties,
        }
    }

    #[test]
    fn version_strings() {
        assert_eq!(Version::parse("2.1"), Some(Version::V2_1));
        assert_eq!(Version::parse(" 3.0 "), Some(Version::V3));
        assert_eq!(Version::parse("4.0"), Some(Version::V4));
        assert_eq!(Version::parse("5.0"), None);
    }

    #[test]
    fn text_accessors_unescape() {
        let card = card(vec![
            Property::new("FN", r"Doe\, Jane"),
            Property::new("title", "Chief Engineer"),
            Property::new("EMAIL", "jane@example.com"),
            Property::new("EMAIL", "jd@work.example"),
        ]);

        assert_eq!(card.formatted_name().as_deref(), Some("Doe, Jane"));
        assert_eq!(card.title().as_deref(), Some("Chief Engineer"));
        assert_eq!(card.emails(), vec!["jane@example.com", "jd@work.example"]);
        assert!(card.uid().is_none());
    }

    #[test]
    fn lookup_with_short_lived_name() {
        let card = card(vec![Property::new("NOTE", "first"), Property::new("note", "second")]);

        let found = {
            let name = String::from("Note");
            card.first(&name)
        };
        assert_eq!(found.map(|p| p.value.as_str()), Some("first"));

        let name = "NOTE".to_string();
        assert_eq!(card.all(&name).count(), 2);
    }

    #[test]
    fn categories_span_lines() {
        let card = card(vec![
            Property::new("CATEGORIES", "Work,VIP"),
            Property::new("CATEGORIES", "Friends"),
        ]);
        assert_eq!(card.categories(), vec!["Work", "VIP", "Friends"]);
    }

    #[test]
    fn structured_accessors() {
        let card = card(vec![
            Property::new("N", "Doe;Jane;;;"),
            Property::new("ADR", ";;1 Main St;Springfield;;12345;"),
            Property::new("ORG", "Acme;R&D"),
        ]);

        let name = card.name().unwrap();
        assert_eq!((name.family.as_str(), name.given.as_str()), ("Doe", "Jane"));
        assert_eq!(card.addresses()[0].locality, "Springfield");
        assert_eq!(card.organization().unwrap().units, vec!["R&D"]);
    }
}
