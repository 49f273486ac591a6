//! Structured values: `N`, `ADR` and `ORG`.
//!
//! Components that carry several comma separated values are joined with a
//! single space; blank values are dropped.

/// `N` (RFC 6350 §6.2.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredName {
    pub family: String,
    pub given: String,
    pub additional: String,
    pub prefixes: String,
    pub suffixes: String,
}

impl StructuredName {
    #[must_use]
    pub fn from_components(components: &[Vec<String>]) -> Self {
        Self {
            family: joined(components, 0),
            given: joined(components, 1),
            additional: joined(components, 2),
            prefixes: joined(components, 3),
            suffixes: joined(components, 4),
        }
    }
}

/// `ADR` (RFC 6350 §6.3.1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub po_box: String,
    pub extended: String,
    pub street: String,
    pub locality: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    #[must_use]
    pub fn from_components(components: &[Vec<String>]) -> Self {
        Self {
            po_box: joined(components, 0),
            extended: joined(components, 1),
            street: joined(components, 2),
            locality: joined(components, 3),
            region: joined(components, 4),
            postal_code: joined(components, 5),
            country: joined(components, 6),
        }
    }
}

/// `ORG` (RFC 6350 §6.6.4): the organization name followed by units,
/// most general first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn from_fields(fields: Vec<String>) -> Self {
        let mut fields = fields.into_iter().map(|f| f.trim().to_string());
        Self {
            name: fields.next().unwrap_or_default(),
            units: fields.filter(|unit| !unit.is_empty()).collect(),
        }
    }
}

fn joined(components: &[Vec<String>], index: usize) -> String {
    components
        .get(index)
        .map(|values| {
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(parts: &[&[&str]]) -> Vec<Vec<String>> {
        parts
            .iter()
            .map(|values| values.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn name_joins_multi_values_and_tolerates_short_input() {
        let name = StructuredName::from_components(&components(&[&["van", " Dyke"], &["Dick", ""]]));
        assert_eq!(name.family, "van Dyke");
        assert_eq!(name.given, "Dick");
        assert_eq!(name.suffixes, "");
    }

    #[test]
    fn address_positions() {
        let adr = Address::from_components(&components(&[
            &[],
            &[],
            &["123 Main St"],
            &["Anytown"],
            &["CA"],
            &["12345"],
            &["USA"],
        ]));
        assert_eq!(adr.street, "123 Main St");
        assert_eq!(adr.locality, "Anytown");
        assert_eq!(adr.postal_code, "12345");
        assert_eq!(adr.po_box, "");
    }

    #[test]
    fn organization_name_and_units() {
        let org = Organization::from_fields(vec!["Acme".into(), " Sales ".into(), String::new()]);
        assert_eq!(org.name, "Acme");
        assert_eq!(org.units, vec!["Sales"]);

        assert_eq!(Organization::from_fields(Vec::new()), Organization::default());
    }
}
