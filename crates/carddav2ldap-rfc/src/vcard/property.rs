//! Properties and their parameters.

use super::escape::{split_unescaped, unescape};

/// A property parameter.
///
/// The name is uppercased. Values have their surrounding quotes removed
/// and RFC 6868 caret escapes resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }
}

/// One content line.
///
/// `value` is stored as received, escapes included. The accessors
/// interpret it according to the shape the caller expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// `item1` in `item1.TEL`.
    pub group: Option<String>,
    /// Uppercased.
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: String,
}

impl Property {
    #[must_use]
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push(Parameter::new(name, value));
        self
    }

    /// First value of the named parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .flat_map(|p| p.values.iter())
            .map(String::as_str)
            .next()
    }

    /// Values of every `TYPE` parameter, in order.
    ///
    /// Producers repeat the parameter (`TYPE=HOME;TYPE=FAX`) as often as
    /// they list values (`TYPE=HOME,FAX`); both forms end up here.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.name == "TYPE")
            .flat_map(|p| p.values.iter().map(String::as_str))
    }

    /// The value as a single unescaped text.
    #[must_use]
    pub fn text(&self) -> String {
        unescape(&self.value)
    }

    /// The value as a comma separated list (`CATEGORIES`, `NICKNAME`).
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        if self.value.is_empty() {
            return Vec::new();
        }
        split_unescaped(&self.value, ',')
            .into_iter()
            .map(unescape)
            .collect()
    }

    /// The value split on `;` only (`ORG`).
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        split_unescaped(&self.value, ';')
            .into_iter()
            .map(unescape)
            .collect()
    }

    /// The value split on `;`, each field split again on `,` (`N`, `ADR`).
    ///
    /// An empty field yields an empty list.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<String>> {
        split_unescaped(&self.value, ';')
            .into_iter()
            .map(|field| {
                if field.is_empty() {
                    Vec::new()
                } else {
                    split_unescaped(field, ',').into_iter().map(unescape).collect()
                }
            })
            .collect()
    }
}
