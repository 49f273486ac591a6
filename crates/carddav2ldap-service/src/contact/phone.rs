//! Phone number cleaning and categorization.

/// Category a phone number is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhoneCategory {
    Work,
    Home,
    Mobile,
    Fax,
    Other,
}

impl PhoneCategory {
    /// Maps a vCard TYPE value to a category, if it names one.
    #[must_use]
    pub fn from_type(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" => Some(Self::Work),
            "home" => Some(Self::Home),
            "cell" | "mobile" | "iphone" => Some(Self::Mobile),
            "fax" => Some(Self::Fax),
            _ => None,
        }
    }

    /// Whether numbers of this category belong in the generic phone attribute.
    #[must_use]
    pub const fn is_voice(self) -> bool {
        !matches!(self, Self::Fax)
    }
}

/// A cleaned number and every category it was tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub number: String,
    pub categories: Vec<PhoneCategory>,
}

/// Phone numbers of one contact, deduplicated and kept in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phones {
    entries: Vec<PhoneNumber>,
}

impl Phones {
    /// Records `number` under each of `categories`.
    ///
    /// A number seen before gains the new categories instead of a second entry.
    pub fn insert(&mut self, number: String, categories: &[PhoneCategory]) {
        let entry = if let Some(pos) = self.entries.iter().position(|e| e.number == number) {
            &mut self.entries[pos]
        } else {
            self.entries.push(PhoneNumber {
                number,
                categories: Vec::new(),
            });
            let last = self.entries.len() - 1;
            &mut self.entries[last]
        };

        for category in categories {
            if !entry.categories.contains(category) {
                entry.categories.push(*category);
            }
        }
    }

    /// Numbers filed under `category`.
    pub fn in_category(&self, category: PhoneCategory) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.categories.contains(&category))
            .map(|e| e.number.as_str())
    }

    /// Union of the work, home, mobile and other numbers.
    pub fn voice(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.categories.iter().any(|c| c.is_voice()))
            .map(|e| e.number.as_str())
    }

    #[must_use]
    pub fn entries(&self) -> &[PhoneNumber] {
        &self.entries
    }
}

/// Strips a raw phone value down to digits and one leading `+`.
///
/// Returns `None` when no digits remain. A `tel:` URI scheme is dropped first.
#[must_use]
pub fn clean_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw
        .get(..4)
        .filter(|scheme| scheme.eq_ignore_ascii_case("tel:"))
        .map_or(raw, |_| &raw[4..]);

    let mut cleaned = String::with_capacity(raw.len());
    if raw.trim_start().starts_with('+') {
        cleaned.push('+');
    }
    cleaned.extend(raw.chars().filter(char::is_ascii_digit));

    if cleaned.is_empty() || cleaned == "+" {
        return None;
    }
    Some(cleaned)
}
