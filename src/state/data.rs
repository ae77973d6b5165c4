//! Shared data structures for the page state
//!
//! These types flow between the DOM backends, the controllers and the
//! offline tooling.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ========== Form Field Set ==========

/// Named values read from a form at submission time.
///
/// Keeps the order controls appear in the form. A repeated name overwrites
/// the earlier value in place, so lookups see the last control with that name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFieldSet {
    entries: Vec<(String, String)>,
}

impl FormFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Raw value, possibly empty
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value only when present and non-empty
    pub fn filled(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Build from a flat JSON object. Non-string scalars are stringified,
    /// `true` becomes `"on"` (a ticked checkbox) and `false`/`null` are left out.
    pub fn from_json_object(json: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut fields = Self::new();
        for (name, value) in object {
            match value {
                serde_json::Value::String(s) => fields.insert(name, s),
                serde_json::Value::Bool(true) => fields.insert(name, "on"),
                serde_json::Value::Bool(false) | serde_json::Value::Null => {}
                other => fields.insert(name, other.to_string()),
            }
        }
        Ok(fields)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormFieldSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

// ========== Gallery ==========

/// Filter value that shows every gallery item
pub const WILDCARD_FILTER: &str = "all";

/// Garment categories known to the gallery tooling.
///
/// The page filter itself matches raw `data-category` strings, so markup may
/// carry categories outside this list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blouse,
    Kurti,
    Salwar,
    Lehenga,
    Gown,
    Other,
}

impl Category {
    /// Detection order; `Other` is the fallback and is not listed
    const DETECTABLE: [Category; 5] = [
        Category::Blouse,
        Category::Kurti,
        Category::Salwar,
        Category::Lehenga,
        Category::Gown,
    ];

    pub const ALL: [Category; 6] = [
        Category::Blouse,
        Category::Kurti,
        Category::Salwar,
        Category::Lehenga,
        Category::Gown,
        Category::Other,
    ];

    /// Value used in `data-category` / `data-filter`
    pub fn slug(self) -> &'static str {
        match self {
            Category::Blouse => "blouse",
            Category::Kurti => "kurti",
            Category::Salwar => "salwar",
            Category::Lehenga => "lehenga",
            Category::Gown => "gown",
            Category::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Blouse => "Blouse",
            Category::Kurti => "Kurti",
            Category::Salwar => "Salwar Suit",
            Category::Lehenga => "Lehenga",
            Category::Gown => "Gown",
            Category::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Blouse => "👔",
            Category::Kurti => "👗",
            Category::Salwar => "🥻",
            Category::Lehenga => "💃",
            Category::Gown => "👰",
            Category::Other => "👘",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Blouse => &["blouse", "blouses", "choli"],
            Category::Kurti => &["kurti", "kurtis", "kurta"],
            Category::Salwar => &["salwar", "suit", "punjabi", "patiala"],
            Category::Lehenga => &["lehenga", "lehengas", "bridal"],
            Category::Gown => &["gown", "gowns", "dress", "evening"],
            Category::Other => &[],
        }
    }

    /// Guess a category from keywords in a file name
    pub fn detect(filename: &str) -> Category {
        let lower = filename.to_lowercase();
        Self::DETECTABLE
            .into_iter()
            .find(|c| c.keywords().iter().any(|k| lower.contains(k)))
            .unwrap_or(Category::Other)
    }
}

/// Does a gallery item with `category` pass the `filter` selection?
pub fn filter_matches(filter: &str, category: Option<&str>) -> bool {
    filter == WILDCARD_FILTER || category == Some(filter)
}
