use crate::ids::AssetId;

/// A candidate-field value on a catalog entity.
///
/// Upstream data sources disagree on whether identifiers like a property
/// number are strings or numbers, so both shapes are carried verbatim.
/// Matching against a decoded payload accepts either strict string equality
/// or equality of the canonical text rendering, and nothing looser: no case
/// folding, no substring matching, no fuzzy matching.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum TagField {
    /// String-valued field.
    Text(String),
    /// Numeric field, kept as a double the way JSON numbers arrive.
    Number(f64),
}

impl TagField {
    /// Canonical text rendering of the field value. Numbers render the way
    /// a double prints, so `55.0` becomes `"55"` and `55.5` stays `"55.5"`.
    pub fn stringified(&self) -> String {
        match self {
            TagField::Text(text) => text.clone(),
            TagField::Number(value) => value.to_string(),
        }
    }

    /// Whether this field matches a decoded payload: strict equality for
    /// text fields, text-rendering equality for numeric ones.
    pub fn matches_payload(&self, payload: &str) -> bool {
        match self {
            TagField::Text(text) => text == payload,
            TagField::Number(value) => value.to_string() == payload,
        }
    }
}

impl std::fmt::Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagField::Text(text) => f.write_str(text),
            TagField::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for TagField {
    fn from(text: &str) -> Self {
        TagField::Text(text.to_owned())
    }
}

impl From<String> for TagField {
    fn from(text: String) -> Self {
        TagField::Text(text)
    }
}

impl From<f64> for TagField {
    fn from(value: f64) -> Self {
        TagField::Number(value)
    }
}

/// An externally supplied record eligible to be matched against a decoded
/// payload. Fetched (and refreshed) by whoever owns the catalog; readers
/// never mutate it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CatalogEntity {
    /// Stable identifier minted by the remote directory.
    pub id: AssetId,
    /// Property-number candidate field, when the record carries one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub property_number: Option<TagField>,
    /// Code candidate field, when the record carries one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: Option<TagField>,
    /// Display name, if any. Not used for matching.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

impl CatalogEntity {
    /// Candidate fields present on this entity, in matching order.
    pub fn candidate_fields(&self) -> impl Iterator<Item = &TagField> {
        self.property_number.iter().chain(self.code.iter())
    }

    /// Whether any candidate field matches the payload. Absent fields never
    /// match.
    pub fn matches_payload(&self, payload: &str) -> bool {
        self.candidate_fields()
            .any(|field| field.matches_payload(payload))
    }
}
