//! Collapse state and filter records exchanged with the host.

use serde::{Deserialize, Deserializer, Serialize};

/// Display mode of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseState {
    #[default]
    Expanded,
    Collapsed,
}

impl CollapseState {
    #[must_use]
    pub const fn is_collapsed(self) -> bool {
        matches!(self, Self::Collapsed)
    }

    /// Literal written to storage.
    #[must_use]
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::Expanded => "false",
            Self::Collapsed => "true",
        }
    }

    /// Only the literal `"true"` means collapsed; anything else, including
    /// a missing value, reads as expanded.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        if value == Some("true") {
            Self::Collapsed
        } else {
            Self::Expanded
        }
    }
}

/// Health indicators offered as checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Stunting,
    Wasting,
    Anemia,
}

impl Indicator {
    pub const ALL: [Self; 3] = [Self::Stunting, Self::Wasting, Self::Anemia];

    /// Checkbox `value` attribute.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Stunting => "stunting",
            Self::Wasting => "wasting",
            Self::Anemia => "anemia",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stunting => "Gutinda kukura",
            Self::Wasting => "Guhira",
            Self::Anemia => "Kurwara amaraso make",
        }
    }
}

/// Snapshot of the filter controls, read live from the document.
///
/// A scalar field is `None` when its control is missing from the page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrient: Option<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// Partial filter record sent by the host in `updateSidebarFilters`.
///
/// Scalar fields apply only when present and non-empty. A present
/// `indicators` list overwrites every checkbox.
///
/// R hosts unbox length-one vectors, so scalars may arrive as numbers
/// (`year: 2018`) and `indicators` as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterPatch {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "text_or_number")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "text_or_number")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "text_or_number")]
    pub age_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "text_or_number")]
    pub nutrient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "one_or_many")]
    pub indicators: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(f64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            // `2018.0` displays as `2018`, the option value a select expects.
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(one) => vec![one.into()],
            OneOrMany::Many(many) => many.into_iter().map(String::from).collect(),
        }),
    )
}
