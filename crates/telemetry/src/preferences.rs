//! Consent preferences.
//!
//! A [`PreferenceSet`] is the list of [`ReportingCategory`] values the user
//! agreed to share. It is persisted verbatim as a JSON list of string tags
//! and loaded leniently so that tags written by a newer release do not
//! invalidate the rest of the record.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One class of data the user consents to share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingCategory {
    /// Gate for any submission: installation id, version, installation type
    Base,
    /// Built-in integration identifiers and a custom-integration flag
    Integrations,
    /// Entity, automation, integration and user counts
    Statistics,
}

impl ReportingCategory {
    /// All known categories, in canonical order
    pub const ALL: [ReportingCategory; 3] = [Self::Base, Self::Integrations, Self::Statistics];

    /// Stable string tag used on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Integrations => "integrations",
            Self::Statistics => "statistics",
        }
    }
}

impl fmt::Display for ReportingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tag does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reporting category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ReportingCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "integrations" => Ok(Self::Integrations),
            "statistics" => Ok(Self::Statistics),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Set of enabled categories.
///
/// Keeps insertion order for stable serialization, but equality ignores it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PreferenceSet(Vec<ReportingCategory>);

impl PreferenceSet {
    /// Empty set: nothing will be submitted
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a category; returns false if it was already present
    pub fn insert(&mut self, category: ReportingCategory) -> bool {
        if self.0.contains(&category) {
            return false;
        }
        self.0.push(category);
        true
    }

    pub fn contains(&self, category: ReportingCategory) -> bool {
        self.0.contains(&category)
    }

    /// Whether any submission may happen at all
    pub fn allows_submission(&self) -> bool {
        self.contains(ReportingCategory::Base)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ReportingCategory> + '_ {
        self.0.iter().copied()
    }

    /// Parse a list of tags strictly (for user input)
    pub fn parse_tags<I, S>(tags: I) -> Result<Self, UnknownCategory>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .map(|t| t.as_ref().parse::<ReportingCategory>())
            .collect()
    }
}

impl PartialEq for PreferenceSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|c| other.contains(c))
    }
}

impl Eq for PreferenceSet {}

impl FromIterator<ReportingCategory> for PreferenceSet {
    fn from_iter<T: IntoIterator<Item = ReportingCategory>>(iter: T) -> Self {
        let mut set = Self::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Display for PreferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.0.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", tags.join(", "))
    }
}

impl<'de> Deserialize<'de> for PreferenceSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = PreferenceSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of reporting category tags")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(PreferenceSet::new())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut set = PreferenceSet::new();
                while let Some(value) = seq.next_element::<serde_json::Value>()? {
                    match value.as_str().map(str::parse::<ReportingCategory>) {
                        Some(Ok(category)) => {
                            set.insert(category);
                        }
                        _ => debug!(tag = %value, "Ignoring unrecognized preference"),
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_any(SetVisitor)
    }
}
