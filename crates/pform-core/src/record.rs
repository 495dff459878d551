//! # Person Record
//!
//! The typed record a person form produces once every rule has passed.
//! Wire names are camelCase to match the form's field paths.

use serde::{Deserialize, Serialize};

/// Gender choice offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Wire value `m`.
    #[serde(rename = "m")]
    Male,
    /// Wire value `f`.
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// All accepted wire values, in declaration order.
    pub const WIRE_VALUES: [&'static str; 2] = ["m", "f"];

    /// The wire value of this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One postal address of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Country, never empty in a validated record.
    pub country: String,
    /// Optional city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// A validated person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Age in years, at least 18.
    pub age: f64,
    /// Contact email.
    pub email: String,
    /// Gender choice.
    pub gender: Gender,
    /// Terms and conditions accepted; always `true` once validated.
    pub terms: bool,
    /// At least one address.
    pub addresses: Vec<Address>,
}

impl Person {
    /// Whether at least one of the two name fields holds text.
    pub fn has_name(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.first_name) || filled(&self.last_name)
    }
}
