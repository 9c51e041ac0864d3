//! # wp-core — Travel Domain Model
//!
//! Flat records for the three collections served by the lookup service
//! (hotels, cities, countries), the hotel identifier, the search result
//! envelope and the bulk seed format.
//!
//! Records are denormalized: a hotel's `city` and `country` are plain strings,
//! never references into the other collections.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Hotel Identifier
// =============================================================================

/// Length of a hotel identifier in bytes.
pub const HOTEL_ID_LEN: usize = 12;

/// Store-assigned hotel identifier: 12 opaque bytes, rendered as 24 lowercase
/// hex characters on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotelId([u8; HOTEL_ID_LEN]);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HotelIdError {
    #[error("hotel id must be 24 hex characters, got {0}")]
    Length(usize),
    #[error("hotel id is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl HotelId {
    pub const fn from_bytes(bytes: [u8; HOTEL_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; HOTEL_ID_LEN] {
        self.0
    }
}

impl FromStr for HotelId {
    type Err = HotelIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.len() != HOTEL_ID_LEN * 2 {
            return Err(HotelIdError::Length(raw.len()));
        }
        let mut bytes = [0u8; HOTEL_ID_LEN];
        hex::decode_to_slice(raw, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for HotelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HotelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(rename = "_id")]
    pub id: HotelId,
    #[serde(default)]
    pub chain_name: String,
    pub hotel_name: String,
    pub city: String,
    pub country: String,
}

impl Hotel {
    /// True if `query` occurs, ignoring case, in the hotel name, the
    /// country or the city.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.hotel_name, query)
            || contains_ignore_case(&self.country, query)
            || contains_ignore_case(&self.city, query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
}

impl City {
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.name, query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub country: String,
    pub countryisocode: String,
}

impl Country {
    /// Substring search only looks at the full country name.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.country, query)
    }

    /// Exact, case-sensitive match on either the full name or the ISO code.
    pub fn is_identified_by(&self, value: &str) -> bool {
        self.country == value || self.countryisocode == value
    }
}

/// Case-insensitive containment. The needle is literal text, not a pattern.
///
/// Characters are folded one to one, so `İ` compares equal to `i` instead of
/// expanding to `i` plus a combining dot.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().map(fold_char).collect();
    if needle.is_empty() {
        return true;
    }
    let haystack: Vec<char> = haystack.chars().map(fold_char).collect();
    haystack.windows(needle.len()).any(|w| w == needle.as_slice())
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

// =============================================================================
// Search Envelope
// =============================================================================

/// Result of a free-text search. All three sequences are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hotels: Vec<Hotel>,
    pub cities: Vec<City>,
    pub countries: Vec<Country>,
}

// =============================================================================
// Seeding
// =============================================================================

/// A hotel as it appears in a seed file. The id is optional; the store
/// assigns one when it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHotel {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<HotelId>,
    #[serde(default)]
    pub chain_name: String,
    pub hotel_name: String,
    pub city: String,
    pub country: String,
}

impl NewHotel {
    pub fn into_hotel(self, id: HotelId) -> Hotel {
        Hotel {
            id,
            chain_name: self.chain_name,
            hotel_name: self.hotel_name,
            city: self.city,
            country: self.country,
        }
    }
}

/// Bulk load for all three collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub hotels: Vec<NewHotel>,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub countries: Vec<Country>,
}

/// Number of records inserted per collection by a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub hotels: usize,
    pub cities: usize,
    pub countries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london_hotel() -> Hotel {
        Hotel {
            id: "65f0c1a2b3c4d5e6f7a8b9c0".parse().unwrap(),
            chain_name: "Amba".into(),
            hotel_name: "Amba Hotel Charing Cross".into(),
            city: "London".into(),
            country: "United Kingdom".into(),
        }
    }

    #[test]
    fn test_hotel_id_display_is_lowercase_hex() {
        let id: HotelId = "65F0C1A2B3C4D5E6F7A8B9C0".parse().unwrap();
        assert_eq!(id.to_string(), "65f0c1a2b3c4d5e6f7a8b9c0");
    }

    #[test]
    fn test_hotel_id_rejects_wrong_length() {
        assert_eq!("abc".parse::<HotelId>(), Err(HotelIdError::Length(3)));
        assert!("".parse::<HotelId>().is_err());
    }

    #[test]
    fn test_hotel_id_rejects_non_hex() {
        let err = "zz0000000000000000000000".parse::<HotelId>().unwrap_err();
        assert!(matches!(err, HotelIdError::Hex(_)));
    }

    #[test]
    fn test_hotel_serializes_id_as_underscore_id_string() {
        let json = serde_json::to_value(london_hotel()).unwrap();
        assert_eq!(json["_id"], "65f0c1a2b3c4d5e6f7a8b9c0");
        assert_eq!(json["hotel_name"], "Amba Hotel Charing Cross");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_hotel_matches_any_of_three_fields_ignoring_case() {
        let hotel = london_hotel();
        assert!(hotel.matches("charing"));
        assert!(hotel.matches("LONDON"));
        assert!(hotel.matches("kingdom"));
        assert!(!hotel.matches("Amba Paris"));
    }

    #[test]
    fn test_hotel_does_not_match_on_chain_name_alone() {
        let mut hotel = london_hotel();
        hotel.chain_name = "Hilton".into();
        assert!(!hotel.matches("hilton"));
    }

    #[test]
    fn test_country_is_identified_by_name_or_iso_code_exactly() {
        let uk = Country {
            country: "United Kingdom".into(),
            countryisocode: "GB".into(),
        };
        assert!(uk.is_identified_by("United Kingdom"));
        assert!(uk.is_identified_by("GB"));
        assert!(!uk.is_identified_by("gb"));
        assert!(!uk.is_identified_by("United"));
    }

    #[test]
    fn test_country_substring_ignores_iso_code() {
        let uk = Country {
            country: "United Kingdom".into(),
            countryisocode: "GB".into(),
        };
        assert!(uk.matches("king"));
        assert!(!uk.matches("gb"));
    }

    #[test]
    fn test_contains_ignore_case_treats_needle_literally() {
        assert!(contains_ignore_case("St. Ives (Cornwall)", "(corn"));
        assert!(!contains_ignore_case("Stoke", "st.ke"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_contains_ignore_case_folds_multi_char_lowercase() {
        assert!(contains_ignore_case("İstanbul", "istanbul"));
        assert!(contains_ignore_case("istanbul", "İST"));
        assert!(contains_ignore_case("Zürich", "ZÜR"));
        assert!(!contains_ignore_case("short", "longer needle"));
    }

    #[test]
    fn test_seed_data_sections_are_optional() {
        let seed: SeedData = serde_json::from_str(r#"{"cities":[{"name":"Paris"}]}"#).unwrap();
        assert!(seed.hotels.is_empty());
        assert!(seed.countries.is_empty());
        assert_eq!(seed.cities[0].name, "Paris");
    }

    #[test]
    fn test_new_hotel_keeps_supplied_id() {
        let raw = r#"{"_id":"000000000000000000000001","hotel_name":"H","city":"C","country":"K"}"#;
        let new: NewHotel = serde_json::from_str(raw).unwrap();
        let id = new.id.unwrap();
        let hotel = new.into_hotel(id);
        assert_eq!(hotel.id.to_string(), "000000000000000000000001");
        assert_eq!(hotel.chain_name, "");
    }
}
