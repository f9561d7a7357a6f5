//! Canonical identifier of one concrete attribute combination.
//!
//! Price entries are stored against an encoded key such as `3:130g|7:Lesk`.
//! Both stored keys and keys built from a caller's selection go through
//! [`AttrsKey`], which keeps its pairs sorted by dimension id, so two keys
//! describing the same combination compare and hash equal no matter how
//! they were assembled.

use super::pricing::AttributeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PAIR_SEPARATOR: char = '|';
pub const VALUE_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttrsKeyError {
    #[error("Malformed attribute pair: {0:?}")]
    MalformedPair(String),

    #[error("Invalid attribute dimension id: {0:?}")]
    InvalidDimension(String),

    #[error("Attribute dimension {0} appears more than once")]
    DuplicateDimension(AttributeId),

    #[error("Value for attribute dimension {0} contains the reserved separator '|'")]
    ReservedSeparator(AttributeId),

    #[error("Value for attribute dimension {0} is empty")]
    EmptyValue(AttributeId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttrsKey(Vec<(AttributeId, String)>);

impl AttrsKey {
    /// Key of a model that does not depend on any attribute
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Values are trimmed, so a key built here and the same key read back
    /// from its encoded form compare equal.
    pub fn new<I, V>(pairs: I) -> Result<Self, AttrsKeyError>
    where
        I: IntoIterator<Item = (AttributeId, V)>,
        V: Into<String>,
    {
        let mut pairs: Vec<(AttributeId, String)> = pairs
            .into_iter()
            .map(|(dimension, value)| {
                let value: String = value.into();
                (dimension, value.trim().to_string())
            })
            .collect();

        for (dimension, value) in &pairs {
            if value.is_empty() {
                return Err(AttrsKeyError::EmptyValue(*dimension));
            }
            if value.contains(PAIR_SEPARATOR) {
                return Err(AttrsKeyError::ReservedSeparator(*dimension));
            }
        }

        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(window) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(AttrsKeyError::DuplicateDimension(window[0].0));
        }

        Ok(Self(pairs))
    }

    pub fn parse(encoded: &str) -> Result<Self, AttrsKeyError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Ok(Self::empty());
        }

        let mut pairs = Vec::new();
        for segment in encoded.split(PAIR_SEPARATOR) {
            let (dimension, value) = segment
                .split_once(VALUE_SEPARATOR)
                .ok_or_else(|| AttrsKeyError::MalformedPair(segment.to_string()))?;
            let dimension: AttributeId = dimension
                .trim()
                .parse()
                .map_err(|_| AttrsKeyError::InvalidDimension(dimension.to_string()))?;
            pairs.push((dimension, value.trim().to_string()));
        }

        Self::new(pairs)
    }

    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(dimension, value)| format!("{}{}{}", dimension, VALUE_SEPARATOR, value))
            .collect::<Vec<_>>()
            .join(&PAIR_SEPARATOR.to_string())
    }

    pub fn pairs(&self) -> &[(AttributeId, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AttrsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for AttrsKey {
    type Err = AttrsKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttrsKey {
    type Error = AttrsKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttrsKey> for String {
    fn from(key: AttrsKey) -> Self {
        key.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_sorted_by_dimension() {
        let key = AttrsKey::new(vec![(7, "Lesk"), (3, "130g")]).unwrap();
        assert_eq!(key.encode(), "3:130g|7:Lesk");
        assert_eq!(key, AttrsKey::new(vec![(3, "130g"), (7, "Lesk")]).unwrap());
    }

    #[test]
    fn test_parse_normalizes_stored_keys() {
        let stored = AttrsKey::parse(" 7:Lesk | 3:130g ").unwrap();
        assert_eq!(stored.encode(), "3:130g|7:Lesk");
        assert_eq!(stored.pairs()[0], (3, "130g".to_string()));
    }

    #[test]
    fn test_value_may_contain_colon() {
        let key = AttrsKey::parse("5:ratio:16:9").unwrap();
        assert_eq!(key.pairs()[0].1, "ratio:16:9");
        assert_eq!(key.to_string().parse::<AttrsKey>().unwrap(), key);
    }

    #[test]
    fn test_empty_key() {
        let key = AttrsKey::parse("").unwrap();
        assert!(key.is_empty());
        assert_eq!(key, AttrsKey::empty());
        assert_eq!(key.encode(), "");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert_eq!(
            AttrsKey::parse("3-130g"),
            Err(AttrsKeyError::MalformedPair("3-130g".to_string()))
        );
        assert!(matches!(AttrsKey::parse("paper:130g"), Err(AttrsKeyError::InvalidDimension(_))));
        assert_eq!(
            AttrsKey::parse("3:a|3:b"),
            Err(AttrsKeyError::DuplicateDimension(3))
        );
        assert_eq!(AttrsKey::parse("3:"), Err(AttrsKeyError::EmptyValue(3)));
        assert_eq!(
            AttrsKey::new(vec![(1, "a|b")]),
            Err(AttrsKeyError::ReservedSeparator(1))
        );
    }

    #[test]
    fn test_new_trims_values_like_parse() {
        let built = AttrsKey::new(vec![(3, " 130g"), (7, "Lesk ")]).unwrap();
        assert_eq!(built.encode(), "3:130g|7:Lesk");
        assert_eq!(AttrsKey::parse(&built.encode()).unwrap(), built);
        assert_eq!(built, AttrsKey::parse("3:130g |7: Lesk").unwrap());

        assert_eq!(AttrsKey::new(vec![(3, "   ")]), Err(AttrsKeyError::EmptyValue(3)));
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let samples: Vec<Vec<(AttributeId, &str)>> = vec![
            vec![],
            vec![(1, "A4")],
            vec![(12, "ratio:16:9"), (3, " 130g ")],
            vec![(9, "Lesk"), (2, "obojstranne"), (5, "350g\t")],
        ];

        for pairs in samples {
            let key = AttrsKey::new(pairs).unwrap();
            let back = AttrsKey::parse(&key.encode()).unwrap();
            assert_eq!(back, key);
            assert_eq!(back.encode(), key.encode());
        }
    }

    #[test]
    fn test_serializes_as_encoded_string() {
        let key = AttrsKey::new(vec![(2, "A4")]).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2:A4\"");
        let back: AttrsKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
