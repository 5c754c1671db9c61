use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{btree_map::Entry, BTreeMap};
use std::fmt;

/// Identifier of a participant on either side of the market.
///
/// Accepts both JSON strings and JSON integers on input (`"a"`, `1`) so that
/// instances written with numeric proposers and lettered reviewers round-trip
/// without quoting every number. Always emitted as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> de::Visitor<'de> for IdVisitor {
            type Value = ParticipantId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a participant id (string or integer)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ParticipantId(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ParticipantId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ParticipantId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ParticipantId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Raw preference maps, most preferred first
pub type PreferenceMap = BTreeMap<ParticipantId, Vec<ParticipantId>>;

/// Deserialize a [`PreferenceMap`], failing when a participant is keyed twice
pub fn unique_preferences<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<PreferenceMap, D::Error> {
    struct UniqueKeys;

    impl<'de> de::Visitor<'de> for UniqueKeys {
        type Value = PreferenceMap;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from participant id to preference list")
        }

        fn visit_map<A: de::MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = PreferenceMap::new();
            while let Some((id, preferences)) =
                access.next_entry::<ParticipantId, Vec<ParticipantId>>()?
            {
                match map.entry(id) {
                    Entry::Occupied(entry) => {
                        return Err(de::Error::custom(format!(
                            "participant {} is listed more than once",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(preferences);
                    }
                }
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueKeys)
}

/// Which group a participant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Proposer,
    Reviewer,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Proposer => Side::Reviewer,
            Side::Reviewer => Side::Proposer,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Proposer => f.write_str("proposer"),
            Side::Reviewer => f.write_str("reviewer"),
        }
    }
}

/// A full problem instance: both groups' preference lists
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PreferenceInstance {
    #[serde(deserialize_with = "unique_preferences")]
    pub proposers: PreferenceMap,
    #[serde(deserialize_with = "unique_preferences")]
    pub reviewers: PreferenceMap,
}

impl PreferenceInstance {
    pub fn new(proposers: PreferenceMap, reviewers: PreferenceMap) -> Self {
        Self { proposers, reviewers }
    }

    /// Number of participants per side (proposer count)
    pub fn size(&self) -> usize {
        self.proposers.len()
    }
}

/// A matched couple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub proposer: ParticipantId,
    pub reviewer: ParticipantId,
}

impl Pair {
    pub fn new(proposer: impl Into<ParticipantId>, reviewer: impl Into<ParticipantId>) -> Self {
        Self {
            proposer: proposer.into(),
            reviewer: reviewer.into(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.proposer, self.reviewer)
    }
}

/// A set of pairs, kept sorted by proposer id so equal matchings compare equal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matching {
    pairs: Vec<Pair>,
}

impl Matching {
    pub fn new(mut pairs: Vec<Pair>) -> Self {
        pairs.sort();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.binary_search(pair).is_ok()
    }

    /// Reviewer held by `proposer`, if any
    pub fn reviewer_of(&self, proposer: &ParticipantId) -> Option<&ParticipantId> {
        self.pairs
            .iter()
            .find(|pair| &pair.proposer == proposer)
            .map(|pair| &pair.reviewer)
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }
}

impl From<Vec<Pair>> for Matching {
    fn from(pairs: Vec<Pair>) -> Self {
        Self::new(pairs)
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", pair)?;
        }
        f.write_str("}")
    }
}

/// Observable events of one deferred-acceptance round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrace {
    pub round: usize,
    /// Proposals made this morning
    pub proposals: Vec<Pair>,
    /// Reviewers' choices as of this afternoon (new or upgraded only)
    pub accepted: Vec<Pair>,
    /// Proposers turned away this evening, paired with the reviewer who refused them
    pub rejected: Vec<Pair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_accepts_numbers() {
        let ids: Vec<ParticipantId> = serde_json::from_str(r#"[1, "b", 3]"#).unwrap();
        assert_eq!(ids, vec!["1".into(), "b".into(), "3".into()]);
    }

    #[test]
    fn test_participant_id_as_map_key() {
        let map: PreferenceMap = serde_json::from_str(r#"{"1": ["a", "b"], "2": ["b", "a"]}"#).unwrap();
        assert_eq!(map[&ParticipantId::from("2")], vec!["b".into(), "a".into()]);
    }

    #[test]
    fn test_repeated_participant_is_refused() {
        let raw = r#"{"proposers": {"1": ["a", "b"], "2": ["a", "b"], "2": ["b", "a"]},
                      "reviewers": {"a": [1, 2], "b": [1, 2]}}"#;
        let err = serde_json::from_str::<PreferenceInstance>(raw).unwrap_err();
        assert!(err.to_string().contains("participant 2 is listed more than once"));

        let ok = r#"{"proposers": {"1": ["a"]}, "reviewers": {"a": [1]}}"#;
        let instance: PreferenceInstance = serde_json::from_str(ok).unwrap();
        assert_eq!(instance.size(), 1);
    }

    #[test]
    fn test_matching_sorted_and_comparable() {
        let left = Matching::new(vec![Pair::new("2", "a"), Pair::new("1", "b")]);
        let right = Matching::new(vec![Pair::new("1", "b"), Pair::new("2", "a")]);
        assert_eq!(left, right);
        assert_eq!(left.pairs()[0].proposer.as_str(), "1");
        assert!(left.contains(&Pair::new("2", "a")));
        assert_eq!(left.reviewer_of(&"1".into()).map(|r| r.as_str()), Some("b"));
        assert_eq!(left.to_string(), "{(1, b), (2, a)}");
    }

    #[test]
    fn test_matching_serializes_as_list() {
        let matching = Matching::new(vec![Pair::new("x", "y")]);
        let json = serde_json::to_string(&matching).unwrap();
        assert_eq!(json, r#"[{"proposer":"x","reviewer":"y"}]"#);
    }
}
