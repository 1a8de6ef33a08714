//! Oracle table: what a generated value may contain under each configuration.
//!
//! Every entry is a typed character-class check keyed by [`FlagSet`]. Fixture
//! regex patterns can be layered on top; they are cross-checked against the
//! typed classes when the table is built so the two never drift apart.

use crate::flag::{Flag, FlagSet};
use crate::result::{ProbeError, ProbeResult};
use regex::Regex;
use std::collections::BTreeMap;

/// Expected shape of generated values for one configuration
#[derive(Debug, Clone)]
pub struct OracleEntry {
    configuration: FlagSet,
    pattern: Option<Regex>,
}

impl OracleEntry {
    /// Typed entry with no textual pattern
    #[must_use]
    pub fn new(configuration: FlagSet) -> Self {
        Self {
            configuration,
            pattern: None,
        }
    }

    /// Attach a fixture pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Configuration this entry describes
    #[must_use]
    pub const fn configuration(&self) -> FlagSet {
        self.configuration
    }

    /// Fixture pattern source, if any
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    /// Validate a generated value against this entry
    pub fn check(&self, value: &str) -> ProbeResult<()> {
        let mismatch = |reason: String| ProbeError::OracleMismatch {
            configuration: self.configuration,
            value: value.to_string(),
            reason,
        };

        if value.is_empty() {
            return Err(mismatch("value is empty".to_string()));
        }

        if !self.configuration.admits_all(value) {
            for c in value.chars() {
                match Flag::classify(c) {
                    None => return Err(mismatch(format!("{c:?} belongs to no character class"))),
                    Some(flag) if !self.configuration.contains(flag) => {
                        return Err(mismatch(format!("{c:?} is {flag}, which is disabled")));
                    }
                    Some(_) => {}
                }
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(mismatch(format!("does not match /{}/", pattern.as_str())));
            }
        }

        Ok(())
    }

    fn self_check(&self) -> ProbeResult<()> {
        let Some(pattern) = &self.pattern else {
            return Ok(());
        };
        let key = self.configuration.pattern_key();
        let accepted = witness(self.configuration);
        if !pattern.is_match(&accepted) {
            return Err(ProbeError::fixture(format!(
                "pattern '{key}' /{}/ rejects {accepted:?}, which only uses enabled classes",
                pattern.as_str()
            )));
        }
        for outside in Flag::ALL.into_iter().filter(|f| !self.configuration.contains(*f)) {
            let rejected = format!("{accepted}{}", witness_char(outside));
            if pattern.is_match(&rejected) {
                return Err(ProbeError::fixture(format!(
                    "pattern '{key}' /{}/ accepts {rejected:?}, which contains {outside}",
                    pattern.as_str()
                )));
            }
        }
        Ok(())
    }
}

const fn witness_char(flag: Flag) -> char {
    match flag {
        Flag::Uppercase => 'A',
        Flag::Lowercase => 'a',
        Flag::Numbers => '0',
        Flag::Symbols => '!',
    }
}

fn witness(configuration: FlagSet) -> String {
    configuration.iter().map(witness_char).collect()
}

/// Complete mapping from configuration to oracle entry
#[derive(Debug, Clone, Default)]
pub struct OracleTable {
    entries: BTreeMap<FlagSet, OracleEntry>,
}

impl OracleTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed entries for all 15 non-empty configurations
    #[must_use]
    pub fn standard() -> Self {
        let entries = FlagSet::all_non_empty()
            .map(|set| (set, OracleEntry::new(set)))
            .collect();
        Self { entries }
    }

    /// Build from fixture patterns keyed by configuration name (`all`, `noUppercase`, ...).
    ///
    /// Each key gets a typed entry plus its compiled pattern. Unknown keys,
    /// the all-false key, invalid regexes and patterns that disagree with the
    /// typed classes are rejected.
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> ProbeResult<Self> {
        let mut table = Self::new();
        for (key, source) in patterns {
            let configuration = FlagSet::from_pattern_key(key)
                .ok_or_else(|| ProbeError::fixture(format!("unknown pattern key '{key}'")))?;
            if configuration.is_empty() {
                return Err(ProbeError::fixture(
                    "a pattern for the all-disabled configuration cannot be checked",
                ));
            }
            let regex = Regex::new(source).map_err(|e| {
                ProbeError::fixture(format!("pattern '{key}' does not compile: {e}"))
            })?;
            let entry = OracleEntry::new(configuration).with_pattern(regex);
            entry.self_check()?;
            table.insert(entry);
        }
        Ok(table)
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, entry: OracleEntry) {
        let _ = self.entries.insert(entry.configuration(), entry);
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `configuration`
    pub fn entry(&self, configuration: FlagSet) -> ProbeResult<&OracleEntry> {
        self.entries
            .get(&configuration)
            .ok_or(ProbeError::MissingOracleEntry { configuration })
    }

    /// Validate `value` for `configuration`
    pub fn check(&self, configuration: FlagSet, value: &str) -> ProbeResult<()> {
        self.entry(configuration)?.check(value)
    }

    /// Fail fast unless every configuration in `visits` has an entry
    pub fn ensure_covers(&self, visits: impl IntoIterator<Item = FlagSet>) -> ProbeResult<()> {
        for configuration in visits {
            let _ = self.entry(configuration)?;
        }
        Ok(())
    }

    /// Entries in configuration order
    pub fn entries(&self) -> impl Iterator<Item = &OracleEntry> {
        self.entries.values()
    }
}

/// Union of the classes present across `samples`
#[must_use]
pub fn observed_classes<'a>(samples: impl IntoIterator<Item = &'a str>) -> FlagSet {
    samples
        .into_iter()
        .flat_map(str::chars)
        .filter_map(Flag::classify)
        .fold(FlagSet::EMPTY, FlagSet::with)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    mod entry_tests {
        use super::*;

        #[test]
        fn test_accepts_only_enabled_classes() {
            let entry = OracleEntry::new(FlagSet::from_flags(&[Flag::Lowercase, Flag::Numbers]));
            assert!(entry.check("abc123xyz").is_ok());
            assert!(entry.check("abc").is_ok());
        }

        #[test]
        fn test_rejects_disabled_class() {
            let entry = OracleEntry::new(FlagSet::ALL.without(Flag::Uppercase));
            let err = entry.check("abc1!Z").unwrap_err();
            assert!(matches!(err, ProbeError::OracleMismatch { .. }));
            assert!(err.to_string().contains("Uppercase"));
        }

        #[test]
        fn test_rejects_unclassified_character() {
            let entry = OracleEntry::new(FlagSet::ALL);
            assert!(entry.check("abc def").is_err());
        }

        #[test]
        fn test_rejects_empty_value() {
            let entry = OracleEntry::new(FlagSet::ALL);
            assert!(entry.check("").is_err());
        }

        #[test]
        fn test_pattern_applied_after_classes() {
            let entry = OracleEntry::new(FlagSet::from_flags(&[Flag::Numbers]))
                .with_pattern(Regex::new("^[0-9]{4}$").unwrap());
            assert!(entry.check("1234").is_ok());
            let err = entry.check("12345").unwrap_err();
            assert!(err.to_string().contains("does not match"));
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn test_standard_covers_every_non_empty_subset() {
            let table = OracleTable::standard();
            assert_eq!(table.len(), 15);
            assert!(table.ensure_covers(FlagSet::all_non_empty()).is_ok());
        }

        #[test]
        fn test_missing_entry_is_reported() {
            let table = OracleTable::standard();
            let err = table.ensure_covers([FlagSet::EMPTY]).unwrap_err();
            assert!(matches!(err, ProbeError::MissingOracleEntry { .. }));
        }

        #[test]
        fn test_from_patterns() {
            let table = OracleTable::from_patterns(&patterns(&[
                ("lowercaseAndNumbers", "^[a-z0-9]+$"),
                ("symbolsOnly", r"^[!-/:-@\[-`{-~]+$"),
            ]))
            .unwrap();
            assert_eq!(table.len(), 2);
            let set = FlagSet::from_flags(&[Flag::Lowercase, Flag::Numbers]);
            assert_eq!(table.entry(set).unwrap().pattern(), Some("^[a-z0-9]+$"));
            assert!(table.check(set, "a1b2").is_ok());
            assert!(table.check(FlagSet::ALL, "a1b2").is_err());
        }

        #[test]
        fn test_from_patterns_rejects_unknown_key() {
            let err = OracleTable::from_patterns(&patterns(&[("everything", ".*")])).unwrap_err();
            assert!(err.to_string().contains("unknown pattern key"));
        }

        #[test]
        fn test_from_patterns_rejects_bad_regex() {
            let err = OracleTable::from_patterns(&patterns(&[("all", "([")])).unwrap_err();
            assert!(err.to_string().contains("does not compile"));
        }

        #[test]
        fn test_from_patterns_rejects_loose_pattern() {
            // Accepts uppercase although uppercase is disabled
            let err =
                OracleTable::from_patterns(&patterns(&[("noUppercase", "^[A-Za-z0-9!]+$")]))
                    .unwrap_err();
            assert!(err.to_string().contains("contains Uppercase"));
        }

        #[test]
        fn test_from_patterns_rejects_tight_pattern() {
            let err = OracleTable::from_patterns(&patterns(&[("lowercaseAndNumbers", "^[a-z]+$")]))
                .unwrap_err();
            assert!(err.to_string().contains("rejects"));
        }

        #[test]
        fn test_from_patterns_rejects_all_disabled_key() {
            assert!(OracleTable::from_patterns(&patterns(&[("none", "^$")])).is_err());
        }
    }

    #[test]
    fn test_observed_classes() {
        let seen = observed_classes(["abc", "123", "xY"]);
        assert_eq!(
            seen,
            FlagSet::from_flags(&[Flag::Lowercase, Flag::Numbers, Flag::Uppercase])
        );
        assert_eq!(observed_classes(Vec::<&str>::new()), FlagSet::EMPTY);
    }
}
