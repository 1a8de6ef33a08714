//! Character-class flags and the 4-bit configuration vector.
//!
//! A [`FlagSet`] is the harness's own record of which classes are enabled.
//! It is only ever changed by applying toggles, never read back from the page.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One character-class toggle on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// A-Z
    Uppercase,
    /// a-z
    Lowercase,
    /// 0-9
    Numbers,
    /// ASCII punctuation
    Symbols,
}

impl Flag {
    /// All flags in panel order
    pub const ALL: [Self; 4] = [Self::Uppercase, Self::Lowercase, Self::Numbers, Self::Symbols];

    /// Bit used for this flag inside a [`FlagSet`]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Uppercase => 0b0001,
            Self::Lowercase => 0b0010,
            Self::Numbers => 0b0100,
            Self::Symbols => 0b1000,
        }
    }

    /// Label as printed on the widget
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uppercase => "Uppercase",
            Self::Lowercase => "Lowercase",
            Self::Numbers => "Numbers",
            Self::Symbols => "Symbols",
        }
    }

    /// Whether `c` belongs to this class
    #[must_use]
    pub const fn admits(self, c: char) -> bool {
        match self {
            Self::Uppercase => c.is_ascii_uppercase(),
            Self::Lowercase => c.is_ascii_lowercase(),
            Self::Numbers => c.is_ascii_digit(),
            Self::Symbols => c.is_ascii_punctuation(),
        }
    }

    /// The class `c` belongs to, if any
    #[must_use]
    pub fn classify(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.admits(c))
    }

    /// Parse a flag from its label, case-insensitively
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.label().eq_ignore_ascii_case(label.trim()))
    }

    const fn key_word(self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Numbers => "numbers",
            Self::Symbols => "symbols",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration vector: which character classes are enabled
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FlagSet(u8);

impl FlagSet {
    /// No class enabled. Never visited by the walk.
    pub const EMPTY: Self = Self(0);

    /// Every class enabled, the panel default
    pub const ALL: Self = Self(0b1111);

    /// Build from raw bits; bits above the fourth are dropped
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Build from a list of flags
    #[must_use]
    pub fn from_flags(flags: &[Flag]) -> Self {
        flags.iter().fold(Self::EMPTY, |set, flag| set.with(*flag))
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether `flag` is enabled
    #[must_use]
    pub const fn contains(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Copy with `flag` enabled
    #[must_use]
    pub const fn with(self, flag: Flag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// Copy with `flag` disabled
    #[must_use]
    pub const fn without(self, flag: Flag) -> Self {
        Self(self.0 & !flag.bit())
    }

    /// Copy with `flag` flipped; the effect of one click
    #[must_use]
    pub const fn toggled(self, flag: Flag) -> Self {
        Self(self.0 ^ flag.bit())
    }

    /// Whether no class is enabled
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of enabled classes
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled flags in panel order
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }

    /// Flags in which `self` and `other` differ
    #[must_use]
    pub fn difference(self, other: Self) -> Vec<Flag> {
        Self(self.0 ^ other.0).iter().collect()
    }

    /// Whether every character of `value` belongs to an enabled class
    #[must_use]
    pub fn admits_all(self, value: &str) -> bool {
        value.chars().all(|c| self.iter().any(|flag| flag.admits(c)))
    }

    /// All 15 non-empty subsets, ordered by bits
    pub fn all_non_empty() -> impl Iterator<Item = Self> {
        (1..=0b1111u8).map(Self)
    }

    /// Fixture key for this subset, e.g. `noUppercase` or `lowercaseAndNumbers`
    #[must_use]
    pub fn pattern_key(self) -> String {
        let flags: Vec<Flag> = self.iter().collect();
        match flags.as_slice() {
            [] => "none".to_string(),
            [only] => format!("{}Only", only.key_word()),
            [a, b] => format!("{}And{}", a.key_word(), capitalize(b.key_word())),
            [_, _, _] => {
                let missing = Self::ALL.without_all(self);
                format!("no{}", missing.map_or("", |flag| flag.label()))
            }
            _ => "all".to_string(),
        }
    }

    /// Inverse of [`FlagSet::pattern_key`]
    #[must_use]
    pub fn from_pattern_key(key: &str) -> Option<Self> {
        if key == "none" {
            return Some(Self::EMPTY);
        }
        Self::all_non_empty().find(|set| set.pattern_key() == key)
    }

    fn without_all(self, other: Self) -> Option<Flag> {
        Self(self.0 & !other.0).iter().next()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagSet({self})")
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(Flag::label).collect();
        write!(f, "{{{}}}", labels.join(", "))
    }
}

impl From<FlagSet> for String {
    fn from(set: FlagSet) -> Self {
        set.pattern_key()
    }
}

impl TryFrom<String> for FlagSet {
    type Error = String;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::from_pattern_key(&key).ok_or_else(|| format!("unknown configuration key '{key}'"))
    }
}
