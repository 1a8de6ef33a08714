//! Toggle widgets and how to read their state.
//!
//! The panel's checkboxes are `<label>`s with a click handler. Checked and
//! unchecked differ only in the `background-color` of the label's `::before`
//! pseudo-element, so [`PseudoElementToggle`] reads that computed style on
//! every call and maps it through two known colours. Anything else is an
//! ambiguous state and an error. [`NativeCheckbox`] covers panels that use a
//! real `<input type="checkbox">`.

use crate::driver::PageDriver;
use crate::flag::Flag;
use crate::flag::FlagSet;
use crate::locator::{names, Locator, LocatorRegistry, Selector};
use crate::wait::WaitOptions;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Capability interface over one toggle widget technology
#[async_trait]
pub trait ToggleWidgetAdapter: Send + Sync + fmt::Debug {
    /// Flag this widget controls
    fn flag(&self) -> Flag;

    /// Read the widget's current state. Never cached.
    async fn is_checked(&self, page: &dyn PageDriver) -> ProbeResult<bool>;

    /// Click the widget once
    async fn toggle(&self, page: &mut dyn PageDriver) -> ProbeResult<()>;
}

/// An sRGB colour with alpha, as browsers report computed colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CssColor {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha, 0-255
    pub a: u8,
}

impl CssColor {
    /// Opaque colour
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `rgb(...)`, `rgba(...)` or `#rrggbb` / `#rgb`
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        static FUNCTIONAL: OnceLock<Option<Regex>> = OnceLock::new();
        let functional = FUNCTIONAL.get_or_init(|| {
            Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,?\s*(\d{1,3})\s*,?\s*(\d{1,3})\s*(?:[,/]\s*([0-9.]+%?)\s*)?\)$")
                .ok()
        });

        let raw = raw.trim().to_ascii_lowercase();
        if let Some(hex) = raw.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let caps = functional.as_ref()?.captures(&raw)?;
        let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
        let alpha = match caps.get(4) {
            None => 255,
            Some(m) => parse_alpha(m.as_str())?,
        };
        Some(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
            a: alpha,
        })
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let byte = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
    }
}

fn parse_alpha(raw: &str) -> Option<u8> {
    let fraction = match raw.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => raw.parse::<f64>().ok()?,
    };
    if !(0.0..=1.0).contains(&fraction) {
        return None;
    }
    Some((fraction * 255.0).round() as u8)
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = f64::from(self.a) / 255.0;
            write!(f, "rgba({}, {}, {}, {alpha:.2})", self.r, self.g, self.b)
        }
    }
}

/// Where the state lives and which two values encode it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProbe {
    /// Pseudo-element to read, e.g. `::before`
    pub pseudo: String,
    /// Computed style property
    pub property: String,
    /// Value meaning checked
    pub checked: String,
    /// Value meaning unchecked
    pub unchecked: String,
}

impl Default for StyleProbe {
    fn default() -> Self {
        Self {
            pseudo: "::before".to_string(),
            property: "background-color".to_string(),
            checked: "rgb(221, 34, 34)".to_string(),
            unchecked: "rgb(255, 255, 255)".to_string(),
        }
    }
}

impl StyleProbe {
    /// Map an observed value to a state.
    ///
    /// Colours are compared after parsing, so `rgb(221,34,34)` and
    /// `#dd2222` both count as checked. Values that do not parse are
    /// compared verbatim.
    pub fn classify(&self, widget: &str, observed: &str) -> ProbeResult<bool> {
        if same_value(observed, &self.checked) {
            Ok(true)
        } else if same_value(observed, &self.unchecked) {
            Ok(false)
        } else {
            Err(ProbeError::AmbiguousWidgetState {
                widget: widget.to_string(),
                property: format!("{} {}", self.pseudo, self.property),
                observed: observed.to_string(),
                checked: self.checked.clone(),
                unchecked: self.unchecked.clone(),
            })
        }
    }

    /// Reject probes whose two states cannot be told apart
    pub fn validate(&self) -> ProbeResult<()> {
        if same_value(&self.checked, &self.unchecked) {
            return Err(ProbeError::ConfigError {
                message: format!(
                    "checked and unchecked values are identical ({})",
                    self.checked
                ),
            });
        }
        Ok(())
    }
}

fn same_value(a: &str, b: &str) -> bool {
    match (CssColor::parse(a), CssColor::parse(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a.trim() == b.trim(),
    }
}

/// Label-style toggle whose state is only visible in a pseudo-element style
#[derive(Debug, Clone)]
pub struct PseudoElementToggle {
    flag: Flag,
    click_target: Locator,
    state_target: Selector,
    probe: StyleProbe,
}

impl PseudoElementToggle {
    /// Widget clicked through `locator`; state read from the descendant
    /// carrying the flag's label text.
    #[must_use]
    pub fn new(flag: Flag, locator: Locator, probe: StyleProbe) -> Self {
        let state_target = locator.selector().clone().within_text(flag.label());
        Self {
            flag,
            click_target: locator,
            state_target,
            probe,
        }
    }

    /// Selector whose pseudo-element is read
    #[must_use]
    pub const fn state_target(&self) -> &Selector {
        &self.state_target
    }

    /// Style probe in use
    #[must_use]
    pub const fn probe(&self) -> &StyleProbe {
        &self.probe
    }
}

#[async_trait]
impl ToggleWidgetAdapter for PseudoElementToggle {
    fn flag(&self) -> Flag {
        self.flag
    }

    async fn is_checked(&self, page: &dyn PageDriver) -> ProbeResult<bool> {
        let observed = page
            .computed_style(
                &self.state_target,
                Some(self.probe.pseudo.as_str()),
                &self.probe.property,
            )
            .await?;
        let state = self.probe.classify(self.flag.label(), &observed)?;
        tracing::trace!(widget = %self.flag, %observed, state, "pseudo-element read");
        Ok(state)
    }

    async fn toggle(&self, page: &mut dyn PageDriver) -> ProbeResult<()> {
        page.click(&self.click_target).await
    }
}

/// Plain `<input type="checkbox">`
#[derive(Debug, Clone)]
pub struct NativeCheckbox {
    flag: Flag,
    locator: Locator,
}

impl NativeCheckbox {
    /// Checkbox at `locator`
    #[must_use]
    pub const fn new(flag: Flag, locator: Locator) -> Self {
        Self { flag, locator }
    }
}

#[async_trait]
impl ToggleWidgetAdapter for NativeCheckbox {
    fn flag(&self) -> Flag {
        self.flag
    }

    async fn is_checked(&self, page: &dyn PageDriver) -> ProbeResult<bool> {
        page.checked_property(self.locator.selector())
            .await?
            .ok_or_else(|| ProbeError::AmbiguousWidgetState {
                widget: self.flag.label().to_string(),
                property: "checked".to_string(),
                observed: "(no native checked property)".to_string(),
                checked: "true".to_string(),
                unchecked: "false".to_string(),
            })
    }

    async fn toggle(&self, page: &mut dyn PageDriver) -> ProbeResult<()> {
        page.click(&self.locator).await
    }
}

/// Which adapter a panel's toggles need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// State only in a pseudo-element style
    #[default]
    PseudoElement,
    /// Native checkbox input
    Native,
}

impl WidgetKind {
    /// Build the adapter for `flag` at `locator`
    #[must_use]
    pub fn adapter(
        self,
        flag: Flag,
        locator: Locator,
        probe: &StyleProbe,
    ) -> Box<dyn ToggleWidgetAdapter> {
        match self {
            Self::PseudoElement => Box::new(PseudoElementToggle::new(flag, locator, probe.clone())),
            Self::Native => Box::new(NativeCheckbox::new(flag, locator)),
        }
    }
}

/// The four toggles of the panel, one adapter per flag
#[derive(Debug)]
pub struct WidgetSet {
    adapters: Vec<Box<dyn ToggleWidgetAdapter>>,
}

impl WidgetSet {
    /// Logical locator name of the toggle for `flag`
    #[must_use]
    pub const fn locator_name(flag: Flag) -> &'static str {
        match flag {
            Flag::Uppercase => names::CHECKBOX_UPPERCASE,
            Flag::Lowercase => names::CHECKBOX_LOWERCASE,
            Flag::Numbers => names::CHECKBOX_NUMBERS,
            Flag::Symbols => names::CHECKBOX_SYMBOLS,
        }
    }

    /// Build adapters for every flag from the registry
    pub fn from_registry(
        registry: &LocatorRegistry,
        kind: WidgetKind,
        probe: &StyleProbe,
        wait: WaitOptions,
    ) -> ProbeResult<Self> {
        probe.validate()?;
        let adapters = Flag::ALL
            .into_iter()
            .map(|flag| {
                let locator = registry.locator(Self::locator_name(flag))?.with_wait(wait);
                Ok(kind.adapter(flag, locator, probe))
            })
            .collect::<ProbeResult<Vec<_>>>()?;
        Ok(Self { adapters })
    }

    /// Adapter for `flag`
    pub fn get(&self, flag: Flag) -> ProbeResult<&dyn ToggleWidgetAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.flag() == flag)
            .map(|adapter| &**adapter)
            .ok_or_else(|| ProbeError::UnknownLocator {
                name: Self::locator_name(flag).to_string(),
            })
    }

    /// Read every toggle into a configuration vector
    pub async fn read(&self, page: &dyn PageDriver) -> ProbeResult<FlagSet> {
        let mut state = FlagSet::EMPTY;
        for adapter in &self.adapters {
            if adapter.is_checked(page).await? {
                state = state.with(adapter.flag());
            }
        }
        Ok(state)
    }

    /// Fail unless the page shows exactly `expected`
    pub async fn expect(&self, page: &dyn PageDriver, expected: FlagSet) -> ProbeResult<()> {
        let observed = self.read(page).await?;
        match expected.difference(observed).first() {
            None => Ok(()),
            Some(flag) => Err(ProbeError::WidgetStateMismatch {
                widget: flag.label().to_string(),
                expected: expected.contains(*flag),
                observed: observed.contains(*flag),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod color_tests {
        use super::*;

        #[test]
        fn test_parse_rgb() {
            assert_eq!(CssColor::parse("rgb(221, 34, 34)"), Some(CssColor::rgb(221, 34, 34)));
            assert_eq!(CssColor::parse("rgb(221,34,34)"), Some(CssColor::rgb(221, 34, 34)));
            assert_eq!(CssColor::parse("RGB(1 2 3)"), Some(CssColor::rgb(1, 2, 3)));
        }

        #[test]
        fn test_parse_rgba() {
            let c = CssColor::parse("rgba(255, 255, 255, 0.5)").unwrap();
            assert_eq!((c.r, c.g, c.b, c.a), (255, 255, 255, 128));
            assert_eq!(CssColor::parse("rgba(0, 0, 0, 1)"), Some(CssColor::rgb(0, 0, 0)));
            assert_eq!(CssColor::parse("rgb(0 0 0 / 100%)"), Some(CssColor::rgb(0, 0, 0)));
        }

        #[test]
        fn test_parse_hex() {
            assert_eq!(CssColor::parse("#dd2222"), Some(CssColor::rgb(221, 34, 34)));
            assert_eq!(CssColor::parse("#fff"), Some(CssColor::rgb(255, 255, 255)));
            assert_eq!(CssColor::parse("#ffff"), None);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert_eq!(CssColor::parse("transparent"), None);
            assert_eq!(CssColor::parse("rgb(300, 0, 0)"), None);
            assert_eq!(CssColor::parse(""), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(CssColor::rgb(221, 34, 34).to_string(), "rgb(221, 34, 34)");
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_classify_known_values() {
            let probe = StyleProbe::default();
            assert!(probe.classify("Uppercase", "rgb(221, 34, 34)").unwrap());
            assert!(!probe.classify("Uppercase", "rgb(255, 255, 255)").unwrap());
            assert!(probe.classify("Uppercase", "#dd2222").unwrap());
        }

        #[test]
        fn test_classify_unknown_value_is_ambiguous() {
            let probe = StyleProbe::default();
            let err = probe.classify("Numbers", "rgb(238, 144, 144)").unwrap_err();
            match err {
                ProbeError::AmbiguousWidgetState { widget, observed, .. } => {
                    assert_eq!(widget, "Numbers");
                    assert_eq!(observed, "rgb(238, 144, 144)");
                }
                other => panic!("expected ambiguous state, got {other}"),
            }
        }

        #[test]
        fn test_classify_transparent_is_ambiguous() {
            let probe = StyleProbe::default();
            assert!(probe.classify("Symbols", "rgba(0, 0, 0, 0)").is_err());
        }

        #[test]
        fn test_validate_rejects_identical_states() {
            let probe = StyleProbe {
                unchecked: "#dd2222".to_string(),
                ..StyleProbe::default()
            };
            assert!(probe.validate().is_err());
            assert!(StyleProbe::default().validate().is_ok());
        }
    }

    mod adapter_tests {
        use super::*;

        #[test]
        fn test_pseudo_toggle_reads_label_descendant() {
            let locator = Locator::new("checkboxNumbers", Selector::css("#numbers"));
            let toggle = PseudoElementToggle::new(Flag::Numbers, locator, StyleProbe::default());
            assert_eq!(
                toggle.state_target(),
                &Selector::css("#numbers").within_text("Numbers")
            );
            assert_eq!(toggle.flag(), Flag::Numbers);
        }

        #[test]
        fn test_widget_kind_builds_adapter() {
            let locator = Locator::new("checkboxSymbols", Selector::css("#s"));
            let adapter = WidgetKind::Native.adapter(Flag::Symbols, locator, &StyleProbe::default());
            assert_eq!(adapter.flag(), Flag::Symbols);
            assert!(format!("{adapter:?}").contains("NativeCheckbox"));
        }
    }
}
