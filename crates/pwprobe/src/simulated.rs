//! In-memory model of the password-generator panel.
//!
//! [`SimulatedPanel`] implements [`PageDriver`] against a page model so the
//! harness can run end to end without a browser. It resolves selectors
//! through the same [`LocatorRegistry`] the harness uses, paints toggle
//! state into the label's `::before` background colour, and can be told to
//! misbehave with [`Fault`]s.
//!
//! Panel behaviour:
//! - only the entry button exists until it has been clicked
//! - all four classes start enabled, length 12
//! - toggling a class regenerates; unchecking the last enabled class is refused
//! - the length field is applied when "generate" is clicked: empty or
//!   non-numeric input means 1, other values clamp to `1..=99`
//! - every generated value carries at least one character of each enabled class

use crate::driver::PageDriver;
use crate::flag::{Flag, FlagSet};
use crate::locator::{names, Locator, LocatorRegistry, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::widget::StyleProbe;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Shortest length the panel produces
pub const MIN_LENGTH: usize = 1;
/// Longest length the panel produces
pub const MAX_LENGTH: usize = 99;
/// Length shown when the panel opens
pub const DEFAULT_LENGTH: usize = 12;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!#$%&*@^";

/// Colour painted by [`Fault::AmbiguousStyle`]
const AMBIGUOUS_COLOR: &str = "rgb(238, 144, 144)";

/// Simple xorshift64 PRNG for deterministic panels
#[derive(Debug, Clone)]
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next() % bound as u64) as usize
    }
}

/// A deliberate defect in the simulated panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Class keeps appearing after it is disabled
    IgnoreFlag(Flag),
    /// Class never appears even when enabled
    DropFlag(Flag),
    /// "Generate" leaves the value unchanged
    StuckValue,
    /// Out-of-range lengths are used as typed
    NoClamp,
    /// Empty length input keeps the previous length
    KeepLengthOnEmpty,
    /// Toggle paints a colour that is neither checked nor unchecked
    AmbiguousStyle(Flag),
    /// Clicking the toggle changes generation but not its paint
    StuckWidget(Flag),
    /// The named element is never rendered
    Missing(String),
    /// The value field shows the previous value for this many reads after each change
    Lag(u32),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IgnoreFlag(flag) => write!(f, "ignore-flag:{}", flag.label().to_lowercase()),
            Self::DropFlag(flag) => write!(f, "drop-flag:{}", flag.label().to_lowercase()),
            Self::StuckValue => f.write_str("stuck-value"),
            Self::NoClamp => f.write_str("no-clamp"),
            Self::KeepLengthOnEmpty => f.write_str("keep-length-on-empty"),
            Self::AmbiguousStyle(flag) => {
                write!(f, "ambiguous-style:{}", flag.label().to_lowercase())
            }
            Self::StuckWidget(flag) => write!(f, "stuck-widget:{}", flag.label().to_lowercase()),
            Self::Missing(name) => write!(f, "missing:{name}"),
            Self::Lag(reads) => write!(f, "lag:{reads}"),
        }
    }
}

impl FromStr for Fault {
    type Err = ProbeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match raw.trim().split_once(':') {
            Some((kind, arg)) => (kind, Some(arg.trim())),
            None => (raw.trim(), None),
        };
        let flag = || {
            arg.and_then(Flag::from_label).ok_or_else(|| {
                ProbeError::ConfigError {
                    message: format!("fault '{raw}' needs a flag: uppercase, lowercase, numbers or symbols"),
                }
            })
        };
        match kind {
            "ignore-flag" => Ok(Self::IgnoreFlag(flag()?)),
            "drop-flag" => Ok(Self::DropFlag(flag()?)),
            "stuck-value" => Ok(Self::StuckValue),
            "no-clamp" => Ok(Self::NoClamp),
            "keep-length-on-empty" => Ok(Self::KeepLengthOnEmpty),
            "ambiguous-style" => Ok(Self::AmbiguousStyle(flag()?)),
            "stuck-widget" => Ok(Self::StuckWidget(flag()?)),
            "missing" => match arg {
                Some(name) if !name.is_empty() => Ok(Self::Missing(name.to_string())),
                _ => Err(ProbeError::ConfigError {
                    message: format!("fault '{raw}' needs a locator name"),
                }),
            },
            "lag" => arg
                .and_then(|n| n.parse().ok())
                .map(Self::Lag)
                .ok_or_else(|| ProbeError::ConfigError {
                    message: format!("fault '{raw}' needs a read count"),
                }),
            _ => Err(ProbeError::ConfigError {
                message: format!("unknown fault '{raw}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    UseGenerator,
    Generate,
    PasswordValue,
    PasswordLength,
    Toggle(Flag),
}

impl Element {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            names::USE_PASSWORD_GENERATOR => Some(Self::UseGenerator),
            names::GENERATE_PASSWORD => Some(Self::Generate),
            names::PASSWORD_VALUE => Some(Self::PasswordValue),
            names::PASSWORD_LENGTH => Some(Self::PasswordLength),
            names::CHECKBOX_UPPERCASE => Some(Self::Toggle(Flag::Uppercase)),
            names::CHECKBOX_LOWERCASE => Some(Self::Toggle(Flag::Lowercase)),
            names::CHECKBOX_NUMBERS => Some(Self::Toggle(Flag::Numbers)),
            names::CHECKBOX_SYMBOLS => Some(Self::Toggle(Flag::Symbols)),
            _ => None,
        }
    }
}

/// Simulated password-generator page
#[derive(Debug)]
pub struct SimulatedPanel {
    registry: LocatorRegistry,
    probe: StyleProbe,
    faults: Vec<Fault>,
    rng: Xorshift64,
    url: String,
    open: bool,
    enabled: FlagSet,
    painted: FlagSet,
    length_field: String,
    value: String,
    previous_value: String,
    lagging_reads: AtomicU32,
    /// Mutating calls, for verification
    pub call_history: Vec<String>,
}

impl SimulatedPanel {
    /// Panel whose elements are found through `registry`
    #[must_use]
    pub fn new(registry: LocatorRegistry) -> Self {
        Self {
            registry,
            probe: StyleProbe::default(),
            faults: Vec::new(),
            rng: Xorshift64::new(0x5EED_CAFE),
            url: String::from("about:blank"),
            open: false,
            enabled: FlagSet::ALL,
            painted: FlagSet::ALL,
            length_field: DEFAULT_LENGTH.to_string(),
            value: String::new(),
            previous_value: String::new(),
            lagging_reads: AtomicU32::new(0),
            call_history: Vec::new(),
        }
    }

    /// Use a fixed seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Xorshift64::new(seed);
        self
    }

    /// Paint toggles with these colours
    #[must_use]
    pub fn with_probe(mut self, probe: StyleProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Inject a fault
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Inject several faults
    #[must_use]
    pub fn with_faults(mut self, faults: impl IntoIterator<Item = Fault>) -> Self {
        self.faults.extend(faults);
        self
    }

    /// Classes the generator currently uses, before faults
    #[must_use]
    pub const fn enabled(&self) -> FlagSet {
        self.enabled
    }

    /// Current generated value, ignoring display lag
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    fn has_fault(&self, fault: &Fault) -> bool {
        self.faults.contains(fault)
    }

    fn is_missing(&self, name: &str) -> bool {
        self.faults
            .iter()
            .any(|fault| matches!(fault, Fault::Missing(missing) if missing == name))
    }

    fn resolve(&self, selector: &Selector) -> ProbeResult<Element> {
        let found = self.registry.iter().find_map(|(name, registered)| {
            let matches = match selector {
                Selector::CssWithText { css, text } => {
                    registered.css_base() == Some(css.as_str())
                        && Element::from_name(name).is_some_and(|element| match element {
                            Element::Toggle(flag) => flag.label().contains(text.as_str()),
                            _ => false,
                        })
                }
                other => registered == other,
            };
            matches.then_some(name)
        });

        let Some(name) = found else {
            return Err(ProbeError::not_found(selector));
        };
        let element = Element::from_name(name).ok_or_else(|| ProbeError::not_found(selector))?;
        let rendered = match element {
            Element::UseGenerator => true,
            _ => self.open,
        };
        if !rendered || self.is_missing(name) {
            return Err(ProbeError::not_found(selector));
        }
        Ok(element)
    }

    fn effective_classes(&self) -> FlagSet {
        let mut classes = self.enabled;
        for fault in &self.faults {
            match fault {
                Fault::IgnoreFlag(flag) => classes = classes.with(*flag),
                Fault::DropFlag(flag) if classes.without(*flag) != FlagSet::EMPTY => {
                    classes = classes.without(*flag);
                }
                _ => {}
            }
        }
        classes
    }

    fn applied_length(&self) -> usize {
        let raw = self.length_field.trim();
        if raw.is_empty() {
            if self.has_fault(&Fault::KeepLengthOnEmpty) {
                return self.value.chars().count();
            }
            return MIN_LENGTH;
        }
        let Ok(requested) = raw.parse::<i64>() else {
            return MIN_LENGTH;
        };
        if self.has_fault(&Fault::NoClamp) {
            return usize::try_from(requested).unwrap_or(0);
        }
        let clamped = requested.clamp(MIN_LENGTH as i64, MAX_LENGTH as i64);
        usize::try_from(clamped).unwrap_or(MIN_LENGTH)
    }

    fn regenerate(&mut self, length: usize) {
        let classes: Vec<&[u8]> = self
            .effective_classes()
            .iter()
            .map(|flag| match flag {
                Flag::Uppercase => UPPERCASE,
                Flag::Lowercase => LOWERCASE,
                Flag::Numbers => NUMBERS,
                Flag::Symbols => SYMBOLS,
            })
            .collect();
        let alphabet: Vec<u8> = classes.iter().flat_map(|class| class.iter().copied()).collect();

        let mut bytes: Vec<u8> = classes
            .iter()
            .take(length)
            .map(|class| class[self.rng.below(class.len())])
            .collect();
        while bytes.len() < length {
            bytes.push(alphabet[self.rng.below(alphabet.len())]);
        }
        for i in (1..bytes.len()).rev() {
            let j = self.rng.below(i + 1);
            bytes.swap(i, j);
        }

        self.previous_value = std::mem::replace(
            &mut self.value,
            bytes.into_iter().map(char::from).collect(),
        );
        let lag = self
            .faults
            .iter()
            .find_map(|fault| match fault {
                Fault::Lag(reads) => Some(*reads),
                _ => None,
            })
            .unwrap_or(0);
        self.lagging_reads.store(lag, Ordering::SeqCst);
        tracing::trace!(value = %self.value, length, "simulated panel regenerated");
    }

    fn current_length(&self) -> usize {
        self.value.chars().count().max(MIN_LENGTH)
    }

    fn press_generate(&mut self) {
        let length = self.applied_length();
        self.length_field = length.to_string();
        if self.has_fault(&Fault::StuckValue) && !self.value.is_empty() {
            return;
        }
        self.regenerate(length);
    }

    fn press_toggle(&mut self, flag: Flag) {
        let next = self.enabled.toggled(flag);
        if next.is_empty() {
            return;
        }
        self.enabled = next;
        if !self.has_fault(&Fault::StuckWidget(flag)) {
            self.painted = self.painted.toggled(flag);
        }
        let length = self.current_length();
        self.regenerate(length);
    }

    fn paint(&self, flag: Flag) -> String {
        if self.has_fault(&Fault::AmbiguousStyle(flag)) {
            AMBIGUOUS_COLOR.to_string()
        } else if self.painted.contains(flag) {
            self.probe.checked.clone()
        } else {
            self.probe.unchecked.clone()
        }
    }
}

#[async_trait]
impl PageDriver for SimulatedPanel {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        if url.trim().is_empty() {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: "empty URL".to_string(),
            });
        }
        self.url = url.to_string();
        self.open = false;
        self.enabled = FlagSet::ALL;
        self.painted = FlagSet::ALL;
        self.length_field = DEFAULT_LENGTH.to_string();
        self.value.clear();
        self.previous_value.clear();
        self.lagging_reads.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        let element = self.resolve(locator.selector())?;
        self.call_history.push(format!("click:{}", locator.name()));
        match element {
            Element::UseGenerator => {
                if !self.open {
                    self.open = true;
                    self.regenerate(DEFAULT_LENGTH);
                }
            }
            Element::Generate => self.press_generate(),
            Element::Toggle(flag) => self.press_toggle(flag),
            Element::PasswordValue | Element::PasswordLength => {}
        }
        Ok(())
    }

    async fn clear(&mut self, locator: &Locator) -> ProbeResult<()> {
        let element = self.resolve(locator.selector())?;
        self.call_history.push(format!("clear:{}", locator.name()));
        match element {
            Element::PasswordLength => {
                self.length_field.clear();
                Ok(())
            }
            _ => Err(ProbeError::input(format!("{} is not editable", locator.name()))),
        }
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.resolve(locator.selector())?;
        self.call_history.push(format!("type:{}:{text}", locator.name()));
        match element {
            Element::PasswordLength => {
                self.length_field.push_str(text);
                Ok(())
            }
            _ => Err(ProbeError::input(format!("{} is not editable", locator.name()))),
        }
    }

    async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
        match self.resolve(selector)? {
            Element::PasswordValue => {
                let lagging = self
                    .lagging_reads
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok();
                if lagging {
                    Ok(self.previous_value.clone())
                } else {
                    Ok(self.value.clone())
                }
            }
            Element::PasswordLength => Ok(self.length_field.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn computed_style(
        &self,
        selector: &Selector,
        pseudo: Option<&str>,
        property: &str,
    ) -> ProbeResult<String> {
        let element = self.resolve(selector)?;
        let painted_pseudo = pseudo == Some(self.probe.pseudo.as_str());
        match element {
            Element::Toggle(flag) if painted_pseudo && property == self.probe.property => {
                Ok(self.paint(flag))
            }
            _ => Ok("rgba(0, 0, 0, 0)".to_string()),
        }
    }

    async fn checked_property(&self, selector: &Selector) -> ProbeResult<Option<bool>> {
        // Toggles are labels: no native checked state
        let _ = self.resolve(selector)?;
        Ok(None)
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(vec![])
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.url.clone())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.call_history.push("close".to_string());
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixture::FixtureSet;
    use crate::oracle::OracleTable;
    use crate::widget::{ToggleWidgetAdapter, WidgetKind, WidgetSet};
    use crate::wait::WaitOptions;

    fn registry() -> LocatorRegistry {
        FixtureSet::bundled().unwrap().registry
    }

    async fn opened(panel: SimulatedPanel) -> SimulatedPanel {
        let mut panel = panel;
        let reg = registry();
        panel.navigate("https://example.test/").await.unwrap();
        panel
            .click(&reg.locator(names::USE_PASSWORD_GENERATOR).unwrap())
            .await
            .unwrap();
        panel
    }

    async fn value(panel: &SimulatedPanel) -> String {
        let selector = registry().selector(names::PASSWORD_VALUE).unwrap().clone();
        panel.input_value(&selector).await.unwrap()
    }

    mod fault_tests {
        use super::*;

        #[test]
        fn test_parse_and_display() {
            for raw in [
                "ignore-flag:symbols",
                "drop-flag:uppercase",
                "stuck-value",
                "no-clamp",
                "keep-length-on-empty",
                "ambiguous-style:numbers",
                "stuck-widget:lowercase",
                "missing:buttonGeneratePassword",
                "lag:3",
            ] {
                let fault: Fault = raw.parse().unwrap();
                assert_eq!(fault.to_string(), raw);
            }
        }

        #[test]
        fn test_parse_rejects_bad_input() {
            assert!("ignore-flag".parse::<Fault>().is_err());
            assert!("ignore-flag:digits".parse::<Fault>().is_err());
            assert!("lag:x".parse::<Fault>().is_err());
            assert!("missing:".parse::<Fault>().is_err());
            assert!("explode".parse::<Fault>().is_err());
        }
    }

    mod panel_tests {
        use super::*;

        #[tokio::test]
        async fn test_closed_panel_hides_generator() {
            let mut panel = SimulatedPanel::new(registry());
            panel.navigate("https://example.test/").await.unwrap();
            let err = panel
                .click(&registry().locator(names::GENERATE_PASSWORD).unwrap())
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_opening_generates_default_length() {
            let panel = opened(SimulatedPanel::new(registry())).await;
            let generated = value(&panel).await;
            assert_eq!(generated.len(), DEFAULT_LENGTH);
            assert!(OracleTable::standard().check(FlagSet::ALL, &generated).is_ok());
            assert!(panel.was_called("click:buttonUsePasswordGenerator"));
        }

        #[tokio::test]
        async fn test_every_enabled_class_present() {
            let panel = opened(SimulatedPanel::new(registry()).with_seed(7)).await;
            let generated = value(&panel).await;
            assert_eq!(crate::oracle::observed_classes([generated.as_str()]), FlagSet::ALL);
        }

        #[tokio::test]
        async fn test_length_field_applied_on_generate() {
            let reg = registry();
            let mut panel = opened(SimulatedPanel::new(reg.clone())).await;
            let length = reg.locator(names::PASSWORD_LENGTH).unwrap();
            let generate = reg.locator(names::GENERATE_PASSWORD).unwrap();
            let length_selector = length.selector().clone();

            for (typed, expected) in [("30", 30), ("0", 1), ("100", 99), ("-4", 1), ("", 1), ("abc", 1)] {
                panel.clear(&length).await.unwrap();
                panel.type_text(&length, typed).await.unwrap();
                panel.click(&generate).await.unwrap();
                assert_eq!(value(&panel).await.len(), expected, "typed {typed:?}");
                assert_eq!(
                    panel.input_value(&length_selector).await.unwrap(),
                    expected.to_string()
                );
            }
        }

        #[tokio::test]
        async fn test_last_class_cannot_be_disabled() {
            let reg = registry();
            let mut panel = opened(SimulatedPanel::new(reg.clone())).await;
            for name in [names::CHECKBOX_UPPERCASE, names::CHECKBOX_LOWERCASE, names::CHECKBOX_NUMBERS] {
                panel.click(&reg.locator(name).unwrap()).await.unwrap();
            }
            assert_eq!(panel.enabled(), FlagSet::from_flags(&[Flag::Symbols]));
            panel
                .click(&reg.locator(names::CHECKBOX_SYMBOLS).unwrap())
                .await
                .unwrap();
            assert_eq!(panel.enabled(), FlagSet::from_flags(&[Flag::Symbols]));
        }

        #[tokio::test]
        async fn test_lag_serves_previous_value() {
            let reg = registry();
            let mut panel = opened(SimulatedPanel::new(reg.clone()).with_fault(Fault::Lag(2))).await;
            let before = panel.value().to_string();
            panel
                .click(&reg.locator(names::GENERATE_PASSWORD).unwrap())
                .await
                .unwrap();
            assert_eq!(value(&panel).await, before);
            assert_eq!(value(&panel).await, before);
            assert_eq!(value(&panel).await, panel.value());
        }

        #[tokio::test]
        async fn test_missing_element_never_renders() {
            let reg = registry();
            let mut panel = opened(
                SimulatedPanel::new(reg.clone())
                    .with_fault(Fault::Missing(names::GENERATE_PASSWORD.to_string())),
            )
            .await;
            assert!(panel
                .click(&reg.locator(names::GENERATE_PASSWORD).unwrap())
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_value_field_is_read_only() {
            let reg = registry();
            let mut panel = opened(SimulatedPanel::new(reg.clone())).await;
            let err = panel
                .type_text(&reg.locator(names::PASSWORD_VALUE).unwrap(), "x")
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::InputError { .. }));
        }
    }

    mod widget_tests {
        use super::*;

        fn widgets() -> WidgetSet {
            WidgetSet::from_registry(
                &registry(),
                WidgetKind::PseudoElement,
                &StyleProbe::default(),
                WaitOptions::default(),
            )
            .unwrap()
        }

        #[tokio::test]
        async fn test_reads_are_stable_without_clicks() {
            let panel = opened(SimulatedPanel::new(registry())).await;
            let widgets = widgets();
            let first = widgets.read(&panel).await.unwrap();
            let second = widgets.read(&panel).await.unwrap();
            assert_eq!(first, FlagSet::ALL);
            assert_eq!(first, second);
        }

        #[tokio::test]
        async fn test_one_click_flips_one_widget() {
            let mut panel = opened(SimulatedPanel::new(registry())).await;
            let widgets = widgets();
            let numbers = widgets.get(Flag::Numbers).unwrap();
            numbers.toggle(&mut panel).await.unwrap();
            assert!(!numbers.is_checked(&panel).await.unwrap());
            assert_eq!(
                widgets.read(&panel).await.unwrap(),
                FlagSet::ALL.without(Flag::Numbers)
            );
            numbers.toggle(&mut panel).await.unwrap();
            assert!(numbers.is_checked(&panel).await.unwrap());
        }

        #[tokio::test]
        async fn test_ambiguous_paint_is_an_error() {
            let panel = opened(
                SimulatedPanel::new(registry()).with_fault(Fault::AmbiguousStyle(Flag::Symbols)),
            )
            .await;
            let err = widgets().read(&panel).await.unwrap_err();
            assert!(matches!(err, ProbeError::AmbiguousWidgetState { .. }));
        }

        #[tokio::test]
        async fn test_stuck_widget_detected_by_expect() {
            let mut panel = opened(
                SimulatedPanel::new(registry()).with_fault(Fault::StuckWidget(Flag::Uppercase)),
            )
            .await;
            let widgets = widgets();
            widgets
                .get(Flag::Uppercase)
                .unwrap()
                .toggle(&mut panel)
                .await
                .unwrap();
            let err = widgets
                .expect(&panel, FlagSet::ALL.without(Flag::Uppercase))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::WidgetStateMismatch { .. }));
        }

        #[tokio::test]
        async fn test_native_adapter_sees_no_checked_property() {
            let panel = opened(SimulatedPanel::new(registry())).await;
            let native = WidgetSet::from_registry(
                &registry(),
                WidgetKind::Native,
                &StyleProbe::default(),
                WaitOptions::default(),
            )
            .unwrap();
            assert!(native.read(&panel).await.is_err());
        }
    }
}
