//! Configuration walk over the 4-cube of character-class flags.
//!
//! The walk starts with every class enabled and applies one toggle per step.
//! After every toggle the tracked configuration, never the page, decides
//! which oracle entry a freshly read value must satisfy.
//!
//! The standard path visits all 15 non-empty configurations and never the
//! all-disabled one. A Hamiltonian path from `1111` on the cube minus `0000`
//! does not exist (seven even-weight against eight odd-weight vertices,
//! starting on an even one), so the path revisits `{Uppercase, Numbers}`
//! once.

use crate::driver::PageDriver;
use crate::flag::{Flag, FlagSet};
use crate::locator::Selector;
use crate::oracle::OracleTable;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{Poller, WaitOptions};
use crate::widget::WidgetSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Toggle order of the standard walk
pub const STANDARD_TOGGLES: [Flag; 15] = [
    Flag::Uppercase,
    Flag::Symbols,
    Flag::Numbers,
    Flag::Symbols,
    Flag::Lowercase,
    Flag::Uppercase,
    Flag::Lowercase,
    Flag::Symbols,
    Flag::Numbers,
    Flag::Lowercase,
    Flag::Symbols,
    Flag::Uppercase,
    Flag::Symbols,
    Flag::Uppercase,
    Flag::Numbers,
];

/// One toggle of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStep {
    /// 1-based step number
    pub index: usize,
    /// Flag clicked
    pub toggle: Flag,
    /// Configuration before the click
    pub before: FlagSet,
    /// Configuration after the click
    pub after: FlagSet,
}

/// A validated toggle sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkPlan {
    start: FlagSet,
    toggles: Vec<Flag>,
}

impl WalkPlan {
    /// The fixed path from all-enabled covering every non-empty configuration
    #[must_use]
    pub fn standard() -> Self {
        Self {
            start: FlagSet::ALL,
            toggles: STANDARD_TOGGLES.to_vec(),
        }
    }

    /// Build a plan, rejecting paths that enter the all-disabled
    /// configuration or miss a non-empty one
    pub fn new(start: FlagSet, toggles: Vec<Flag>) -> ProbeResult<Self> {
        let plan = Self { start, toggles };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the structural rules
    pub fn validate(&self) -> ProbeResult<()> {
        if self.start.is_empty() {
            return Err(ProbeError::InvalidPlan {
                message: "walk cannot start with every class disabled".to_string(),
            });
        }
        if let Some(step) = self.steps().find(|step| step.after.is_empty()) {
            return Err(ProbeError::InvalidPlan {
                message: format!(
                    "step {} ({} off) disables every class",
                    step.index, step.toggle
                ),
            });
        }
        let visited: BTreeSet<FlagSet> = self.vertices().into_iter().collect();
        let missed: Vec<String> = FlagSet::all_non_empty()
            .filter(|set| !visited.contains(set))
            .map(|set| set.to_string())
            .collect();
        if !missed.is_empty() {
            return Err(ProbeError::InvalidPlan {
                message: format!("walk never visits {}", missed.join(", ")),
            });
        }
        Ok(())
    }

    /// Starting configuration
    #[must_use]
    pub const fn start(&self) -> FlagSet {
        self.start
    }

    /// Flags clicked, in order
    #[must_use]
    pub fn toggles(&self) -> &[Flag] {
        &self.toggles
    }

    /// Steps with the configuration before and after each click
    pub fn steps(&self) -> impl Iterator<Item = WalkStep> + '_ {
        self.toggles
            .iter()
            .enumerate()
            .scan(self.start, |current, (i, flag)| {
                let before = *current;
                *current = before.toggled(*flag);
                Some(WalkStep {
                    index: i + 1,
                    toggle: *flag,
                    before,
                    after: *current,
                })
            })
    }

    /// Every configuration checked: the start, then one per step
    #[must_use]
    pub fn vertices(&self) -> Vec<FlagSet> {
        std::iter::once(self.start)
            .chain(self.steps().map(|step| step.after))
            .collect()
    }

    /// Configurations visited more than once
    #[must_use]
    pub fn revisits(&self) -> Vec<FlagSet> {
        let mut seen = BTreeSet::new();
        let mut again = Vec::new();
        for vertex in self.vertices() {
            if !seen.insert(vertex) && !again.contains(&vertex) {
                again.push(vertex);
            }
        }
        again
    }
}

impl Default for WalkPlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// One checked configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Step number; 0 for the starting configuration
    pub step: usize,
    /// Flag clicked to get here
    pub toggled: Option<Flag>,
    /// Tracked configuration
    pub configuration: FlagSet,
    /// Value that satisfied the oracle
    pub value: String,
}

/// Result of a completed walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkReport {
    /// Every checked configuration in order
    pub visits: Vec<Visit>,
}

impl WalkReport {
    /// Number of different configurations checked
    #[must_use]
    pub fn distinct_configurations(&self) -> usize {
        self.visits
            .iter()
            .map(|visit| visit.configuration)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Drives a [`WalkPlan`] against a page
#[derive(Debug)]
pub struct ConfigurationWalker<'a> {
    plan: &'a WalkPlan,
    oracle: &'a OracleTable,
    widgets: &'a WidgetSet,
    value: Selector,
    wait: WaitOptions,
}

impl<'a> ConfigurationWalker<'a> {
    /// Walker over `plan`, checking values read from `value`
    #[must_use]
    pub const fn new(
        plan: &'a WalkPlan,
        oracle: &'a OracleTable,
        widgets: &'a WidgetSet,
        value: Selector,
        wait: WaitOptions,
    ) -> Self {
        Self {
            plan,
            oracle,
            widgets,
            value,
            wait,
        }
    }

    /// Walk the plan.
    ///
    /// Fails before touching the page if the oracle lacks an entry for any
    /// configuration the plan visits. Then requires the toggles to show the
    /// start configuration, checks the oracle there, and after each click
    /// requires exactly the clicked toggle to have flipped before checking
    /// the oracle again.
    pub async fn walk(&self, page: &mut dyn PageDriver) -> ProbeResult<WalkReport> {
        self.plan.validate()?;
        self.oracle.ensure_covers(self.plan.vertices())?;

        let mut report = WalkReport::default();
        let start = self.plan.start();
        self.await_widgets(page, start).await?;
        let value = self.await_oracle(page, start).await?;
        tracing::debug!(configuration = %start, %value, "start configuration verified");
        report.visits.push(Visit {
            step: 0,
            toggled: None,
            configuration: start,
            value,
        });

        for step in self.plan.steps() {
            self.click(page, step.toggle).await?;
            self.await_widgets(page, step.after).await?;
            let value = self.await_oracle(page, step.after).await?;
            tracing::debug!(
                step = step.index,
                toggle = %step.toggle,
                configuration = %step.after,
                %value,
                "configuration verified"
            );
            report.visits.push(Visit {
                step: step.index,
                toggled: Some(step.toggle),
                configuration: step.after,
                value,
            });
        }

        Ok(report)
    }

    async fn click(&self, page: &mut dyn PageDriver, flag: Flag) -> ProbeResult<()> {
        let widget = self.widgets.get(flag)?;
        let mut poller = Poller::new(self.wait, format!("{flag} toggle"));
        loop {
            match widget.toggle(page).await {
                Ok(()) => return Ok(()),
                Err(e) => poller.retry(e).await?,
            }
        }
    }

    async fn await_widgets(&self, page: &dyn PageDriver, expected: FlagSet) -> ProbeResult<()> {
        let mut poller = Poller::new(self.wait, format!("toggles to show {expected}"));
        loop {
            match self.widgets.expect(page, expected).await {
                Ok(()) => return Ok(()),
                Err(e) => poller.retry(e).await?,
            }
        }
    }

    async fn await_oracle(&self, page: &dyn PageDriver, configuration: FlagSet) -> ProbeResult<String> {
        let mut poller = Poller::new(self.wait, format!("a value for {configuration}"));
        loop {
            let checked = match page.input_value(&self.value).await {
                Ok(value) => self.oracle.check(configuration, &value).map(|()| value),
                Err(e) => Err(e),
            };
            match checked {
                Ok(value) => return Ok(value),
                Err(e) => poller.retry(e).await?,
            }
        }
    }
}
