//! Statistical class coverage at one configuration.
//!
//! A single value may legitimately miss a class, so coverage is judged over
//! a sample: regenerate N times and require every enabled class to appear
//! somewhere in the sample.

use crate::driver::PageDriver;
use crate::flag::FlagSet;
use crate::oracle::observed_classes;
use crate::regeneration::RegenerationChecker;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Default sample size
pub const DEFAULT_SAMPLES: usize = 20;

/// Sample collected by [`ClassDistributionCheck`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    /// Values read, in order
    pub samples: Vec<String>,
    /// Classes seen across all samples
    pub observed: FlagSet,
}

/// Samples values and checks class coverage
#[derive(Debug, Clone)]
pub struct ClassDistributionCheck {
    regeneration: RegenerationChecker,
    samples: usize,
}

impl ClassDistributionCheck {
    /// Sample `samples` values (at least one) through `regeneration`
    #[must_use]
    pub fn new(regeneration: RegenerationChecker, samples: usize) -> Self {
        Self {
            regeneration,
            samples: samples.max(1),
        }
    }

    /// Collect the sample and require every class of `expected` in it
    pub async fn verify(
        &self,
        page: &mut dyn PageDriver,
        expected: FlagSet,
    ) -> ProbeResult<DistributionReport> {
        let mut samples = Vec::with_capacity(self.samples);
        samples.push(self.regeneration.await_value(page).await?);
        while samples.len() < self.samples {
            let previous = samples.last().cloned().unwrap_or_default();
            let (next, _) = self.regeneration.regenerate_from(page, &previous).await?;
            samples.push(next);
        }

        let observed = observed_classes(samples.iter().map(String::as_str));
        let missing = FlagSet::from_bits(expected.bits() & !observed.bits());
        tracing::debug!(samples = samples.len(), %observed, %missing, "class distribution sampled");
        if !missing.is_empty() {
            return Err(ProbeError::MissingClasses {
                missing,
                samples: samples.len(),
            });
        }
        Ok(DistributionReport { samples, observed })
    }
}
