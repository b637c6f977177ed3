//! Property-test run profile parsing for CI and local overrides.
//!
//! Property suites read their case count and fork mode from the environment
//! through [`ProptestRunProfile`], so CI can scale every suite at once.

use std::env;

/// Environment variable controlling proptest case counts.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable controlling proptest process forking.
pub const OPFOREST_PBT_FORK_ENV_KEY: &str = "OPFOREST_PBT_FORK";

/// Runtime profile for property-test execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads a profile from the environment, falling back to the given
    /// defaults for unset or malformed variables.
    ///
    /// # Examples
    ///
    /// ```
    /// use opforest_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: Override::<CaseCount>::read(PROGTEST_CASES_ENV_KEY).or(default_cases),
            fork: Override::<bool>::read(OPFOREST_PBT_FORK_ENV_KEY).or(default_fork),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run proptest cases in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

/// A value that can be parsed from a profile environment variable.
trait ProfileValue: Sized {
    type Output;

    fn parse(raw: &str) -> Result<Self::Output, &'static str>;
}

/// Positive proptest case count.
struct CaseCount;

impl ProfileValue for CaseCount {
    type Output = u32;

    fn parse(raw: &str) -> Result<u32, &'static str> {
        match raw.trim().parse::<u32>() {
            Ok(0) => Err("cases must be > 0"),
            Ok(cases) => Ok(cases),
            Err(_) => Err("expected a positive integer"),
        }
    }
}

impl ProfileValue for bool {
    type Output = Self;

    fn parse(raw: &str) -> Result<Self, &'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err("expected one of: true/false/1/0/yes/no/on/off"),
        }
    }
}

/// Parsed state of one environment override.
struct Override<V: ProfileValue> {
    value: Option<V::Output>,
}

impl<V: ProfileValue> Override<V> {
    fn read(key: &'static str) -> Self {
        let Ok(raw) = env::var(key) else {
            return Self { value: None };
        };
        match V::parse(&raw) {
            Ok(value) => Self { value: Some(value) },
            Err(reason) => {
                tracing::warn!(
                    env = key,
                    raw = %raw,
                    reason,
                    "invalid property-test profile override; using default",
                );
                Self { value: None }
            }
        }
    }

    fn or(self, default: V::Output) -> V::Output {
        self.value.unwrap_or(default)
    }
}
