// src/cdr/config.rs

//! Configuration surface shared by the circuit generators.

use crate::core::CdrError;
use crate::core::constants::{DEFAULT_SIGMA_REPLACE, DEFAULT_SIGMA_SELECT};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::str::FromStr;

/// How the non-Clifford operations that get replaced are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectMethod {
    /// Every candidate is equally likely.
    #[default]
    Uniform,
    /// Candidates close to a Clifford angle are more likely.
    Gaussian,
}

/// How a selected operation's Clifford replacement is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplaceMethod {
    /// Any of the four Clifford angles, uniformly.
    Uniform,
    /// Clifford angle drawn with a Gaussian kernel around the original angle.
    Gaussian,
    /// The nearest Clifford angle; exact ties are broken at random.
    #[default]
    Closest,
}

impl FromStr for SelectMethod {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(SelectMethod::Uniform),
            "gaussian" => Ok(SelectMethod::Gaussian),
            _ => Err(CdrError::InvalidMethod {
                option: "method_select",
                value: s.to_string(),
                expected: "'uniform', 'gaussian'",
            }),
        }
    }
}

impl FromStr for ReplaceMethod {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(ReplaceMethod::Uniform),
            "gaussian" => Ok(ReplaceMethod::Gaussian),
            "closest" => Ok(ReplaceMethod::Closest),
            _ => Err(CdrError::InvalidMethod {
                option: "method_replace",
                value: s.to_string(),
                expected: "'uniform', 'gaussian', 'closest'",
            }),
        }
    }
}

impl fmt::Display for SelectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectMethod::Uniform => write!(f, "uniform"),
            SelectMethod::Gaussian => write!(f, "gaussian"),
        }
    }
}

impl fmt::Display for ReplaceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaceMethod::Uniform => write!(f, "uniform"),
            ReplaceMethod::Gaussian => write!(f, "gaussian"),
            ReplaceMethod::Closest => write!(f, "closest"),
        }
    }
}

/// Source of randomness handed to a generator. It is turned into an owned
/// [`StdRng`] when the generator is constructed.
#[derive(Debug, Clone, Default)]
pub enum RandomState {
    /// Seed from the operating system.
    #[default]
    Entropy,
    /// Deterministic seed.
    Seed(u64),
    /// An already running generator; its current state is taken over.
    Generator(StdRng),
}

impl RandomState {
    pub(crate) fn into_rng(self) -> StdRng {
        match self {
            RandomState::Entropy => StdRng::from_os_rng(),
            RandomState::Seed(seed) => StdRng::seed_from_u64(seed),
            RandomState::Generator(rng) => rng,
        }
    }
}

impl From<u64> for RandomState {
    fn from(seed: u64) -> Self {
        RandomState::Seed(seed)
    }
}

impl From<StdRng> for RandomState {
    fn from(rng: StdRng) -> Self {
        RandomState::Generator(rng)
    }
}

/// Options of the near-Clifford mapper and the random source.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Approximate fraction of the non-Clifford operations left untouched
    /// in every generated circuit.
    pub fraction_non_clifford: f64,
    /// Selection policy.
    pub method_select: SelectMethod,
    /// Replacement policy.
    pub method_replace: ReplaceMethod,
    /// Kernel width for [`SelectMethod::Gaussian`].
    pub sigma_select: f64,
    /// Kernel width for [`ReplaceMethod::Gaussian`].
    pub sigma_replace: f64,
    /// Random source.
    pub random_state: RandomState,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fraction_non_clifford: 0.0,
            method_select: SelectMethod::Uniform,
            method_replace: ReplaceMethod::Closest,
            sigma_select: DEFAULT_SIGMA_SELECT,
            sigma_replace: DEFAULT_SIGMA_REPLACE,
            random_state: RandomState::Entropy,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep roughly this fraction of non-Clifford operations unchanged.
    pub fn with_fraction_non_clifford(mut self, fraction: f64) -> Self {
        self.fraction_non_clifford = fraction;
        self
    }

    /// Set the selection policy.
    pub fn with_method_select(mut self, method: SelectMethod) -> Self {
        self.method_select = method;
        self
    }

    /// Set the replacement policy.
    pub fn with_method_replace(mut self, method: ReplaceMethod) -> Self {
        self.method_replace = method;
        self
    }

    /// Set both policies from their names, failing on unknown names.
    pub fn with_method_names(mut self, select: &str, replace: &str) -> Result<Self, CdrError> {
        self.method_select = select.parse()?;
        self.method_replace = replace.parse()?;
        Ok(self)
    }

    /// Set the gaussian kernel widths.
    pub fn with_sigmas(mut self, sigma_select: f64, sigma_replace: f64) -> Self {
        self.sigma_select = sigma_select;
        self.sigma_replace = sigma_replace;
        self
    }

    /// Use a deterministic seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_state = RandomState::Seed(seed);
        self
    }

    /// Continue from an existing generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.random_state = RandomState::Generator(rng);
        self
    }

    /// Checks numeric options.
    pub fn validate(&self) -> Result<(), CdrError> {
        if !(0.0..=1.0).contains(&self.fraction_non_clifford) {
            return Err(CdrError::InvalidFraction(self.fraction_non_clifford));
        }
        validate_sigma("sigma_select", self.sigma_select)?;
        validate_sigma("sigma_replace", self.sigma_replace)
    }
}

fn validate_sigma(name: &'static str, value: f64) -> Result<(), CdrError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CdrError::InvalidSigma { name, value })
    }
}
