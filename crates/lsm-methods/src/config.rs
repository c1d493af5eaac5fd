//! Pricing-method configuration.
//!
//! A [`PricingConfig`] is passed explicitly into every pricing call; there
//! is no global default that calls could silently share. Configurations can
//! be assembled with the builder or read from TOML:
//!
//! ```
//! use lsm_methods::{BasisKind, PricingConfig};
//!
//! let config = PricingConfig::from_toml_str(
//!     r#"
//!     paths = 20000
//!     steps = 100
//!     exercise_frequency = 5
//!
//!     [basis]
//!     kind = "monomial"
//!     order = 3
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.paths, 20_000);
//! assert_eq!(config.basis.kind, BasisKind::Monomial);
//! assert_eq!(config.seed, 42);
//! ```

use lsm_core::{ensure, Error, Result, Size};
use lsm_math::GeneratorKind;
use serde::{Deserialize, Serialize};

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: Size = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: Size = 100_000;

/// Highest supported polynomial order of a regression basis.
pub const MAX_BASIS_ORDER: Size = 8;

/// Family of basis functions for continuation-value regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisKind {
    /// `1, x, x², …` per underlying.
    Monomial,
    /// Physicists' Hermite polynomials `1, H₁(x), H₂(x), …` per underlying.
    Hermite,
    /// Every monomial in all underlyings up to the total order, cross
    /// terms included.
    CrossPolynomial,
}

/// Basis family and polynomial order, fixed for one pricing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionBasis {
    /// Basis family.
    pub kind: BasisKind,
    /// Highest polynomial degree.
    pub order: Size,
}

impl RegressionBasis {
    /// Hermite basis of the given order.
    pub fn hermite(order: Size) -> Self {
        Self {
            kind: BasisKind::Hermite,
            order,
        }
    }

    /// Monomial basis of the given order.
    pub fn monomial(order: Size) -> Self {
        Self {
            kind: BasisKind::Monomial,
            order,
        }
    }

    /// Cross-term polynomial basis of the given total order.
    pub fn cross_polynomial(order: Size) -> Self {
        Self {
            kind: BasisKind::CrossPolynomial,
            order,
        }
    }
}

impl Default for RegressionBasis {
    fn default() -> Self {
        Self::hermite(2)
    }
}

/// Monte Carlo pricing-method configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Number of simulated paths `Np`.
    pub paths: Size,
    /// Number of time steps `NT`.
    pub steps: Size,
    /// Every `M`-th step is an exercise opportunity for American exercise.
    pub exercise_frequency: Size,
    /// Seed of the Gaussian source.
    pub seed: u64,
    /// Gaussian source.
    pub generator: GeneratorKind,
    /// Regression basis. Kept last: it serialises as a TOML table.
    pub basis: RegressionBasis,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            paths: 10_000,
            steps: 50,
            exercise_frequency: 1,
            seed: 42,
            generator: GeneratorKind::default(),
            basis: RegressionBasis::default(),
        }
    }
}

impl PricingConfig {
    /// Creates a new configuration builder starting from the defaults.
    pub fn builder() -> PricingConfigBuilder {
        PricingConfigBuilder::default()
    }

    /// Parse and validate a TOML document. Missing keys take their default.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if a count is zero or above its maximum.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_PATHS).contains(&self.paths),
            "path count must be in [1, {MAX_PATHS}], got {}",
            self.paths
        );
        ensure!(
            (1..=MAX_STEPS).contains(&self.steps),
            "step count must be in [1, {MAX_STEPS}], got {}",
            self.steps
        );
        ensure!(
            self.exercise_frequency >= 1,
            "exercise frequency must be positive"
        );
        ensure!(
            (1..=MAX_BASIS_ORDER).contains(&self.basis.order),
            "basis order must be in [1, {MAX_BASIS_ORDER}], got {}",
            self.basis.order
        );
        Ok(())
    }
}

/// Builder for [`PricingConfig`] with validation at build time.
#[derive(Debug, Clone, Default)]
pub struct PricingConfigBuilder {
    config: PricingConfig,
}

impl PricingConfigBuilder {
    /// Sets the number of simulation paths.
    pub fn paths(mut self, paths: Size) -> Self {
        self.config.paths = paths;
        self
    }

    /// Sets the number of time steps.
    pub fn steps(mut self, steps: Size) -> Self {
        self.config.steps = steps;
        self
    }

    /// Sets the exercise frequency `M`.
    pub fn exercise_frequency(mut self, m: Size) -> Self {
        self.config.exercise_frequency = m;
        self
    }

    /// Sets the regression basis.
    pub fn basis(mut self, basis: RegressionBasis) -> Self {
        self.config.basis = basis;
        self
    }

    /// Sets the seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets the Gaussian source.
    pub fn generator(mut self, generator: GeneratorKind) -> Self {
        self.config.generator = generator;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Whatever [`PricingConfig::validate`] rejects.
    pub fn build(self) -> Result<PricingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let c = PricingConfig::builder()
            .paths(500)
            .steps(12)
            .exercise_frequency(3)
            .basis(RegressionBasis::cross_polynomial(2))
            .seed(7)
            .generator(GeneratorKind::StdRng)
            .build()
            .unwrap();
        assert_eq!(c.paths, 500);
        assert_eq!(c.steps, 12);
        assert_eq!(c.exercise_frequency, 3);
        assert_eq!(c.basis.kind, BasisKind::CrossPolynomial);
        assert_eq!(c.seed, 7);
        assert_eq!(c.generator, GeneratorKind::StdRng);
    }

    #[test]
    fn builder_rejects_zero_counts() {
        assert!(matches!(
            PricingConfig::builder().paths(0).build(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(PricingConfig::builder().steps(0).build().is_err());
        assert!(PricingConfig::builder().exercise_frequency(0).build().is_err());
        assert!(PricingConfig::builder()
            .basis(RegressionBasis::hermite(0))
            .build()
            .is_err());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(PricingConfig::from_toml_str("").unwrap(), PricingConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let c = PricingConfig::builder()
            .paths(1234)
            .basis(RegressionBasis::monomial(3))
            .generator(GeneratorKind::StdRng)
            .build()
            .unwrap();
        let text = c.to_toml_string().unwrap();
        assert!(text.contains("generator = \"std_rng\""));
        assert_eq!(PricingConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            PricingConfig::from_toml_str("paths = \"many\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PricingConfig::from_toml_str("steps = 0"),
            Err(Error::InvalidParameter(_))
        ));
    }
}
