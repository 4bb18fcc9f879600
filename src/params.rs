use crate::errors::{IsingError, IsingResult};
use crate::lattice::{check_dimensions, InitPolicy};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Boltzmann's constant, folded into the temperature.
pub const KB: f64 = 1.0;

/// Temperature of the 2D square lattice phase transition for `J = 1`.
pub const CRITICAL_TEMPERATURE: f64 = 2.269_185_314_213_022;

/// Configuration of a single simulation.
///
/// `coupling` is J, `field` is h and `temperature` is T in units where
/// [`KB`] is one. The energy of a configuration is
/// `E = -J * sum_<ij> s_i s_j - h * sum_i s_i`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct IsingParams {
    /// Number of lattice rows, H.
    pub rows: usize,
    /// Number of lattice columns, W.
    pub cols: usize,
    /// Coupling between neighboring spins. Positive is ferromagnetic.
    pub coupling: f64,
    /// Thermal energy scale, must be positive.
    pub temperature: f64,
    /// Uniform external field.
    pub field: f64,
    /// Initial spin configuration.
    pub init: InitPolicy,
    /// Seed for the default rng, `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for IsingParams {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 16,
            coupling: 1.0,
            temperature: CRITICAL_TEMPERATURE,
            field: 0.0,
            init: InitPolicy::Random,
            seed: None,
        }
    }
}

impl IsingParams {
    /// Make a new set of parameters with a random initial state and no seed.
    pub fn new(rows: usize, cols: usize, coupling: f64, temperature: f64, field: f64) -> Self {
        Self {
            rows,
            cols,
            coupling,
            temperature,
            field,
            ..Default::default()
        }
    }

    /// Use `init` for the initial state.
    pub fn with_init(mut self, init: InitPolicy) -> Self {
        self.init = init;
        self
    }

    /// Seed the default rng.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of sites, `rows * cols`.
    pub fn n_sites(&self) -> usize {
        self.rows * self.cols
    }

    /// Inverse temperature `1 / (KB * T)`.
    pub fn beta(&self) -> f64 {
        1.0 / (KB * self.temperature)
    }

    /// Check the dimensions and physical parameters.
    pub fn validate(&self) -> IsingResult<()> {
        check_dimensions(self.rows, self.cols)?;
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(IsingError::InvalidParameter {
                name: "temperature",
                value: self.temperature,
                reason: "must be finite and greater than zero",
            });
        }
        if !self.coupling.is_finite() {
            return Err(IsingError::InvalidParameter {
                name: "coupling",
                value: self.coupling,
                reason: "must be finite",
            });
        }
        if !self.field.is_finite() {
            return Err(IsingError::InvalidParameter {
                name: "field",
                value: self.field,
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(IsingParams::default().validate().is_ok());
    }

    #[test]
    fn test_bad_temperature() {
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let p = IsingParams::new(4, 4, 1.0, t, 0.0);
            match p.validate() {
                Err(IsingError::InvalidParameter { name, .. }) => assert_eq!(name, "temperature"),
                other => panic!("expected an invalid temperature, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_bad_dimensions() {
        let p = IsingParams::new(1, 4, 1.0, 1.0, 0.0);
        assert_eq!(
            p.validate(),
            Err(IsingError::InvalidDimension { rows: 1, cols: 4 })
        );
    }

    #[test]
    fn test_bad_field() {
        let p = IsingParams::new(4, 4, 1.0, 1.0, f64::NAN);
        assert!(p.validate().is_err());
        let p = IsingParams::new(4, 4, f64::NEG_INFINITY, 1.0, 0.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let p = IsingParams::new(3, 5, 1.0, 2.0, 0.1)
            .with_init(InitPolicy::AllDown)
            .with_seed(7);
        assert_eq!(p.init, InitPolicy::AllDown);
        assert_eq!(p.seed, Some(7));
        assert_eq!(p.n_sites(), 15);
        assert_eq!(p.beta(), 0.5);
    }
}
