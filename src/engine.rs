//! Single-spin-flip Metropolis dynamics on a periodic square lattice.
//!
//! The engine owns its lattice, its parameters and its rng. The running energy
//! and magnetization are updated on every accepted flip and always agree with
//! [`IsingEngine::recompute_observables`] up to floating point rounding.

use crate::errors::{IsingError, IsingResult};
use crate::lattice::{InitPolicy, Lattice};
use crate::observables::{Observables, Snapshot};
use crate::params::{IsingParams, KB};
use crate::stepper::MonteCarloStepper;
use rand::prelude::*;
use std::iter::FusedIterator;
use tracing::debug;

/// An engine using the standard seedable rng.
pub type DefaultIsingEngine = IsingEngine<StdRng>;

/// A 2D Ising lattice evolving under Metropolis dynamics.
#[derive(Debug, Clone)]
pub struct IsingEngine<R: Rng> {
    params: IsingParams,
    lattice: Lattice,
    energy: f64,
    magnetization: i64,
    steps: u64,
    accepted: u64,
    rng: R,
}

/// Build a [`DefaultIsingEngine`], seeded if `seed` is given.
pub fn new_engine(
    rows: usize,
    cols: usize,
    coupling: f64,
    temperature: f64,
    field: f64,
    init: InitPolicy,
    seed: Option<u64>,
) -> IsingResult<DefaultIsingEngine> {
    let params = IsingParams {
        rows,
        cols,
        coupling,
        temperature,
        field,
        init,
        seed,
    };
    IsingEngine::new(params)
}

impl IsingEngine<StdRng> {
    /// Make a new engine, seeding the rng from `params.seed` or from the OS.
    pub fn new(params: IsingParams) -> IsingResult<Self> {
        // Validate before touching the OS entropy source.
        params.validate()?;
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new_with_rng(params, rng)
    }
}

impl<R: Rng> IsingEngine<R> {
    /// Make a new engine with a given rng.
    ///
    /// `params.seed` is ignored, the rng is used as is.
    pub fn new_with_rng(params: IsingParams, mut rng: R) -> IsingResult<Self> {
        params.validate()?;
        let lattice = Lattice::new(params.rows, params.cols, params.init, &mut rng)?;
        Ok(Self::build(params, lattice, rng))
    }

    /// Make a new engine starting from an existing lattice.
    ///
    /// The dimensions in `params` must match those of the lattice.
    pub fn new_with_lattice(params: IsingParams, lattice: Lattice, rng: R) -> IsingResult<Self> {
        params.validate()?;
        if (params.rows, params.cols) != (lattice.rows(), lattice.cols()) {
            return Err(IsingError::DimensionMismatch {
                rows: params.rows,
                cols: params.cols,
                found_rows: lattice.rows(),
                found_cols: lattice.cols(),
            });
        }
        Ok(Self::build(params, lattice, rng))
    }

    fn build(params: IsingParams, lattice: Lattice, rng: R) -> Self {
        let energy = lattice.energy(params.coupling, params.field);
        let magnetization = lattice.magnetization();
        debug!(
            rows = params.rows,
            cols = params.cols,
            coupling = params.coupling,
            temperature = params.temperature,
            field = params.field,
            init = ?params.init,
            seeded = params.seed.is_some(),
            energy,
            magnetization,
            "constructed ising engine"
        );
        Self {
            params,
            lattice,
            energy,
            magnetization,
            steps: 0,
            accepted: 0,
            rng,
        }
    }

    /// Energy change caused by flipping `(row, col)`, without flipping it.
    ///
    /// With `s` the spin and `n` the sum of its four neighbors this is
    /// `2 s (J n + h)`.
    pub fn local_field_energy_delta(&self, row: usize, col: usize) -> IsingResult<f64> {
        let s = self.lattice.get(row, col)?;
        Ok(self.energy_delta(row, col, s))
    }

    #[inline]
    fn energy_delta(&self, row: usize, col: usize, s: i8) -> f64 {
        let n = f64::from(self.lattice.neighbor_sum_unchecked(row, col));
        2.0 * f64::from(s) * (self.params.coupling * n + self.params.field)
    }

    /// Randomly choose if a flip should be made based on temperature and energy change.
    ///
    /// Consumes one uniform draw only when `delta_e > 0`.
    pub fn should_flip(rng: &mut R, temperature: f64, delta_e: f64) -> bool {
        // If dE <= 0 then it will always flip, don't bother calculating odds.
        if delta_e > 0.0 {
            let chance = (-delta_e / (KB * temperature)).exp();
            rng.gen::<f64>() < chance
        } else {
            true
        }
    }

    /// Propose a flip of a uniformly chosen site and apply the Metropolis rule.
    ///
    /// Returns whether the flip was accepted.
    pub fn step(&mut self) -> bool {
        let row = self.rng.gen_range(0..self.lattice.rows());
        let col = self.rng.gen_range(0..self.lattice.cols());
        let s = self.lattice.spin(row, col);
        let delta_e = self.energy_delta(row, col, s);

        self.steps += 1;
        if Self::should_flip(&mut self.rng, self.params.temperature, delta_e) {
            self.lattice.flip_unchecked(row, col);
            self.energy += delta_e;
            self.magnetization -= 2 * i64::from(s);
            self.accepted += 1;
            true
        } else {
            false
        }
    }

    /// Lazily take `n_steps` steps, yielding the observables after each one.
    pub fn run(&mut self, n_steps: usize) -> Steps<'_, R> {
        Steps {
            engine: self,
            remaining: n_steps,
        }
    }

    /// Lazily take `n_sweeps` sweeps of N steps each, yielding the observables after each sweep.
    pub fn run_sweep(&mut self, n_sweeps: usize) -> Sweeps<'_, R> {
        Sweeps {
            engine: self,
            remaining: n_sweeps,
        }
    }

    /// Energy and magnetization right now.
    pub fn observables(&self) -> Observables {
        Observables {
            step: self.steps,
            energy: self.energy,
            magnetization: self.magnetization,
            n_sites: self.lattice.n_sites(),
        }
    }

    /// A copy of the lattice with its observables, without advancing.
    pub fn current_snapshot(&self) -> Snapshot {
        Snapshot {
            lattice: self.lattice.clone(),
            observables: self.observables(),
        }
    }

    /// Recompute `(E, M)` from scratch over the whole lattice.
    pub fn recompute_observables(&self) -> (f64, i64) {
        (
            self.lattice.energy(self.params.coupling, self.params.field),
            self.lattice.magnetization(),
        )
    }

    /// Refill the lattice following `policy` and recompute the running totals.
    ///
    /// Step and acceptance counters are kept.
    pub fn reset_spins(&mut self, policy: InitPolicy) {
        self.lattice.reset(policy, &mut self.rng);
        self.params.init = policy;
        let (energy, magnetization) = self.recompute_observables();
        self.energy = energy;
        self.magnetization = magnetization;
        debug!(init = ?policy, energy, magnetization, "reset spins");
    }

    /// Running total energy.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Running total magnetization.
    pub fn magnetization(&self) -> i64 {
        self.magnetization
    }

    /// Number of steps taken so far.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Number of accepted flips so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Fraction of steps which were accepted, NaN before the first step.
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps == 0 {
            f64::NAN
        } else {
            self.accepted as f64 / self.steps as f64
        }
    }

    /// The parameters of this engine.
    pub fn params(&self) -> &IsingParams {
        &self.params
    }

    /// The current lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Consume the engine and keep the lattice.
    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }

    fn log_finished(&self, unit: &'static str) {
        debug!(
            unit,
            steps = self.steps,
            accepted = self.accepted,
            acceptance_rate = self.acceptance_rate(),
            energy = self.energy,
            magnetization = self.magnetization,
            "run finished"
        );
    }
}

impl<R: Rng> MonteCarloStepper for IsingEngine<R> {
    fn timestep(&mut self) -> bool {
        self.step()
    }

    fn n_sites(&self) -> usize {
        self.lattice.n_sites()
    }

    fn state_ref(&self) -> &[i8] {
        self.lattice.spins()
    }

    fn observables(&self) -> Observables {
        IsingEngine::observables(self)
    }
}

/// Iterator over the observables after each step, see [`IsingEngine::run`].
#[derive(Debug)]
pub struct Steps<'a, R: Rng> {
    engine: &'a mut IsingEngine<R>,
    remaining: usize,
}

impl<'a, R: Rng> Iterator for Steps<'a, R> {
    type Item = Observables;

    fn next(&mut self) -> Option<Observables> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.engine.step();
        if self.remaining == 0 {
            self.engine.log_finished("steps");
        }
        Some(self.engine.observables())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, R: Rng> ExactSizeIterator for Steps<'a, R> {}
impl<'a, R: Rng> FusedIterator for Steps<'a, R> {}

/// Iterator over the observables after each sweep, see [`IsingEngine::run_sweep`].
#[derive(Debug)]
pub struct Sweeps<'a, R: Rng> {
    engine: &'a mut IsingEngine<R>,
    remaining: usize,
}

impl<'a, R: Rng> Iterator for Sweeps<'a, R> {
    type Item = Observables;

    fn next(&mut self) -> Option<Observables> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.engine.sweep();
        if self.remaining == 0 {
            self.engine.log_finished("sweeps");
        }
        Some(self.engine.observables())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, R: Rng> ExactSizeIterator for Sweeps<'a, R> {}
impl<'a, R: Rng> FusedIterator for Sweeps<'a, R> {}
