#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `ising` is a library for simulating the classical 2D ising model on a periodic
//! square lattice using single-spin-flip metropolis monte carlo.
//!
//! The energy of a configuration is `E = -J sum_<ij> s_i s_j - h sum_i s_i` with
//! Boltzmann's constant folded into the temperature. The engine keeps running
//! totals of the energy and magnetization which are updated on each accepted flip.
//!
//! It also offers a few feature gated modules:
//! - autocorrelation calculations on spins or observables: use `autocorrelations`
//! - running many independent lattices on the rayon pool with the `parallel` feature.
//! - parameter, lattice and snapshot serialization using serde with the `serialize` feature.
//!
//! # Basic Example
//! ```
//! use ising::*;
//!
//! // 16x16 lattice, J = 1, T = 2.0, h = 0.
//! let params = IsingParams::new(16, 16, 1.0, 2.0, 0.0)
//!     .with_init(InitPolicy::AllUp)
//!     .with_seed(1234);
//! let mut engine = IsingEngine::new(params).unwrap();
//!
//! // Observables after each of 1000 single-spin-flip attempts.
//! for obs in engine.run(1000) {
//!     assert!(obs.magnetization.abs() <= 256);
//! }
//!
//! // One sample per sweep of N attempts.
//! let stats: ObservableStats = engine.run_sweep(100).collect();
//! let m = stats.mean_abs_magnetization_per_site();
//! assert!(m > 0.0 && m <= 1.0);
//! ```

/// Autocorrelations of spins and observable series.
#[cfg(feature = "autocorrelations")]
pub mod autocorrelations;
/// The metropolis engine.
pub mod engine;
/// Error types.
pub mod errors;
/// The spin lattice.
pub mod lattice;
/// Energy, magnetization and their statistics.
pub mod observables;
/// Independent engines on the rayon thread pool.
#[cfg(feature = "parallel")]
pub mod parallel;
/// Simulation parameters.
pub mod params;
/// Helpers for anything taking monte carlo timesteps.
pub mod stepper;

#[cfg(feature = "autocorrelations")]
pub use autocorrelations::*;
pub use engine::{new_engine, DefaultIsingEngine, IsingEngine, Steps, Sweeps};
pub use errors::{IsingError, IsingResult};
pub use lattice::{InitPolicy, Lattice, Site};
pub use observables::{ObservableStats, Observables, Snapshot};
pub use params::{IsingParams, CRITICAL_TEMPERATURE, KB};
pub use stepper::{MonteCarloStepper, DEFAULT_SAMPLING_FREQ};
