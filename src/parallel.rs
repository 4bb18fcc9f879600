use crate::engine::IsingEngine;
use crate::observables::{ObservableStats, Observables};
use rand::Rng;
use rayon::prelude::*;

/// Run `n_sweeps` sweeps on every engine at once, returning each engine's series.
///
/// Engines share nothing, each one is advanced on its own rayon task with its
/// own rng, so the results are the same as running them one after the other.
pub fn run_independent_sweeps<R>(engines: &mut [IsingEngine<R>], n_sweeps: usize) -> Vec<Vec<Observables>>
where
    R: Rng + Send,
{
    engines
        .par_iter_mut()
        .map(|engine| engine.run_sweep(n_sweeps).collect::<Vec<_>>())
        .collect()
}

/// Run `n_sweeps` sweeps on every engine at once, keeping only summary statistics.
pub fn measure_independent_sweeps<R>(engines: &mut [IsingEngine<R>], n_sweeps: usize) -> Vec<ObservableStats>
where
    R: Rng + Send,
{
    engines
        .par_iter_mut()
        .map(|engine| engine.run_sweep(n_sweeps).collect::<ObservableStats>())
        .collect()
}
