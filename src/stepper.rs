use crate::observables::Observables;

/// Interval, in steps, between stored lattice states when sampling.
pub const DEFAULT_SAMPLING_FREQ: usize = 100;

/// Provides helpers to structs which take single-spin-flip timesteps.
pub trait MonteCarloStepper {
    /// Attempt a single spin flip, returns true if it was accepted.
    fn timestep(&mut self) -> bool;

    /// Number of lattice sites.
    fn n_sites(&self) -> usize;

    /// Get a reference to the row-major state.
    fn state_ref(&self) -> &[i8];

    /// Current energy and magnetization.
    fn observables(&self) -> Observables;

    /// Attempt one flip per site on average, returns the number accepted.
    fn sweep(&mut self) -> usize {
        let n = self.n_sites();
        (0..n).filter(|_| self.timestep()).count()
    }

    /// Take t timesteps and return the average energy.
    fn timesteps(&mut self, t: usize) -> f64 {
        let (_, average_energy) = self.timesteps_measure(t, (), |_acc, _state| (), None);
        average_energy
    }

    /// Take n sweeps and return the average energy measured after each.
    fn sweeps(&mut self, n: usize) -> f64 {
        let freq = self.n_sites();
        let (_, average_energy) = self.timesteps_measure(n * freq, (), |_acc, _state| (), Some(freq));
        average_energy
    }

    /// Take t timesteps and sample states, by default every [`DEFAULT_SAMPLING_FREQ`] steps.
    fn timesteps_sample(&mut self, t: usize, sampling_freq: Option<usize>) -> (Vec<Vec<i8>>, f64) {
        let sampling_freq = sampling_freq.unwrap_or(DEFAULT_SAMPLING_FREQ).max(1);
        let acc = Vec::with_capacity(t / sampling_freq + 1);
        self.timesteps_measure(
            t,
            acc,
            |mut acc, state| {
                acc.push(state.to_vec());
                acc
            },
            Some(sampling_freq),
        )
    }

    /// Take t timesteps and sample states, apply f to each.
    fn timesteps_sample_iter<F>(&mut self, t: usize, sampling_freq: Option<usize>, iter_fn: F) -> f64
    where
        F: Fn(&[i8]),
    {
        let (_, e) = self.timesteps_measure(t, (), |_, state| iter_fn(state), sampling_freq);
        e
    }

    /// Take t timesteps and sample states, fold across states and output results.
    fn timesteps_measure<F, T>(
        &mut self,
        timesteps: usize,
        init_t: T,
        state_fold: F,
        sampling_freq: Option<usize>,
    ) -> (T, f64)
    where
        F: Fn(T, &[i8]) -> T,
    {
        self.timesteps_measure_with_self(
            timesteps,
            init_t,
            |acc, s| state_fold(acc, s.state_ref()),
            sampling_freq,
        )
    }

    /// Take t timesteps and fold across the stepper itself every `sampling_freq` steps.
    ///
    /// Returns the folded value and the energy averaged over the sampled steps,
    /// which is NaN if no step was sampled.
    fn timesteps_measure_with_self<F, T>(
        &mut self,
        timesteps: usize,
        init_t: T,
        state_fold: F,
        sampling_freq: Option<usize>,
    ) -> (T, f64)
    where
        F: Fn(T, &Self) -> T,
    {
        let mut acc = init_t;
        let mut steps_measured = 0usize;
        let mut total_e = 0.0;
        let sampling_freq = sampling_freq.unwrap_or(1).max(1);

        for t in 0..timesteps {
            self.timestep();

            // Sample every `sampling_freq`
            // Ignore first one.
            if (t + 1) % sampling_freq == 0 {
                acc = state_fold(acc, self);
                steps_measured += 1;
                total_e += self.observables().energy;
            }
        }
        let average_e = if steps_measured == 0 {
            f64::NAN
        } else {
            total_e / steps_measured as f64
        };
        (acc, average_e)
    }
}
