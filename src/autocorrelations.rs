use crate::observables::Observables;
use crate::stepper::MonteCarloStepper;
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use rustfft::FftPlanner;
use std::ops::DivAssign;

/// Calculate autocorrelations for a MonteCarloStepper
pub trait AutoCorrelations: MonteCarloStepper {
    /// Calculate the autcorrelation calculations for the results of f(state).
    fn calculate_autocorrelation<F>(
        &mut self,
        timesteps: usize,
        sampling_freq: Option<usize>,
        use_fft: Option<bool>,
        sample_mapper: F,
    ) -> Vec<f64>
    where
        F: Fn(&Self, Vec<i8>) -> Vec<f64>,
    {
        let acc = Vec::with_capacity(timesteps / sampling_freq.unwrap_or(1).max(1) + 1);
        let (samples, _) = self.timesteps_measure(
            timesteps,
            acc,
            |mut acc, state| {
                acc.push(state.to_vec());
                acc
            },
            sampling_freq,
        );
        let samples = samples
            .into_iter()
            .map(|s| sample_mapper(self, s))
            .collect::<Vec<Vec<f64>>>();

        if use_fft.unwrap_or(true) {
            fft_autocorrelation(&samples)
        } else {
            naive_autocorrelation(&samples)
        }
    }

    /// Calculate the autocorrelation of the spins.
    fn calculate_spin_autocorrelation(
        &mut self,
        timesteps: usize,
        sampling_freq: Option<usize>,
        use_fft: Option<bool>,
    ) -> Vec<f64> {
        self.calculate_autocorrelation(timesteps, sampling_freq, use_fft, |_, sample| {
            sample.into_iter().map(f64::from).collect()
        })
    }
}

impl<Q: MonteCarloStepper> AutoCorrelations for Q {}

/// Autocorrelation of a scalar function of a recorded observable series.
///
/// ```ignore
/// let series = engine.run_sweep(1000).collect::<Vec<_>>();
/// let acf = observable_autocorrelation(&series, |o| o.energy);
/// ```
pub fn observable_autocorrelation<F>(series: &[Observables], f: F) -> Vec<f64>
where
    F: Fn(&Observables) -> f64,
{
    let samples = series.iter().map(|o| vec![f(o)]).collect::<Vec<_>>();
    fft_autocorrelation(&samples)
}

/// Integrated autocorrelation time `1/2 + sum_t C(t)`, summed until `C` first drops to zero.
pub fn integrated_autocorrelation_time(autocorrelation: &[f64]) -> f64 {
    let half = autocorrelation.len() / 2;
    0.5 + autocorrelation
        .iter()
        .take(half)
        .skip(1)
        .take_while(|c| **c > 0.0)
        .sum::<f64>()
}

/// Per-variable centered and normalized series, constant variables are dropped.
fn normalized_series(samples: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let tmax = samples.len();
    let n = samples[0].len();
    (0..n)
        .filter_map(|i| {
            let mean = samples.iter().map(|s| s[i]).sum::<f64>() / tmax as f64;
            let v = samples.iter().map(|s| s[i] - mean).collect::<Vec<_>>();
            let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                Some(v.into_iter().map(|x| x / norm).collect())
            } else {
                None
            }
        })
        .collect()
}

/// Circular autocorrelation averaged across variables, using FFTs.
///
/// `samples[t][i]` is variable `i` at time `t`. The result is one at zero lag.
/// Variables which never change are ignored, if all are constant every entry is NaN.
pub fn fft_autocorrelation(samples: &[Vec<f64>]) -> Vec<f64> {
    let tmax = samples.len();
    if tmax == 0 {
        return vec![];
    }
    let series = normalized_series(samples);
    let n = series.len();
    if n == 0 {
        return vec![f64::NAN; tmax];
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(tmax);
    let ifft = planner.plan_fft_inverse(tmax);

    let mut acc = vec![Complex::<f64>::zero(); tmax];
    series.into_iter().for_each(|v| {
        let mut buffer = v
            .into_iter()
            .map(|x| Complex::new(x, 0.0))
            .collect::<Vec<Complex<f64>>>();
        fft.process(&mut buffer);
        buffer
            .iter_mut()
            .for_each(|c| *c = Complex::new(c.norm_sqr(), 0.0));
        ifft.process(&mut buffer);
        acc.iter_mut().zip(buffer).for_each(|(a, b)| *a += b);
    });
    acc.iter_mut()
        .for_each(|c| c.div_assign((n * tmax) as f64));
    acc.into_iter().map(|c| c.re).collect()
}

/// Same as [`fft_autocorrelation`] but computed directly in `O(n t^2)`.
pub fn naive_autocorrelation(samples: &[Vec<f64>]) -> Vec<f64> {
    let tmax = samples.len();
    if tmax == 0 {
        return vec![];
    }
    let series = normalized_series(samples);
    let n = series.len();
    if n == 0 {
        return vec![f64::NAN; tmax];
    }

    (0..tmax)
        .map(|tau| {
            series
                .iter()
                .map(|v| {
                    (0..tmax)
                        .map(|t| v[t] * v[(t + tau) % tmax])
                        .sum::<f64>()
                })
                .sum::<f64>()
                / n as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IsingEngine;
    use crate::lattice::InitPolicy;
    use crate::params::IsingParams;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn make_samples() -> Vec<Vec<f64>> {
        (0..32)
            .map(|t| {
                let t = t as f64;
                vec![(t * 0.3).sin(), (t * 0.7).cos() + 0.1 * t, 2.0]
            })
            .collect()
    }

    #[test]
    fn test_fft_matches_naive() {
        let samples = make_samples();
        let a = fft_autocorrelation(&samples);
        let b = naive_autocorrelation(&samples);
        assert_eq!(a.len(), 32);
        assert!((a[0] - 1.0).abs() < 1e-9);
        a.iter()
            .zip(b.iter())
            .for_each(|(x, y)| assert!((x - y).abs() < 1e-9, "{} vs {}", x, y));
    }

    #[test]
    fn test_constant_series() {
        let samples = vec![vec![1.0]; 8];
        assert!(fft_autocorrelation(&samples).iter().all(|c| c.is_nan()));
        assert!(fft_autocorrelation(&[]).is_empty());
    }

    #[test]
    fn test_integrated_time() {
        let acf = vec![1.0, 0.5, 0.25, -0.1, 0.3, 0.0, 0.0, 0.0];
        assert_eq!(integrated_autocorrelation_time(&acf), 1.25);
    }

    #[test]
    fn test_engine_autocorrelation() {
        let params = IsingParams::new(8, 8, 1.0, 2.5, 0.0).with_init(InitPolicy::Random);
        let mut engine = IsingEngine::new_with_rng(params, SmallRng::seed_from_u64(42)).unwrap();
        let acf = engine.calculate_spin_autocorrelation(6400, Some(64), None);
        assert_eq!(acf.len(), 100);
        assert!((acf[0] - 1.0).abs() < 1e-9);

        let series = engine.run_sweep(64).collect::<Vec<_>>();
        let acf = observable_autocorrelation(&series, |o| o.energy);
        assert_eq!(acf.len(), 64);
        assert!(integrated_autocorrelation_time(&acf) >= 0.5);
    }
}
