use crate::lattice::Lattice;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Energy and magnetization of the lattice after a given number of steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Observables {
    /// Number of single-spin-flip attempts made so far.
    pub step: u64,
    /// Total energy E.
    pub energy: f64,
    /// Total magnetization M, the sum of all spins.
    pub magnetization: i64,
    /// Number of lattice sites N.
    pub n_sites: usize,
}

impl Observables {
    /// E / N
    pub fn energy_per_site(&self) -> f64 {
        self.energy / self.n_sites as f64
    }

    /// M / N, the average spin.
    pub fn magnetization_per_site(&self) -> f64 {
        self.magnetization as f64 / self.n_sites as f64
    }

    /// |M| / N
    pub fn abs_magnetization_per_site(&self) -> f64 {
        self.magnetization_per_site().abs()
    }
}

impl Display for Observables {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.step,
            self.energy,
            self.magnetization_per_site()
        )
    }
}

/// A copy of the lattice together with its observables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// The spins at the time of the snapshot.
    pub lattice: Lattice,
    /// Energy and magnetization at the time of the snapshot.
    pub observables: Observables,
}

impl Snapshot {
    /// Total energy E.
    pub fn energy(&self) -> f64 {
        self.observables.energy
    }

    /// Total magnetization M.
    pub fn magnetization(&self) -> i64 {
        self.observables.magnetization
    }
}

/// Streaming averages over a series of [`Observables`].
///
/// Moments are accumulated per site so that fluctuation estimates of the
/// specific heat and susceptibility can be taken at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservableStats {
    count: usize,
    n_sites: usize,
    energy: f64,
    energy_sq: f64,
    magnetization: f64,
    abs_magnetization: f64,
    magnetization_sq: f64,
}

impl ObservableStats {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample.
    pub fn update(&mut self, obs: &Observables) {
        let e = obs.energy_per_site();
        let m = obs.magnetization_per_site();
        self.count += 1;
        self.n_sites = obs.n_sites;
        self.energy += e;
        self.energy_sq += e * e;
        self.magnetization += m;
        self.abs_magnetization += m.abs();
        self.magnetization_sq += m * m;
    }

    /// Number of samples seen.
    pub fn count(&self) -> usize {
        self.count
    }

    fn mean(&self, total: f64) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            total / self.count as f64
        }
    }

    /// <E/N>
    pub fn mean_energy_per_site(&self) -> f64 {
        self.mean(self.energy)
    }

    /// <M/N>
    pub fn mean_magnetization_per_site(&self) -> f64 {
        self.mean(self.magnetization)
    }

    /// <|M|/N>
    pub fn mean_abs_magnetization_per_site(&self) -> f64 {
        self.mean(self.abs_magnetization)
    }

    /// Specific heat per site, `N (<e^2> - <e>^2) / T^2` with `e = E/N`.
    pub fn specific_heat(&self, temperature: f64) -> f64 {
        let e = self.mean_energy_per_site();
        let var = self.mean(self.energy_sq) - e * e;
        self.n_sites as f64 * var / (temperature * temperature)
    }

    /// Susceptibility per site, `N (<m^2> - <|m|>^2) / T` with `m = M/N`.
    pub fn susceptibility(&self, temperature: f64) -> f64 {
        let m = self.mean_abs_magnetization_per_site();
        let var = self.mean(self.magnetization_sq) - m * m;
        self.n_sites as f64 * var / temperature
    }
}

impl Extend<Observables> for ObservableStats {
    fn extend<T: IntoIterator<Item = Observables>>(&mut self, iter: T) {
        iter.into_iter().for_each(|obs| self.update(&obs))
    }
}

impl FromIterator<Observables> for ObservableStats {
    fn from_iter<T: IntoIterator<Item = Observables>>(iter: T) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}
