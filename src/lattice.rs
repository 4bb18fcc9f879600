use crate::errors::{IsingError, IsingResult};
use rand::Rng;
#[cfg(feature = "serialize")]
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::{Debug, Error, Formatter};

/// A lattice coordinate `(row, col)`.
pub type Site = (usize, usize);

/// How to fill a freshly built lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum InitPolicy {
    /// Every spin is +1.
    AllUp,
    /// Every spin is -1.
    AllDown,
    /// Each spin is drawn independently and uniformly from {-1, +1}.
    Random,
}

/// A rows x cols grid of spins with periodic boundaries.
///
/// Spins are stored in row-major order as `i8` values which are always either
/// `1` or `-1`. The only mutation exposed is a single-site flip (and a full
/// reset), so the invariant holds for the lifetime of the lattice.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct Lattice {
    rows: usize,
    cols: usize,
    spins: Vec<i8>,
}

/// Deserialization goes through [`Lattice::from_spins`], so dimensions, buffer
/// length and spin values are checked.
#[cfg(feature = "serialize")]
impl<'de> Deserialize<'de> for Lattice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawLattice {
            rows: usize,
            cols: usize,
            spins: Vec<i8>,
        }
        let raw = RawLattice::deserialize(deserializer)?;
        Lattice::from_spins(raw.rows, raw.cols, raw.spins).map_err(de::Error::custom)
    }
}

impl Debug for Lattice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let s = self
            .spins
            .chunks(self.cols)
            .map(|row| {
                row.iter()
                    .map(|s| if *s > 0 { "+" } else { "-" })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        f.write_str(&s)
    }
}

impl Lattice {
    /// Make a new lattice filled according to `policy`.
    ///
    /// The rng is only consumed for [`InitPolicy::Random`], one bool per cell in
    /// row-major order.
    pub fn new<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        policy: InitPolicy,
        rng: &mut R,
    ) -> IsingResult<Self> {
        check_dimensions(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            spins: make_spin_state(rows * cols, policy, rng),
        })
    }

    /// Make a lattice with every spin set to `+1` (or `-1` if `up` is false).
    pub fn new_uniform(rows: usize, cols: usize, up: bool) -> IsingResult<Self> {
        check_dimensions(rows, cols)?;
        let s = if up { 1 } else { -1 };
        Ok(Self {
            rows,
            cols,
            spins: vec![s; rows * cols],
        })
    }

    /// Build a lattice from an existing row-major spin buffer.
    pub fn from_spins(rows: usize, cols: usize, spins: Vec<i8>) -> IsingResult<Self> {
        check_dimensions(rows, cols)?;
        if spins.len() != rows * cols {
            return Err(IsingError::InvalidState(format!(
                "expected {} spins for a {}x{} lattice, found {}",
                rows * cols,
                rows,
                cols,
                spins.len()
            )));
        }
        if let Some(bad) = spins.iter().find(|s| **s != 1 && **s != -1) {
            return Err(IsingError::InvalidState(format!(
                "spin values must be +1 or -1, found {}",
                bad
            )));
        }
        Ok(Self { rows, cols, spins })
    }

    /// Refill the lattice in place, keeping its dimensions.
    pub fn reset<R: Rng + ?Sized>(&mut self, policy: InitPolicy, rng: &mut R) {
        self.spins = make_spin_state(self.n_sites(), policy, rng);
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of sites, `rows * cols`.
    pub fn n_sites(&self) -> usize {
        self.spins.len()
    }

    /// The row-major spin buffer.
    pub fn spins(&self) -> &[i8] {
        &self.spins
    }

    /// Copy the spins out as one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        self.spins.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// Get the spin at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> IsingResult<i8> {
        self.check_site(row, col)?;
        Ok(self.spin(row, col))
    }

    /// The four periodic neighbors of `(row, col)`: up, down, left, right.
    ///
    /// On a lattice with exactly two rows (or columns) the up and down (or left
    /// and right) neighbors coincide, the site is then coupled to that
    /// neighbor twice.
    pub fn neighbors(&self, row: usize, col: usize) -> IsingResult<[Site; 4]> {
        self.check_site(row, col)?;
        Ok(self.neighbor_sites(row, col))
    }

    /// Sum of the four neighboring spins of `(row, col)`.
    pub fn neighbor_sum(&self, row: usize, col: usize) -> IsingResult<i32> {
        self.check_site(row, col)?;
        Ok(self.neighbor_sum_unchecked(row, col))
    }

    /// Invert the spin at `(row, col)`.
    ///
    /// Nothing is returned on success; the `Result` only carries
    /// [`IsingError::OutOfBounds`] for coordinates outside the lattice.
    pub fn flip(&mut self, row: usize, col: usize) -> IsingResult<()> {
        self.check_site(row, col)?;
        self.flip_unchecked(row, col);
        Ok(())
    }

    /// Sum of all spins.
    pub fn magnetization(&self) -> i64 {
        self.spins.iter().map(|s| i64::from(*s)).sum()
    }

    /// Sum over bonds of `s_i * s_j`, each bond counted once.
    ///
    /// Each site contributes the bond to its right and to its lower neighbor.
    pub fn bond_sum(&self) -> i64 {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .map(|(row, col)| {
                let s = i64::from(self.spin(row, col));
                let right = i64::from(self.spin(row, (col + 1) % self.cols));
                let down = i64::from(self.spin((row + 1) % self.rows, col));
                s * (right + down)
            })
            .sum()
    }

    /// Total energy `-J * sum_<ij> s_i s_j - h * sum_i s_i`, computed from scratch.
    pub fn energy(&self, coupling: f64, field: f64) -> f64 {
        -coupling * self.bond_sum() as f64 - field * self.magnetization() as f64
    }

    #[inline]
    pub(crate) fn spin(&self, row: usize, col: usize) -> i8 {
        self.spins[row * self.cols + col]
    }

    #[inline]
    pub(crate) fn flip_unchecked(&mut self, row: usize, col: usize) {
        let s = &mut self.spins[row * self.cols + col];
        *s = -*s;
    }

    #[inline]
    pub(crate) fn neighbor_sites(&self, row: usize, col: usize) -> [Site; 4] {
        [
            ((row + self.rows - 1) % self.rows, col),
            ((row + 1) % self.rows, col),
            (row, (col + self.cols - 1) % self.cols),
            (row, (col + 1) % self.cols),
        ]
    }

    #[inline]
    pub(crate) fn neighbor_sum_unchecked(&self, row: usize, col: usize) -> i32 {
        self.neighbor_sites(row, col)
            .iter()
            .map(|(r, c)| i32::from(self.spin(*r, *c)))
            .sum()
    }

    fn check_site(&self, row: usize, col: usize) -> IsingResult<()> {
        if row < self.rows && col < self.cols {
            Ok(())
        } else {
            Err(IsingError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }
}

pub(crate) fn check_dimensions(rows: usize, cols: usize) -> IsingResult<()> {
    if rows < 2 || cols < 2 {
        Err(IsingError::InvalidDimension { rows, cols })
    } else {
        Ok(())
    }
}

/// Build a spin state of `n` sites following `policy`.
pub fn make_spin_state<R: Rng + ?Sized>(n: usize, policy: InitPolicy, rng: &mut R) -> Vec<i8> {
    match policy {
        InitPolicy::AllUp => vec![1; n],
        InitPolicy::AllDown => vec![-1; n],
        InitPolicy::Random => (0..n)
            .map(|_| if rng.gen::<bool>() { 1 } else { -1 })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_reject_small_dimensions() {
        assert_eq!(
            Lattice::new_uniform(1, 4, true),
            Err(IsingError::InvalidDimension { rows: 1, cols: 4 })
        );
        assert_eq!(
            Lattice::new_uniform(4, 0, true),
            Err(IsingError::InvalidDimension { rows: 4, cols: 0 })
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let mut lat = Lattice::new_uniform(3, 5, true).unwrap();
        assert!(lat.get(2, 4).is_ok());
        assert_eq!(
            lat.get(3, 0),
            Err(IsingError::OutOfBounds {
                row: 3,
                col: 0,
                rows: 3,
                cols: 5
            })
        );
        assert!(lat.get(0, 5).is_err());
        assert!(lat.flip(0, 5).is_err());
        assert!(lat.neighbors(7, 1).is_err());
    }

    #[test]
    fn test_neighbors_wrap() {
        let lat = Lattice::new_uniform(4, 6, true).unwrap();
        let ns = lat.neighbors(0, 0).unwrap();
        assert!(ns.contains(&(3, 0)));
        assert!(ns.contains(&(0, 5)));
        assert!(ns.contains(&(1, 0)));
        assert!(ns.contains(&(0, 1)));

        let ns = lat.neighbors(3, 5).unwrap();
        assert!(ns.contains(&(0, 5)));
        assert!(ns.contains(&(3, 0)));
    }

    #[test]
    fn test_neighbors_distinct() {
        let lat = Lattice::new_uniform(3, 3, true).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let mut ns = lat.neighbors(row, col).unwrap().to_vec();
                ns.sort_unstable();
                ns.dedup();
                assert_eq!(ns.len(), 4);
            }
        }
    }

    #[test]
    fn test_flip_and_magnetization() {
        let mut lat = Lattice::new_uniform(4, 4, true).unwrap();
        assert_eq!(lat.magnetization(), 16);
        lat.flip(1, 2).unwrap();
        assert_eq!(lat.get(1, 2), Ok(-1));
        assert_eq!(lat.magnetization(), 14);
        lat.flip(1, 2).unwrap();
        assert_eq!(lat.magnetization(), 16);
    }

    #[test]
    fn test_uniform_energy() {
        let lat = Lattice::new_uniform(4, 4, true).unwrap();
        // 2 bonds per site.
        assert_eq!(lat.bond_sum(), 32);
        assert_eq!(lat.energy(1.0, 0.0), -32.0);
        assert_eq!(lat.energy(1.0, 0.5), -40.0);

        let lat = Lattice::new_uniform(4, 4, false).unwrap();
        assert_eq!(lat.energy(1.0, 0.5), -24.0);
    }

    #[test]
    fn test_checkerboard_energy() {
        let spins = (0..16)
            .map(|i| if (i / 4 + i % 4) % 2 == 0 { 1 } else { -1 })
            .collect();
        let lat = Lattice::from_spins(4, 4, spins).unwrap();
        assert_eq!(lat.magnetization(), 0);
        assert_eq!(lat.bond_sum(), -32);
        assert_eq!(lat.neighbor_sum(0, 0), Ok(-4));
    }

    #[test]
    fn test_from_spins_validates() {
        assert!(Lattice::from_spins(2, 2, vec![1, -1, 1]).is_err());
        assert!(Lattice::from_spins(2, 2, vec![1, -1, 0, 1]).is_err());
        assert!(Lattice::from_spins(2, 2, vec![1, -1, -1, 1]).is_ok());
    }

    #[test]
    fn test_random_init_is_seeded() {
        let mut rng_a = SmallRng::seed_from_u64(1234);
        let mut rng_b = SmallRng::seed_from_u64(1234);
        let a = Lattice::new(8, 8, InitPolicy::Random, &mut rng_a).unwrap();
        let b = Lattice::new(8, 8, InitPolicy::Random, &mut rng_b).unwrap();
        assert_eq!(a, b);
        assert!(a.spins().iter().all(|s| *s == 1 || *s == -1));
        // 64 fair coins all landing the same way would be astonishing.
        assert!(a.magnetization().abs() < 64);
    }

    #[test]
    fn test_reset() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut lat = Lattice::new(5, 3, InitPolicy::Random, &mut rng).unwrap();
        lat.reset(InitPolicy::AllDown, &mut rng);
        assert_eq!(lat.magnetization(), -15);
        assert_eq!(lat.rows(), 5);
        assert_eq!(lat.cols(), 3);
        assert_eq!(lat.to_rows().len(), 5);
    }
}
