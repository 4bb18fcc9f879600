use thiserror::Error;

/// Result type for fallible lattice and engine operations.
pub type IsingResult<T> = Result<T, IsingError>;

/// Precondition violations raised by the lattice and the engine.
///
/// None of these are transient: the engine does no I/O, so an error always
/// means the caller handed in a bad value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsingError {
    /// The lattice needs at least two rows and two columns.
    #[error("invalid lattice dimensions {rows}x{cols}, both must be at least 2")]
    InvalidDimension {
        /// Requested number of rows.
        rows: usize,
        /// Requested number of columns.
        cols: usize,
    },
    /// A physical parameter is outside of its allowed range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// What the parameter must satisfy.
        reason: &'static str,
    },
    /// A coordinate lies outside of `[0, rows) x [0, cols)`.
    #[error("site ({row}, {col}) is outside of a {rows}x{cols} lattice")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Number of rows in the lattice.
        rows: usize,
        /// Number of columns in the lattice.
        cols: usize,
    },
    /// A lattice handed to the engine does not match the configured dimensions.
    #[error("lattice is {found_rows}x{found_cols} but parameters ask for {rows}x{cols}")]
    DimensionMismatch {
        /// Rows in the parameters.
        rows: usize,
        /// Columns in the parameters.
        cols: usize,
        /// Rows in the lattice.
        found_rows: usize,
        /// Columns in the lattice.
        found_cols: usize,
    },
    /// A spin buffer does not describe a valid lattice.
    #[error("invalid spin state: {0}")]
    InvalidState(String),
}
