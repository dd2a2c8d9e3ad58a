use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, CostError>;

/// Failures that stop a cost breakdown from being produced.
#[derive(Debug, Error)]
pub enum CostError {
    /// Loan term of zero months.
    #[error("loan term must be at least one month, got {0}")]
    InvalidTerm(u32),

    /// Make is not present in the maintenance table.
    #[error("unknown make '{0}': no maintenance costs on file")]
    UnknownMake(String),

    /// Fuel efficiency of zero, below zero, or not a number.
    #[error("fuel efficiency must be positive, got {0}")]
    NonPositiveEfficiency(f64),

    /// Wrapper for failures reading the maintenance table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A maintenance table row that does not parse.
    #[error("malformed maintenance rate on line {line}: {reason}")]
    MalformedRate { line: usize, reason: String },

    /// More vehicles than can be compared side by side.
    #[error("can compare at most two vehicles, got {0}")]
    TooManyVehicles(usize),

    /// A required input was not supplied.
    #[error("missing required argument {0}")]
    MissingArgument(&'static str),

    /// A vehicle argument not in `MAKE,PRICE,EFFICIENCY` form.
    #[error("invalid vehicle '{0}': expected MAKE,PRICE,EFFICIENCY")]
    InvalidVehicle(String),
}
