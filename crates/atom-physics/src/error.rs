use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Initialization error taxonomy.
///
/// Every variant is fatal to the run: the store either initializes fully or
/// not at all, and no partial state escapes. The tick loop itself is a total
/// function over valid states and has no error path.
#[derive(Debug, Error)]
pub enum Error {
    /// Atom count token missing, non-numeric, or not positive.
    #[error("atom count must be a positive integer, got {0:?}")]
    Count(String),

    /// A record failed to parse; names the atom index it belongs to.
    #[error("malformed record for atom {index}: {reason}")]
    Record { index: usize, reason: String },

    /// Rejection sampling could not place an atom within the attempt budget.
    #[error("no non-overlapping placement found for atom {index} after {attempts} attempts")]
    Placement { index: usize, attempts: u32 },

    /// Unreadable or missing initial-state source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
