use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while formulating, solving or validating a strip packing instance.
///
/// Solver timeouts and proofs of infeasibility are not errors, they are reported through
/// [`SolveStatus`](crate::solver::SolveStatus).
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing instance data. Only affects the instance at hand.
    #[error("invalid instance: {0}")]
    InputFormat(String),

    /// Defect in the assembly of the model (e.g. empty domain, dangling variable).
    #[error("model construction failed: {0}")]
    ModelConstruction(String),

    /// A solver assignment which does not describe a valid packing.
    #[error("solution failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// The solving engine failed in a way not covered by a status.
    #[error("solver backend failure: {0}")]
    Backend(String),
}

impl Error {
    /// Errors which indicate a defect in this library rather than in its input.
    pub fn is_defect(&self) -> bool {
        !matches!(self, Error::InputFormat(_))
    }
}

/// Invariant of a packing that was found to be violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected {expected} placements, found {found}")]
    PlacementCount { expected: usize, found: usize },

    #[error("packing width {found} differs from strip width {expected}")]
    StripWidth { expected: u64, found: u64 },

    #[error("variable {name} has value {value}, which is not a valid coordinate or dimension")]
    InvalidValue { name: String, value: i64 },

    #[error("rectangle {0} exceeds the strip")]
    OutOfStrip(usize),

    #[error("rectangles {0} and {1} overlap")]
    Overlap(usize, usize),

    #[error("height {declared} is not the top of the highest rectangle ({actual})")]
    HeightNotTight { declared: u64, actual: u64 },

    #[error("dimensions of rectangle {0} do not match its base dimensions and rotation flag")]
    RotationMismatch(usize),

    #[error("square rectangle {0} is marked as rotated")]
    RotatedSquare(usize),

    #[error("rectangle {0} is rotated while rotation is disabled")]
    RotationDisabled(usize),
}
