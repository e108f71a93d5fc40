#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a value is malformed for the operation it was passed to.
    #[error("invalid value: {reason}")]
    InvalidValue {
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when a value has the wrong type tag for the operation.
    #[error("invalid type: expected {expected}, got {got}")]
    InvalidType {
        /// The type the operation required.
        expected: &'static str,
        /// The type that was actually supplied.
        got: &'static str,
    },

    /// Returned when the lower bound is not below the upper bound.
    #[error("invalid bounds: lower ({lower}) must be less than upper ({upper})")]
    InvalidBounds {
        /// The lower bound value.
        lower: f64,
        /// The upper bound value.
        upper: f64,
    },

    /// Returned when a distribution is malformed or incompatible with the
    /// domain it is asked to sample.
    #[error("invalid distribution: {reason}")]
    InvalidDistribution {
        /// Why the distribution was rejected.
        reason: String,
    },

    /// Returned when an expression cannot be parsed, resolved, or evaluated.
    #[error("invalid expression: {reason}")]
    InvalidExpression {
        /// Why the expression was rejected.
        reason: String,
    },

    /// Returned when an activation condition is malformed, or references a
    /// parameter that is not declared strictly earlier than the one it gates.
    #[error("invalid condition: {reason}")]
    InvalidCondition {
        /// Why the condition was rejected.
        reason: String,
    },

    /// Returned when a configuration fails domain or consistency checks.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// Returned when an evaluation fails consistency checks.
    #[error("invalid evaluation: {reason}")]
    InvalidEvaluation {
        /// Why the evaluation was rejected.
        reason: String,
    },

    /// Returned when a features binding fails domain checks.
    #[error("invalid features: {reason}")]
    InvalidFeatures {
        /// Why the features binding was rejected.
        reason: String,
    },

    /// Returned when an index or tree position is outside the valid range.
    #[error("index {index} out of bounds (length {len})")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The length of the indexed collection.
        len: usize,
    },

    /// Returned when a bounded retry loop (rejection sampling or
    /// forbidden-clause resampling) exhausts its attempt budget.
    #[error("sampling unsuccessful after {attempts} attempts")]
    SamplingUnsuccessful {
        /// The number of attempts made before giving up.
        attempts: usize,
    },

    /// Returned when two values cannot be ordered relative to each other,
    /// including any ordering attempt involving an inactive value.
    #[error("values of types {lhs} and {rhs} are not comparable")]
    TypeNotComparable {
        /// The type of the left operand.
        lhs: &'static str,
        /// The type of the right operand.
        rhs: &'static str,
    },

    /// Returned when a query has no results where the caller expected some.
    #[error("not enough data")]
    NotEnoughData,

    /// Returned when a snapshot disagrees with the objects re-supplied at
    /// restore time.
    #[error("invalid handle: {reason}")]
    InvalidHandle {
        /// Why the handle mapping was rejected.
        reason: String,
    },

    /// Returned when an operation is not defined for the receiver, such as
    /// sampling a string parameter.
    #[error("unsupported operation: {reason}")]
    Unsupported {
        /// Why the operation is not available.
        reason: &'static str,
    },

    /// Returned when a user-supplied strategy panics or fails; the payload
    /// is the strategy's own message.
    #[error("external strategy error: {0}")]
    External(String),

    /// Returned when encoding or decoding a snapshot fails.
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = core::result::Result<T, Error>;
