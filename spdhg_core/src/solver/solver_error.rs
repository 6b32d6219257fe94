/// Configuration errors.
/// 
/// Raised before any iteration starts; an algorithm never runs with an invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError
{
    /// A strong convexity modulus required by an accelerated variant is zero or undefined.
    ZeroStrongConvexity,
    /// Subset selection probabilities are negative or do not sum to one.
    ProbSum,
    /// Number of subsets is zero or exceeds the number of blocks.
    SubsetExcess,
    /// Step size bound \\(\rho\\) is out of \\((0, 1)\\).
    RhoRange,
    /// Number of operator norms does not match the partition.
    NormCount,
    /// A step size is not a finite positive value.
    NonPositiveStep,
    /// Number of dual step sizes does not match the number of blocks.
    StepCount,
    /// No block or no primal variable.
    EmptyProblem,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            ConfigError::ZeroStrongConvexity => "ZeroStrongConvexity: strong convexity modulus must be positive",
            ConfigError::ProbSum             => "ProbSum: probabilities must be nonnegative and sum to 1",
            ConfigError::SubsetExcess        => "SubsetExcess: number of subsets must be in 1..=number of blocks",
            ConfigError::RhoRange            => "RhoRange: rho must be in (0, 1)",
            ConfigError::NormCount           => "NormCount: number of operator norms mismatches the partition",
            ConfigError::NonPositiveStep     => "NonPositiveStep: step size must be finite and positive",
            ConfigError::StepCount           => "StepCount: number of dual step sizes mismatches the blocks",
            ConfigError::EmptyProblem        => "EmptyProblem: no block or no primal variable",
        })
    }
}

//

/// Solver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError
{
    /// Invalid algorithm configuration.
    Config(ConfigError),
    /// A point outside the effective domain of a [`crate::solver::ConvexFn`].
    OutOfDomain,
    /// Invalid [`crate::solver::Operator`], or a vector length mismatching it.
    InvalidOp,
}

impl core::fmt::Display for SolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            SolverError::Config(e)   => write!(f, "Config: {}", e),
            SolverError::OutOfDomain => write!(f, "OutOfDomain: point outside the effective domain"),
            SolverError::InvalidOp   => write!(f, "InvalidOp: invalid Operator or size mismatch"),
        }
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        SolverError::Config(e)
    }
}

//

impl std::error::Error for ConfigError {}

impl std::error::Error for SolverError {}
