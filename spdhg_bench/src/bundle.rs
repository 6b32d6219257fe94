use serde::{Serialize, Deserialize};

/// Simulated measurement, one entry per view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBundle
{
    /// Observed counts.
    pub data: Vec<Vec<f64>>,
    /// Multiplicative correction factors of the forward projection.
    pub factors: Vec<Vec<f64>>,
    /// Additive background.
    pub background: Vec<Vec<f64>>,
}

/// Saddle point of high accuracy, the reference of every comparative run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetBundle
{
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// \\(-A^T y\\), a subgradient of \\(g\\) at `x`.
    pub subx: Vec<f64>,
    /// \\(A x\\), a subgradient of \\(f^\*\\) at `y`.
    pub suby: Vec<f64>,
    /// Objective value at `x`.
    pub obj: f64,
}

/// Quality measures recorded at one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record
{
    pub obj: f64,
    /// `dist_x + dist_y`.
    pub dist: f64,
    /// \\(\frac12 \\|x - x^\*\\|^2\\).
    pub dist_x: f64,
    /// \\(\frac12 \\|y - y^\*\\|^2\\).
    pub dist_y: f64,
}

/// Records of one run, append-only while the run goes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace
{
    pub records: Vec<Record>,
}

impl Trace
{
    pub fn push(&mut self, r: Record)
    {
        self.records.push(r);
    }

    pub fn len(&self) -> usize
    {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.records.is_empty()
    }

    /// Series of one measure.
    pub fn measure<M>(&self, m: M) -> Vec<f64>
    where M: Fn(&Record) -> f64
    {
        self.records.iter().map(m).collect()
    }
}

/// Output of one algorithm variant, consumed by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput
{
    /// Name of the variant.
    pub alg: String,
    /// Iterations at which `trace` recorded.
    pub iter_save: Vec<usize>,
    /// Total iterations.
    pub niter: usize,
    /// Final primal iterate.
    pub x: Vec<f64>,
    pub trace: Trace,
    /// Number of subsets.
    pub nsub: usize,
    /// Extrapolation parameter, `None` for the Pesquet-Repetti method.
    pub theta: Option<f64>,
}
