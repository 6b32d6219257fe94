use std::time::Instant;
use spdhg_core::solver::{IterateState, LinAlg, Objective, Observer, SolverError};
use crate::{La, Record, TargetBundle, Trace};

/// Records quality measures against a saddle point every `step` iterations.
pub struct TraceRecorder<'a>
{
    target: &'a TargetBundle,
    step: usize,
    iter_save: Vec<usize>,
    trace: Trace,
    err: Option<SolverError>,
}

impl<'a> TraceRecorder<'a>
{
    /// Creates an instance recording at `k = 0, step, 2 step, ...`.
    pub fn new(target: &'a TargetBundle, step: usize) -> Self
    {
        TraceRecorder {
            target,
            step: step.max(1),
            iter_save: Vec::new(),
            trace: Trace::default(),
            err: None,
        }
    }

    /// Gives back the recorded iterations and trace,
    /// or the first error of evaluating the objective.
    pub fn finish(self) -> Result<(Vec<usize>, Trace), SolverError>
    {
        match self.err {
            Some(e) => Err(e),
            None => Ok((self.iter_save, self.trace)),
        }
    }
}

impl<'a> Observer<La> for TraceRecorder<'a>
{
    fn on_iteration(&mut self, k: usize, state: &IterateState<f64>, obj: &dyn Objective<La>)
    {
        if k % self.step != 0 || self.err.is_some() {
            return;
        }

        let obj = match obj.objective(&state.x) {
            Ok(v) => v,
            Err(e) => {
                log::error!("{}: objective: {}", k, e);
                self.err = Some(e);
                return;
            },
        };
        let dist_x = La::half_sqdist(&state.x, &self.target.x);
        let dist_y = La::half_sqdist(&state.y, &self.target.y);

        self.iter_save.push(k);
        self.trace.push(Record {
            obj,
            dist: dist_x + dist_y,
            dist_x,
            dist_y,
        });
    }
}

//

/// Logs the iteration and the cumulative wall-clock time every `step` iterations.
pub struct LogProgress
{
    step: usize,
    start: Instant,
}

impl LogProgress
{
    pub fn new(step: usize) -> Self
    {
        LogProgress {
            step: step.max(1),
            start: Instant::now(),
        }
    }
}

impl Observer<La> for LogProgress
{
    fn on_iteration(&mut self, k: usize, _state: &IterateState<f64>, _obj: &dyn Objective<La>)
    {
        if k == 0 {
            self.start = Instant::now();
        }
        else if k % self.step == 0 {
            log::info!("iter = {}, time = {:.3} s", k, self.start.elapsed().as_secs_f64());
        }
    }
}

//

/// Keeps copies of the primal iterate at given iterations, to be written out after the run.
pub struct Snapshot
{
    iter_plot: Vec<usize>,
    snaps: Vec<(usize, Vec<f64>)>,
}

impl Snapshot
{
    pub fn new(iter_plot: Vec<usize>) -> Self
    {
        Snapshot {
            iter_plot,
            snaps: Vec::new(),
        }
    }

    /// Snapshots taken, in iteration order.
    pub fn into_snaps(self) -> Vec<(usize, Vec<f64>)>
    {
        self.snaps
    }
}

impl Observer<La> for Snapshot
{
    fn on_iteration(&mut self, k: usize, state: &IterateState<f64>, _obj: &dyn Objective<La>)
    {
        if self.iter_plot.contains(&k) {
            self.snaps.push((k, state.x.clone()));
        }
    }
}
