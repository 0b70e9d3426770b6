use itertools::izip;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{FillCache, FillKey};
use crate::grid::Grid;
use crate::landcover::{NoDataPolicy, WeightModel};
use crate::physics::models::PathLossFn;
use crate::physics::routes::{DirVector, Route, RouteTable};

/// Loss value marking a cell no ray has assigned yet.
pub const UNASSIGNED: f64 = 9999.0;
/// Final value for cells unreached by any ray from any transmitter.
pub const UNREACHED: f64 = -1.0;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Linear meters per grid cell.
    pub cell_size_m: f64,
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size_m: 30.0,
            frequency_mhz: 900.0,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoverageError {
    #[error("no land cover layers registered")]
    NoLayers,
    #[error("grid shape {got:?} does not match registered shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfGrid {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Path-loss coverage engine.
///
/// Constructed once per scenario: the route table is built at construction
/// and never changes. Land-cover layers are registered with their laws before
/// the first query; `run` borrows the engine immutably and returns a fresh
/// grid, so queries never disturb engine configuration.
pub struct CoverageEngine {
    config: EngineConfig,
    routes: RouteTable,
    weights: WeightModel,
    models: Vec<PathLossFn>,
    policy: NoDataPolicy,
}

impl CoverageEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            routes: RouteTable::build(config.cell_size_m),
            weights: WeightModel::new(),
            models: Vec::new(),
            policy: NoDataPolicy::default(),
        }
    }

    pub fn with_policy(config: EngineConfig, policy: NoDataPolicy) -> Self {
        let mut engine = Self::new(config);
        engine.policy = policy;
        engine
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Register one land-cover layer and the law paired with it. Pairing is
    /// by registration order; every class present in the scenario must be
    /// registered before the first query.
    pub fn add_land_cover(&mut self, layer: Grid, model: PathLossFn) -> Result<(), CoverageError> {
        if let Some(expected) = self.weights.shape() {
            if layer.shape() != expected {
                return Err(CoverageError::ShapeMismatch {
                    expected,
                    got: layer.shape(),
                });
            }
        }
        self.weights.push(layer);
        self.models.push(model);
        Ok(())
    }

    /// Merged coverage for every transmitter marked non-zero in `mask`:
    /// elementwise minimum across the per-transmitter fills (lower loss
    /// wins), with still-unassigned cells remapped to [`UNREACHED`].
    ///
    /// Fills are independent and minimum is exact under reordering, so they
    /// are distributed across the rayon pool; the result is identical to a
    /// sequential pass.
    pub fn run(&self, mask: &Grid, threshold: Option<f64>) -> Result<Grid, CoverageError> {
        let (shape, sources) = self.sources(mask)?;
        info!(transmitters = sources.len(), "computing merged coverage");

        let mut result = sources
            .par_iter()
            .map(|&(row, col)| self.fill_inner(shape, row, col, threshold))
            .reduce(
                || Grid::filled(shape.0, shape.1, UNASSIGNED),
                |mut merged, fill| {
                    merged.min_merge(&fill);
                    merged
                },
            );

        result.replace(UNASSIGNED, UNREACHED);
        Ok(result)
    }

    /// Per-transmitter fills, unmerged, in row-major order of the mask's
    /// non-zero cells. Cells off every ray still hold [`UNASSIGNED`], so the
    /// grids remain mergeable by elementwise minimum.
    pub fn run_each(
        &self,
        mask: &Grid,
        threshold: Option<f64>,
    ) -> Result<Vec<Grid>, CoverageError> {
        let (shape, sources) = self.sources(mask)?;
        Ok(sources
            .par_iter()
            .map(|&(row, col)| self.fill_inner(shape, row, col, threshold))
            .collect())
    }

    /// [`run`](Self::run), consulting `cache` for previously computed
    /// single-source fills. Useful for planning sweeps that re-evaluate
    /// overlapping candidate transmitter sets.
    pub fn run_with_cache(
        &self,
        mask: &Grid,
        threshold: Option<f64>,
        cache: &FillCache,
    ) -> Result<Grid, CoverageError> {
        let (shape, sources) = self.sources(mask)?;
        info!(
            transmitters = sources.len(),
            "computing merged coverage through fill cache"
        );

        let fills: Vec<_> = sources
            .par_iter()
            .map(|&(row, col)| {
                let key = FillKey::new(row, col, threshold);
                cache.get_or_compute(key, || self.fill_inner(shape, row, col, threshold))
            })
            .collect();

        let mut result = Grid::filled(shape.0, shape.1, UNASSIGNED);
        for fill in &fills {
            result.min_merge(fill);
        }
        result.replace(UNASSIGNED, UNREACHED);
        Ok(result)
    }

    /// Single-source fill: the loss grid for one transmitter cell, sentinel
    /// everywhere except the cells its rays reach. The source itself is 0.
    pub fn fill(
        &self,
        row: usize,
        col: usize,
        threshold: Option<f64>,
    ) -> Result<Grid, CoverageError> {
        let shape = self.registered_shape()?;
        if row >= shape.0 || col >= shape.1 {
            return Err(CoverageError::OutOfGrid {
                row,
                col,
                rows: shape.0,
                cols: shape.1,
            });
        }
        Ok(self.fill_inner(shape, row, col, threshold))
    }

    fn registered_shape(&self) -> Result<(usize, usize), CoverageError> {
        self.weights.shape().ok_or(CoverageError::NoLayers)
    }

    /// Validate preconditions and list the mask's transmitter cells.
    fn sources(
        &self,
        mask: &Grid,
    ) -> Result<((usize, usize), Vec<(usize, usize)>), CoverageError> {
        let shape = self.registered_shape()?;
        if mask.shape() != shape {
            return Err(CoverageError::ShapeMismatch {
                expected: shape,
                got: mask.shape(),
            });
        }
        Ok((shape, mask.nonzero()))
    }

    fn fill_inner(
        &self,
        shape: (usize, usize),
        row: usize,
        col: usize,
        threshold: Option<f64>,
    ) -> Grid {
        debug!(row, col, "single-source fill");
        let mut result = Grid::filled(shape.0, shape.1, UNASSIGNED);
        result.set(row, col, 0.0);

        for (vector, route) in self.routes.iter() {
            self.walk_ray(&mut result, row, col, *vector, route, threshold);
        }
        result
    }

    /// Advance one ray from the source outward, one grid step per iteration,
    /// until it leaves the grid or the distance accumulated so far passes the
    /// threshold. Each step starts from the loss already assigned to the
    /// current cell, folds in every route waypoint in order, then overwrites
    /// the next cell on the ray.
    fn walk_ray(
        &self,
        result: &mut Grid,
        src_row: usize,
        src_col: usize,
        vector: DirVector,
        route: &Route,
        threshold: Option<f64>,
    ) {
        let (d_row, d_col) = vector;
        let mut row = src_row as isize;
        let mut col = src_col as isize;
        let mut travelled = 0.0_f64;

        loop {
            if threshold.is_some_and(|t| travelled > t) {
                return;
            }
            let next_row = row + d_row;
            let next_col = col + d_col;
            if !result.contains(next_row, next_col) {
                return;
            }

            // Waypoint offsets stay inside the box spanned by the current and
            // next cell, so samples need no further bounds checks.
            let mut loss = result.get(row as usize, col as usize);
            let mut dist = travelled;
            for &((w_row, w_col), step) in route.waypoints() {
                let weights = self
                    .weights
                    .weights_at((row + w_row) as usize, (col + w_col) as usize);
                loss = self.step_loss(loss, dist, dist + step, &weights);
                dist += step;
            }

            result.set(next_row as usize, next_col as usize, loss);
            row = next_row;
            col = next_col;
            travelled = dist;
        }
    }

    /// Advance the accumulated loss across one waypoint.
    ///
    /// At the first sample out from the source the loss anchors directly on
    /// the mixed law at the new distance; afterwards each sample scales the
    /// running loss by the mixture-weighted ratio of the law at the new vs.
    /// previous distance, letting the effective attenuation vary cell by
    /// cell along a ray without restarting from the source.
    fn step_loss(&self, prev_loss: f64, prev_dist: f64, next_dist: f64, weights: &[f64]) -> f64 {
        let no_coverage = weights.iter().sum::<f64>() == 0.0;
        match self.policy {
            NoDataPolicy::Transparent => {
                if no_coverage {
                    prev_loss
                } else if prev_dist == 0.0 || prev_loss == 0.0 {
                    self.mixed_loss(weights, next_dist)
                } else {
                    prev_loss * self.mixed_ratio(weights, prev_dist, next_dist)
                }
            }
            NoDataPolicy::Collapse => {
                if prev_dist == 0.0 {
                    self.mixed_loss(weights, next_dist)
                } else {
                    prev_loss * self.mixed_ratio(weights, prev_dist, next_dist)
                }
            }
        }
    }

    fn mixed_loss(&self, weights: &[f64], dist: f64) -> f64 {
        let freq = self.config.frequency_mhz;
        izip!(weights, &self.models)
            .map(|(w, model)| w * model(freq, dist))
            .sum()
    }

    fn mixed_ratio(&self, weights: &[f64], prev_dist: f64, next_dist: f64) -> f64 {
        let freq = self.config.frequency_mhz;
        izip!(weights, &self.models)
            .map(|(w, model)| w * model(freq, next_dist) / model(freq, prev_dist))
            .sum()
    }
}
