use crate::grid::Grid;
use crate::physics::models::{ModelError, ModelRegistry, PathLossFn};

/// How a sampled cell belonging to no registered land-cover class
/// contributes to a ray walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoDataPolicy {
    /// The sample is a no-op: the accumulated loss passes through unchanged,
    /// and a ray still at its source value anchors at its first covered
    /// sample instead of at distance zero.
    #[default]
    Transparent,
    /// The raw all-zero weight vector goes straight into the mixing sum,
    /// collapsing the accumulated loss to zero from this sample onward.
    Collapse,
}

/// Per-class coverage layers and the local land-cover mixture.
///
/// Layers are registered in model order; all layers share one shape.
#[derive(Debug, Default)]
pub struct WeightModel {
    layers: Vec<Grid>,
}

impl WeightModel {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(&mut self, layer: Grid) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn shape(&self) -> Option<(usize, usize)> {
        self.layers.first().map(Grid::shape)
    }

    /// Normalized per-class weights at a cell. When the raw coverage sums to
    /// zero the raw all-zero vector is returned unchanged; the caller decides
    /// what a no-coverage sample means (see [`NoDataPolicy`]).
    pub fn weights_at(&self, row: usize, col: usize) -> Vec<f64> {
        let mut weights: Vec<f64> = self.layers.iter().map(|layer| layer.get(row, col)).collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            for w in &mut weights {
                *w /= total;
            }
        }
        weights
    }
}

/// Split a class-code raster into one binary coverage layer per code present,
/// each paired with its law from the registry. Layers come back in ascending
/// code order. A code the registry does not know is an error.
pub fn split_classes(
    class_grid: &Grid,
    registry: &ModelRegistry,
) -> Result<Vec<(Grid, PathLossFn)>, ModelError> {
    let mut codes: Vec<u8> = Vec::new();
    for &value in &class_grid.data {
        if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
            return Err(ModelError::MalformedClass(value));
        }
        let code = value as u8;
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes.sort_unstable();

    let mut layers = Vec::with_capacity(codes.len());
    for code in codes {
        let model = registry.resolve(code)?;
        let mut layer = Grid::zeros(class_grid.rows, class_grid.cols);
        for (out, &value) in layer.data.iter_mut().zip(&class_grid.data) {
            if value as u8 == code {
                *out = 1.0;
            }
        }
        layers.push((layer, model));
    }
    Ok(layers)
}
