use thiserror::Error;

/// Empirical distance-loss law: (frequency in MHz, distance in meters) -> loss.
pub type PathLossFn = fn(f64, f64) -> f64;

// Egli antenna heights baked into the openland law
const EGLI_BASE_HEIGHT_M: f64 = 1.0;
const EGLI_MOBILE_HEIGHT_M: f64 = 10.0;

/// Egli model for open land or urban terrain.
/// L = 20 log f + 40 log d_km - 20 log hb + 76.3 - 10 log hm
pub fn egli(freq_mhz: f64, dist_m: f64) -> f64 {
    20.0 * freq_mhz.log10() + 40.0 * (dist_m / 1000.0).log10()
        - 20.0 * EGLI_BASE_HEIGHT_M.log10()
        + 76.3
        - 10.0 * EGLI_MOBILE_HEIGHT_M.log10()
}

/// COST235 vegetation loss, trees in leaf.
pub fn cost235_in_leaf(freq_mhz: f64, dist_m: f64) -> f64 {
    15.6 * freq_mhz.powf(-0.009) * dist_m.powf(0.26)
}

/// COST235 vegetation loss, trees out of leaf.
pub fn cost235_out_of_leaf(freq_mhz: f64, dist_m: f64) -> f64 {
    26.6 * freq_mhz.powf(-0.2) * dist_m.powf(0.5)
}

/// Free-space path loss.
/// L = 20 log d_km + 20 log f + 32.44
pub fn free_space(freq_mhz: f64, dist_m: f64) -> f64 {
    20.0 * (dist_m / 1000.0).log10() + 20.0 * freq_mhz.log10() + 32.44
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ModelError {
    #[error("unrecognized land cover classification {0}")]
    UnknownClass(u8),
    #[error("land cover code {0} is not an integer class")]
    MalformedClass(f64),
}

/// Lookup table from land-cover class code to its propagation law.
///
/// Codes index directly into the table, so resolving a model is a plain
/// array access rather than a branch per class.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    mappings: Vec<Option<PathLossFn>>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self {
            mappings: vec![None; 256],
        }
    }

    /// Registry for the stock land-cover coding:
    /// 0 = open land, 1 = woodland in leaf, 2 = woodland out of leaf.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(0, egli);
        registry.register(1, cost235_in_leaf);
        registry.register(2, cost235_out_of_leaf);
        registry
    }

    pub fn register(&mut self, code: u8, model: PathLossFn) {
        self.mappings[code as usize] = Some(model);
    }

    pub fn resolve(&self, code: u8) -> Result<PathLossFn, ModelError> {
        self.mappings[code as usize].ok_or(ModelError::UnknownClass(code))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
