use tracing::debug;

/// Integer lattice step taken by one ray per advance.
pub type DirVector = (isize, isize);

/// Waypoint offset relative to the ray's current cell.
pub type Offset = (isize, isize);

/// Ordered sub-sample points for one grid step along a direction.
///
/// Each waypoint pairs an offset from the current cell with the incremental
/// distance in meters covered by that sub-step. Iteration order is the order
/// the route was generated in; the loss accumulation is order-dependent.
#[derive(Debug, Clone)]
pub struct Route {
    waypoints: Vec<(Offset, f64)>,
}

impl Route {
    fn new(waypoints: Vec<(Offset, f64)>) -> Self {
        Self { waypoints }
    }

    pub fn waypoints(&self) -> &[(Offset, f64)] {
        &self.waypoints
    }

    /// Total distance covered by one grid step on this route.
    pub fn step_length(&self) -> f64 {
        self.waypoints.iter().map(|&(_, d)| d).sum()
    }

    fn map_offsets(&self, f: impl Fn(Offset) -> Offset) -> Route {
        Route::new(
            self.waypoints
                .iter()
                .map(|&(offset, dist)| (f(offset), dist))
                .collect(),
        )
    }
}

/// Immutable direction set with one route per direction, approximating a
/// radial star of rays at slopes {0, ±1, ±2, ±3, ±4, ±1/2, ±1/3, ±1/4}
/// across all four quadrants plus the pure horizontal/vertical directions.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<(DirVector, Route)>,
}

// Non-identity axis-sign combinations for the reflection pass.
const SIGN_PAIRS: [(isize, isize); 3] = [(-1, 1), (1, -1), (-1, -1)];

impl RouteTable {
    /// Build the table for a given cell size: five first-octant primitives,
    /// then a reflection pass, then a transpose pass. Each pass iterates a
    /// snapshot taken at its start, so vectors created by a pass are not
    /// re-expanded within it.
    pub fn build(cell_size: f64) -> Self {
        let mut table = Self {
            entries: primitives(cell_size),
        };

        // Reflection
        let snapshot = table.entries.clone();
        for ((row, col), route) in &snapshot {
            for (sign_r, sign_c) in SIGN_PAIRS {
                let mirrored = (row * sign_r, col * sign_c);
                if table.contains(mirrored) {
                    continue;
                }
                let mirrored_route = route.map_offsets(|(r, c)| (r * sign_r, c * sign_c));
                table.entries.push((mirrored, mirrored_route));
            }
        }

        // Transpose
        let snapshot = table.entries.clone();
        for ((row, col), route) in &snapshot {
            let transposed = (*col, *row);
            if table.contains(transposed) {
                continue;
            }
            let transposed_route = route.map_offsets(|(r, c)| (c, r));
            table.entries.push((transposed, transposed_route));
        }

        debug!(directions = table.entries.len(), cell_size, "route table built");
        table
    }

    pub fn contains(&self, vector: DirVector) -> bool {
        self.entries.iter().any(|&(v, _)| v == vector)
    }

    pub fn get(&self, vector: DirVector) -> Option<&Route> {
        self.entries
            .iter()
            .find(|&&(v, _)| v == vector)
            .map(|(_, route)| route)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(DirVector, Route)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First-octant primitives with slopes 0, 1, 1/2, 1/3, 1/4. Each route
/// subdivides the straight segment to the vector's endpoint, sampling the
/// lattice cells nearest the line.
fn primitives(cell_size: f64) -> Vec<(DirVector, Route)> {
    let half = cell_size / 2.0;
    let diag = cell_size / 2.0_f64.sqrt();
    let r5 = cell_size * 5.0_f64.sqrt() / 4.0;
    let r10 = cell_size * 10.0_f64.sqrt();
    let r17 = cell_size * 17.0_f64.sqrt();

    vec![
        ((0, 1), Route::new(vec![((0, 0), half), ((0, 1), half)])),
        ((1, 1), Route::new(vec![((0, 0), diag), ((1, 1), diag)])),
        (
            (1, 2),
            Route::new(vec![
                ((0, 0), r5),
                ((0, 1), r5),
                ((1, 1), r5),
                ((1, 2), r5),
            ]),
        ),
        (
            (1, 3),
            Route::new(vec![
                ((0, 0), r10 / 6.0),
                ((0, 1), r10 / 3.0),
                ((1, 2), r10 / 3.0),
                ((1, 3), r10 / 6.0),
            ]),
        ),
        (
            (1, 4),
            Route::new(vec![
                ((0, 0), r17 / 8.0),
                ((0, 1), r17 / 4.0),
                ((0, 2), r17 / 8.0),
                ((1, 2), r17 / 8.0),
                ((1, 3), r17 / 4.0),
                ((1, 4), r17 / 8.0),
            ]),
        ),
    ]
}
