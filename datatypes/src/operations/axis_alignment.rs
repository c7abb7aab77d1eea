use crate::spatial_reference::AxisDirection;

/// How grid axes line up with the axes of a world coordinate system: a
/// permutation (grid axis -> world axis) plus a per-grid-axis flip flag.
///
/// A flipped grid axis runs against its world axis direction: its scale is
/// negative and its first cell anchors at the world axis maximum.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AxisMapping {
    permutation: Vec<usize>,
    flipped: Vec<bool>,
}

impl AxisMapping {
    pub fn dimension(&self) -> usize {
        self.permutation.len()
    }

    /// The world axis the given grid axis maps to.
    pub fn world_axis(&self, grid_axis: usize) -> usize {
        self.permutation[grid_axis]
    }

    pub fn is_flipped(&self, grid_axis: usize) -> bool {
        self.flipped[grid_axis]
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    pub fn flipped(&self) -> &[bool] {
        &self.flipped
    }
}

/// Derives the grid-to-world axis mapping from the world axis directions.
///
/// Grid axis 0 is the column axis and grid axis 1 the row axis, with rows
/// growing downward. Two rules cover the conventional cases:
///
/// - a north/south-first axis order (e.g. latitude, longitude) swaps the
///   first two axes, so grid columns still follow the east/west axis;
/// - a grid axis mapped to a `North`, `West` or `Down` world axis is
///   flipped, since grid indices grow east and down.
///
/// Axes beyond the first two map one-to-one.
pub fn infer_axis_mapping(directions: &[AxisDirection]) -> AxisMapping {
    let dimension = directions.len();
    let mut permutation: Vec<usize> = (0..dimension).collect();

    if dimension >= 2 && directions[0].is_north_south() && directions[1].is_east_west() {
        permutation.swap(0, 1);
        tracing::debug!(
            "Swapping grid x/y axes for a ({}, {}) world axis order",
            directions[0],
            directions[1]
        );
    }

    let flipped = permutation
        .iter()
        .map(|&world_axis| {
            matches!(
                directions[world_axis],
                AxisDirection::North | AxisDirection::West | AxisDirection::Down
            )
        })
        .collect();

    AxisMapping {
        permutation,
        flipped,
    }
}
