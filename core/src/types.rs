use ndarray::Array2;

/// Single coordinate axis used for grid rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and whole-grid cell counts.
pub type CellCount = u16;

/// Grid position as `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn cell_count(rows: Coord, cols: Coord) -> CellCount {
    let rows = rows as CellCount;
    let cols = cols as CellCount;
    rows.saturating_mul(cols)
}

/// True when `a` lies in the 3x3 block centered on `b`.
pub const fn in_safe_zone(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let dim = self.dim();
        // coordinates cannot address anything past Coord::MAX anyway
        let clip = |axis: usize| axis.try_into().unwrap_or(Coord::MAX);
        NeighborIter::new(index, (clip(dim.0), clip(dim.1)))
    }
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterates the in-bounds 8-neighborhood of a position, center excluded.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
