use ndarray::Array2;
use rand::prelude::*;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::Write as _;
use std::ops::BitOr;

use crate::{
    Cell, CellCount, Coord, Coord2, Mine, NeighborIterExt, Scenario, SolutionSink, ToNdIndex,
    cell_count, in_safe_zone,
};

/// Outcome of a secondary action (mark toggle).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Marked,
    Unmarked,
    /// An active special mine was marked and the row/column disarm sweep ran.
    Swept,
}

impl MarkOutcome {
    /// Whether this outcome could have caused an update to the game.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Outcome of a primary action (reveal).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    /// An armed mine went off.
    Detonated,
    /// Every safe cell is now revealed.
    Cleared,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Used to merge outcomes when a cascade touches several cells.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            // a detonation dominates everything
            (Detonated, _) => Detonated,
            (_, Detonated) => Detonated,
            // then clearing the board
            (Cleared, _) => Cleared,
            (_, Cleared) => Cleared,
            // then an ordinary reveal
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// What seeded a cascade. Secondary-triggered cascades may have their
/// empty-cell expansion suppressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trigger {
    Primary,
    Secondary,
}

/// The grid of cells and mines plus placement and click resolution.
///
/// Mine placement is deferred until the first successful primary action so
/// that the clicked cell and its whole 3x3 neighborhood stay mine-free. The
/// derived predicates [`mine_detonated`](Self::mine_detonated) and
/// [`all_safe_cells_revealed`](Self::all_safe_cells_revealed) are recomputed
/// after every mutating entry point and are never stale.
#[derive(Debug)]
pub struct Minefield {
    rows: Coord,
    cols: Coord,
    mine_count: CellCount,
    has_special_mine: bool,
    // how long (in successful primary actions) the special mine keeps its
    // disarm ability
    special_mine_lifetime: u32,
    // whether empty cells revealed by the disarm sweep also expand
    sweep_expands_empty: bool,
    cells: Array2<Cell>,
    rng: SmallRng,
    solution: Option<SolutionSink>,
    clicks: u32,
    marked_count: CellCount,
    first_click_happened: bool,
    mine_detonated: bool,
    all_safe_cells_revealed: bool,
}

// cells reserved for the first click and its neighbors
const SAFE_ZONE_CELLS: CellCount = 9;

impl Minefield {
    pub const SPECIAL_MINE_LIFETIME: u32 = 4;

    pub fn new(rows: Coord, cols: Coord, mine_count: CellCount, has_special_mine: bool) -> Self {
        Self::with_seed(rows, cols, mine_count, has_special_mine, rand::random())
    }

    /// Deterministic constructor: the same seed always yields the same mine
    /// layout for a given first click.
    pub fn with_seed(
        rows: Coord,
        cols: Coord,
        mine_count: CellCount,
        has_special_mine: bool,
        seed: u64,
    ) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let capacity = cell_count(rows, cols).saturating_sub(SAFE_ZONE_CELLS);
        let mine_count = if mine_count > capacity {
            log::warn!("{mine_count} mines do not fit beside a safe first click, clamping to {capacity}");
            capacity
        } else {
            mine_count
        };

        Self {
            rows,
            cols,
            mine_count,
            has_special_mine,
            special_mine_lifetime: Self::SPECIAL_MINE_LIFETIME,
            sweep_expands_empty: false,
            cells: Array2::default([rows as usize, cols as usize]),
            rng: SmallRng::seed_from_u64(seed),
            solution: None,
            clicks: 0,
            marked_count: 0,
            first_click_happened: false,
            mine_detonated: false,
            all_safe_cells_revealed: false,
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        let size = scenario.grid_size();
        Self::new(size, size, scenario.mine_count(), scenario.has_special_mine())
    }

    /// Lets empty cells revealed by the disarm sweep expand like a primary
    /// cascade. Off by default.
    pub fn with_sweep_expansion(mut self, enabled: bool) -> Self {
        self.sweep_expands_empty = enabled;
        self
    }

    /// Attaches the append target that will receive the mine layout after
    /// placement.
    pub fn set_solution_sink(&mut self, sink: SolutionSink) {
        self.solution = Some(sink);
    }

    /// Primary action. On the very first one, places the mines around
    /// `coords` and persists the layout. Marked and revealed cells are left
    /// alone; anything else starts a cascade.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        let Some(coords) = self.validate(coords) else {
            return NoChange;
        };

        if !self.first_click_happened {
            self.place_mines(coords);
            self.write_solution();
            self.first_click_happened = true;
        }

        {
            let cell = &self.cells[coords.to_nd_index()];
            if cell.is_revealed() || cell.is_marked() {
                return NoChange;
            }
        }

        self.clicks += 1;
        let mut outcome = self.cascade([coords], Trigger::Primary);
        self.refresh_derived();
        if self.all_safe_cells_revealed {
            outcome = outcome | Cleared;
        }
        outcome
    }

    /// Secondary action. Unmarking always succeeds; marking respects the
    /// budget of `mine_count` concurrent marks and may trigger the special
    /// mine's disarm sweep while its window is open.
    pub fn mark(&mut self, coords: Coord2) -> MarkOutcome {
        use MarkOutcome::*;

        let Some(coords) = self.validate(coords) else {
            return NoChange;
        };

        let budget_left = self.marked_count < self.mine_count;
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.is_revealed() {
            return NoChange;
        }

        if cell.try_unmark() {
            self.marked_count -= 1;
            self.refresh_derived();
            return Unmarked;
        }

        if !budget_left {
            return NoChange;
        }

        // hidden and within budget, cannot fail
        cell.try_mark();
        let marked_special = cell.mine().is_some_and(Mine::is_special);
        self.marked_count += 1;

        if marked_special && self.clicks < self.special_mine_lifetime {
            self.disarm_sweep(coords);
            self.refresh_derived();
            return Swept;
        }

        self.refresh_derived();
        Marked
    }

    /// Force-reveals every mine-bearing cell, marked or not. Does nothing
    /// before the first click, and never touches safe cells.
    pub fn reveal_all_mines(&mut self) {
        if !self.first_click_happened {
            return;
        }

        for cell in self.cells.iter_mut() {
            if !cell.has_mine() {
                continue;
            }
            if cell.try_unmark() {
                self.marked_count -= 1;
            }
            cell.try_reveal();
        }
        self.refresh_derived();
    }

    fn validate(&self, coords: Coord2) -> Option<Coord2> {
        if coords.0 < self.rows && coords.1 < self.cols {
            Some(coords)
        } else {
            log::warn!("ignoring action outside the grid: {coords:?}");
            None
        }
    }

    /// Draws uniformly random positions, rejecting the 3x3 zone around the
    /// first click, until `mine_count` distinct cells hold a mine. The
    /// special mine, when enabled, is always the first one placed.
    fn place_mines(&mut self, safe: Coord2) {
        let mut placed: CellCount = 0;
        while placed < self.mine_count {
            let coords: Coord2 = (
                self.rng.random_range(0..self.rows),
                self.rng.random_range(0..self.cols),
            );
            if in_safe_zone(coords, safe) {
                continue;
            }

            let special = self.has_special_mine && placed == 0;
            if !self.cells[coords.to_nd_index()].try_place_mine(special) {
                continue;
            }
            placed += 1;

            // only the neighbors count the new mine, never its own cell
            for neighbor in self.cells.iter_neighbors(coords) {
                self.cells[neighbor.to_nd_index()].increment_adjacent(1);
            }
        }

        log::debug!("placed {placed} mines, safe zone around {safe:?}");
        self.refresh_derived();
    }

    fn write_solution(&mut self) {
        let Some(sink) = self.solution.as_mut() else {
            return;
        };

        let mut lines = String::new();
        for ((row, col), cell) in self.cells.indexed_iter() {
            let Some(mine) = cell.mine() else { continue };
            let _ = writeln!(lines, "{row} {col} {}", u8::from(mine.is_special()));
        }

        if let Err(err) = sink
            .write_all(lines.as_bytes())
            .and_then(|()| sink.flush())
        {
            log::warn!("could not write the mine positions: {err}");
        }
    }

    /// Disarms every mine in the center's row and column, then cascades all
    /// of those cells as a secondary-triggered reveal.
    fn disarm_sweep(&mut self, center: Coord2) {
        log::debug!("disarm sweep from {center:?}");
        let mut seeds = Vec::with_capacity(self.rows as usize + self.cols as usize);

        for col in 0..self.cols {
            let coords = (center.0, col);
            if let Some(mine) = self.cells[coords.to_nd_index()].mine_mut() {
                mine.try_disarm();
            }
            seeds.push(coords);
        }
        for row in 0..self.rows {
            let coords = (row, center.1);
            if let Some(mine) = self.cells[coords.to_nd_index()].mine_mut() {
                mine.try_disarm();
            }
            seeds.push(coords);
        }

        self.cascade(seeds, Trigger::Secondary);
    }

    /// Worklist shared by both action types: pop a cell, unmark it, reveal
    /// it, and expand through zero-adjacency cells. Latching reveals make a
    /// visited set unnecessary. The queue drains before returning, so one
    /// action is atomic for any observer.
    fn cascade(
        &mut self,
        seeds: impl IntoIterator<Item = Coord2>,
        trigger: Trigger,
    ) -> RevealOutcome {
        use RevealOutcome::*;

        let mut queue: VecDeque<Coord2> = seeds.into_iter().collect();
        let mut outcome = NoChange;

        while let Some(coords) = queue.pop_front() {
            let cell = &mut self.cells[coords.to_nd_index()];
            if cell.try_unmark() {
                self.marked_count -= 1;
            }
            if !cell.try_reveal() {
                continue;
            }

            let adjacent = cell.adjacent_mines();
            let detonated = cell.mine().is_some_and(Mine::has_detonated);
            outcome = outcome | if detonated { Detonated } else { Revealed };
            log::trace!("revealed {coords:?}, adjacent mines: {adjacent}");

            if adjacent == 0 {
                if trigger == Trigger::Secondary && !self.sweep_expands_empty {
                    continue;
                }
                queue.extend(self.cells.iter_neighbors(coords));
            }
        }

        outcome
    }

    fn refresh_derived(&mut self) {
        self.mine_detonated = self
            .cells
            .iter()
            .any(|cell| cell.mine().is_some_and(Mine::has_detonated));
        self.all_safe_cells_revealed = self.first_click_happened
            && self
                .cells
                .iter()
                .filter(|cell| !cell.has_mine())
                .all(Cell::is_revealed);
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub const fn has_special_mine(&self) -> bool {
        self.has_special_mine
    }

    pub const fn special_mine_lifetime(&self) -> u32 {
        self.special_mine_lifetime
    }

    /// Successful primary actions so far.
    pub const fn clicks(&self) -> u32 {
        self.clicks
    }

    pub const fn marked_count(&self) -> CellCount {
        self.marked_count
    }

    pub const fn first_click_happened(&self) -> bool {
        self.first_click_happened
    }

    pub const fn mine_detonated(&self) -> bool {
        self.mine_detonated
    }

    pub const fn all_safe_cells_revealed(&self) -> bool {
        self.all_safe_cells_revealed
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        (coords.0 < self.rows && coords.1 < self.cols)
            .then(|| &self.cells[coords.to_nd_index()])
    }

    pub fn indexed_cells(&self) -> impl Iterator<Item = (Coord2, &Cell)> {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| ((row as Coord, col as Coord), cell))
    }
}
