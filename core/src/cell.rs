use serde::{Deserialize, Serialize};

use crate::Mine;

/// Visibility state of a cell.
///
/// A marked cell can return to `Hidden`, but `Revealed` is terminal. Marked
/// and revealed can never hold at the same time by construction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Marked,
    Revealed,
}

/// One square of the minefield. The grid index is its identity; the cell
/// itself only carries its mine, its neighbor count and its visibility.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    mine: Option<Mine>,
    adjacent_mines: u8,
    state: CellState,
}

impl Cell {
    /// Fails if a mine already occupies the cell.
    pub(crate) fn try_place_mine(&mut self, special: bool) -> bool {
        if self.mine.is_some() {
            return false;
        }
        self.mine = Some(Mine::new(special));
        true
    }

    /// Placement-time only; the count is frozen afterwards.
    pub(crate) fn increment_adjacent(&mut self, amount: u8) {
        self.adjacent_mines += amount;
    }

    pub(crate) fn try_mark(&mut self) -> bool {
        if self.state != CellState::Hidden {
            return false;
        }
        self.state = CellState::Marked;
        true
    }

    pub(crate) fn try_unmark(&mut self) -> bool {
        if self.state != CellState::Marked {
            return false;
        }
        self.state = CellState::Hidden;
        true
    }

    /// Fails on marked or already-revealed cells. On success a present mine
    /// goes off, unless it was disarmed earlier.
    pub(crate) fn try_reveal(&mut self) -> bool {
        if self.state != CellState::Hidden {
            return false;
        }
        self.state = CellState::Revealed;
        if let Some(mine) = self.mine.as_mut() {
            mine.try_detonate();
        }
        true
    }

    pub(crate) fn mine_mut(&mut self) -> Option<&mut Mine> {
        self.mine.as_mut()
    }

    pub fn mine(&self) -> Option<&Mine> {
        self.mine.as_ref()
    }

    pub const fn has_mine(&self) -> bool {
        self.mine.is_some()
    }

    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub const fn state(&self) -> CellState {
        self.state
    }

    pub const fn is_marked(&self) -> bool {
        matches!(self.state, CellState::Marked)
    }

    pub const fn is_revealed(&self) -> bool {
        matches!(self.state, CellState::Revealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_can_only_be_placed_once() {
        let mut cell = Cell::default();

        assert!(cell.try_place_mine(true));
        assert!(!cell.try_place_mine(false));
        assert!(cell.mine().is_some_and(Mine::is_special));
    }

    #[test]
    fn marked_cell_cannot_be_revealed_or_remarked() {
        let mut cell = Cell::default();

        assert!(cell.try_mark());
        assert!(!cell.try_mark());
        assert!(!cell.try_reveal());
        assert!(cell.is_marked());
        assert!(!cell.is_revealed());
    }

    #[test]
    fn unmark_requires_a_mark() {
        let mut cell = Cell::default();

        assert!(!cell.try_unmark());
        assert!(cell.try_mark());
        assert!(cell.try_unmark());
        assert_eq!(cell.state(), CellState::Hidden);
    }

    #[test]
    fn reveal_is_terminal() {
        let mut cell = Cell::default();

        assert!(cell.try_reveal());
        assert!(!cell.try_reveal());
        assert!(!cell.try_mark());
        assert!(cell.is_revealed());
    }

    #[test]
    fn reveal_detonates_an_armed_mine() {
        let mut cell = Cell::default();
        cell.try_place_mine(false);

        assert!(cell.try_reveal());
        assert!(cell.mine().is_some_and(Mine::has_detonated));
    }

    #[test]
    fn reveal_leaves_a_disarmed_mine_alone() {
        let mut cell = Cell::default();
        cell.try_place_mine(false);
        assert!(cell.mine_mut().unwrap().try_disarm());

        assert!(cell.try_reveal());
        assert!(!cell.mine().unwrap().has_detonated());
        assert!(cell.mine().unwrap().has_been_disarmed());
    }
}
