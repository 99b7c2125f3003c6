use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CellCount, Coord2, MarkOutcome, Minefield, RevealOutcome, Scenario, SolutionSink};

/// Lifecycle of a match. Transitions only move forward:
/// `NotStarted -> Running -> Ended`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    NotStarted,
    Running,
    Ended,
}

impl MatchPhase {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Cpu,
}

impl Winner {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Cpu => "CPU",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot emitted once per finished match for an external history log.
///
/// The time limit is the configured one, not the elapsed time, matching the
/// original behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub mine_count: CellCount,
    pub clicks: u32,
    pub time_limit: u32,
    pub winner: Winner,
}

/// One played match: a minefield plus a countdown.
///
/// The match starts the moment the minefield's first click latches and ends
/// the first time a mine detonates, every safe cell is revealed, or the
/// clock runs out. The outcome is decided on entry to `Ended`, before the
/// remaining mines are force-revealed (force-revealing detonates armed
/// mines, which must not turn a win into a loss).
#[derive(Debug)]
pub struct Match {
    minefield: Minefield,
    time_limit: u32,
    remaining: u32,
    phase: MatchPhase,
    outcome: Option<Winner>,
}

impl Match {
    pub fn new(minefield: Minefield, time_limit: u32) -> Self {
        Self {
            minefield,
            time_limit,
            remaining: time_limit,
            phase: MatchPhase::default(),
            outcome: None,
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::new(Minefield::from_scenario(scenario), scenario.time_limit())
    }

    pub fn set_solution_sink(&mut self, sink: SolutionSink) {
        self.minefield.set_solution_sink(sink);
    }

    /// Primary action. Rejected without effect once the match has ended.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if self.phase.is_ended() {
            return RevealOutcome::NoChange;
        }
        let outcome = self.minefield.reveal(coords);
        self.update_phase();
        outcome
    }

    /// Secondary action. Rejected without effect once the match has ended.
    pub fn mark(&mut self, coords: Coord2) -> MarkOutcome {
        if self.phase.is_ended() {
            return MarkOutcome::NoChange;
        }
        let outcome = self.minefield.mark(coords);
        self.update_phase();
        outcome
    }

    /// One countdown step. Only a running match loses time.
    pub fn tick(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        log::trace!("tick, {}s remaining", self.remaining);
        self.update_phase();
    }

    /// Gives up and shows the board. Ends a running match as a loss.
    pub fn resign(&mut self) {
        if !self.phase.is_running() {
            return;
        }
        self.remaining = 0;
        self.update_phase();
    }

    fn update_phase(&mut self) {
        if self.phase == MatchPhase::NotStarted && self.minefield.first_click_happened() {
            self.remaining = self.time_limit;
            self.phase = MatchPhase::Running;
            log::debug!("match started, {}s on the clock", self.remaining);
        }

        if self.phase == MatchPhase::Running {
            let detonated = self.minefield.mine_detonated();
            let cleared = self.minefield.all_safe_cells_revealed();
            if detonated || cleared || self.remaining == 0 {
                let winner = if !detonated && cleared {
                    Winner::Player
                } else {
                    Winner::Cpu
                };
                self.outcome = Some(winner);
                self.phase = MatchPhase::Ended;
                self.minefield.reveal_all_mines();
                log::debug!("match ended, winner: {winner}");
            }
        }
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub const fn started(&self) -> bool {
        !matches!(self.phase, MatchPhase::NotStarted)
    }

    pub const fn ended(&self) -> bool {
        self.phase.is_ended()
    }

    pub const fn time_limit(&self) -> u32 {
        self.time_limit
    }

    /// Meaningful only after the match started.
    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    /// Always false before the match ends.
    pub const fn player_won(&self) -> bool {
        matches!(self.outcome, Some(Winner::Player))
    }

    /// The history entry for this match, available once it ended.
    pub fn record(&self) -> Option<MatchRecord> {
        let winner = self.outcome?;
        Some(MatchRecord {
            mine_count: self.minefield.mine_count(),
            clicks: self.minefield.clicks(),
            time_limit: self.time_limit,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beginner_match(seed: u64) -> Match {
        Match::new(Minefield::with_seed(9, 9, 10, false, seed), 120)
    }

    fn safe_cells(game: &Match) -> Vec<Coord2> {
        game.minefield()
            .indexed_cells()
            .filter(|(_, cell)| !cell.has_mine())
            .map(|(coords, _)| coords)
            .collect()
    }

    fn mine_cells(game: &Match) -> Vec<Coord2> {
        game.minefield()
            .indexed_cells()
            .filter(|(_, cell)| cell.has_mine())
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn match_starts_on_the_first_primary_action() {
        let mut game = beginner_match(1);
        assert_eq!(game.phase(), MatchPhase::NotStarted);
        assert!(!game.started());

        game.mark((0, 0));
        assert!(!game.started(), "marking does not start the match");

        game.reveal((4, 4));
        assert_eq!(game.phase(), MatchPhase::Running);
        assert_eq!(game.remaining_seconds(), 120);
    }

    #[test]
    fn ticks_only_count_while_running() {
        let mut game = beginner_match(1);
        game.tick();
        assert_eq!(game.remaining_seconds(), 120);

        game.reveal((4, 4));
        game.tick();
        game.tick();
        assert_eq!(game.remaining_seconds(), 118);
    }

    #[test]
    fn running_out_of_time_loses() {
        let mut game = Match::new(Minefield::with_seed(9, 9, 10, false, 1), 3);
        game.reveal((4, 4));
        assert!(!game.player_won());

        for _ in 0..3 {
            assert!(!game.ended());
            game.tick();
        }

        assert!(game.ended());
        assert!(!game.player_won());
        let record = game.record().unwrap();
        assert_eq!(record.winner, Winner::Cpu);
        assert_eq!(record.time_limit, 3);

        // the clock is stopped
        game.tick();
        assert_eq!(game.remaining_seconds(), 0);
    }

    #[test]
    fn detonating_a_mine_ends_and_loses_the_match() {
        let mut game = beginner_match(13);
        game.reveal((4, 4));

        let mine = mine_cells(&game)
            .into_iter()
            .find(|&coords| !game.minefield().cell(coords).unwrap().is_revealed())
            .unwrap();
        assert_eq!(game.reveal(mine), RevealOutcome::Detonated);

        assert!(game.ended());
        assert!(!game.player_won());
        // all mines are shown after the loss
        for coords in mine_cells(&game) {
            assert!(game.minefield().cell(coords).unwrap().is_revealed());
        }
        // further actions are rejected
        assert_eq!(game.reveal((0, 0)), RevealOutcome::NoChange);
        assert_eq!(game.mark((0, 0)), MarkOutcome::NoChange);
    }

    #[test]
    fn revealing_every_safe_cell_wins_regardless_of_the_clock() {
        let mut game = beginner_match(21);
        game.reveal((4, 4));
        game.tick();

        assert!(!game.player_won(), "no win before the match ends");

        for coords in safe_cells(&game) {
            game.reveal(coords);
        }

        assert!(game.ended());
        assert!(game.player_won());
        assert!(game.remaining_seconds() > 0, "ended by completion, not timeout");

        let record = game.record().unwrap();
        assert_eq!(record.winner, Winner::Player);
        assert_eq!(record.winner.label(), "Player");
        assert_eq!(record.mine_count, 10);
        assert_eq!(record.time_limit, 120);
        assert!(record.clicks > 0);
    }

    #[test]
    fn win_survives_the_final_mine_reveal() {
        // force-revealing mines on match end detonates them; the outcome
        // must have been latched before that
        let mut game = beginner_match(8);
        game.reveal((4, 4));
        for coords in safe_cells(&game) {
            game.reveal(coords);
        }

        assert!(game.minefield().mine_detonated());
        assert!(game.player_won());
        assert_eq!(game.record().unwrap().winner, Winner::Player);
    }

    #[test]
    fn marking_the_special_mine_early_keeps_the_match_alive() {
        let mut game = Match::new(Minefield::with_seed(16, 16, 40, true, 9), 240);
        game.reveal((8, 8));

        let special = game
            .minefield()
            .indexed_cells()
            .find(|(_, cell)| cell.mine().is_some_and(|mine| mine.is_special()))
            .map(|(coords, _)| coords)
            .unwrap();
        assert_eq!(game.mark(special), MarkOutcome::Swept);

        assert!(!game.ended());
        assert!(!game.minefield().mine_detonated());

        // a disarmed mine in the swept row reveals as disarmed, not detonated
        let disarmed = game
            .minefield()
            .indexed_cells()
            .find(|(coords, cell)| {
                (coords.0 == special.0 || coords.1 == special.1)
                    && cell.mine().is_some_and(|mine| mine.has_been_disarmed())
            })
            .map(|(coords, _)| coords)
            .unwrap();
        assert!(game.minefield().cell(disarmed).unwrap().is_revealed());
        assert!(!game.ended());
    }

    #[test]
    fn resign_forfeits_a_running_match() {
        let mut game = beginner_match(5);
        game.resign();
        assert!(!game.ended(), "nothing to resign before the start");

        game.reveal((4, 4));
        game.resign();
        assert!(game.ended());
        assert!(!game.player_won());
    }

    #[test]
    fn record_is_unavailable_until_the_end() {
        let mut game = beginner_match(3);
        assert!(game.record().is_none());
        game.reveal((4, 4));
        assert!(game.record().is_none());
    }

    #[test]
    fn fresh_match_exposes_an_untouched_field() {
        let game = beginner_match(0);
        let field = game.minefield();
        assert_eq!(field.rows(), 9);
        assert_eq!(field.marked_count(), 0);
        assert!(field.indexed_cells().all(|(_, cell)| !cell.is_revealed()));
    }
}
