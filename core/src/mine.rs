use serde::{Deserialize, Serialize};

/// Arming state of a mine.
///
/// `Detonated` and `Disarmed` are terminal and mutually exclusive: whichever
/// latch fires first wins, the other transition is refused forever after.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineState {
    #[default]
    Armed,
    Detonated,
    Disarmed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mine {
    special: bool,
    state: MineState,
}

impl Mine {
    pub(crate) fn new(special: bool) -> Self {
        Self {
            special,
            state: MineState::Armed,
        }
    }

    /// Fails only if the mine was disarmed first.
    pub(crate) fn try_detonate(&mut self) -> bool {
        match self.state {
            MineState::Disarmed => false,
            _ => {
                self.state = MineState::Detonated;
                true
            }
        }
    }

    /// Fails only if the mine already went off.
    pub(crate) fn try_disarm(&mut self) -> bool {
        match self.state {
            MineState::Detonated => false,
            _ => {
                self.state = MineState::Disarmed;
                true
            }
        }
    }

    pub const fn is_special(&self) -> bool {
        self.special
    }

    pub const fn state(&self) -> MineState {
        self.state
    }

    pub const fn has_detonated(&self) -> bool {
        matches!(self.state, MineState::Detonated)
    }

    pub const fn has_been_disarmed(&self) -> bool {
        matches!(self.state, MineState::Disarmed)
    }
}
