use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::{CellCount, Coord, InvalidDescription, InvalidValue, StoreError};

/// Number of lines in the textual scenario description.
pub const DESCRIPTION_LINES: usize = 4;

/// Difficulty tier of a scenario. The numeric id is what appears in the
/// description format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Self::Beginner, Self::Expert];

    pub const fn id(self) -> u32 {
        match self {
            Self::Beginner => 1,
            Self::Expert => 2,
        }
    }

    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Beginner),
            2 => Some(Self::Expert),
            _ => None,
        }
    }

    /// Side length of the (square) grid played at this tier.
    pub const fn grid_size(self) -> Coord {
        match self {
            Self::Beginner => 9,
            Self::Expert => 16,
        }
    }

    pub fn mine_count_bounds(self) -> RangeInclusive<CellCount> {
        match self {
            Self::Beginner => 9..=11,
            Self::Expert => 35..=45,
        }
    }

    pub fn time_limit_bounds(self) -> RangeInclusive<u32> {
        match self {
            Self::Beginner => 120..=180,
            Self::Expert => 240..=360,
        }
    }

    pub const fn allows_special_mine(self) -> bool {
        match self {
            Self::Beginner => false,
            Self::Expert => true,
        }
    }
}

/// Validated match configuration.
///
/// Immutable once constructed: [`Scenario::new`] checks every field against
/// the difficulty's bounds before the value exists, so a scenario can never
/// be half-valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    difficulty: Difficulty,
    time_limit: u32,
    mine_count: CellCount,
    has_special_mine: bool,
}

impl Scenario {
    pub fn new(
        difficulty: Difficulty,
        time_limit: u32,
        mine_count: CellCount,
        has_special_mine: bool,
    ) -> Result<Self, InvalidValue> {
        if !difficulty.time_limit_bounds().contains(&time_limit) {
            return Err(InvalidValue::TimeLimit);
        }
        if !difficulty.mine_count_bounds().contains(&mine_count) {
            return Err(InvalidValue::MineCount);
        }
        if has_special_mine && !difficulty.allows_special_mine() {
            return Err(InvalidValue::SpecialMine);
        }
        Ok(Self {
            difficulty,
            time_limit,
            mine_count,
            has_special_mine,
        })
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub const fn grid_size(&self) -> Coord {
        self.difficulty.grid_size()
    }

    pub const fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub const fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub const fn has_special_mine(&self) -> bool {
        self.has_special_mine
    }

    /// Renders the fixed four-line description: difficulty id, mine count,
    /// time limit, special-mine flag as `0`/`1`.
    pub fn to_description(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.difficulty.id());
        let _ = writeln!(out, "{}", self.mine_count);
        let _ = writeln!(out, "{}", self.time_limit);
        let _ = writeln!(out, "{}", u8::from(self.has_special_mine));
        out
    }

    /// Parses a four-line description. Commits nothing on failure: a wrong
    /// line count, a non-integer token, or an out-of-range value all reject
    /// the whole description.
    pub fn from_description(text: &str) -> Result<Self, InvalidDescription> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != DESCRIPTION_LINES {
            return Err(InvalidDescription::LineCount {
                expected: DESCRIPTION_LINES,
                found: lines.len(),
            });
        }

        let mut values = [0i64; DESCRIPTION_LINES];
        for (index, line) in lines.iter().enumerate() {
            values[index] = line
                .trim()
                .parse()
                .map_err(|_| InvalidDescription::Integer(index + 1))?;
        }

        let difficulty = u32::try_from(values[0])
            .ok()
            .and_then(Difficulty::from_id)
            .ok_or(InvalidValue::Difficulty)?;
        let mine_count =
            CellCount::try_from(values[1]).map_err(|_| InvalidValue::MineCount)?;
        let time_limit = u32::try_from(values[2]).map_err(|_| InvalidValue::TimeLimit)?;
        let has_special_mine = values[3] == 1;

        Ok(Self::new(difficulty, time_limit, mine_count, has_special_mine)?)
    }

    /// Writes the description to a new file under `dir`. Refuses to replace
    /// an existing file.
    pub fn save(&self, dir: &Path, filename: &str) -> Result<PathBuf, StoreError> {
        let path = dir.join(filename);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists);
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(self.to_description().as_bytes())?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_description(&text)?)
    }
}
