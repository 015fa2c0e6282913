use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of letters in every guess.
pub const WORD_LENGTH: usize = 5;

/// Number of guess rows kept on the board, newest first.
pub const GUESS_HISTORY_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterColor {
    Correct, // right letter, right position
    Present, // right letter, wrong position
    #[serde(alias = "absent")]
    Miss,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterTile {
    pub letter: char,
    pub color: LetterColor,
}

/// One evaluated guess as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRow {
    pub tiles: Vec<LetterTile>,
    pub solved: bool,
}

impl GuessRow {
    /// Pairs each letter with the colour at the same index. Missing colours
    /// render as `Unknown` rather than dropping the row.
    pub fn from_feedback(guess: &str, colors: &[LetterColor], solved: bool) -> Self {
        let tiles = guess
            .chars()
            .enumerate()
            .map(|(i, letter)| LetterTile {
                letter,
                color: colors.get(i).copied().unwrap_or(LetterColor::Unknown),
            })
            .collect();

        Self { tiles, solved }
    }

    pub fn word(&self) -> String {
        self.tiles.iter().map(|t| t.letter).collect()
    }
}

/// Raw score pair keyed by server slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScorePair {
    #[serde(default)]
    pub p1: i32,
    #[serde(default)]
    pub p2: i32,
}
