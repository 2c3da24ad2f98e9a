//! The mystery word guessing game.
//!
//! A guess must be exactly as long as the mystery word and consist only of
//! letters. Every such guess costs a turn; anything else is rejected for
//! free. A wrong guess is answered with the word's letters at the positions
//! the guess got right and a placeholder everywhere else.

use crate::protocol::Response;

/// The word to be guessed
pub const MYSTERY_WORD: &str = "TOPPLE";

/// Shown in feedback for positions that did not match
pub const PLACEHOLDER: char = '*';

const INVALID_GUESS: &str =
    "Oops! You need enter a six letter word containing only alphabetical characters and no spaces.";
const TRY_AGAIN: &str = "Try again:";

/// Outcome of one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessResult {
    /// Wrong length or not all letters; no turn used
    Invalid,
    /// Valid guess that did not match, with its feedback
    Miss(String),
    /// Word found after this many turns
    Won { turns: u32 },
}

impl GuessResult {
    /// Add the reply for this result to `response`
    pub fn render(&self, response: &mut Response) {
        match self {
            GuessResult::Invalid => {
                response.lines(&[INVALID_GUESS, TRY_AGAIN]);
            }
            GuessResult::Miss(feedback) => {
                response.lines(&[feedback.as_str(), TRY_AGAIN]);
            }
            GuessResult::Won { turns } => {
                response.line(&format!(
                    "You got it in {} turns - well done and goodbye!",
                    turns
                ));
            }
        }
    }
}

/// State of one game.
#[derive(Debug)]
pub struct Game {
    word: Vec<char>,
    turns: u32,
}

impl Game {
    /// Start a game for `word`, which should be uppercase
    pub fn new(word: &str) -> Self {
        Game {
            word: word.chars().collect(),
            turns: 0,
        }
    }

    /// Valid guesses made so far
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Score one trimmed, non-empty guess
    pub fn guess(&mut self, input: &str) -> GuessResult {
        if !self.is_valid(input) {
            return GuessResult::Invalid;
        }

        self.turns += 1;

        let matches: Vec<bool> = self
            .word
            .iter()
            .zip(input.chars())
            // A letter whose uppercase form is several chars (ß -> SS) never matches
            .map(|(&target, guessed)| guessed.to_uppercase().eq(Some(target)))
            .collect();

        if matches.iter().all(|&hit| hit) {
            return GuessResult::Won { turns: self.turns };
        }

        let feedback = self
            .word
            .iter()
            .zip(matches)
            .map(|(&target, hit)| if hit { target } else { PLACEHOLDER })
            .collect();

        GuessResult::Miss(feedback)
    }

    fn is_valid(&self, input: &str) -> bool {
        input.chars().count() == self.word.len() && input.chars().all(char::is_alphabetic)
    }
}
