//! Rock/paper/cisor core rules.

use rand::Rng;
use std::fmt;

/// Rounds per set; finishing a set resolves it and resets the round
/// counters.
pub const ROUNDS_PER_SET: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Rock,
    Paper,
    Cisor,
}

impl Move {
    /// Parses one token. `scissors` is accepted as an alias and a
    /// trailing `:` or `,` is forgiven, people punctuate.
    pub fn parse(token: &str) -> Option<Move> {
        let token = token.trim_end_matches([':', ',']).to_ascii_lowercase();
        match token.as_str() {
            "rock" => Some(Move::Rock),
            "paper" => Some(Move::Paper),
            "cisor" | "scissors" => Some(Move::Cisor),
            _ => None,
        }
    }

    /// First valid move found anywhere in a free-form message.
    pub fn find_in(message: &str) -> Option<Move> {
        message.split_whitespace().find_map(Move::parse)
    }

    pub fn random() -> Move {
        match rand::thread_rng().gen_range(0..3) {
            0 => Move::Rock,
            1 => Move::Paper,
            _ => Move::Cisor,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Cisor => "cisor",
        };
        write!(f, "{name}")
    }
}

/// 1 when `left` beats `right`, -1 when it loses, 0 on a tie.
pub fn compare(left: Move, right: Move) -> i32 {
    use Move::*;
    match (left, right) {
        (a, b) if a == b => 0,
        (Rock, Cisor) | (Paper, Rock) | (Cisor, Paper) => 1,
        _ => -1,
    }
}
