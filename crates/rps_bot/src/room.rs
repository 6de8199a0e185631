//! Two-player rooms for head-to-head matches refereed by the bot.

use crate::game::{Move, ROUNDS_PER_SET, compare};

#[derive(Debug, Default)]
pub struct Room {
    name: String,
    player1: Option<String>,
    player2: Option<String>,
    choice1: Option<Move>,
    choice2: Option<Move>,
    wins1: u32,
    wins2: u32,
    ties: u32,
    rounds_played: u32,
    sets1: u32,
    sets2: u32,
}

/// Outcome of a resolved round, ready to announce.
#[derive(Debug, PartialEq)]
pub struct RoundResult {
    pub choice1: Move,
    pub choice2: Move,
    /// 1: player1 took the round, -1: player2, 0: tie.
    pub outcome: i32,
    pub rounds_played: u32,
    pub set_finished: bool,
}

impl Room {
    pub fn new(name: &str) -> Self {
        Room {
            name: name.to_owned(),
            ..Room::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player1(&self) -> Option<&str> {
        self.player1.as_deref()
    }

    pub fn player2(&self) -> Option<&str> {
        self.player2.as_deref()
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.player1.iter().chain(self.player2.iter()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.player1.is_none() && self.player2.is_none()
    }

    /// Both seats taken; rounds can be played.
    pub fn is_ready(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    pub fn has_player(&self, nick: &str) -> bool {
        self.players().any(|p| p == nick)
    }

    pub fn other_player(&self, nick: &str) -> Option<&str> {
        self.players().find(|&p| p != nick)
    }

    pub fn add_player(&mut self, nick: &str) -> bool {
        if self.has_player(nick) {
            return false;
        }
        if self.player1.is_none() {
            self.player1 = Some(nick.to_owned());
            true
        } else if self.player2.is_none() {
            self.player2 = Some(nick.to_owned());
            true
        } else {
            false
        }
    }

    pub fn remove_player(&mut self, nick: &str) {
        if self.player1.as_deref() == Some(nick) {
            self.player1 = None;
            self.choice1 = None;
        }
        if self.player2.as_deref() == Some(nick) {
            self.player2 = None;
            self.choice2 = None;
        }
    }

    /// Records a choice; resolves the round once both are in.
    pub fn play(&mut self, nick: &str, mv: Move) -> Option<RoundResult> {
        if !self.is_ready() {
            return None;
        }
        if self.player1.as_deref() == Some(nick) {
            self.choice1 = Some(mv);
        } else if self.player2.as_deref() == Some(nick) {
            self.choice2 = Some(mv);
        } else {
            return None;
        }

        let (choice1, choice2) = match (self.choice1, self.choice2) {
            (Some(a), Some(b)) => (a, b),
            _ => return None,
        };

        let outcome = compare(choice1, choice2);
        match outcome {
            1 => self.wins1 += 1,
            -1 => self.wins2 += 1,
            _ => self.ties += 1,
        }
        self.rounds_played += 1;
        self.choice1 = None;
        self.choice2 = None;

        let set_finished = self.rounds_played >= ROUNDS_PER_SET;
        let result = RoundResult {
            choice1,
            choice2,
            outcome,
            rounds_played: self.rounds_played,
            set_finished,
        };
        if set_finished {
            if self.wins1 > self.wins2 {
                self.sets1 += 1;
            } else if self.wins2 > self.wins1 {
                self.sets2 += 1;
            }
        }
        Some(result)
    }

    /// Round score before the counters reset; call right after a
    /// finished set to announce it.
    pub fn set_summary(&self) -> String {
        format!(
            "Set finished. Round score: {} {} - {} {}, ties={}; Sets: {}={}, {}={}",
            self.player1.as_deref().unwrap_or("?"),
            self.wins1,
            self.wins2,
            self.player2.as_deref().unwrap_or("?"),
            self.ties,
            self.player1.as_deref().unwrap_or("?"),
            self.sets1,
            self.player2.as_deref().unwrap_or("?"),
            self.sets2,
        )
    }

    /// Clears round counters for the next set; set totals persist.
    pub fn reset_rounds(&mut self) {
        self.wins1 = 0;
        self.wins2 = 0;
        self.ties = 0;
        self.rounds_played = 0;
        self.choice1 = None;
        self.choice2 = None;
    }

    pub fn status(&self) -> String {
        format!(
            "Room '{}' players: [{}, {}] rounds: {}; score: {} {}-{} {}; sets: {}={}, {}={}",
            self.name,
            self.player1.as_deref().unwrap_or(""),
            self.player2.as_deref().unwrap_or(""),
            self.rounds_played,
            self.player1.as_deref().unwrap_or("?"),
            self.wins1,
            self.wins2,
            self.player2.as_deref().unwrap_or("?"),
            self.player1.as_deref().unwrap_or("?"),
            self.sets1,
            self.player2.as_deref().unwrap_or("?"),
            self.sets2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_room() -> Room {
        let mut room = Room::new("arena");
        assert!(room.add_player("alice"));
        assert!(room.add_player("bob"));
        room
    }

    #[test]
    fn seats_are_limited_to_two() {
        let mut room = ready_room();
        assert!(!room.add_player("carol"));
        assert!(!room.add_player("alice"), "no double seating");
    }

    #[test]
    fn round_resolves_when_both_chose() {
        let mut room = ready_room();
        assert_eq!(room.play("alice", Move::Rock), None);
        let result = room.play("bob", Move::Cisor).expect("round resolves");
        assert_eq!(result.outcome, 1);
        assert_eq!(result.rounds_played, 1);
        assert!(!result.set_finished);
    }

    #[test]
    fn choices_clear_between_rounds() {
        let mut room = ready_room();
        room.play("alice", Move::Rock);
        room.play("bob", Move::Paper);
        // A new round needs both choices again.
        assert_eq!(room.play("alice", Move::Rock), None);
    }

    #[test]
    fn fifth_round_finishes_the_set() {
        let mut room = ready_room();
        for _ in 0..4 {
            room.play("alice", Move::Rock);
            room.play("bob", Move::Cisor);
        }
        room.play("alice", Move::Paper);
        let result = room.play("bob", Move::Rock).unwrap();
        assert!(result.set_finished);
        assert!(room.set_summary().contains("Sets: alice=1, bob=0"));
        room.reset_rounds();
        assert!(room.status().contains("rounds: 0"));
        assert!(room.status().contains("sets: alice=1, bob=0"));
    }

    #[test]
    fn leaving_frees_the_seat_and_pending_choice() {
        let mut room = ready_room();
        room.play("alice", Move::Rock);
        room.remove_player("alice");
        assert!(!room.is_ready());
        assert!(!room.is_empty());
        assert_eq!(room.other_player("bob"), None);
        // Bob's later move cannot resolve against the stale choice.
        assert_eq!(room.play("bob", Move::Paper), None);
    }
}
