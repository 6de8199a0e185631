//! The IRC side of the bot: connection, handshake and message routing.
//!
//! Line handling is synchronous and returns the raw lines to write, so
//! the whole command surface is testable without a socket.

use log::{debug, info};
use std::collections::HashMap;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::game::{self, Move};
use crate::room::Room;
use crate::stats::PlayerStats;

pub const BOT_NICK: &str = "cisor";
const HOME_CHANNEL: &str = "#general";

pub struct Bot {
    host: String,
    port: u16,
    password: String,
    stats: HashMap<String, PlayerStats>,
    rooms: HashMap<String, Room>,
    /// nick -> room name, one room per player.
    player_room: HashMap<String, String>,
}

impl Bot {
    pub fn new(host: &str, port: u16, password: &str) -> Self {
        Bot {
            host: host.to_owned(),
            port,
            password: password.to_owned(),
            stats: HashMap::new(),
            rooms: HashMap::new(),
            player_room: HashMap::new(),
        }
    }

    /// Connects, registers and serves games until the server goes away.
    pub async fn run(&mut self) -> io::Result<()> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (read_half, mut write_half) = stream.into_split();
        info!("connected to {}:{}", self.host, self.port);

        let handshake = format!(
            "PASS {}\r\nNICK {}\r\nUSER bot 0 * :{} bot\r\nJOIN {}\r\n",
            self.password, BOT_NICK, BOT_NICK, HOME_CHANNEL
        );
        write_half.write_all(handshake.as_bytes()).await?;

        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                info!("server closed the connection");
                return Ok(());
            }
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                continue;
            }
            debug!(">> {trimmed}");
            for reply in self.handle_line(trimmed) {
                debug!("<< {reply}");
                write_half.write_all(reply.as_bytes()).await?;
                write_half.write_all(b"\r\n").await?;
            }
        }
    }

    /// Routes one inbound line and returns the raw lines to send back.
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        if let Some(token) = line.strip_prefix("PING ") {
            return vec![format!("PONG {token}")];
        }

        let Some((sender, target, message)) = extract_privmsg(line) else {
            return Vec::new();
        };
        // Only direct messages are game moves; channel chatter is not.
        if target != BOT_NICK {
            return Vec::new();
        }

        let words: Vec<&str> = message.split_whitespace().collect();
        match words.first().map(|w| w.to_ascii_lowercase()).as_deref() {
            Some("help") => help_lines(&sender),
            Some("room") => self.handle_room_command(&sender, &words),
            Some("play") => match words.get(1).and_then(|w| Move::parse(w)) {
                Some(mv) => self.handle_room_move(&sender, mv),
                None => vec![privmsg(&sender, "Invalid move. Use rock|paper|cisor.")],
            },
            Some(word) if word.contains("score") => self.scoreboard_lines(&sender),
            _ => match Move::find_in(&message) {
                Some(mv) => self.handle_solo_move(&sender, mv),
                None => vec![privmsg(
                    &sender,
                    "Invalid move. How to play: send 'rock', 'paper' or 'cisor' (or 'scissors').",
                )],
            },
        }
    }

    /// One round against the bot itself.
    fn handle_solo_move(&mut self, sender: &str, player_move: Move) -> Vec<String> {
        let bot_move = Move::random();
        let outcome = game::compare(player_move, bot_move);

        let stats = self.stats.entry(sender.to_owned()).or_default();
        let verdict = match outcome {
            1 => {
                stats.record_win();
                "you win"
            }
            -1 => {
                stats.record_loss();
                "you lose"
            }
            _ => {
                stats.record_tie();
                "tie"
            }
        };

        let mut out = vec![privmsg(
            sender,
            &format!("I choose {bot_move}; you played {player_move} -- {verdict}"),
        )];
        if stats.set_finished() {
            stats.resolve_set();
            out.extend(self.scoreboard_lines(sender));
        }
        out
    }

    fn scoreboard_lines(&mut self, sender: &str) -> Vec<String> {
        let stats = self.stats.entry(sender.to_owned()).or_default();
        stats
            .scoreboard(sender)
            .into_iter()
            .map(|row| privmsg(sender, &row))
            .collect()
    }

    fn handle_room_command(&mut self, sender: &str, words: &[&str]) -> Vec<String> {
        match words.get(1).copied() {
            Some("create") => match words.get(2) {
                Some(name) => self.room_create(sender, name),
                None => vec![privmsg(sender, "Usage: room create <name>")],
            },
            Some("join") => match words.get(2) {
                Some(name) => self.room_join(sender, name),
                None => vec![privmsg(sender, "Usage: room join <name>")],
            },
            Some("leave") => self.room_leave(sender),
            Some("status") => self.room_status(sender),
            _ => vec![privmsg(
                sender,
                "Usage: room <create|join|leave|status> [name]",
            )],
        }
    }

    fn room_create(&mut self, sender: &str, name: &str) -> Vec<String> {
        let mut out = self.leave_current_room(sender);
        if self.rooms.contains_key(name) {
            out.push(privmsg(sender, "Room already exists."));
            return out;
        }
        let mut room = Room::new(name);
        room.add_player(sender);
        self.rooms.insert(name.to_owned(), room);
        self.player_room
            .insert(sender.to_owned(), name.to_owned());
        out.push(privmsg(
            sender,
            &format!(
                "Room '{name}' created. Waiting for an opponent (ask them to 'room join {name}')."
            ),
        ));
        out
    }

    fn room_join(&mut self, sender: &str, name: &str) -> Vec<String> {
        if self.player_room.get(sender).map(String::as_str) == Some(name) {
            return vec![privmsg(sender, "You are already in this room.")];
        }
        let mut out = self.leave_current_room(sender);
        let Some(room) = self.rooms.get_mut(name) else {
            out.push(privmsg(sender, "No such room."));
            return out;
        };
        if !room.add_player(sender) {
            out.push(privmsg(sender, "Room is full."));
            return out;
        }
        let opponent = room.other_player(sender).map(str::to_owned);
        self.player_room
            .insert(sender.to_owned(), name.to_owned());
        out.push(privmsg(
            sender,
            &format!(
                "Joined room '{name}'. Both players DM 'play <rock|paper|cisor>' to play rounds."
            ),
        ));
        if let Some(opponent) = opponent {
            out.push(privmsg(
                &opponent,
                &format!("{sender} joined your room '{name}'"),
            ));
        }
        out
    }

    fn room_leave(&mut self, sender: &str) -> Vec<String> {
        if !self.player_room.contains_key(sender) {
            return vec![privmsg(sender, "You're not in a room.")];
        }
        self.leave_current_room(sender)
    }

    fn room_status(&mut self, sender: &str) -> Vec<String> {
        let Some(room_name) = self.player_room.get(sender) else {
            return vec![privmsg(sender, "You're not in a room.")];
        };
        let Some(room) = self.rooms.get(room_name) else {
            return vec![privmsg(sender, "You're not in a room.")];
        };
        if !room.is_ready() {
            return vec![privmsg(sender, "There are not enough players in the room.")];
        }
        vec![privmsg(sender, &room.status())]
    }

    fn handle_room_move(&mut self, sender: &str, mv: Move) -> Vec<String> {
        let Some(room_name) = self.player_room.get(sender).cloned() else {
            return vec![privmsg(
                sender,
                "Join a room first: room create <name> or room join <name>",
            )];
        };
        let Some(room) = self.rooms.get_mut(&room_name) else {
            return vec![privmsg(sender, "You're not in a room.")];
        };
        if !room.is_ready() {
            return vec![privmsg(sender, "There are not enough players in the room.")];
        }

        match room.play(sender, mv) {
            None => vec![privmsg(sender, "Move received. Waiting for the opponent...")],
            Some(result) => {
                let player1 = room.player1().unwrap_or("?").to_owned();
                let player2 = room.player2().unwrap_or("?").to_owned();
                let verdict = match result.outcome {
                    1 => format!("{player1} wins this round"),
                    -1 => format!("{player2} wins this round"),
                    _ => "Round is a tie".to_owned(),
                };
                let announcement = format!(
                    "Choices: {player1}={}, {player2}={}; {verdict}. ({}/{})",
                    result.choice1,
                    result.choice2,
                    result.rounds_played,
                    game::ROUNDS_PER_SET,
                );
                let mut out = vec![
                    privmsg(&player1, &announcement),
                    privmsg(&player2, &announcement),
                ];
                if result.set_finished {
                    let summary = room.set_summary();
                    out.push(privmsg(&player1, &summary));
                    out.push(privmsg(&player2, &summary));
                    room.reset_rounds();
                }
                out
            }
        }
    }

    /// Pulls the player out of whatever room they occupy, notifying the
    /// opponent and reaping the room once it empties.
    fn leave_current_room(&mut self, sender: &str) -> Vec<String> {
        let Some(room_name) = self.player_room.remove(sender) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(room) = self.rooms.get_mut(&room_name) {
            let opponent = room.other_player(sender).map(str::to_owned);
            room.remove_player(sender);
            out.push(privmsg(sender, &format!("You left room '{room_name}'.")));
            if let Some(opponent) = opponent {
                out.push(privmsg(
                    &opponent,
                    &format!(
                        "{sender} left your room '{room_name}'. There are not enough players in the room."
                    ),
                ));
            }
            if room.is_empty() {
                self.rooms.remove(&room_name);
            }
        }
        out
    }
}

fn privmsg(target: &str, text: &str) -> String {
    format!("PRIVMSG {target} :{text}")
}

fn help_lines(sender: &str) -> Vec<String> {
    [
        "Play rock/paper/cisor: DM me 'rock', 'paper' or 'cisor'. Five rounds make a set.",
        "'score' shows your scoreboard against me.",
        "Multiplayer: 'room create <name>', 'room join <name>', then 'play <move>'.",
        "'room status' shows the match, 'room leave' gives up your seat.",
    ]
    .iter()
    .map(|line| privmsg(sender, line))
    .collect()
}

/// Pulls `(sender, target, text)` out of a PRIVMSG line shaped like
/// `:nick!user@host PRIVMSG target :text`.
fn extract_privmsg(line: &str) -> Option<(String, String, String)> {
    let rest = line.strip_prefix(':')?;
    let (prefix, rest) = rest.split_once(' ')?;
    let sender = prefix.split('!').next()?.to_owned();
    let rest = rest.strip_prefix("PRIVMSG ")?;
    let (target, text) = rest.split_once(' ')?;
    let text = text.strip_prefix(':').unwrap_or(text);
    Some((sender, target.to_owned(), text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dm(bot: &mut Bot, sender: &str, text: &str) -> Vec<String> {
        bot.handle_line(&format!(
            ":{sender}!{sender}@127.0.0.1 PRIVMSG {BOT_NICK} :{text}"
        ))
    }

    #[test]
    fn ping_answers_pong() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        assert_eq!(bot.handle_line("PING :abc"), vec!["PONG :abc".to_owned()]);
    }

    #[test]
    fn channel_chatter_is_ignored() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        let replies = bot.handle_line(":alice!a@h PRIVMSG #general :rock");
        assert!(replies.is_empty());
    }

    #[test]
    fn extract_privmsg_shapes() {
        let parsed = extract_privmsg(":alice!alice@127.0.0.1 PRIVMSG cisor :rock please");
        assert_eq!(
            parsed,
            Some((
                "alice".to_owned(),
                "cisor".to_owned(),
                "rock please".to_owned()
            ))
        );
        assert_eq!(extract_privmsg(":ircserv 001 alice :Welcome"), None);
    }

    #[test]
    fn solo_round_reports_both_moves() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        let replies = dm(&mut bot, "alice", "rock");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("PRIVMSG alice :I choose "));
        assert!(replies[0].contains("you played rock"));
    }

    #[test]
    fn five_solo_rounds_produce_a_scoreboard() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        let mut total = Vec::new();
        for _ in 0..5 {
            total.extend(dm(&mut bot, "alice", "rock"));
        }
        assert!(total.iter().any(|l| l.contains("| Player")));
    }

    #[test]
    fn invalid_dm_gets_usage_hint() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        let replies = dm(&mut bot, "alice", "lizard");
        assert!(replies[0].contains("Invalid move"));
    }

    #[test]
    fn room_lifecycle() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        let replies = dm(&mut bot, "alice", "room create arena");
        assert!(replies[0].contains("Room 'arena' created"));

        let replies = dm(&mut bot, "bob", "room join arena");
        assert!(replies.iter().any(|l| l.contains("Joined room 'arena'")));
        assert!(replies.iter().any(|l| l.contains("bob joined your room")));

        // First move waits, second resolves and announces to both.
        let replies = dm(&mut bot, "alice", "play rock");
        assert!(replies[0].contains("Waiting for the opponent"));
        let replies = dm(&mut bot, "bob", "play cisor");
        assert_eq!(replies.len(), 2);
        assert!(replies[0].contains("alice wins this round"));
        assert!(replies[0].contains("(1/5)"));

        let replies = dm(&mut bot, "alice", "room status");
        assert!(replies[0].contains("score: alice 1-0 bob"));

        let replies = dm(&mut bot, "bob", "room leave");
        assert!(replies.iter().any(|l| l.contains("You left room 'arena'")));
        assert!(replies.iter().any(|l| l.contains("not enough players")));
    }

    #[test]
    fn joining_a_second_room_leaves_the_first() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        dm(&mut bot, "alice", "room create one");
        dm(&mut bot, "bob", "room create two");
        let replies = dm(&mut bot, "alice", "room join two");
        assert!(replies.iter().any(|l| l.contains("You left room 'one'")));
        assert!(replies.iter().any(|l| l.contains("Joined room 'two'")));
    }

    #[test]
    fn full_set_in_a_room_announces_and_resets() {
        let mut bot = Bot::new("127.0.0.1", 6667, "secret");
        dm(&mut bot, "alice", "room create arena");
        dm(&mut bot, "bob", "room join arena");
        let mut all = Vec::new();
        for _ in 0..5 {
            all.extend(dm(&mut bot, "alice", "play paper"));
            all.extend(dm(&mut bot, "bob", "play rock"));
        }
        assert!(all.iter().any(|l| l.contains("Set finished")));
        assert!(all.iter().any(|l| l.contains("Sets: alice=1, bob=0")));
        let replies = dm(&mut bot, "alice", "room status");
        assert!(replies[0].contains("rounds: 0"));
    }
}
