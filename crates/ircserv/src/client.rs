use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::sync::mpsc::Sender;

use crate::message::format_reply;

pub type ClientId = usize;

static NEXT_CLIENT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn next_client_id() -> ClientId {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// One client connection as the dispatcher sees it. The socket halves
/// live in the reader/writer tasks; this struct owns the registration
/// state machine, the identity triple and the send queue handle.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    /// Peer IP, the authoritative hostname no matter what USER claims.
    pub ip: String,
    pub port: u16,
    pub nickname: String,
    pub username: String,
    pub hostname: String,
    pub realname: String,
    pub pass_accepted: bool,
    pub nick_set: bool,
    pub user_set: bool,
    pub registered: bool,
    pub greeted: bool,
    outbound: Sender<String>,
    shutdown: Arc<Notify>,
}

impl Client {
    pub fn new(id: ClientId, addr: SocketAddr, outbound: Sender<String>, shutdown: Arc<Notify>) -> Self {
        Client {
            id,
            ip: addr.ip().to_string(),
            port: addr.port(),
            nickname: String::new(),
            username: String::new(),
            hostname: String::new(),
            realname: String::new(),
            pass_accepted: false,
            nick_set: false,
            user_set: false,
            registered: false,
            greeted: true,
            outbound,
            shutdown,
        }
    }

    /// Formats and enqueues one reply. A closed or saturated queue means
    /// the peer stopped draining; the connection is scheduled for close
    /// instead of blocking the dispatcher.
    pub fn send(&self, reply: &str) {
        let line = format_reply(reply);
        log::debug!("[{}] << {}", self.id, line.trim_end());
        if self.outbound.try_send(line).is_err() {
            log::debug!("[{}] send queue unavailable, scheduling close", self.id);
            self.shutdown.notify_one();
        }
    }

    /// `nick!user@host` as used in broadcast prefixes.
    pub fn prefix(&self) -> String {
        format!("{}!{}@{}", self.nickname, self.username, self.hostname)
    }

    /// Reply target: the nickname once one exists, `*` before that.
    pub fn display_nick(&self) -> &str {
        if self.nickname.is_empty() {
            "*"
        } else {
            &self.nickname
        }
    }

    pub fn set_nickname(&mut self, nick: &str) {
        self.nickname = nick.to_owned();
        self.nick_set = true;
    }

    pub fn set_user(&mut self, username: &str, realname: &str) {
        self.username = username.to_owned();
        self.hostname = self.ip.clone();
        self.realname = realname.to_owned();
        self.user_set = true;
    }

    /// Completes registration once PASS, NICK and USER are all in.
    /// Returns true exactly once, on the transition.
    pub fn try_register(&mut self) -> bool {
        if !self.registered && self.pass_accepted && self.nick_set && self.user_set {
            self.registered = true;
            return true;
        }
        false
    }

    /// Wakes the reader task so the connection tears down.
    pub fn request_close(&self) {
        self.shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_client() -> (Client, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let addr: SocketAddr = "127.0.0.1:54321".parse().unwrap();
        let client = Client::new(next_client_id(), addr, tx, Arc::new(Notify::new()));
        (client, rx)
    }

    #[test]
    fn registration_needs_all_three_flags() {
        let (mut client, _rx) = test_client();
        assert!(!client.try_register());
        client.pass_accepted = true;
        assert!(!client.try_register());
        client.set_nickname("alice");
        assert!(!client.try_register());
        client.set_user("alice", "Alice A");
        assert!(client.try_register());
        // Only the transition reports true.
        assert!(!client.try_register());
        assert!(client.registered);
    }

    #[test]
    fn hostname_is_peer_ip() {
        let (mut client, _rx) = test_client();
        client.set_nickname("alice");
        client.set_user("alice", "Alice A");
        assert_eq!(client.hostname, "127.0.0.1");
        assert_eq!(client.prefix(), "alice!alice@127.0.0.1");
    }

    #[test]
    fn display_nick_falls_back_to_star() {
        let (mut client, _rx) = test_client();
        assert_eq!(client.display_nick(), "*");
        client.set_nickname("bob");
        assert_eq!(client.display_nick(), "bob");
    }

    #[test]
    fn send_terminates_lines() {
        let (client, mut rx) = test_client();
        client.send("PING x");
        assert_eq!(rx.try_recv().unwrap(), "PING x\r\n");
    }
}
