use chrono::Local;
use dashmap::DashMap;
use log::{debug, info};

use crate::channel::Channel;
use crate::client::{Client, ClientId};
use crate::parsers::to_irc_lower;

/// Process-wide state: connections by id, the case-insensitive nickname
/// and channel indices, and immutable server metadata. Only the
/// dispatcher task mutates it, so every method takes `&self` and there
/// is exactly one scheduling agent behind them.
#[derive(Debug)]
pub struct ServerState {
    pub server_name: String,
    pub created: String,
    password: String,
    pub clients: DashMap<ClientId, Client>,
    /// lowercase nickname -> id, registered connections only.
    nicks: DashMap<String, ClientId>,
    /// lowercase channel name -> channel (display case kept inside).
    pub channels: DashMap<String, Channel>,
}

impl ServerState {
    pub fn new(server_name: &str, password: &str) -> Self {
        ServerState {
            server_name: server_name.to_owned(),
            created: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            password: password.to_owned(),
            clients: DashMap::new(),
            nicks: DashMap::new(),
            channels: DashMap::new(),
        }
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn add_client(&self, client: Client) {
        self.clients.insert(client.id, client);
    }

    /// Queues one reply line for a connection. Unknown ids are ignored;
    /// a disconnect may already have raced the caller.
    pub fn send_to(&self, id: ClientId, reply: &str) {
        if let Some(client) = self.clients.get(&id) {
            client.send(reply);
        }
    }

    /// Case-insensitive lookup through the registered-nickname index.
    pub fn client_by_nick(&self, nick: &str) -> Option<ClientId> {
        self.nicks.get(&to_irc_lower(nick)).map(|entry| *entry)
    }

    /// Uniqueness scan over every connection, registered or not, so a
    /// half-registered nickname still blocks a duplicate.
    pub fn nick_in_use(&self, nick: &str, excluding: ClientId) -> bool {
        let wanted = to_irc_lower(nick);
        self.clients.iter().any(|entry| {
            entry.id != excluding && !entry.nickname.is_empty()
                && to_irc_lower(&entry.nickname) == wanted
        })
    }

    /// Index a registered connection's nickname, dropping a previous
    /// binding when the nick changed.
    pub fn bind_nick(&self, nick: &str, id: ClientId, old_nick: Option<&str>) {
        if let Some(old) = old_nick {
            self.nicks.remove(&to_irc_lower(old));
        }
        self.nicks.insert(to_irc_lower(nick), id);
    }

    pub fn channel_key(name: &str) -> String {
        to_irc_lower(name)
    }

    pub fn channel_exists(&self, name: &str) -> bool {
        self.channels.contains_key(&Self::channel_key(name))
    }

    /// Fetches a channel by display name, creating it on first JOIN.
    pub fn get_or_create_channel(&self, name: &str) -> String {
        let key = Self::channel_key(name);
        if !self.channels.contains_key(&key) {
            info!("Channel {name} created");
            self.channels.insert(key.clone(), Channel::new(name));
        }
        key
    }

    /// Drops a channel once its member count reaches zero.
    pub fn remove_channel_if_empty(&self, key: &str) {
        let empty = self
            .channels
            .get(key)
            .map(|chan| chan.is_empty())
            .unwrap_or(false);
        if empty {
            if let Some((_, chan)) = self.channels.remove(key) {
                info!("Channel {} destroyed", chan.name());
            }
        }
    }

    /// Lowercase keys of every channel this connection is on.
    pub fn channels_of(&self, id: ClientId) -> Vec<String> {
        self.channels
            .iter()
            .filter(|entry| entry.is_member(id))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Sends a line to every channel member, honoring insertion order.
    /// `exclude` implements the PRIVMSG echo rule; every other command
    /// echoes to its own actor.
    pub fn broadcast(&self, channel_key: &str, line: &str, exclude: Option<ClientId>) {
        let members = match self.channels.get(channel_key) {
            Some(chan) => chan.members().to_vec(),
            None => return,
        };
        for member in members {
            if Some(member) == exclude {
                continue;
            }
            self.send_to(member, line);
        }
    }

    /// `353` payload: nicknames in join order, operators prefixed `@`.
    pub fn member_list(&self, channel_key: &str) -> String {
        let members: Vec<(ClientId, bool)> = match self.channels.get(channel_key) {
            Some(chan) => chan
                .members()
                .iter()
                .map(|&id| (id, chan.is_operator(id)))
                .collect(),
            None => return String::new(),
        };
        let mut list = String::new();
        for (id, is_op) in members {
            if let Some(client) = self.clients.get(&id) {
                if !list.is_empty() {
                    list.push(' ');
                }
                if is_op {
                    list.push('@');
                }
                list.push_str(&client.nickname);
            }
        }
        list
    }

    /// Tears one connection down: removes it from every channel
    /// (optionally broadcasting a QUIT line first), destroys channels
    /// it leaves empty, unbinds the nickname and frees the client.
    /// Safe to call twice; the second call finds nothing to do.
    pub fn disconnect(&self, id: ClientId, quit_line: Option<&str>) {
        let Some((_, client)) = self.clients.remove(&id) else {
            return;
        };

        for key in self.channels_of(id) {
            if let Some(line) = quit_line {
                self.broadcast(&key, line, Some(id));
            }
            if let Some(mut chan) = self.channels.get_mut(&key) {
                chan.remove_member(id);
            }
            self.remove_channel_if_empty(&key);
        }

        if !client.nickname.is_empty() {
            let lower = to_irc_lower(&client.nickname);
            self.nicks.remove_if(&lower, |_, bound| *bound == id);
        }

        debug!("[{id}] connection removed from registry");
        client.request_close();
    }

    #[cfg(test)]
    pub fn registered_nick_count(&self) -> usize {
        self.nicks.len()
    }
}
