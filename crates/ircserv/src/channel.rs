use chrono::{DateTime, Local};
use std::collections::HashSet;

use crate::client::ClientId;

/// Why a JOIN attempt was turned away, in the order the gates are
/// checked: invite-only first, then key, then limit.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinRefusal {
    InviteOnly,
    KeyMissing,
    KeyMismatch,
    LimitZero,
    Full,
}

/// A chat room. Members are referenced by [`ClientId`]; the registry
/// resolves them back to connections when broadcasting, so a channel
/// never outlives its members' bookkeeping.
#[derive(Debug)]
pub struct Channel {
    name: String,
    topic: String,
    topic_setter: String,
    topic_time: Option<DateTime<Local>>,
    key: String,
    limit: usize,
    limited: bool,
    invite_only: bool,
    topic_restricted: bool,
    /// Insertion order is broadcast order.
    members: Vec<ClientId>,
    operators: HashSet<ClientId>,
    invites: Vec<ClientId>,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Channel {
            name: name.to_owned(),
            topic: String::new(),
            topic_setter: String::new(),
            topic_time: None,
            key: String::new(),
            limit: 0,
            limited: false,
            invite_only: false,
            topic_restricted: false,
            members: Vec::new(),
            operators: HashSet::new(),
            invites: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_operator(&self, id: ClientId) -> bool {
        self.operators.contains(&id)
    }

    pub fn is_invited(&self, id: ClientId) -> bool {
        self.invites.contains(&id)
    }

    /// Members in join order.
    pub fn members(&self) -> &[ClientId] {
        &self.members
    }

    pub fn invite_only(&self) -> bool {
        self.invite_only
    }

    pub fn topic_restricted(&self) -> bool {
        self.topic_restricted
    }

    pub fn key_protected(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn limited(&self) -> bool {
        self.limited
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn topic_setter(&self) -> &str {
        &self.topic_setter
    }

    pub fn topic_time_display(&self) -> String {
        match &self.topic_time {
            Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => String::new(),
        }
    }

    /// Checks the mode gates for a prospective member, in `+i`, `+k`,
    /// `+l` order. Does not mutate; JOIN calls [`Channel::add_member`]
    /// afterwards.
    pub fn check_join(&self, id: ClientId, key: &str) -> Result<(), JoinRefusal> {
        if self.invite_only && !self.is_invited(id) {
            return Err(JoinRefusal::InviteOnly);
        }
        if self.key_protected() {
            if key.is_empty() {
                return Err(JoinRefusal::KeyMissing);
            }
            if key != self.key {
                return Err(JoinRefusal::KeyMismatch);
            }
        }
        if self.limited {
            if self.limit == 0 {
                return Err(JoinRefusal::LimitZero);
            }
            if self.members.len() >= self.limit {
                return Err(JoinRefusal::Full);
            }
        }
        Ok(())
    }

    /// Adds a member, refusing duplicates. The first member becomes an
    /// operator; a pending invite is consumed.
    pub fn add_member(&mut self, id: ClientId) -> bool {
        if self.is_member(id) {
            return false;
        }
        self.members.push(id);
        self.remove_invite(id);
        if self.members.len() == 1 {
            self.operators.insert(id);
        }
        true
    }

    /// Removes a member from members, operators and the invite list.
    pub fn remove_member(&mut self, id: ClientId) {
        self.members.retain(|&m| m != id);
        self.operators.remove(&id);
        self.remove_invite(id);
    }

    /// Operator grants only apply to current members.
    pub fn add_operator(&mut self, id: ClientId) -> bool {
        if self.is_member(id) {
            self.operators.insert(id)
        } else {
            false
        }
    }

    pub fn remove_operator(&mut self, id: ClientId) {
        self.operators.remove(&id);
    }

    pub fn add_invite(&mut self, id: ClientId) {
        if !self.is_invited(id) {
            self.invites.push(id);
        }
    }

    pub fn remove_invite(&mut self, id: ClientId) {
        self.invites.retain(|&i| i != id);
    }

    pub fn set_invite_only(&mut self, flag: bool) {
        self.invite_only = flag;
    }

    pub fn set_topic_restricted(&mut self, flag: bool) {
        self.topic_restricted = flag;
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_owned();
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.limited = limit > 0;
    }

    pub fn clear_limit(&mut self) {
        self.limit = 0;
        self.limited = false;
    }

    /// Sets the topic with setter/time provenance. Topics are limited to
    /// printable ASCII; anything else leaves the topic untouched.
    pub fn set_topic(&mut self, topic: &str, setter: &str) -> bool {
        if !topic.bytes().all(|b| (32..=126).contains(&b)) {
            log::warn!("Topic change failed for {}: invalid characters", self.name);
            return false;
        }
        self.topic = topic.to_owned();
        self.topic_setter = setter.to_owned();
        self.topic_time = Some(Local::now());
        true
    }
}
