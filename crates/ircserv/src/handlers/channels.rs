//! Channel membership and moderation: JOIN, PART, MODE, INVITE, KICK,
//! TOPIC and NAMES.

use std::collections::HashSet;

use crate::channel::JoinRefusal;
use crate::client::ClientId;
use crate::constants::ERR_CHANNELISFULL_STR;
use crate::handlers::{display_nick, need_more_params, require_registered};
use crate::modes::{self, ModeChange, ModeError};
use crate::parsers::is_valid_channel_name;
use crate::registry::ServerState;
use crate::replies::Reply;

/// Resolves a channel name to its index key, answering 403 when it does
/// not exist.
fn channel_key_or_reply(state: &ServerState, id: ClientId, name: &str) -> Option<String> {
    let key = ServerState::channel_key(name);
    if state.channels.contains_key(&key) {
        Some(key)
    } else {
        let nick = display_nick(state, id);
        state.send_to(
            id,
            &Reply::ErrNoSuchChannel {
                nick: &nick,
                channel: name,
            }
            .format(),
        );
        None
    }
}

/// 442 unless the actor is on the channel.
fn membership_or_reply(state: &ServerState, id: ClientId, key: &str, display: &str) -> bool {
    let member = state
        .channels
        .get(key)
        .map(|chan| chan.is_member(id))
        .unwrap_or(false);
    if !member {
        let nick = display_nick(state, id);
        state.send_to(
            id,
            &Reply::ErrNotOnChannel {
                nick: &nick,
                channel: display,
            }
            .format(),
        );
    }
    member
}

/// 482 unless the actor holds operator status on the channel.
fn operator_or_reply(state: &ServerState, id: ClientId, key: &str, display: &str) -> bool {
    let operator = state
        .channels
        .get(key)
        .map(|chan| chan.is_operator(id))
        .unwrap_or(false);
    if !operator {
        let nick = display_nick(state, id);
        state.send_to(
            id,
            &Reply::ErrChanOPrivsNeeded {
                nick: &nick,
                channel: display,
            }
            .format(),
        );
    }
    operator
}

fn actor_prefix(state: &ServerState, id: ClientId) -> Option<String> {
    state.clients.get(&id).map(|client| client.prefix())
}

/// 332-plus-provenance or 331 for one channel, to one recipient.
fn send_topic(state: &ServerState, id: ClientId, key: &str, display: &str) {
    let nick = display_nick(state, id);
    let Some((topic, setter, time)) = state.channels.get(key).map(|chan| {
        (
            chan.topic().to_owned(),
            chan.topic_setter().to_owned(),
            chan.topic_time_display(),
        )
    }) else {
        return;
    };
    if topic.is_empty() {
        state.send_to(
            id,
            &Reply::NoTopic {
                nick: &nick,
                channel: display,
            }
            .format(),
        );
    } else {
        state.send_to(
            id,
            &Reply::Topic {
                nick: &nick,
                channel: display,
                topic: &topic,
            }
            .format(),
        );
        state.send_to(
            id,
            &Reply::TopicWhoTime {
                nick: &nick,
                setter: &setter,
                time: &time,
            }
            .format(),
        );
    }
}

/// 353 + 366 for one channel, to one recipient.
fn send_names(state: &ServerState, id: ClientId, key: &str, display: &str) {
    let nick = display_nick(state, id);
    let names = state.member_list(key);
    state.send_to(
        id,
        &Reply::NamReply {
            nick: &nick,
            channel: display,
            names: &names,
        }
        .format(),
    );
    state.send_to(
        id,
        &Reply::EndOfNames {
            nick: &nick,
            channel: display,
        }
        .format(),
    );
}

// 3.2.1 Join message
//
//       Command: JOIN
//    Parameters: ( <channel> *( "," <channel> ) [ <key> *( "," <key> ) ] )
//
//    If a JOIN is successful, the user receives a JOIN message as
//    confirmation and is then sent the channel's topic (using RPL_TOPIC)
//    and the list of users who are on the channel (using RPL_NAMREPLY),
//    which MUST include the user joining.
pub fn handle_join(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.is_empty() {
        need_more_params(state, id, "JOIN");
        return;
    }

    let keys: Vec<&str> = params
        .get(1)
        .map(|k| k.split(',').collect())
        .unwrap_or_default();
    for (i, name) in params[0].split(',').enumerate() {
        let key = keys.get(i).copied().unwrap_or("");
        join_one(state, id, name, key);
    }
}

fn join_one(state: &ServerState, id: ClientId, name: &str, join_key: &str) {
    let nick = display_nick(state, id);
    if !is_valid_channel_name(name) {
        state.send_to(
            id,
            &Reply::ErrNoSuchChannel {
                nick: &nick,
                channel: name,
            }
            .format(),
        );
        return;
    }

    let key = state.get_or_create_channel(name);
    let Some((display, already_member, gate)) = state.channels.get(&key).map(|chan| {
        (
            chan.name().to_owned(),
            chan.is_member(id),
            chan.check_join(id, join_key),
        )
    }) else {
        return;
    };

    if already_member {
        state.send_to(
            id,
            &Reply::ErrAlreadyOnChannel {
                nick: &nick,
                channel: &display,
            }
            .format(),
        );
        return;
    }

    // Gates apply in +i, +k, +l order.
    if let Err(refusal) = gate {
        let reply = match refusal {
            JoinRefusal::InviteOnly => Reply::ErrInviteOnlyChan {
                nick: &nick,
                channel: &display,
            },
            JoinRefusal::KeyMissing => Reply::ErrBadChannelKey {
                nick: &nick,
                channel: &display,
                detail: "Key required (+k)",
            },
            JoinRefusal::KeyMismatch => Reply::ErrBadChannelKey {
                nick: &nick,
                channel: &display,
                detail: "Incorrect key (+k)",
            },
            JoinRefusal::LimitZero => Reply::ErrChannelIsFull {
                nick: &nick,
                channel: &display,
                detail: "Channel limit is 0 (+l)",
            },
            JoinRefusal::Full => Reply::ErrChannelIsFull {
                nick: &nick,
                channel: &display,
                detail: ERR_CHANNELISFULL_STR,
            },
        };
        state.send_to(id, &reply.format());
        return;
    }

    if let Some(mut chan) = state.channels.get_mut(&key) {
        chan.add_member(id);
    }
    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    state.broadcast(&key, &format!(":{prefix} JOIN {display}"), None);
    send_topic(state, id, &key, &display);
    send_names(state, id, &key, &display);
    log::info!("{nick} joined {display}");
}

// 3.2.2 Part message
//
//       Command: PART
//    Parameters: <channel> *( "," <channel> ) [ <Part Message> ]
pub fn handle_part(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.is_empty() {
        need_more_params(state, id, "PART");
        return;
    }

    let message = params[1..].join(" ");
    for name in params[0].split(',') {
        part_one(state, id, name, &message);
    }
}

fn part_one(state: &ServerState, id: ClientId, name: &str, message: &str) {
    let nick = display_nick(state, id);
    if !is_valid_channel_name(name) {
        state.send_to(
            id,
            &Reply::ErrNoSuchChannel {
                nick: &nick,
                channel: name,
            }
            .format(),
        );
        return;
    }
    let Some(key) = channel_key_or_reply(state, id, name) else {
        return;
    };
    let display = state
        .channels
        .get(&key)
        .map(|chan| chan.name().to_owned())
        .unwrap_or_else(|| name.to_owned());
    if !membership_or_reply(state, id, &key, &display) {
        return;
    }

    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    let line = if message.is_empty() {
        format!(":{prefix} PART {display}")
    } else {
        format!(":{prefix} PART {display} :{message}")
    };
    state.broadcast(&key, &line, None);

    if let Some(mut chan) = state.channels.get_mut(&key) {
        chan.remove_member(id);
    }
    state.remove_channel_if_empty(&key);
    log::info!("{nick} parted {display}");
}

// 3.2.3 Channel mode message
//
//       Command: MODE
//    Parameters: <channel> *( ( "-" / "+" ) *<modes> *<modeparams> )
//
//    Only channel modes i, t, k, l and o are recognized. The whole mode
//    string is validated before anything is applied, so a bad unit in
//    the middle never leaves the channel half-changed.
pub fn handle_mode(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.is_empty() {
        need_more_params(state, id, "MODE");
        return;
    }

    let nick = display_nick(state, id);
    let target = params[0].as_str();
    if !target.starts_with('#') {
        // User modes are not implemented.
        state.send_to(
            id,
            &Reply::ErrNoSuchChannel {
                nick: &nick,
                channel: target,
            }
            .format(),
        );
        return;
    }
    let Some(key) = channel_key_or_reply(state, id, target) else {
        return;
    };
    let display = state
        .channels
        .get(&key)
        .map(|chan| chan.name().to_owned())
        .unwrap_or_else(|| target.to_owned());
    if !operator_or_reply(state, id, &key, &display) {
        return;
    }
    if params.len() == 1 {
        // Mode digest elided.
        return;
    }

    // Remaining arguments mix sign-prefixed mode strings with their
    // parameters; classify, then compile.
    let mut units = Vec::new();
    let mut args = Vec::new();
    for token in &params[1..] {
        if token.starts_with('+') || token.starts_with('-') {
            units.extend(modes::split_units(token));
        } else {
            args.push(token.clone());
        }
    }

    let changes = match modes::compile(&units, args) {
        Ok(changes) => changes,
        Err(ModeError::UnknownMode(letter)) => {
            state.send_to(
                id,
                &Reply::ErrUnknownMode {
                    nick: &nick,
                    mode: letter,
                }
                .format(),
            );
            return;
        }
        Err(ModeError::MissingParam) | Err(ModeError::BadLimit) => {
            need_more_params(state, id, "MODE");
            return;
        }
    };

    // Resolve operator targets up front: every named nick must be a
    // current member or the command is rejected untouched.
    let mut resolved: Vec<(ModeChange, Option<ClientId>)> = Vec::with_capacity(changes.len());
    for change in changes {
        let target_id = match &change {
            ModeChange::GiveOp(target) | ModeChange::TakeOp(target) => {
                let found = state.client_by_nick(target).filter(|&tid| {
                    state
                        .channels
                        .get(&key)
                        .map(|chan| chan.is_member(tid))
                        .unwrap_or(false)
                });
                match found {
                    Some(tid) => Some(tid),
                    None => {
                        state.send_to(
                            id,
                            &Reply::ErrUserNotInChannel {
                                nick: &nick,
                                target: target.as_str(),
                                channel: &display,
                            }
                            .format(),
                        );
                        return;
                    }
                }
            }
            _ => None,
        };
        resolved.push((change, target_id));
    }

    let mut applied = Vec::with_capacity(resolved.len());
    if let Some(mut chan) = state.channels.get_mut(&key) {
        for (change, target_id) in &resolved {
            match change {
                ModeChange::InviteOnly(flag) => chan.set_invite_only(*flag),
                ModeChange::TopicRestricted(flag) => chan.set_topic_restricted(*flag),
                ModeChange::SetKey(new_key) => chan.set_key(new_key),
                ModeChange::ClearKey => chan.set_key(""),
                ModeChange::SetLimit(limit) => chan.set_limit(*limit),
                ModeChange::ClearLimit => chan.clear_limit(),
                ModeChange::GiveOp(_) => {
                    chan.add_operator(target_id.unwrap());
                }
                ModeChange::TakeOp(_) => chan.remove_operator(target_id.unwrap()),
            }
            applied.push(change.applied());
        }
    }

    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    for change in applied {
        state.broadcast(&key, &format!(":{prefix} MODE {display} {change}"), None);
    }
}

// 3.2.7 Invite message
//
//       Command: INVITE
//    Parameters: <nickname> <channel>
//
//    Only the user inviting and the user being invited will receive
//    notification of the invitation.
pub fn handle_invite(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.len() < 2 {
        need_more_params(state, id, "INVITE");
        return;
    }

    let nick = display_nick(state, id);
    let target_nick = params[0].as_str();
    let Some(key) = channel_key_or_reply(state, id, &params[1]) else {
        return;
    };
    let display = state
        .channels
        .get(&key)
        .map(|chan| chan.name().to_owned())
        .unwrap_or_else(|| params[1].clone());
    if !membership_or_reply(state, id, &key, &display) {
        return;
    }

    let invite_only = state
        .channels
        .get(&key)
        .map(|chan| chan.invite_only())
        .unwrap_or(false);
    if invite_only && !operator_or_reply(state, id, &key, &display) {
        return;
    }

    let Some(target_id) = state.client_by_nick(target_nick) else {
        state.send_to(
            id,
            &Reply::ErrNoSuchNick {
                nick: &nick,
                target: target_nick,
            }
            .format(),
        );
        return;
    };
    let target_member = state
        .channels
        .get(&key)
        .map(|chan| chan.is_member(target_id))
        .unwrap_or(false);
    if target_member {
        state.send_to(
            id,
            &Reply::ErrUserOnChannel {
                nick: &nick,
                target: target_nick,
                channel: &display,
            }
            .format(),
        );
        return;
    }

    if let Some(mut chan) = state.channels.get_mut(&key) {
        chan.add_invite(target_id);
    }
    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    let line = format!(":{prefix} INVITE {target_nick} {display}");
    state.send_to(target_id, &line);
    state.send_to(id, &line);
    log::info!("{nick} invited {target_nick} to {display}");
}

// 3.2.8 Kick command
//
//       Command: KICK
//    Parameters: <channel> <user> [<comment>]
pub fn handle_kick(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.len() < 2 {
        need_more_params(state, id, "KICK");
        return;
    }

    let nick = display_nick(state, id);
    let Some(key) = channel_key_or_reply(state, id, &params[0]) else {
        return;
    };
    let display = state
        .channels
        .get(&key)
        .map(|chan| chan.name().to_owned())
        .unwrap_or_else(|| params[0].clone());
    if !membership_or_reply(state, id, &key, &display) {
        return;
    }
    if !operator_or_reply(state, id, &key, &display) {
        return;
    }

    let target_nick = params[1].as_str();
    let target_id = state.client_by_nick(target_nick).filter(|&tid| {
        state
            .channels
            .get(&key)
            .map(|chan| chan.is_member(tid))
            .unwrap_or(false)
    });
    let Some(target_id) = target_id else {
        state.send_to(
            id,
            &Reply::ErrUserNotInChannel {
                nick: &nick,
                target: target_nick,
                channel: &display,
            }
            .format(),
        );
        return;
    };

    let comment = params.get(2).map(String::as_str).unwrap_or("");
    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    state.broadcast(
        &key,
        &format!(":{prefix} KICK {display} {target_nick} :{comment}"),
        None,
    );

    if let Some(mut chan) = state.channels.get_mut(&key) {
        chan.remove_member(target_id);
    }
    state.remove_channel_if_empty(&key);
    log::info!("{nick} kicked {target_nick} from {display}");
}

// 3.2.4 Topic message
//
//       Command: TOPIC
//    Parameters: <channel> [ <topic> ]
//
//    The TOPIC command is used to change or view the topic of a
//    channel.
pub fn handle_topic(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }
    if params.is_empty() {
        need_more_params(state, id, "TOPIC");
        return;
    }

    let nick = display_nick(state, id);
    let Some(key) = channel_key_or_reply(state, id, &params[0]) else {
        return;
    };
    let display = state
        .channels
        .get(&key)
        .map(|chan| chan.name().to_owned())
        .unwrap_or_else(|| params[0].clone());
    if !membership_or_reply(state, id, &key, &display) {
        return;
    }

    if params.len() == 1 {
        send_topic(state, id, &key, &display);
        return;
    }
    if params.len() > 2 {
        need_more_params(state, id, "TOPIC");
        return;
    }

    let restricted = state
        .channels
        .get(&key)
        .map(|chan| chan.topic_restricted())
        .unwrap_or(false);
    if restricted && !operator_or_reply(state, id, &key, &display) {
        return;
    }

    let text = params[1].trim_matches([' ', '\t']).to_owned();
    let accepted = state
        .channels
        .get_mut(&key)
        .map(|mut chan| chan.set_topic(&text, &nick))
        .unwrap_or(false);
    if !accepted {
        // Unprintable topics are dropped without a reply.
        return;
    }

    let Some(prefix) = actor_prefix(state, id) else {
        return;
    };
    state.broadcast(&key, &format!(":{prefix} TOPIC {display} :{text}"), None);
}

// 3.2.5 Names message
//
//       Command: NAMES
//    Parameters: [ <channel> *( "," <channel> ) ]
//
//    At the end of the unfiltered listing, users who are not on any
//    channel are listed as being on `channel' "*".
pub fn handle_names(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }

    if let Some(list) = params.first() {
        for name in list.split(',') {
            let name = name.trim_matches([' ', '\t']);
            if name.is_empty() {
                continue;
            }
            let key = ServerState::channel_key(name);
            let display = state.channels.get(&key).map(|chan| chan.name().to_owned());
            match display {
                Some(display) => send_names(state, id, &key, &display),
                None => {
                    let nick = display_nick(state, id);
                    state.send_to(
                        id,
                        &Reply::EndOfNames {
                            nick: &nick,
                            channel: name,
                        }
                        .format(),
                    );
                }
            }
        }
        return;
    }

    let channel_keys: Vec<String> = state
        .channels
        .iter()
        .map(|entry| entry.key().clone())
        .collect();
    let mut on_channel: HashSet<ClientId> = HashSet::new();
    for key in &channel_keys {
        let display = match state.channels.get(key) {
            Some(chan) => {
                on_channel.extend(chan.members().iter().copied());
                chan.name().to_owned()
            }
            None => continue,
        };
        send_names(state, id, key, &display);
    }

    let strays: Vec<String> = state
        .clients
        .iter()
        .filter(|entry| entry.registered && !on_channel.contains(&entry.id))
        .map(|entry| entry.nickname.clone())
        .collect();
    if !strays.is_empty() {
        let nick = display_nick(state, id);
        let names = strays.join(" ");
        state.send_to(
            id,
            &Reply::NamReply {
                nick: &nick,
                channel: "*",
                names: &names,
            }
            .format(),
        );
        state.send_to(
            id,
            &Reply::EndOfNames {
                nick: &nick,
                channel: "*",
            }
            .format(),
        );
    }
}
