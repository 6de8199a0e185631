//! PRIVMSG delivery.

use crate::client::ClientId;
use crate::constants::MAX_MESSAGE_LENGTH;
use crate::handlers::{display_nick, require_registered};
use crate::registry::ServerState;
use crate::replies::Reply;

// 3.3.1 Private messages
//
//       Command: PRIVMSG
//    Parameters: <msgtarget> <text to be sent>
//
//    PRIVMSG is used to send private messages between users, as well as
//    to send messages to channels.  <msgtarget> is usually the nickname
//    of the recipient of the message, or a channel name.
//
//    Channel deliveries exclude the sender; a client never hears its
//    own PRIVMSG back.
pub fn handle_privmsg(state: &ServerState, id: ClientId, params: &[String]) {
    if !require_registered(state, id) {
        return;
    }

    let nick = display_nick(state, id);
    if params.is_empty() {
        state.send_to(id, &Reply::ErrNoRecipient { nick: &nick }.format());
        return;
    }
    if params.len() < 2 {
        state.send_to(id, &Reply::ErrNoTextToSend { nick: &nick }.format());
        return;
    }

    let Some(prefix) = state.clients.get(&id).map(|client| client.prefix()) else {
        return;
    };
    let targets = params[0].as_str();
    let text = params[1..].join(" ");
    let line = format!(":{prefix} PRIVMSG {targets} :{text}");
    if line.len() + 2 > MAX_MESSAGE_LENGTH {
        state.send_to(id, &Reply::ErrMessageTooLong { nick: &nick }.format());
        return;
    }

    for target in targets.split(',') {
        if target.starts_with('#') {
            deliver_to_channel(state, id, &nick, target, &line);
        } else {
            deliver_to_nick(state, id, &nick, target, &line);
        }
    }
}

fn deliver_to_channel(state: &ServerState, id: ClientId, nick: &str, target: &str, line: &str) {
    let key = ServerState::channel_key(target);
    let membership = state.channels.get(&key).map(|chan| chan.is_member(id));
    match membership {
        None => {
            state.send_to(
                id,
                &Reply::ErrNoSuchChannel {
                    nick,
                    channel: target,
                }
                .format(),
            );
        }
        Some(false) => {
            state.send_to(
                id,
                &Reply::ErrCannotSendToChan {
                    nick,
                    channel: target,
                }
                .format(),
            );
        }
        Some(true) => state.broadcast(&key, line, Some(id)),
    }
}

fn deliver_to_nick(state: &ServerState, id: ClientId, nick: &str, target: &str, line: &str) {
    match state.client_by_nick(target) {
        Some(target_id) => state.send_to(target_id, line),
        None => {
            state.send_to(id, &Reply::ErrNoSuchNick { nick, target }.format());
        }
    }
}
