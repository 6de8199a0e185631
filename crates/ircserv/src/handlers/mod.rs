pub mod channels;
pub mod messages;
pub mod misc;
pub mod registration;

use log::info;

use crate::client::ClientId;
use crate::message::Message;
use crate::registry::ServerState;
use crate::replies::Reply;

/// Command verbs are accepted only in their uppercase spelling; nothing
/// is canonicalized on the way in.
fn is_uppercase(command: &str) -> bool {
    !command.is_empty() && !command.bytes().any(|b| b.is_ascii_lowercase())
}

/// Entry point for one complete inbound line from a connection.
/// Parses the frame, enforces the uppercase contract, and routes to the
/// command handler. Unknown ids are tolerated: the connection may have
/// been torn down while this line waited in the event queue.
pub fn dispatch_line(state: &ServerState, id: ClientId, line: &str) {
    info!(">> incoming [{id}] {line}");
    if !state.clients.contains_key(&id) {
        return;
    }

    let Ok(message) = Message::parse(line) else {
        return;
    };

    let command = message.command.as_str();
    if !is_uppercase(command) {
        state.send_to(id, &Reply::ErrLowercaseCommand { command }.format());
        return;
    }

    let params = &message.params;
    match command {
        "PASS" => registration::handle_pass(state, id, params),
        "NICK" => registration::handle_nick(state, id, params),
        "USER" => registration::handle_user(state, id, params),
        "JOIN" => channels::handle_join(state, id, params),
        "PART" => channels::handle_part(state, id, params),
        "MODE" => channels::handle_mode(state, id, params),
        "INVITE" => channels::handle_invite(state, id, params),
        "KICK" => channels::handle_kick(state, id, params),
        "TOPIC" => channels::handle_topic(state, id, params),
        "NAMES" => channels::handle_names(state, id, params),
        "PRIVMSG" => messages::handle_privmsg(state, id, params),
        "PING" => misc::handle_ping(state, id, params),
        "QUIT" => misc::handle_quit(state, id, params),
        _ => {
            let nick = display_nick(state, id);
            state.send_to(
                id,
                &Reply::ErrUnknownCommand {
                    nick: &nick,
                    command,
                }
                .format(),
            );
        }
    }
}

/// The acting connection's reply target (`*` before a nickname exists).
pub(crate) fn display_nick(state: &ServerState, id: ClientId) -> String {
    state
        .clients
        .get(&id)
        .map(|client| client.display_nick().to_owned())
        .unwrap_or_else(|| "*".to_owned())
}

/// Commands past the registration wall answer 451 until PASS, NICK and
/// USER have all been accepted.
pub(crate) fn require_registered(state: &ServerState, id: ClientId) -> bool {
    let registered = state
        .clients
        .get(&id)
        .map(|client| client.registered)
        .unwrap_or(false);
    if !registered {
        let nick = display_nick(state, id);
        state.send_to(id, &Reply::ErrNotRegistered { nick: &nick }.format());
    }
    registered
}

/// 461 for a command that arrived short of parameters.
pub(crate) fn need_more_params(state: &ServerState, id: ClientId, command: &str) {
    let nick = display_nick(state, id);
    state.send_to(
        id,
        &Reply::ErrNeedMoreParams {
            nick: &nick,
            command,
        }
        .format(),
    );
}
