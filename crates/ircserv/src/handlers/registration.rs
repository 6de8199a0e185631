//! PASS / NICK / USER: the registration state machine.
//!
//! The handshake is strictly ordered. PASS must come first, then NICK,
//! then USER; each step out of order earns a 462 explaining what was
//! expected. Completing all three flips the connection to registered
//! and emits the 001-004 welcome burst.

use crate::client::ClientId;
use crate::constants::ERR_ALREADYREGISTRED_STR;
use crate::handlers::{display_nick, need_more_params};
use crate::parsers::is_valid_nickname;
use crate::registry::ServerState;
use crate::replies::Reply;

// 3.1.1 Password message
//
//       Command: PASS
//    Parameters: <password>
//
//    The PASS command is used to set a 'connection password'.  The
//    optional password can and MUST be set before any attempt to
//    register the connection is made.
pub fn handle_pass(state: &ServerState, id: ClientId, params: &[String]) {
    if params.len() != 1 {
        need_more_params(state, id, "PASS");
        return;
    }

    let nick = display_nick(state, id);
    let Some(flags) = state
        .clients
        .get(&id)
        .map(|c| (c.pass_accepted, c.nick_set, c.user_set))
    else {
        return;
    };
    let (pass_accepted, nick_set, user_set) = flags;

    if pass_accepted {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "PASS already accepted, proceed with NICK and USER",
            }
            .format(),
        );
        return;
    }
    if nick_set || user_set {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "PASS must be sent before NICK or USER",
            }
            .format(),
        );
        return;
    }
    if !state.password_matches(&params[0]) {
        state.send_to(id, &Reply::ErrPasswdMismatch { nick: &nick }.format());
        return;
    }

    if let Some(mut client) = state.clients.get_mut(&id) {
        client.pass_accepted = true;
    }
    state.send_to(id, &Reply::PassAccepted.format());
}

// 3.1.2 Nick message
//
//       Command: NICK
//    Parameters: <nickname>
//
//    NICK command is used to give user a nickname or change the
//    existing one.
pub fn handle_nick(state: &ServerState, id: ClientId, params: &[String]) {
    let nick = display_nick(state, id);
    if params.is_empty() {
        state.send_to(id, &Reply::ErrNoNicknameGiven { nick: &nick }.format());
        return;
    }

    let Some(snapshot) = state.clients.get(&id).map(|c| {
        (
            c.pass_accepted,
            c.user_set,
            c.registered,
            c.nickname.clone(),
            c.prefix(),
        )
    }) else {
        return;
    };
    let (pass_accepted, user_set, registered, old_nick, old_prefix) = snapshot;

    if !pass_accepted {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "You must send PASS before NICK",
            }
            .format(),
        );
        return;
    }
    if user_set && !registered {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "NICK must be sent before USER",
            }
            .format(),
        );
        return;
    }

    let wanted = params[0].as_str();
    if !is_valid_nickname(wanted) {
        state.send_to(
            id,
            &Reply::ErrErroneusNickname {
                nick: &nick,
                attempted: wanted,
            }
            .format(),
        );
        return;
    }
    if state.nick_in_use(wanted, id) {
        state.send_to(
            id,
            &Reply::ErrNicknameInUse {
                nick: "*",
                attempted: wanted,
            }
            .format(),
        );
        return;
    }

    if let Some(mut client) = state.clients.get_mut(&id) {
        client.set_nickname(wanted);
    }

    if registered {
        // Nick change on a live connection: re-index and echo the
        // change back to the actor.
        state.bind_nick(wanted, id, Some(&old_nick));
        state.send_to(
            id,
            &Reply::NickChanged {
                old_prefix: &old_prefix,
                nick: wanted,
            }
            .format(),
        );
    } else {
        state.send_to(id, &Reply::NickSet { nick: wanted }.format());
        complete_registration(state, id);
    }
}

// 3.1.3 User message
//
//       Command: USER
//    Parameters: <user> <mode> <unused> <realname>
//
//    The USER command is used at the beginning of connection to specify
//    the username and realname of a new user. It must be noted that
//    realname parameter must be the last parameter, because it may
//    contain space characters and must be prefixed with a colon (':')
//    to make sure this is recognised as such.
pub fn handle_user(state: &ServerState, id: ClientId, params: &[String]) {
    let nick = display_nick(state, id);
    if params.len() < 4 {
        need_more_params(state, id, "USER");
        return;
    }

    let Some(flags) = state
        .clients
        .get(&id)
        .map(|c| (c.pass_accepted, c.nick_set, c.user_set, c.registered))
    else {
        return;
    };
    let (pass_accepted, nick_set, user_set, registered) = flags;

    if !pass_accepted {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "You must send PASS before USER",
            }
            .format(),
        );
        return;
    }
    if registered {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: ERR_ALREADYREGISTRED_STR,
            }
            .format(),
        );
        return;
    }
    if user_set {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "USER already set",
            }
            .format(),
        );
        return;
    }
    if !nick_set {
        state.send_to(
            id,
            &Reply::ErrAlreadyRegistred {
                nick: &nick,
                detail: "NICK must be sent before USER",
            }
            .format(),
        );
        return;
    }

    if params[1] != "0" {
        state.send_to(
            id,
            &Reply::ErrUserSyntax {
                nick: &nick,
                detail: "Mode must be 0",
            }
            .format(),
        );
        return;
    }
    // With a trailing parameter the realname is one element; extra
    // middles mean a multi-word realname without the leading colon.
    if params.len() > 4 {
        state.send_to(
            id,
            &Reply::ErrUserSyntax {
                nick: &nick,
                detail: "Use : for multi-word realnames",
            }
            .format(),
        );
        return;
    }

    if let Some(mut client) = state.clients.get_mut(&id) {
        client.set_user(&params[0], &params[3]);
    }
    complete_registration(state, id);
}

/// Flips to registered when the PASS+NICK+USER triple is complete,
/// indexes the nickname, and emits 001-004.
fn complete_registration(state: &ServerState, id: ClientId) {
    let became_registered = state
        .clients
        .get_mut(&id)
        .map(|mut client| client.try_register())
        .unwrap_or(false);
    if !became_registered {
        return;
    }

    let Some((nick, user, host)) = state
        .clients
        .get(&id)
        .map(|c| (c.nickname.clone(), c.username.clone(), c.hostname.clone()))
    else {
        return;
    };
    state.bind_nick(&nick, id, None);
    log::info!("[{id}] {nick} registered");

    state.send_to(
        id,
        &Reply::Welcome {
            nick: &nick,
            user: &user,
            host: &host,
        }
        .format(),
    );
    state.send_to(id, &Reply::YourHost { nick: &nick }.format());
    state.send_to(
        id,
        &Reply::Created {
            nick: &nick,
            date: &state.created,
        }
        .format(),
    );
    state.send_to(id, &Reply::MyInfo { nick: &nick }.format());
}
