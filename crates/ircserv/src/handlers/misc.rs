//! PING and QUIT.

use crate::client::ClientId;
use crate::handlers::need_more_params;
use crate::registry::ServerState;
use crate::replies::Reply;

// 3.7.2 Ping message
//
//       Command: PING
//    Parameters: <server1>
//
//    When a PING message is received, the appropriate PONG message MUST
//    be sent as reply as soon as possible.
pub fn handle_ping(state: &ServerState, id: ClientId, params: &[String]) {
    let Some(token) = params.first() else {
        need_more_params(state, id, "PING");
        return;
    };
    state.send_to(id, &Reply::Pong { token }.format());
}

// 3.1.7 Quit
//
//       Command: QUIT
//    Parameters: [ <Quit Message> ]
//
//    A client session is terminated with a quit message.  The server
//    acknowledges this by sending an ERROR message to the client and
//    relays the quit to every channel the client was on.
pub fn handle_quit(state: &ServerState, id: ClientId, params: &[String]) {
    let message = if params.is_empty() {
        "Client Quit".to_owned()
    } else {
        params.join(" ")
    };

    let Some(prefix) = state.clients.get(&id).map(|client| client.prefix()) else {
        return;
    };
    state.send_to(id, &Reply::ErrorClosingLink { message: &message }.format());

    let quit_line = format!(":{prefix} QUIT :{message}");
    log::info!("[{id}] quit: {message}");
    state.disconnect(id, Some(&quit_line));
}
