//! Integration tests for channel membership and messaging.

mod common;

use std::time::Duration;

use common::{TestClient, TestServer};

#[tokio::test]
async fn join_broadcasts_and_lists_names() {
    let server = TestServer::spawn(17620).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();

    alice.send_line("JOIN #lab").await.unwrap();
    let join = alice.recv_until(" JOIN ").await.expect("self JOIN echo");
    assert_eq!(join, ":alice!alice@127.0.0.1 JOIN #lab");
    let names = alice.recv_until(" 353 ").await.expect("353");
    assert_eq!(names, ":ircserv 353 alice = #lab :@alice");
    alice.recv_until(" 366 ").await.expect("366");

    bob.send_line("JOIN #lab").await.unwrap();
    // The existing member sees the newcomer's JOIN.
    let seen = alice.recv_until(" JOIN ").await.expect("bob's JOIN");
    assert_eq!(seen, ":bob!bob@127.0.0.1 JOIN #lab");
    // The newcomer's names list shows the operator prefix on alice only.
    let names = bob.recv_until(" 353 ").await.expect("353");
    assert_eq!(names, ":ircserv 353 bob = #lab :@alice bob");
}

#[tokio::test]
async fn duplicate_join_is_refused() {
    let server = TestServer::spawn(17621).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    alice.register().await.unwrap();
    alice.join("#lab").await.unwrap();

    alice.send_line("JOIN #lab").await.unwrap();
    let reply = alice.recv_until(" 443 ").await.expect("443");
    assert!(reply.contains("You are already on that channel"));
}

#[tokio::test]
async fn channel_names_are_case_insensitive_but_display_preserved() {
    let server = TestServer::spawn(17622).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();

    alice.join("#Lab").await.unwrap();
    bob.send_line("JOIN #LAB").await.unwrap();
    // Both see the display casing picked by the creator.
    let seen = bob.recv_until(" JOIN ").await.unwrap();
    assert_eq!(seen, ":bob!bob@127.0.0.1 JOIN #Lab");
}

#[tokio::test]
async fn invalid_channel_names_are_rejected() {
    let server = TestServer::spawn(17623).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    alice.register().await.unwrap();

    alice.send_line("JOIN #").await.unwrap();
    alice.recv_until(" 403 ").await.expect("403 for lone #");

    let long = format!("JOIN #{}", "c".repeat(50));
    alice.send_line(&long).await.unwrap();
    alice.recv_until(" 403 ").await.expect("403 for 51-byte name");
}

#[tokio::test]
async fn privmsg_reaches_members_but_never_echoes() {
    let server = TestServer::spawn(17624).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    let mut carol = TestClient::connect(server.port(), "carol").await.unwrap();
    for client in [&mut alice, &mut bob, &mut carol] {
        client.register().await.unwrap();
        client.join("#lab").await.unwrap();
    }
    // Drain the join broadcasts the earlier members received.
    bob.recv_until("carol!carol@127.0.0.1 JOIN").await.unwrap();

    alice.privmsg("#lab", "hello").await.unwrap();
    let to_bob = bob.recv_until(" PRIVMSG ").await.expect("bob copy");
    assert_eq!(to_bob, ":alice!alice@127.0.0.1 PRIVMSG #lab :hello");
    let to_carol = carol.recv_until(" PRIVMSG ").await.expect("carol copy");
    assert_eq!(to_carol, ":alice!alice@127.0.0.1 PRIVMSG #lab :hello");
    alice
        .assert_no_line("PRIVMSG #lab :hello", Duration::from_millis(300))
        .await;
}

#[tokio::test]
async fn privmsg_direct_to_nickname() {
    let server = TestServer::spawn(17625).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();

    alice.privmsg("bob", "psst").await.unwrap();
    let line = bob.recv_until(" PRIVMSG ").await.expect("direct message");
    assert_eq!(line, ":alice!alice@127.0.0.1 PRIVMSG bob :psst");

    alice.privmsg("nobody", "psst").await.unwrap();
    let reply = alice.recv_until(" 401 ").await.expect("401");
    assert!(reply.contains("nobody :No such nick"));
}

#[tokio::test]
async fn privmsg_requires_membership() {
    let server = TestServer::spawn(17626).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut eve = TestClient::connect(server.port(), "eve").await.unwrap();
    alice.register().await.unwrap();
    eve.register().await.unwrap();
    alice.join("#lab").await.unwrap();

    eve.privmsg("#lab", "let me in").await.unwrap();
    let reply = eve.recv_until(" 404 ").await.expect("404");
    assert!(reply.contains("Cannot send to channel"));

    eve.privmsg("#ghost", "anyone").await.unwrap();
    eve.recv_until(" 403 ").await.expect("403");
}

#[tokio::test]
async fn privmsg_missing_pieces() {
    let server = TestServer::spawn(17627).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    alice.register().await.unwrap();

    alice.send_line("PRIVMSG").await.unwrap();
    alice.recv_until(" 411 ").await.expect("411 without target");

    alice.send_line("PRIVMSG #lab").await.unwrap();
    alice.recv_until(" 412 ").await.expect("412 without text");
}

#[tokio::test]
async fn part_removes_and_destroys_empty_channels() {
    let server = TestServer::spawn(17628).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();
    alice.join("#lab").await.unwrap();
    bob.join("#lab").await.unwrap();

    bob.send_line("PART #lab :gotta go").await.unwrap();
    let seen = alice.recv_until(" PART ").await.expect("part broadcast");
    assert_eq!(seen, ":bob!bob@127.0.0.1 PART #lab :gotta go");

    alice.send_line("PART #lab").await.unwrap();
    alice.recv_until(" PART ").await.expect("own part echo");

    // Channel is gone: a message to it now reports no such channel.
    alice.privmsg("#lab", "anyone").await.unwrap();
    alice.recv_until(" 403 ").await.expect("channel destroyed");
}

#[tokio::test]
async fn rejoining_after_part_loses_operator_status() {
    let server = TestServer::spawn(17629).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();
    alice.join("#lab").await.unwrap();
    bob.join("#lab").await.unwrap();

    alice.send_line("PART #lab").await.unwrap();
    alice.recv_until(" PART ").await.unwrap();
    alice.send_line("JOIN #lab").await.unwrap();
    let names = alice.recv_until(" 353 ").await.expect("353 after rejoin");
    // Bob keeps the channel alive; the rejoiner is no longer op.
    assert_eq!(names, ":ircserv 353 alice = #lab :bob alice");
}

#[tokio::test]
async fn topic_set_and_read_back() {
    let server = TestServer::spawn(17630).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();
    alice.join("#lab").await.unwrap();
    bob.join("#lab").await.unwrap();

    // Empty topic reads back as 331.
    alice.send_line("TOPIC #lab").await.unwrap();
    let reply = alice.recv_until(" 331 ").await.expect("331");
    assert!(reply.contains("No topic is set"));

    alice.send_line("TOPIC #lab :plans for friday").await.unwrap();
    let seen = bob.recv_until(" TOPIC ").await.expect("topic broadcast");
    assert_eq!(seen, ":alice!alice@127.0.0.1 TOPIC #lab :plans for friday");

    bob.send_line("TOPIC #lab").await.unwrap();
    let topic = bob.recv_until(" 332 ").await.expect("332");
    assert_eq!(topic, ":ircserv 332 bob #lab :plans for friday");
    let provenance = bob.recv_until("Topic set by").await.expect("provenance");
    assert!(provenance.contains("Topic set by alice at "));
}

#[tokio::test]
async fn joining_a_channel_with_topic_receives_it() {
    let server = TestServer::spawn(17631).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    alice.register().await.unwrap();
    alice.join("#lab").await.unwrap();
    alice.send_line("TOPIC #lab :standing agenda").await.unwrap();
    alice.recv_until(" TOPIC ").await.unwrap();

    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    bob.register().await.unwrap();
    bob.send_line("JOIN #lab").await.unwrap();
    let topic = bob.recv_until(" 332 ").await.expect("332 on join");
    assert_eq!(topic, ":ircserv 332 bob #lab :standing agenda");
}

#[tokio::test]
async fn names_lists_stray_users_under_star() {
    let server = TestServer::spawn(17632).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut loner = TestClient::connect(server.port(), "loner").await.unwrap();
    alice.register().await.unwrap();
    loner.register().await.unwrap();
    alice.join("#lab").await.unwrap();

    alice.send_line("NAMES").await.unwrap();
    let lab = alice.recv_until(" 353 ").await.expect("channel names");
    assert_eq!(lab, ":ircserv 353 alice = #lab :@alice");
    let strays = alice.recv_until("= * :").await.expect("stray listing");
    assert!(strays.contains("loner"));

    // Unknown channels answer with just the end marker.
    alice.send_line("NAMES #nowhere").await.unwrap();
    let end = alice.recv_until(" 366 ").await.expect("366");
    assert!(end.contains("#nowhere :End of NAMES list"));
}

#[tokio::test]
async fn quit_propagates_to_all_shared_channels() {
    let server = TestServer::spawn(17633).await.expect("server");
    let mut alice = TestClient::connect(server.port(), "alice").await.unwrap();
    let mut bob = TestClient::connect(server.port(), "bob").await.unwrap();
    alice.register().await.unwrap();
    bob.register().await.unwrap();
    alice.join("#lab").await.unwrap();
    alice.join("#ops").await.unwrap();
    bob.join("#lab").await.unwrap();

    alice.quit("bye").await.unwrap();
    let error = alice.recv_until("ERROR").await.expect("ERROR to actor");
    assert_eq!(error, "ERROR :Closing link: bye");

    let seen = bob.recv_until(" QUIT ").await.expect("quit broadcast");
    assert_eq!(seen, ":alice!alice@127.0.0.1 QUIT :bye");

    // #ops emptied out with alice's departure.
    bob.send_line("JOIN #ops").await.unwrap();
    let names = bob.recv_until(" 353 ").await.expect("fresh #ops");
    assert_eq!(names, ":ircserv 353 bob = #ops :@bob");
}
