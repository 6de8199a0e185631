//! Load-test client: floods the server with many virtual users that
//! register, join one shared channel and chat on a fixed interval.
//!
//! Usage: stress_client <host> <port> <password> [clients]

use std::error::Error;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_owned());
    let port = args.next().unwrap_or_else(|| "6667".to_owned());
    let password = args.next().unwrap_or_else(|| "secret".to_owned());
    let num_clients: usize = args.next().and_then(|n| n.parse().ok()).unwrap_or(1000);
    let server_addr = format!("{host}:{port}");
    let interval_ms = 1000;

    println!("Starting stress test: {num_clients} clients against {server_addr}...");

    for i in 0..num_clients {
        let addr = server_addr.clone();
        let password = password.clone();
        tokio::spawn(async move {
            if let Err(e) = run_client(i, &addr, &password, interval_ms).await {
                eprintln!("Client {i} error: {e}");
            }
        });

        // Small delay between spawns to avoid overwhelming the OS accept() queue
        time::sleep(Duration::from_millis(5)).await;
    }

    // Keep the main task alive forever
    std::future::pending::<()>().await;
    Ok(())
}

async fn run_client(id: usize, addr: &str, password: &str, interval: u64) -> io::Result<()> {
    let mut stream = TcpStream::connect(addr).await?;
    let nick = format!("bot{id}");

    // 1. Handshake
    let login = format!(
        "PASS {password}\r\nNICK {nick}\r\nUSER {nick} 0 * :LoadTester\r\n"
    );
    stream.write_all(login.as_bytes()).await?;

    // 2. Join a common channel to exercise the broadcast fan-out
    stream.write_all(b"JOIN #stress_test\r\n").await?;

    let mut ticker = time::interval(Duration::from_millis(interval));
    let mut drain = [0u8; 4096];
    let mut cpt = 0_usize;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let msg = format!(
                    "PRIVMSG #stress_test :Message from {nick} - Load Testing...{cpt}\r\n"
                );
                cpt += 1;
                if stream.write_all(msg.as_bytes()).await.is_err() {
                    break; // Connection lost
                }
            }
            // Keep the receive window open so the server never backs up.
            read = stream.read(&mut drain) => {
                match read {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        }
    }
    Ok(())
}
