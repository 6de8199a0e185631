use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use ircserv::config::{Config, Settings};
use ircserv::server::Server;

use super::client::PASSWORD;

/// A real server listening on localhost, torn down when dropped.
pub struct TestServer {
    port: u16,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(port: u16) -> io::Result<TestServer> {
        let settings = Settings {
            port,
            password: PASSWORD.to_owned(),
            config: Config::default(),
        };
        let handle = tokio::spawn(async move {
            let _ = Server::new(settings).run().await;
        });

        // Wait for the listener to come up.
        for _ in 0..100 {
            if let Ok(probe) = TcpStream::connect(("127.0.0.1", port)).await {
                drop(probe);
                return Ok(TestServer { port, handle });
            }
            sleep(Duration::from_millis(10)).await;
        }
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "test server did not start listening",
        ))
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
