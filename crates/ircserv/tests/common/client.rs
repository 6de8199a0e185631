use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

pub const PASSWORD: &str = "secret";
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// A scripted IRC client speaking raw lines over a real socket.
pub struct TestClient {
    pub nick: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(port: u16, nick: &str) -> io::Result<TestClient> {
        let stream = TcpStream::connect(("127.0.0.1", port)).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(TestClient {
            nick: nick.to_owned(),
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
    }

    /// One reply line, CRLF stripped. Errors out after two quiet
    /// seconds so a missing reply fails the test instead of hanging it.
    pub async fn recv_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no reply within timeout"))??;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed",
            ));
        }
        Ok(line.trim_end().to_owned())
    }

    /// Reads until a line containing `pattern` shows up and returns it.
    pub async fn recv_until(&mut self, pattern: &str) -> io::Result<String> {
        loop {
            let line = self.recv_line().await?;
            if line.contains(pattern) {
                return Ok(line);
            }
        }
    }

    /// Asserts that no line containing `pattern` arrives within the
    /// grace window. Used for the PRIVMSG no-self-echo rule.
    pub async fn assert_no_line(&mut self, pattern: &str, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            let mut line = String::new();
            let read = tokio::time::timeout_at(deadline, self.reader.read_line(&mut line)).await;
            match read {
                Err(_) => return, // window elapsed quietly
                Ok(Ok(0)) => return,
                Ok(Ok(_)) => {
                    assert!(
                        !line.contains(pattern),
                        "unexpected line matching {pattern:?}: {line:?}"
                    );
                }
                Ok(Err(_)) => return,
            }
        }
    }

    /// PASS/NICK/USER handshake, waiting for the 001 welcome.
    pub async fn register(&mut self) -> io::Result<()> {
        let nick = self.nick.clone();
        self.send_line(&format!("PASS {PASSWORD}")).await?;
        self.send_line(&format!("NICK {nick}")).await?;
        self.send_line(&format!("USER {nick} 0 * :Test User")).await?;
        self.recv_until(" 001 ").await?;
        Ok(())
    }

    /// JOIN and wait for the end of the names burst.
    pub async fn join(&mut self, channel: &str) -> io::Result<()> {
        self.send_line(&format!("JOIN {channel}")).await?;
        self.recv_until(" 366 ").await?;
        Ok(())
    }

    pub async fn privmsg(&mut self, target: &str, text: &str) -> io::Result<()> {
        self.send_line(&format!("PRIVMSG {target} :{text}")).await
    }

    pub async fn quit(&mut self, message: &str) -> io::Result<()> {
        self.send_line(&format!("QUIT :{message}")).await
    }
}
