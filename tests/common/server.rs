//! Scripted IRC server.
//!
//! Accepts a single connection, answers the relay's registration and JOIN
//! the way a real server would (or misbehaves on request), and records every
//! line the client sends.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// How the server treats its one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Welcome, confirm the JOIN, wait for the client to hang up.
    Normal,
    /// Claim the first nick is taken before welcoming.
    NickInUse,
    /// Never send the welcome.
    Silent,
    /// Wait this long before the welcome.
    SlowWelcome(Duration),
    /// Ban the client from the channel.
    RefuseJoin,
    /// Drop the connection right after the welcome.
    HangUpAfterWelcome,
}

/// A test IRC server.
pub struct TestIrcServer {
    addr: SocketAddr,
    handle: JoinHandle<anyhow::Result<Vec<String>>>,
}

impl TestIrcServer {
    /// Bind to an ephemeral port and serve one client in the background.
    pub async fn spawn(behavior: Behavior) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(serve(listener, behavior));
        Ok(Self { addr, handle })
    }

    /// Get the server address as `host:port`.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Wait for the client to disconnect and return every line it sent.
    pub async fn received(self) -> anyhow::Result<Vec<String>> {
        let joined = tokio::time::timeout(Duration::from_secs(5), self.handle).await?;
        joined?
    }
}

async fn serve(listener: TcpListener, behavior: Behavior) -> anyhow::Result<Vec<String>> {
    let (stream, _) = listener.accept().await?;
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut received = Vec::new();
    let mut nick = String::new();
    let mut rejected_first_nick = false;
    let mut line = String::new();

    loop {
        line.clear();
        // A reset from an aborted client ends the conversation like EOF.
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let text = line.trim_end_matches(['\r', '\n']).to_string();
        received.push(text.clone());

        let mut words = text.splitn(2, ' ');
        let command = words.next().unwrap_or_default();
        let args = words.next().unwrap_or_default();

        let reply = match command {
            "NICK" => {
                nick = args.to_string();
                match behavior {
                    Behavior::NickInUse if !rejected_first_nick => {
                        rejected_first_nick = true;
                        Some(format!(":fake.server 433 * {} :Nickname is already in use", nick))
                    }
                    // The retry arrives after USER, so it completes registration.
                    Behavior::NickInUse => Some(welcome(&nick)),
                    _ => None,
                }
            }
            "USER" => match behavior {
                Behavior::Silent | Behavior::NickInUse => None,
                Behavior::SlowWelcome(delay) => {
                    sleep(delay).await;
                    Some(welcome(&nick))
                }
                Behavior::HangUpAfterWelcome => {
                    let _ = writer.write_all(welcome(&nick).as_bytes()).await;
                    break;
                }
                _ => Some(format!("PING :fake.server\r\n{}", welcome(&nick))),
            },
            "JOIN" => match behavior {
                Behavior::RefuseJoin => Some(format!(
                    ":fake.server 474 {} {} :Cannot join channel (+b)",
                    nick, args
                )),
                _ => Some(format!(":{}!relay@127.0.0.1 JOIN :{}", nick, args)),
            },
            _ => None,
        };

        if let Some(reply) = reply {
            let framed = format!("{}\r\n", reply.trim_end());
            if writer.write_all(framed.as_bytes()).await.is_err() {
                break;
            }
        }
    }

    Ok(received)
}

fn welcome(nick: &str) -> String {
    format!(":fake.server 001 {} :Welcome to the test network\r\n", nick)
}
