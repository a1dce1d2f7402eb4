// src/client/mod.rs

//! The client protocol engine: sends one command line at a time, reassembles
//! framed responses, and transparently follows admission redirects.

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::core::protocol::{is_sentinel_line, parse_redirect};

/// Cap on redirect hops for a single command, in case the rotation tier
/// bounces a client between instances.
const MAX_REDIRECT_HOPS: usize = 8;

/// Drives one server conversation. Holds the current connection and the most
/// recently issued command so a redirect can resend it verbatim.
pub struct ClientEngine {
    host: String,
    port: u16,
    conn: Option<BufReader<TcpStream>>,
}

impl ClientEngine {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            conn: None,
        }
    }

    /// The port currently in use (updated when a redirect is followed).
    pub fn current_port(&self) -> u16 {
        self.port
    }

    async fn connect(&mut self) -> Result<()> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", self.host, self.port))?;
        debug!("Connected to {}:{}", self.host, self.port);
        self.conn = Some(BufReader::new(stream));
        Ok(())
    }

    /// Sends one command and returns the response body, following redirects.
    ///
    /// The response may arrive split across any number of physical reads;
    /// lines are accumulated until a sentinel is seen. Either sentinel
    /// convention (a lone `END` line or a blank line) terminates the
    /// response.
    pub async fn exchange(&mut self, command: &str) -> Result<Vec<String>> {
        for _ in 0..MAX_REDIRECT_HOPS {
            if self.conn.is_none() {
                self.connect().await?;
            }
            let conn = self.conn.as_mut().expect("connected above");

            conn.write_all(command.as_bytes()).await?;
            conn.write_all(b"\n").await?;
            conn.flush().await?;

            let mut body = Vec::new();
            loop {
                let mut line = String::new();
                let n = conn.read_line(&mut line).await?;
                if n == 0 {
                    self.conn = None;
                    bail!("Connection closed before the response completed");
                }
                let line = line.trim_end_matches(['\n', '\r']);

                if body.is_empty()
                    && let Some(port) = parse_redirect(line)
                {
                    // Close, reconnect to the announced port, resend the
                    // command verbatim, resume reading.
                    debug!("Redirected to port {port}");
                    self.conn = None;
                    self.port = port;
                    break;
                }
                if is_sentinel_line(line) {
                    return Ok(body);
                }
                body.push(line.to_string());
            }
        }
        Err(anyhow!(
            "Gave up after {MAX_REDIRECT_HOPS} redirects; the mirror rotation may be looping"
        ))
    }

    /// Sends `quitc` and verifies the server closes the connection without
    /// writing any further response bytes.
    pub async fn quit(&mut self) -> Result<()> {
        if self.conn.is_none() {
            return Ok(());
        }
        let conn = self.conn.as_mut().expect("checked above");
        conn.write_all(b"quitc\n").await?;
        conn.flush().await?;

        let mut trailing = String::new();
        let n = conn.read_line(&mut trailing).await?;
        self.conn = None;
        if n != 0 {
            bail!("Server sent {n} unexpected bytes after quitc");
        }
        Ok(())
    }
}

/// The interactive client loop: read a command from the terminal, exchange
/// it, print the response body.
pub async fn run(host: &str, port: u16) -> Result<()> {
    let mut engine = ClientEngine::new(host, port);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt()?;
        let Some(line) = stdin.next_line().await? else {
            // Terminal closed; leave the server session cleanly.
            engine.quit().await?;
            return Ok(());
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "quitc" {
            engine.quit().await?;
            return Ok(());
        }

        match engine.exchange(command).await {
            Ok(body) => {
                for response_line in &body {
                    println!("{response_line}");
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn print_prompt() -> Result<()> {
    use std::io::Write;
    print!("Please enter the command: ");
    std::io::stdout().flush()?;
    Ok(())
}
