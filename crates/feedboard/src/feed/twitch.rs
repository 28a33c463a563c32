//! Anonymous, read-only Twitch chat over plain IRC.

use super::{Connector, Feed, FeedError};
use crate::source::SourceId;
use futures::future::BoxFuture;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_stream::wrappers::SplitStream;

pub const TWITCH_IRC_ADDR: &str = "irc.chat.twitch.tv:6667";

/// `justinfan*` nicknames are accepted without a password, read-only.
const ANONYMOUS_NICK: &str = "justinfan123123";

/// The parts of an IRC line a chat reader cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcMessage<'a> {
    Ping(&'a str),
    Privmsg { channel: &'a str, text: &'a str },
    Other(&'a str),
}

/// Parse one IRC line, tolerating IRCv3 tags and a source prefix.
///
/// CTCP `ACTION` payloads (`/me`) are unwrapped to their text.
pub fn parse_line(line: &str) -> Option<IrcMessage<'_>> {
    let mut rest = line.trim_end_matches(['\r', '\n']);
    if rest.starts_with('@') {
        rest = rest.split_once(' ')?.1;
    }
    if rest.starts_with(':') {
        rest = rest.split_once(' ')?.1;
    }
    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));
    match command {
        "" => None,
        "PING" => Some(IrcMessage::Ping(params.strip_prefix(':').unwrap_or(params))),
        "PRIVMSG" => {
            let (target, text) = params.split_once(" :")?;
            let target = target.trim();
            let channel = target.strip_prefix('#').unwrap_or(target);
            let text = text
                .strip_prefix("\u{1}ACTION ")
                .and_then(|t| t.strip_suffix('\u{1}'))
                .unwrap_or(text);
            Some(IrcMessage::Privmsg { channel, text })
        }
        other => Some(IrcMessage::Other(other)),
    }
}

/// Opens a [`TwitchFeed`] per channel against one IRC endpoint.
#[derive(Debug, Clone)]
pub struct TwitchConnector {
    addr: String,
}

impl TwitchConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Default for TwitchConnector {
    fn default() -> Self {
        Self::new(TWITCH_IRC_ADDR)
    }
}

impl Connector for TwitchConnector {
    fn open(&self, source: &SourceId) -> Box<dyn Feed> {
        Box::new(TwitchFeed::new(source.clone(), self.addr.clone()))
    }
}

struct Connection {
    lines: SplitStream<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

/// Chat messages of a single Twitch channel.
pub struct TwitchFeed {
    source: SourceId,
    addr: String,
    conn: Option<Connection>,
}

impl TwitchFeed {
    pub fn new(source: SourceId, addr: impl Into<String>) -> Self {
        Self {
            source,
            addr: addr.into(),
            conn: None,
        }
    }
}

async fn send_line(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await
}

impl Feed for TwitchFeed {
    fn source(&self) -> &SourceId {
        &self.source
    }

    fn connect(&mut self) -> BoxFuture<'_, Result<(), FeedError>> {
        Box::pin(async move {
            let stream = TcpStream::connect(&self.addr).await?;
            let (read, mut writer) = stream.into_split();
            send_line(&mut writer, &format!("NICK {ANONYMOUS_NICK}")).await?;
            // Twitch channel names are lowercase.
            let channel = self.source.as_str().to_ascii_lowercase();
            send_line(&mut writer, &format!("JOIN #{channel}")).await?;
            self.conn = Some(Connection {
                lines: SplitStream::new(BufReader::new(read).split(b'\n')),
                writer,
            });
            Ok(())
        })
    }

    fn next_message(&mut self) -> BoxFuture<'_, Result<Option<String>, FeedError>> {
        Box::pin(async move {
            let conn = self.conn.as_mut().ok_or(FeedError::NotConnected)?;
            while let Some(raw) = conn.lines.next().await {
                // Chat text is not guaranteed to be UTF-8; only transport
                // errors end the feed.
                let raw = raw?;
                let line = String::from_utf8_lossy(&raw);
                match parse_line(&line) {
                    Some(IrcMessage::Ping(token)) => {
                        send_line(&mut conn.writer, &format!("PONG :{token}")).await?;
                    }
                    Some(IrcMessage::Privmsg { channel, text })
                        if channel.eq_ignore_ascii_case(self.source.as_str()) =>
                    {
                        return Ok(Some(text.to_owned()));
                    }
                    _ => {}
                }
            }
            Ok(None)
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut conn) = self.conn.take() {
                let channel = self.source.as_str().to_ascii_lowercase();
                let _ = send_line(&mut conn.writer, &format!("PART #{channel}")).await;
                let _ = conn.writer.shutdown().await;
            }
        })
    }
}
