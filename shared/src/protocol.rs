//! Line-delimited wire protocol: `TAG|payload`, one message per line
//!
//! Every message is a single UTF-8 line: a short fixed tag, the `|`
//! separator, then a JSON encoding of the variant's fields. There is no
//! length prefix, checksum, or version field; framing relies entirely on
//! JSON never emitting a raw newline. Field names are PascalCase on the
//! wire (`HELLO|{"Text":"...","Player":"A"}`).

use crate::board::{BoardSnapshot, Player};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the type tag and the JSON payload.
pub const SEPARATOR: char = '|';

const TAG_HELLO: &str = "HELLO";
const TAG_WAIT: &str = "WAIT";
const TAG_BOARD: &str = "BOARD";
const TAG_MOVE: &str = "MOVE";
const TAG_ERROR: &str = "ERROR";

/// Errors raised while encoding or decoding a wire line.
///
/// All decode variants are fatal to the offending connection: a peer that
/// has lost framing cannot be trusted to resume it. Encode failures are the
/// sender's problem and never reach the wire.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The separator is missing or the tag position is empty.
    #[error("malformed envelope: {0:?}")]
    MalformedEnvelope(String),

    /// The tag is not one of the known message types.
    #[error("unknown message type: {0:?}")]
    UnknownMessageType(String),

    /// The payload does not deserialize into the shape the tag requires.
    #[error("payload does not match its tag: {0}")]
    PayloadDecode(#[source] serde_json::Error),

    /// The payload could not be serialized on the sending side.
    #[error("failed to serialize payload: {0}")]
    PayloadEncode(#[source] serde_json::Error),
}

/// Every message the server and client can exchange.
///
/// A closed union: dispatch sites match exhaustively so a new variant is a
/// compile error everywhere it matters, not a silent default branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The peer seat is still empty; sit tight.
    Wait,
    /// Greeting sent on connect, naming the assigned seat.
    Hello { text: String, player: Player },
    /// The authoritative board state.
    Board { snapshot: BoardSnapshot },
    /// A proposed move at column `x`, row `y`.
    Move { x: i32, y: i32 },
    /// A rejected move or other player-visible failure.
    Error { text: String },
}

#[derive(Serialize, Deserialize)]
struct WaitPayload {}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HelloPayload {
    text: String,
    player: Player,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BoardPayload {
    snapshot: BoardSnapshot,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MovePayload {
    x: i32,
    y: i32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorPayload {
    text: String,
}

/// Encodes a message as one wire line, without the trailing newline.
pub fn encode(message: &Message) -> Result<String, ProtocolError> {
    let (tag, payload) = match message {
        Message::Wait => (TAG_WAIT, serde_json::to_string(&WaitPayload {})),
        Message::Hello { text, player } => (
            TAG_HELLO,
            serde_json::to_string(&HelloPayload {
                text: text.clone(),
                player: *player,
            }),
        ),
        Message::Board { snapshot } => (
            TAG_BOARD,
            serde_json::to_string(&BoardPayload {
                snapshot: snapshot.clone(),
            }),
        ),
        Message::Move { x, y } => (TAG_MOVE, serde_json::to_string(&MovePayload { x: *x, y: *y })),
        Message::Error { text } => (
            TAG_ERROR,
            serde_json::to_string(&ErrorPayload { text: text.clone() }),
        ),
    };
    let payload = payload.map_err(ProtocolError::PayloadEncode)?;
    Ok(format!("{tag}{SEPARATOR}{payload}"))
}

/// Decodes one wire line back into a [`Message`].
///
/// Splits on the first separator only, so a `|` inside a JSON string is
/// harmless.
pub fn decode(line: &str) -> Result<Message, ProtocolError> {
    let (tag, payload) = line
        .split_once(SEPARATOR)
        .ok_or_else(|| ProtocolError::MalformedEnvelope(line.to_string()))?;
    if tag.is_empty() {
        return Err(ProtocolError::MalformedEnvelope(line.to_string()));
    }
    match tag {
        TAG_WAIT => {
            let _: WaitPayload = parse(payload)?;
            Ok(Message::Wait)
        }
        TAG_HELLO => {
            let p: HelloPayload = parse(payload)?;
            Ok(Message::Hello {
                text: p.text,
                player: p.player,
            })
        }
        TAG_BOARD => {
            let p: BoardPayload = parse(payload)?;
            Ok(Message::Board {
                snapshot: p.snapshot,
            })
        }
        TAG_MOVE => {
            let p: MovePayload = parse(payload)?;
            Ok(Message::Move { x: p.x, y: p.y })
        }
        TAG_ERROR => {
            let p: ErrorPayload = parse(payload)?;
            Ok(Message::Error { text: p.text })
        }
        _ => Err(ProtocolError::UnknownMessageType(tag.to_string())),
    }
}

fn parse<'a, T: Deserialize<'a>>(payload: &'a str) -> Result<T, ProtocolError> {
    serde_json::from_str(payload).map_err(ProtocolError::PayloadDecode)
}
