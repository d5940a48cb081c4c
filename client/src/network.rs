//! Client connection and the sequential read/dispatch loop

use crate::{input, rendering};
use log::{error, warn};
use shared::{protocol, BoardPhase, BoardSnapshot, Message, Player};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// A connected client: the socket halves, the seat the server assigned,
/// and the last board seen (used to re-prompt after a rejected move).
pub struct Client {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    seat: Player,
    last_snapshot: Option<BoardSnapshot>,
}

impl Client {
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half).lines(),
            writer: write_half,
            seat: Player::None,
            last_snapshot: None,
        })
    }

    /// Handles server messages one at a time until the game ends or the
    /// server closes the connection.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let Some(line) = self.reader.next_line().await? else {
                rendering::show_disconnect();
                return Ok(());
            };
            let message = match protocol::decode(&line) {
                Ok(message) => message,
                Err(e) => {
                    error!("could not decode server message: {e}");
                    return Err(e.into());
                }
            };
            if !self.handle_message(message).await? {
                return Ok(());
            }
        }
    }

    /// Dispatches one server message. Returns false once the game is over.
    async fn handle_message(
        &mut self,
        message: Message,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        match message {
            Message::Hello { text, player } => {
                rendering::show_hello(&text, player);
                self.seat = player;
            }
            Message::Wait => rendering::show_waiting(),
            Message::Board { snapshot } => {
                rendering::show_board(&snapshot);
                if snapshot.phase != BoardPhase::Playing {
                    rendering::show_game_over(&snapshot.phase);
                    return Ok(false);
                }
                let size = snapshot.size;
                self.last_snapshot = Some(snapshot);
                self.prompt_and_send(size).await?;
            }
            Message::Error { text } => {
                rendering::show_error(&text);
                // Re-prompt against the last board we saw; the server did
                // not change anything.
                if let Some(snapshot) = &self.last_snapshot {
                    let size = snapshot.size;
                    self.prompt_and_send(size).await?;
                }
            }
            Message::Move { .. } => {
                warn!("server sent an unexpected MOVE message; ignoring");
            }
        }
        Ok(true)
    }

    async fn prompt_and_send(&mut self, board_size: usize) -> io::Result<()> {
        rendering::show_turn_prompt(self.seat);
        let (x, y) = input::read_move(board_size).await?;
        self.send_message(&Message::Move { x, y }).await
    }

    /// Writes one message as a newline-terminated line. A marshal failure
    /// drops the message and keeps the connection open.
    async fn send_message(&mut self, message: &Message) -> io::Result<()> {
        let line = match protocol::encode(message) {
            Ok(line) => line,
            Err(e) => {
                error!("error marshaling message, dropping it: {e}");
                return Ok(());
            }
        };
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await
    }
}
