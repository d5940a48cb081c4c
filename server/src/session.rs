//! Per-connection session state machine and the connection reader task
//!
//! Each accepted connection gets two tasks: a reader that turns incoming
//! lines into typed messages ([`spawn_reader`]) and the session loop itself
//! ([`ConnectedSession::run`]), which walks the states `greeting` →
//! `waiting-for-peer` → `active` → `closed`.
//!
//! Sessions are generic over the writer so tests can drive them through an
//! in-memory duplex pipe instead of a real socket.

use crate::guard::BoardGuard;
use log::{debug, error, info, warn};
use shared::{protocol, Message, Player};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

/// Greeting sent to every connection as soon as its seat is assigned.
pub const GREETING: &str = "Welcome to the tic-tac-toe server!";

/// Process-wide game phase, published to sessions over a watch channel.
///
/// `Waiting` until both seats are filled, then `Playing` for the rest of
/// the process lifetime. The terminal result lives on the board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Waiting,
    Playing,
}

/// Spawns the reader task for one connection.
///
/// Reads lines from the socket, decodes each through the protocol codec,
/// and forwards typed messages into the returned queue. The task ends — and
/// the queue closes — on end-of-stream (peer disconnected) or on the first
/// undecodable line: a peer that has lost framing is torn down rather than
/// resynchronized.
pub fn spawn_reader<R>(reader: R) -> mpsc::UnboundedReceiver<Message>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match protocol::decode(&line) {
                    Ok(message) => {
                        if tx.send(message).is_err() {
                            // Session is gone; nothing left to read for.
                            break;
                        }
                    }
                    Err(cause) => {
                        warn!("protocol violation, closing connection: {cause} (line {line:?})");
                        break;
                    }
                },
                Ok(None) => {
                    info!("peer disconnected");
                    break;
                }
                Err(e) => {
                    error!("error reading client message: {e}");
                    break;
                }
            }
        }
    });
    rx
}

/// Writes one message as a newline-terminated wire line.
///
/// Encode failures are logged and the message dropped; the connection stays
/// open. Only transport errors propagate.
pub(crate) async fn send_message<W>(writer: &mut W, message: &Message) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = match protocol::encode(message) {
        Ok(line) => line,
        Err(e) => {
            error!("error marshaling message, dropping it: {e}");
            return Ok(());
        }
    };
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// One player's server-side session.
///
/// Owns the socket write half and the assigned seat, shares the board
/// through the guard, and holds both ends of the turn synchronizer: the
/// send handle of its own notification channel (read by the opponent's
/// session) and the receive handle of the opponent's channel.
pub struct ConnectedSession<W> {
    seat: Player,
    writer: W,
    guard: BoardGuard,
    my_updates: mpsc::Sender<()>,
    opponent_updates: mpsc::Receiver<()>,
    phase: watch::Receiver<GamePhase>,
    shutdown: watch::Receiver<bool>,
    inbound: mpsc::UnboundedReceiver<Message>,
}

impl<W> ConnectedSession<W>
where
    W: AsyncWrite + Unpin,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seat: Player,
        writer: W,
        guard: BoardGuard,
        my_updates: mpsc::Sender<()>,
        opponent_updates: mpsc::Receiver<()>,
        phase: watch::Receiver<GamePhase>,
        shutdown: watch::Receiver<bool>,
        inbound: mpsc::UnboundedReceiver<Message>,
    ) -> Self {
        Self {
            seat,
            writer,
            guard,
            my_updates,
            opponent_updates,
            phase,
            shutdown,
            inbound,
        }
    }

    /// Runs the session to completion: greet, wait for the peer seat if
    /// necessary, then relay moves and board updates until the connection
    /// closes or shutdown is requested.
    pub async fn run(mut self) -> io::Result<()> {
        info!("session for seat {} starting", self.seat);
        send_message(
            &mut self.writer,
            &Message::Hello {
                text: GREETING.to_string(),
                player: self.seat,
            },
        )
        .await?;

        if *self.phase.borrow() != GamePhase::Playing {
            send_message(&mut self.writer, &Message::Wait).await?;
            if !self.wait_for_game_start().await {
                info!("session for seat {} closed before game start", self.seat);
                return Ok(());
            }
        }

        let snapshot = self.guard.snapshot().await;
        send_message(&mut self.writer, &Message::Board { snapshot }).await?;

        self.active_loop().await
    }

    /// Blocks until the phase watch reports `Playing`.
    ///
    /// Messages arriving before game start are drained and dropped — not
    /// even error-replied — so a premature move can never mutate the board.
    /// Returns false when the connection closes or shutdown fires first.
    async fn wait_for_game_start(&mut self) -> bool {
        loop {
            // Level check first: a shutdown sent before this receiver was
            // subscribed would otherwise count as already seen.
            if *self.shutdown.borrow() {
                return false;
            }
            tokio::select! {
                changed = self.phase.changed() => match changed {
                    Ok(()) if *self.phase.borrow() == GamePhase::Playing => return true,
                    Ok(()) => {}
                    Err(_) => return false,
                },
                message = self.inbound.recv() => match message {
                    Some(message) => {
                        debug!("seat {}: dropping {:?} received before game start", self.seat, message);
                    }
                    None => return false,
                },
                _ = self.shutdown.changed() => return false,
            }
        }
    }

    /// The `active` state: dispatch inbound messages and forward opponent
    /// update notifications until the connection ends.
    async fn active_loop(&mut self) -> io::Result<()> {
        let mut peer_gone = false;
        loop {
            if *self.shutdown.borrow() {
                info!("session for seat {} shutting down", self.seat);
                return Ok(());
            }
            tokio::select! {
                message = self.inbound.recv() => match message {
                    Some(message) => self.dispatch(message).await?,
                    None => {
                        info!("session for seat {} closed", self.seat);
                        return Ok(());
                    }
                },
                signal = self.opponent_updates.recv(), if !peer_gone => match signal {
                    Some(()) => {
                        let snapshot = self.guard.snapshot().await;
                        send_message(&mut self.writer, &Message::Board { snapshot }).await?;
                    }
                    None => {
                        debug!("seat {}: opponent session ended, no more updates", self.seat);
                        peer_gone = true;
                    }
                },
                _ = self.shutdown.changed() => {
                    info!("session for seat {} shutting down", self.seat);
                    return Ok(());
                }
            }
        }
    }

    /// Handles one inbound message while `active`.
    async fn dispatch(&mut self, message: Message) -> io::Result<()> {
        match message {
            Message::Move { x, y } => match self.guard.apply_move(self.seat, x, y).await {
                Ok(snapshot) => {
                    send_message(&mut self.writer, &Message::Board { snapshot }).await?;
                    self.notify_opponent();
                }
                Err(e) => {
                    // No state changed, so the opponent is not signaled.
                    send_message(
                        &mut self.writer,
                        &Message::Error {
                            text: e.to_string(),
                        },
                    )
                    .await?;
                }
            },
            other => {
                warn!("seat {}: ignoring unsupported message {:?}", self.seat, other);
            }
        }
        Ok(())
    }

    /// Wakes the opponent's session so it re-sends the current snapshot.
    ///
    /// A full channel means a refresh is already pending, so the signal
    /// coalesces instead of being lost.
    fn notify_opponent(&self) {
        match self.my_updates.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                debug!("seat {}: opponent no longer listening for updates", self.seat);
            }
        }
    }
}
