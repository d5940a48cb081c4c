//! TCP listener, seat assignment, and game-start gating
//!
//! The server accepts exactly two connections per process lifetime. The
//! first accepted connection is seated as player A, the second as player B;
//! accepting stops the moment both seats are filled, so the game phase
//! itself gates acceptance. Each connection gets a reader task and a
//! session task wired to the shared board guard and the turn-synchronizer
//! channels.

use crate::guard::BoardGuard;
use crate::session::{spawn_reader, ConnectedSession, GamePhase};
use log::{error, info, warn};
use shared::{Board, Player};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Handle for terminating a running server and its sessions.
///
/// Every blocking wait inside the server selects on this signal, so tests
/// can end a game deterministically instead of waiting on a silent peer.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// One two-player game served over a single listening endpoint.
pub struct GameServer {
    listener: TcpListener,
    guard: BoardGuard,
    shutdown: Arc<watch::Sender<bool>>,
}

impl GameServer {
    /// Binds the listener and creates the single board of the game.
    pub async fn new(addr: &str, board_size: usize) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            listener,
            guard: BoardGuard::new(Board::new(board_size)),
            shutdown: Arc::new(shutdown),
        })
    }

    /// Actual bound address; useful when port 0 lets the OS pick one.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Runs the game to completion: seat two players, start play, and wait
    /// for both sessions to end.
    pub async fn run(self) -> io::Result<()> {
        let mut shutdown_rx = self.shutdown.subscribe();
        let (phase_tx, phase_rx) = watch::channel(GamePhase::Waiting);
        let (updates_a_tx, updates_a_rx) = mpsc::channel(1);
        let (updates_b_tx, updates_b_rx) = mpsc::channel(1);

        let Some(first) = self.accept(&mut shutdown_rx).await? else {
            return Ok(());
        };
        let session_a =
            self.spawn_session(Player::A, first, updates_a_tx, updates_b_rx, phase_rx.clone());

        let Some(second) = self.accept(&mut shutdown_rx).await? else {
            return Ok(());
        };
        // Flip the phase before the second session starts so it skips the
        // wait state entirely; the first session wakes through its watch.
        let _ = phase_tx.send(GamePhase::Playing);
        let session_b =
            self.spawn_session(Player::B, second, updates_b_tx, updates_a_rx, phase_rx.clone());

        info!("both seats filled; game started, no further connections accepted");

        for handle in [session_a, session_b] {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("session ended with an I/O error: {e}"),
                Err(e) => error!("session task panicked: {e}"),
            }
        }
        Ok(())
    }

    /// Accepts the next connection, retrying on transient accept errors.
    /// Returns `None` when shutdown is requested before a peer arrives.
    async fn accept(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> io::Result<Option<TcpStream>> {
        loop {
            // Level check first: a shutdown sent before this receiver was
            // subscribed would otherwise count as already seen.
            if *shutdown.borrow() {
                info!("shutdown requested before game start");
                return Ok(None);
            }
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, addr)) => {
                        info!("accepted connection from {addr}");
                        return Ok(Some(stream));
                    }
                    Err(e) => warn!("failed to accept a connection: {e}"),
                },
                _ = shutdown.changed() => {
                    info!("shutdown requested before game start");
                    return Ok(None);
                }
            }
        }
    }

    fn spawn_session(
        &self,
        seat: Player,
        stream: TcpStream,
        my_updates: mpsc::Sender<()>,
        opponent_updates: mpsc::Receiver<()>,
        phase: watch::Receiver<GamePhase>,
    ) -> JoinHandle<io::Result<()>> {
        let (read_half, write_half) = stream.into_split();
        let inbound = spawn_reader(read_half);
        let session = ConnectedSession::new(
            seat,
            write_half,
            self.guard.clone(),
            my_updates,
            opponent_updates,
            phase,
            self.shutdown.subscribe(),
            inbound,
        );
        tokio::spawn(session.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn binds_to_an_os_assigned_port() {
        let server = GameServer::new("127.0.0.1:0", 3).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn shutdown_before_any_connection_ends_the_run() {
        let server = GameServer::new("127.0.0.1:0", 3).await.unwrap();
        let handle = server.shutdown_handle();
        let run = tokio::spawn(server.run());

        handle.shutdown();
        let result = timeout(Duration::from_secs(5), run)
            .await
            .expect("server did not stop")
            .unwrap();
        assert_ok!(result);
    }
}
