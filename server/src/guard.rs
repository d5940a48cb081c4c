//! Lock-protected access to the single shared board
//!
//! Sessions never touch the board directly. Every mutation goes through
//! [`BoardGuard::apply_move`], which holds the lock across validation and
//! mutation so a half-applied move is never observable. The lock is held
//! only for the duration of the board operation, never across I/O.

use log::debug;
use shared::{Board, BoardSnapshot, MoveError, Player};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the one board of the game.
///
/// Cloning is cheap; all clones refer to the same board and the same lock.
#[derive(Clone)]
pub struct BoardGuard {
    inner: Arc<Mutex<Board>>,
}

impl BoardGuard {
    pub fn new(board: Board) -> Self {
        Self {
            inner: Arc::new(Mutex::new(board)),
        }
    }

    /// Validates and applies one move atomically, returning the post-move
    /// snapshot taken under the same lock.
    ///
    /// Concurrent calls from the two sessions serialize on the lock in
    /// acquisition order: first writer wins. No turn-order fairness is
    /// applied at this layer.
    pub async fn apply_move(
        &self,
        player: Player,
        x: i32,
        y: i32,
    ) -> Result<BoardSnapshot, MoveError> {
        let mut board = self.inner.lock().await;
        board.apply_move(player, x, y)?;
        debug!("player {} marked ({}, {})", player, x, y);
        Ok(board.snapshot())
    }

    /// Current snapshot. Sessions call this on every notification instead
    /// of trusting any value carried on a channel.
    pub async fn snapshot(&self) -> BoardSnapshot {
        self.inner.lock().await.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::BoardPhase;

    #[tokio::test]
    async fn apply_move_returns_the_post_move_snapshot() {
        let guard = BoardGuard::new(Board::new(3));
        let snapshot = guard.apply_move(Player::A, 0, 0).await.unwrap();
        assert_eq!(snapshot.cells[0][0], Player::A);
        assert_eq!(snapshot.phase, BoardPhase::Playing);
    }

    #[tokio::test]
    async fn rejected_move_leaves_the_board_unchanged() {
        let guard = BoardGuard::new(Board::new(3));
        guard.apply_move(Player::A, 1, 1).await.unwrap();
        let err = guard.apply_move(Player::B, 1, 1).await.unwrap_err();
        assert_eq!(err, MoveError::Occupied { x: 1, y: 1 });
        let snapshot = guard.snapshot().await;
        assert_eq!(snapshot.cells[1][1], Player::A);
    }

    /// Two seats race for the same cell: exactly one move lands.
    #[tokio::test]
    async fn racing_moves_on_one_cell_serialize() {
        let guard = BoardGuard::new(Board::new(3));
        let mut handles = Vec::new();
        for player in [Player::A, Player::B] {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move {
                guard.apply_move(player, 1, 1).await
            }));
        }

        let mut wins = 0;
        let mut occupied = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(MoveError::Occupied { .. }) => occupied += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(occupied, 1);
    }

    /// Many concurrent moves on distinct cells: the final grid equals some
    /// sequential application order, with no interleaved partial mutation.
    #[tokio::test]
    async fn concurrent_moves_apply_as_if_sequential() {
        // Chosen so no three-in-a-row exists regardless of ordering.
        let moves = [
            (Player::A, 0, 0),
            (Player::B, 1, 0),
            (Player::A, 2, 1),
            (Player::B, 0, 1),
        ];
        let guard = BoardGuard::new(Board::new(3));
        let mut handles = Vec::new();
        for (player, x, y) in moves {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move {
                guard.apply_move(player, x, y).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = guard.snapshot().await;
        for (player, x, y) in moves {
            assert_eq!(snapshot.cells[y as usize][x as usize], player);
        }
        let filled: usize = snapshot
            .cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Player::None)
            .count();
        assert_eq!(filled, moves.len());
        assert_eq!(snapshot.phase, BoardPhase::Playing);
    }
}
