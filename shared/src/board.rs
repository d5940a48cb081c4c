//! Board state, move validation, and win/draw detection
//!
//! The board is the single piece of shared mutable state in a game. The
//! server owns exactly one instance behind a lock; everything that leaves
//! this module for the network does so as an immutable [`BoardSnapshot`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One of the two fixed seats a connection can occupy, or no seat at all.
///
/// Serialized on the wire as `"A"`, `"B"`, or `"None"`. Once a seat is
/// assigned to a connection it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
    None,
}

impl Player {
    /// Single-character mark used when rendering the grid.
    pub fn mark(self) -> char {
        match self {
            Player::A => 'A',
            Player::B => 'B',
            Player::None => '.',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "A"),
            Player::B => write!(f, "B"),
            Player::None => write!(f, "none"),
        }
    }
}

/// Rejection reasons for a proposed move.
///
/// These are domain errors: they are reported back to the offending player
/// as an `ERROR` message and never terminate the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("coordinates ({x}, {y}) are outside the {size}x{size} board")]
    OutOfBounds { x: i32, y: i32, size: usize },

    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },

    #[error("the game is already over")]
    GameOver,

    #[error("moves must come from a seated player")]
    NotAPlayer,
}

/// Whether the game is still running or has reached a terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPhase {
    Playing,
    Won(Player),
    Draw,
}

/// Immutable view of the board at one point in time.
///
/// This is what travels inside `BOARD` messages. `cells[y][x]` is the mark
/// at column `x`, row `y`; `rendered` is a human-readable grid for terminal
/// clients. Receivers must treat a snapshot as display data only and never
/// use it to mutate anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoardSnapshot {
    pub size: usize,
    pub cells: Vec<Vec<Player>>,
    pub phase: BoardPhase,
    pub rendered: String,
}

/// The mutable game grid.
///
/// Moves are legal when the coordinates are in range, the target cell is
/// empty, and the game is not over. Turn alternation is deliberately not
/// enforced: move ordering between the two seats is whatever order the
/// server applies them in.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Player>,
}

impl Board {
    /// Creates an empty `size` x `size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Player::None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Mark at column `x`, row `y`. Coordinates must be in range.
    pub fn cell(&self, x: usize, y: usize) -> Player {
        self.cells[y * self.size + x]
    }

    /// Checks that `(x, y)` names a cell on this board.
    pub fn validate_coordinates(&self, x: i32, y: i32) -> Result<(), MoveError> {
        if x < 0 || y < 0 || x as usize >= self.size || y as usize >= self.size {
            return Err(MoveError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        Ok(())
    }

    /// Validates and applies one move, mutating the board in place.
    pub fn apply_move(&mut self, player: Player, x: i32, y: i32) -> Result<(), MoveError> {
        if player == Player::None {
            return Err(MoveError::NotAPlayer);
        }
        if self.phase() != BoardPhase::Playing {
            return Err(MoveError::GameOver);
        }
        self.validate_coordinates(x, y)?;
        let index = y as usize * self.size + x as usize;
        if self.cells[index] != Player::None {
            return Err(MoveError::Occupied { x, y });
        }
        self.cells[index] = player;
        Ok(())
    }

    /// Current game phase, computed from the grid contents.
    pub fn phase(&self) -> BoardPhase {
        for player in [Player::A, Player::B] {
            if self.has_won(player) {
                return BoardPhase::Won(player);
            }
        }
        if self.cells.iter().all(|cell| *cell != Player::None) {
            BoardPhase::Draw
        } else {
            BoardPhase::Playing
        }
    }

    /// A player wins by filling a full row, column, or diagonal.
    fn has_won(&self, player: Player) -> bool {
        let n = self.size;
        let owns = |x: usize, y: usize| self.cell(x, y) == player;
        for y in 0..n {
            if (0..n).all(|x| owns(x, y)) {
                return true;
            }
        }
        for x in 0..n {
            if (0..n).all(|y| owns(x, y)) {
                return true;
            }
        }
        if (0..n).all(|i| owns(i, i)) {
            return true;
        }
        (0..n).all(|i| owns(i, n - 1 - i))
    }

    /// Produces the immutable snapshot sent to clients.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size,
            cells: (0..self.size)
                .map(|y| (0..self.size).map(|x| self.cell(x, y)).collect())
                .collect(),
            phase: self.phase(),
            rendered: self.to_string(),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            if y > 0 {
                writeln!(f, "{}", vec!["---"; self.size].join("+"))?;
            }
            let row: Vec<String> = (0..self.size)
                .map(|x| format!(" {} ", self.cell(x, y).mark()))
                .collect();
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_empty_and_playing() {
        let board = Board::new(3);
        assert_eq!(board.phase(), BoardPhase::Playing);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(board.cell(x, y), Player::None);
            }
        }
    }

    #[test]
    fn apply_move_marks_cell() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 1, 2).unwrap();
        assert_eq!(board.cell(1, 2), Player::A);
        assert_eq!(board.cell(2, 1), Player::None);
    }

    #[test]
    fn occupied_cell_is_rejected_without_mutation() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 0, 0).unwrap();
        let err = board.apply_move(Player::B, 0, 0).unwrap_err();
        assert_eq!(err, MoveError::Occupied { x: 0, y: 0 });
        assert_eq!(board.cell(0, 0), Player::A);
    }

    #[test]
    fn out_of_bounds_coordinates_are_rejected() {
        let mut board = Board::new(3);
        assert_eq!(
            board.apply_move(Player::A, -1, 0),
            Err(MoveError::OutOfBounds { x: -1, y: 0, size: 3 })
        );
        assert_eq!(
            board.apply_move(Player::A, 0, 3),
            Err(MoveError::OutOfBounds { x: 0, y: 3, size: 3 })
        );
        assert!(board.validate_coordinates(2, 2).is_ok());
    }

    #[test]
    fn unseated_player_cannot_move() {
        let mut board = Board::new(3);
        assert_eq!(
            board.apply_move(Player::None, 0, 0),
            Err(MoveError::NotAPlayer)
        );
    }

    #[test]
    fn row_win_is_detected() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 0, 1).unwrap();
        board.apply_move(Player::B, 0, 0).unwrap();
        board.apply_move(Player::A, 1, 1).unwrap();
        board.apply_move(Player::B, 1, 0).unwrap();
        board.apply_move(Player::A, 2, 1).unwrap();
        assert_eq!(board.phase(), BoardPhase::Won(Player::A));
    }

    #[test]
    fn column_win_is_detected() {
        let mut board = Board::new(3);
        for y in 0..3 {
            board.apply_move(Player::B, 2, y).unwrap();
            if y < 2 {
                board.apply_move(Player::A, 0, y).unwrap();
            }
        }
        assert_eq!(board.phase(), BoardPhase::Won(Player::B));
    }

    #[test]
    fn diagonal_wins_are_detected() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 0, 0).unwrap();
        board.apply_move(Player::A, 1, 1).unwrap();
        board.apply_move(Player::A, 2, 2).unwrap();
        assert_eq!(board.phase(), BoardPhase::Won(Player::A));

        let mut board = Board::new(3);
        board.apply_move(Player::B, 2, 0).unwrap();
        board.apply_move(Player::B, 1, 1).unwrap();
        board.apply_move(Player::B, 0, 2).unwrap();
        assert_eq!(board.phase(), BoardPhase::Won(Player::B));
    }

    #[test]
    fn full_board_without_winner_is_a_draw() {
        // A B A
        // A B B
        // B A A
        let mut board = Board::new(3);
        let marks = [
            (Player::A, 0, 0),
            (Player::B, 1, 0),
            (Player::A, 2, 0),
            (Player::A, 0, 1),
            (Player::B, 1, 1),
            (Player::B, 2, 1),
            (Player::B, 0, 2),
            (Player::A, 1, 2),
            (Player::A, 2, 2),
        ];
        for (player, x, y) in marks {
            board.apply_move(player, x, y).unwrap();
        }
        assert_eq!(board.phase(), BoardPhase::Draw);
    }

    #[test]
    fn moves_after_game_over_are_rejected() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 0, 0).unwrap();
        board.apply_move(Player::A, 1, 1).unwrap();
        board.apply_move(Player::A, 2, 2).unwrap();
        assert_eq!(
            board.apply_move(Player::B, 0, 1),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn snapshot_reflects_grid_and_phase() {
        let mut board = Board::new(3);
        board.apply_move(Player::A, 0, 0).unwrap();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.size, 3);
        assert_eq!(snapshot.cells[0][0], Player::A);
        assert_eq!(snapshot.cells[1][1], Player::None);
        assert_eq!(snapshot.phase, BoardPhase::Playing);
        assert!(snapshot.rendered.contains('A'));
        assert_eq!(snapshot.rendered, board.to_string());
    }

    #[test]
    fn rendering_has_one_line_per_row_plus_rules() {
        let board = Board::new(3);
        let rendered = board.to_string();
        // 3 cell rows + 2 rule lines, each newline-terminated.
        assert_eq!(rendered.lines().count(), 5);
        assert!(rendered.contains("---+---+---"));
    }
}
