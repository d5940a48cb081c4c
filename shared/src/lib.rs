//! Shared game domain and wire protocol for the tic-tac-toe server and client.
//!
//! The `board` module holds the game rules: the grid, legal-move checking,
//! win/draw detection, and the immutable snapshot type sent to clients. The
//! `protocol` module defines the line-delimited `TAG|payload` envelope the
//! server and client exchange over TCP, together with its typed error
//! taxonomy.
//!
//! Both binaries depend on this crate so the board simulation and the wire
//! format can never drift apart.

pub mod board;
pub mod protocol;

pub use board::{Board, BoardPhase, BoardSnapshot, MoveError, Player};
pub use protocol::{decode, encode, Message, ProtocolError, SEPARATOR};

/// Side length of the board created when no size is given on the command line.
pub const DEFAULT_BOARD_SIZE: usize = 3;
