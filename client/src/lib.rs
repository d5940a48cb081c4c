//! # Tic-Tac-Toe Terminal Client Library
//!
//! Interactive client for the two-player tic-tac-toe server. It connects
//! over TCP, decodes the line-delimited `TAG|payload` protocol from the
//! `shared` crate, renders whatever the server sends, and prompts the
//! player for moves.
//!
//! ## Module Organization
//!
//! - [`network`] — the connection and the sequential read/dispatch loop.
//!   The client is deliberately single-threaded in spirit: it handles one
//!   server message at a time, prompting for a move whenever a board
//!   arrives and play continues.
//! - [`input`] — reads and validates the two move coordinates from
//!   standard input, on the blocking thread pool so the runtime never
//!   stalls on a slow human.
//! - [`rendering`] — prints greetings, the board grid, and errors to the
//!   terminal.
//!
//! The server is authoritative for everything: the client validates only
//! that entered coordinates fit the board, and leaves occupancy and
//! game-over checks to the server's error replies.

pub mod input;
pub mod network;
pub mod rendering;
