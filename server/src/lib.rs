//! # Tic-Tac-Toe Game Server Library
//!
//! This library implements the session/protocol engine for a two-player
//! turn-based game served over TCP. It accepts exactly two connections per
//! process lifetime, assigns the first connection seat A and the second
//! seat B, and relays the shared board between the two peers over the
//! line-delimited `TAG|payload` protocol defined in the `shared` crate.
//!
//! ## Architecture
//!
//! One lightweight tokio task per connection handles reading (decoding
//! lines into typed messages) and one per session handles dispatch. The
//! board is the only shared mutable resource; it is reachable exclusively
//! through the lock in the [`guard`] module, so two racing moves are always
//! applied one after the other — whichever acquires the lock first wins.
//!
//! Turn synchronization uses a pair of capacity-1 signal channels, one per
//! seat. A session that applies a move successfully signals the opponent's
//! session, which re-fetches the current snapshot from the guard and pushes
//! it to its own peer. The channels carry no data: the snapshot at delivery
//! time is always the authoritative one.
//!
//! ## Module Organization
//!
//! - [`guard`] — lock-protected accessor serializing all board mutations.
//! - [`session`] — per-connection state machine (`greeting` →
//!   `waiting-for-peer` → `active` → `closed`), the connection reader task,
//!   and the opponent notification channels.
//! - [`network`] — the TCP listener, seat assignment, game-start gating,
//!   and the shutdown handle used to terminate sessions deterministically.
//!
//! ## Lifecycle
//!
//! A game is single-use: no state survives the process, seats are never
//! reassigned, and once both seats are filled no further connections are
//! accepted. A disconnected peer ends its own session only; the remaining
//! player stays connected but receives no further updates.

pub mod guard;
pub mod network;
pub mod session;
