//! Authoritative state machine for one room of four-player ludo.
//!
//! The engine owns everything a room needs to adjudicate a game: seated
//! players, per-player token sets, the rotating turn pointer, the dice and
//! pending-move state, and a bounded history of semantic events. All
//! mutation goes through the typed operations on [`Engine`]; every operation
//! either fully succeeds or fails with a [`GameError`] before touching any
//! state.
//!
//! ## Modules
//!
//! - [`Engine`] — the room state machine and its mutation operations
//! - [`Square`] / [`build_path`] — per-color path construction
//! - [`Move`] / [`TurnState`] — dice and legal-move bookkeeping
//! - [`History`] — append-only bounded event log
//! - [`GameState`] — pure serializable projection for broadcast

mod engine;
mod error;
mod event;
mod history;
mod path;
mod player;
mod state;
mod token;
mod turn;

pub use engine::*;
pub use error::*;
pub use event::*;
pub use history::*;
pub use path::*;
pub use player::*;
pub use state::*;
pub use token::*;
pub use turn::*;
