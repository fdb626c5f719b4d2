//! Room coordination for live ludo games.
//!
//! This crate is the imperative shell around the functional core in
//! `ludo-engine`: it owns the room map, serializes every mutation against
//! a per-room lock, drains AI turns inside the same critical section, and
//! mirrors room state to a shared store so games survive restarts and are
//! visible across horizontally scaled processes.
//!
//! ## Architecture
//!
//! - [`Coordinator`] — one entry point per player action; lock, mutate,
//!   drain AI, persist, broadcast
//! - [`Room`] — an engine behind its mutation-serializing mutex
//! - [`RoomStore`] — room and connection registry contract, with
//!   [`MemoryStore`] and (feature `redis`) `RedisStore` implementations
//! - [`run_ai_turns`] — bounded AI turn drain
//! - [`ResultsSink`] — one-shot hand-off of finished-game outcomes
//! - [`ClientCommand`] / [`ServerMessage`] — wire types for the external
//!   transport collaborator

mod coordinator;
mod error;
mod message;
mod orchestrator;
mod results;
mod room;
mod store;

pub use coordinator::*;
pub use error::*;
pub use message::*;
pub use orchestrator::*;
pub use results::*;
pub use room::*;
pub use store::*;
