//! Move-selection policies for automated players.
//!
//! Policies operate only on the legal-move list the engine already
//! validated for the current player and dice. They read engine state
//! through its public queries and never mutate it.
//!
//! - [`Random`] — uniform choice (easy)
//! - [`Greedy`] — finish first, then capture, then random (medium)
//! - [`Heuristic`] — weighted scoring with tie-breaking jitter (hard)

mod policy;

pub use policy::*;
