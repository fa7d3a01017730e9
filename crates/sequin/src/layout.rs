//! Horizontal layout of a sequence.
//!
//! # Pipeline Position
//!
//! ```text
//! Semantic Model
//!     ↓ separation pass (this module)
//! Separations
//!     ↓ position pass (this module)
//! AgentPositions
//!     ↓ draw pass
//! Layered SVG output
//! ```
//!
//! Neither pass mutates its input: the separation pass builds a fresh
//! [`Separations`] table and the position pass returns a fresh
//! [`AgentPositions`].

mod positioning;
mod separation;
pub(crate) mod traverse;

pub use positioning::{AgentPositions, position_agents};
pub use separation::{AgentSpacing, Separations};

pub(crate) use separation::compute_separations;
