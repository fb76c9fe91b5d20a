//! Pure simulation logic for NETSPIKE, a turn-based network-intrusion
//! game.
//!
//! This crate contains all game logic independent of any rendering,
//! audio, or input runtime. One line of input goes in, an ordered list
//! of typed log entries comes out; the presentation layer renders the
//! entries and reads the public `GameState` fields. All randomness
//! flows through injected `rand::Rng` values, so seeded runs are fully
//! deterministic.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `commands` (private) | One handler per command in the closed vocabulary |
//! | [`constants`] | Base costs, detection increments, cadences, scores |
//! | [`engine`] | GameState aggregate, turn resolution, modifier reconciliation |
//! | [`modifiers`] | Named rule-variant catalog and keyword lookup |
//! | [`network`] | Node graph generation, BFS, edge rewiring |
//! | [`player`] | Player state and the Overlord detection system |
//! | [`report`] | Typed `(text, kind)` log entries |
//! | [`rival`] | Rival hacker finite-state machine |
//! | [`trace`] | Trace program pursuit AI |
//!
//! # Example
//!
//! ```rust
//! use netspike_core::engine::GameState;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut game = GameState::new("", &mut rng);
//!
//! for entry in game.execute("status", &mut rng) {
//!     println!("{}", entry.text);
//! }
//! ```

mod commands;
pub mod constants;
pub mod engine;
pub mod modifiers;
pub mod network;
pub mod player;
pub mod report;
pub mod rival;
pub mod trace;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{GameState, LossReason};
    pub use crate::modifiers::{modifier_for, ModifierConfig};
    pub use crate::network::{Network, NodeState, NodeType};
    pub use crate::report::{Entry, EntryKind};
}
