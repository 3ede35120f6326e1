//! Recovery collaborators.
//!
//! Only the checkpoint contract lives here; expression construction never
//! depends on it.

pub mod checkpoint;

pub use checkpoint::{Checkpoint, SimpleCheckpoint};
