//! # seqedit - Multiple Sequence Alignment Editing Engine
//!
//! An in-memory editor for aligned sequences whose column statistics and
//! consensus line follow every edit incrementally.
//!
//! ## Architecture
//!
//! Data flows one way, from the alignment to its derived views:
//! - `model`: sequence rows and their alphabet
//! - `coords`: 1-based/negative index normalization, ranges and rectangles
//! - `alignment`: the editable alignment and all its structural operations
//! - `event`: change notifications emitted at each level
//! - `distribution`: per-column character counts
//! - `live_distribution`: counts kept in step with an alignment's events
//! - `symbol_rules`: consensus rules and the symbol selection algorithm
//! - `live_symbols`: consensus string kept in step with the counts
//! - `controller`: edit session routing events through the chain
//! - `command`: textual edit commands
//! - `fasta`: aligned FASTA import and export

pub mod alignment;
pub mod command;
pub mod controller;
pub mod coords;
pub mod distribution;
pub mod event;
pub mod fasta;
pub mod live_distribution;
pub mod live_symbols;
pub mod model;
pub mod symbol_rules;

pub use alignment::{Alignment, EditError};
pub use controller::{EditSession, SessionConfig, SessionEvent};
pub use model::{SequenceRow, SequenceType};
