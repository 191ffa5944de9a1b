//! Elimination brackets driven by team captains.
//!
//! Captains submit and confirm match scores, administrators can force a
//! result, winners flow into the matches that wait on them, and the
//! tournament closes once its final round has a winner.

pub mod bracket;
pub mod captain;
pub mod cleanup;
pub mod completion;
pub mod config;
pub mod consensus;
pub mod error;
pub mod models;
pub mod propagation;
pub mod store;

pub use bracket::{Bracket, CompletionReport, Outcome, Roster};
pub use error::{BracketError, ErrorKind};
