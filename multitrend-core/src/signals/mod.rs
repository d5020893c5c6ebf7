//! Entry and exit signal generation.

pub mod generator;

pub use generator::{confirm_entry, generate, ExitReason, SignalDecision};
