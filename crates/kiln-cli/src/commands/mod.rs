//! Command implementations for the kiln CLI.
//!
//! kiln has a single command shape, `kiln [TASK]`, implemented in [`run`].

pub mod run;

pub use run::execute;
