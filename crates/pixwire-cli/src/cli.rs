//! Command-line surface: argument definitions, handlers and table output.

pub mod commands;
pub mod output;
pub mod run;
