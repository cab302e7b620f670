//! Safemap CLI library.
//!
//! Argument types shared by the subcommands and the text renderings they
//! print. The binary in `main.rs` wires these to the library.

pub mod config;
pub mod output;
