//! Asset Uploader Library
//!
//! Command-line front end for the chunked asset uploader: tracing setup,
//! adapter wiring and the `upload` / `url` commands.

pub mod bootstrap;
pub mod cli;

pub use cli::{run, Cli};
