//! Fetch, extract, build and instrument Defects4J-style benchmark checkouts.
//!
//! Network transfer, compilation and bytecode rewriting are delegated to
//! external programs configured in [`config::Config`].

pub mod archive;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod error;
pub mod instrument;
pub mod manifest;
pub mod project;
pub mod tool;

pub use error::PrepError;
pub use project::ProjectId;
