//! CLI commands

pub mod context;
pub mod netpeering;
pub mod profile;
