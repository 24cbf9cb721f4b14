//! # Domain Models
//!
//! Pure types shared by every `DocFill` crate. The only dependency is `serde`:
//! no I/O, no document handling, just data and defaults.

pub mod config;
pub mod constants;
pub mod registry;
