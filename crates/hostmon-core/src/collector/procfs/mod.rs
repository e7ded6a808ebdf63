//! Samplers for the Linux `/proc` and `/sys` filesystems.
//!
//! This module provides parsers and the system sampler for reading host-wide
//! information from the kernel's virtual filesystems.

pub mod parser;
pub mod system;

pub use parser::ParseError;
pub use system::{DEFAULT_CPU_INTERVAL, SystemSampler};
