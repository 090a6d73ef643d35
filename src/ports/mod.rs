//! Ports - Trait definitions for the pluggable edges of the crate.

pub mod ocr;
