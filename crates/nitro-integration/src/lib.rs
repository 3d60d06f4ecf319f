//! ROM initialization pipeline for nitrous
//!
//! This crate ties the loader stages together into the synchronous
//! sequence behind the frontend's `loadRom` call.

pub mod pipeline;

pub use pipeline::initialize;
