//! Shared primitives and the generation pipeline.
//!
//! Leaves first: `extract` and `coerce` are total helpers over untyped JSON,
//! `lab` and `canonical` define the LabSpec model, `pipeline` drives the two
//! model calls. The remaining modules are the ambient stack around them.

pub mod assets;
pub mod canonical;
pub mod coerce;
pub mod config;
pub mod error;
pub mod extract;
pub mod lab;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod scope;
pub mod time;
