//! Core Monte-Carlo path-tracing engine: scene interactions, BSDF/emitter/
//! medium sampling contracts, and a parallel tile-rendering pipeline. The
//! crate exposes the integration core as a library; an XML scene parser,
//! image codecs, and a full command-line front end are external
//! collaborators (see `config.rs`, `demos/`).

pub mod config;
pub mod core;
pub mod error;
pub mod integrators;
