//! Scene-construction error taxonomy, grounded on spec §7 ("Configuration
//! errors... reported at scene-construction time... and are fatal") and the
//! teacher's `thiserror`-style error enums elsewhere in this crate's
//! lineage. Sampling-time degeneracies are deliberately NOT represented
//! here: they stay pdf=0 records, handled in-band by the integrators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown {kind} plugin: {name}")]
    UnknownPlugin { kind: &'static str, name: String },

    #[error("{plugin} is missing required property `{property}`")]
    MissingProperty {
        plugin: &'static str,
        property: &'static str,
    },

    #[error("property `{property}` has the wrong type, expected {expected}")]
    TypeMismatch {
        property: &'static str,
        expected: &'static str,
    },

    #[error("{outer} cannot nest this child: {reason}")]
    IncompatibleNesting { outer: &'static str, reason: String },

    #[error("I/O error while building scene: {0}")]
    Io(#[from] std::io::Error),
}
