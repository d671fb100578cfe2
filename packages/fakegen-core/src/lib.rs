#![deny(clippy::all)]

/**
 * Fake synthesis core.
 *
 * Given a host compiler's facts about an `@Fake`-annotated declaration,
 * validates its eligibility (Phase F), transforms it into a generator-ready
 * shape (Phase T), and synthesizes a configurable test double (Phase S).
 * `pipeline::run_unit` is the single entry point that sequences all of it
 * for one compilation unit; everything else is exposed for hosts that want
 * to drive individual phases themselves.
 */

pub mod cache;
pub mod chars;
pub mod code_model;
pub mod collector;
pub mod config;
pub mod default_value;
pub mod error;
pub mod host;
pub mod metadata_storage;
pub mod parse_util;
pub mod phase_f;
pub mod phase_t;
pub mod pipeline;
pub mod recipes;
pub mod render;
pub mod telemetry;
pub mod type_ref;
pub mod util;
pub mod variant;

pub use config::Config;
pub use error::{Diagnostic, DiagnosticCode, GenError, GenResult};
pub use host::HostFacts;
pub use pipeline::{run_unit, GeneratedFile, PipelineOutcome};

/// Crate version, surfaced the same way the CLI reports its own.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
