#![deny(clippy::all)]

/**
 * Fake-generator CLI
 *
 * Thin host-facing shell around `fakegen-core`: reads a host-facts JSON
 * document plus plugin options, runs the pipeline, writes emitted files and
 * the signature cache to disk, and reports a generate/skip summary.
 */
pub use fakegen_core as core;

pub mod document;
pub mod logging;
pub mod runner;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
