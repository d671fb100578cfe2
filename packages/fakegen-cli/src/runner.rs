//! Drives `fakegen_core::run_unit` against a loaded host-facts document,
//! then persists its output: one file per generated declaration under
//! `outputDir`, plus the signature cache. Disabled persistence
//! (`output_dir: None`) still runs the pipeline but writes nothing.

use std::path::Path;

use fakegen_core::cache::SignatureCache;
use fakegen_core::{Config, PipelineOutcome};

use crate::document::HostFactsDocument;

pub fn run(document: &HostFactsDocument, config: &Config) -> anyhow::Result<PipelineOutcome> {
    let cache = SignatureCache::load(config.output_dir.as_deref());
    let annotated = document.annotated_set(config);
    let outcome = fakegen_core::run_unit(&document.facts, &annotated, config, &cache);

    if let Some(output_dir) = &config.output_dir {
        write_files(output_dir, &outcome)?;
        cache.save()?;
    }

    for diagnostic in &outcome.diagnostics {
        if diagnostic.code.is_warning() {
            tracing::debug!(target: "fakegen", "{diagnostic}");
        } else {
            tracing::warn!(target: "fakegen", "{diagnostic}");
        }
    }
    tracing::info!(target: "fakegen", summary = %outcome.summary, "unit processed");

    Ok(outcome)
}

fn write_files(output_dir: &Path, outcome: &PipelineOutcome) -> anyhow::Result<()> {
    for file in &outcome.files {
        let dest = output_dir.join(&file.relative_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, &file.contents)?;
    }
    Ok(())
}
