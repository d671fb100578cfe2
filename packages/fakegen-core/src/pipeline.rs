//! Orchestration: wires Phase F, the metadata store (C8), the incremental
//! cache (C9), Phase T, and the renderer (C4/C5) together into the single
//! per-declaration path a host compilation pass drives. Nothing here does
//! analysis or synthesis itself -- it only sequences the phases and records
//! telemetry, per spec.md §5's "module boundary" table.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::cache::SignatureCache;
use crate::config::Config;
use crate::error::Diagnostic;
use crate::host::HostFacts;
use crate::metadata_storage::MetadataStorage;
use crate::phase_f;
use crate::phase_t;
use crate::recipes;
use crate::render;
use crate::telemetry::{Counters, Summary};

/// One declaration's fake, ready to be written to disk at
/// `<outputDir>/<relative_path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: Summary,
}

/// Runs Phase F -> C8 -> C9 gate -> Phase T -> C5/C4 over one compilation
/// unit's worth of host facts. `annotated_fq_names` is the round's set of
/// declarations actually carrying the target annotation -- `facts` itself
/// may additionally contain supertypes-only declarations kept around
/// purely so inheritance resolution can look them up. Disabled config
/// (`Config::enabled == false`) short-circuits with an empty outcome, per
/// spec.md §4.6's "whole unit is a no-op" behavior.
pub fn run_unit(facts: &HostFacts, annotated_fq_names: &HashSet<String>, config: &Config, cache: &SignatureCache) -> PipelineOutcome {
    let counters = Counters::new();
    if !config.enabled {
        return PipelineOutcome { files: Vec::new(), diagnostics: Vec::new(), summary: counters.snapshot() };
    }

    let storage = MetadataStorage::new();
    let mut diagnostics = Vec::new();

    for result in phase_f::analyze_unit(facts, annotated_fq_names) {
        counters.incr_observed();
        match result {
            Ok(decl) => {
                counters.incr_validated();
                storage.store(decl);
            }
            Err(diag) => {
                counters.incr_rejected();
                diagnostics.push(diag);
            }
        }
    }
    for decl in facts.declarations.iter().filter(|d| annotated_fq_names.contains(&d.fq_name)) {
        diagnostics.extend(phase_f::resolve_warnings(decl, facts));
    }

    let mut files = Vec::new();
    for decl in storage.all() {
        if !cache.needs_regeneration(&decl) {
            counters.incr_skipped();
            continue;
        }
        let inputs = phase_t::transform(&decl);
        let rendered = match recipes::synthesize(&inputs) {
            Ok(file) => render::render(&file),
            Err(err) => {
                tracing::error!(target: "fakegen", declaration = %decl.header().fq_name, error = %err, "synthesis failed, skipping this declaration");
                continue;
            }
        };
        cache.record_generation(&decl);
        counters.incr_generated();
        files.push(GeneratedFile { relative_path: relative_path_for(&decl), contents: rendered });
    }

    PipelineOutcome { files, diagnostics, summary: counters.snapshot() }
}

fn relative_path_for(decl: &phase_f::ValidatedDecl) -> PathBuf {
    let header = decl.header();
    let mut path = PathBuf::new();
    for segment in header.package.split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push(format!("Fake{}Impl.kt", header.simple_name));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::*;
    use crate::parse_util::ParseSourceSpan;

    fn greeter_facts() -> HostFacts {
        HostFacts {
            unit_name: "unit".into(),
            declarations: vec![RawDeclaration {
                fq_name: "com.example.Greeter".into(),
                simple_name: "Greeter".into(),
                package: "com.example".into(),
                kind: DeclarationKind::Interface,
                modifiers: RawModifiers::default(),
                type_parameters: vec![],
                properties: vec![],
                functions: vec![RawFunction {
                    name: "hello".into(),
                    parameters: vec![RawParameter { name: "name".into(), type_spelling: "String".into(), has_default: false, is_vararg: false }],
                    return_type_spelling: "String".into(),
                    is_suspend: false,
                    is_inline: false,
                    type_parameters: vec![],
                    operator: None,
                    extension_receiver_type: None,
                }],
                abstract_member_names: vec![],
                direct_supertypes: vec![],
                location: ParseSourceSpan::whole_file("Greeter.kt"),
            }],
        }
    }

    fn annotated() -> HashSet<String> {
        let mut set = HashSet::new();
        set.insert("com.example.Greeter".to_string());
        set
    }

    #[test]
    fn first_run_generates_the_file() {
        let facts = greeter_facts();
        let config = Config::default();
        let cache = SignatureCache::load(None);
        let outcome = run_unit(&facts, &annotated(), &config, &cache);
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].relative_path, PathBuf::from("com/example/FakeGreeterImpl.kt"));
        assert!(outcome.files[0].contents.contains("class FakeGreeterImpl : Greeter {"));
        assert_eq!(outcome.summary.generated, 1);
        assert_eq!(outcome.summary.skipped, 0);
    }

    #[test]
    fn unchanged_second_run_skips() {
        let facts = greeter_facts();
        let config = Config::default();
        let cache = SignatureCache::load(None);
        run_unit(&facts, &annotated(), &config, &cache);
        let second = run_unit(&facts, &annotated(), &config, &cache);
        assert_eq!(second.files.len(), 0);
        assert_eq!(second.summary.skipped, 1);
    }

    #[test]
    fn disabled_config_is_a_no_op() {
        let facts = greeter_facts();
        let mut config = Config::default();
        config.enabled = false;
        let cache = SignatureCache::load(None);
        let outcome = run_unit(&facts, &annotated(), &config, &cache);
        assert!(outcome.files.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }
}
