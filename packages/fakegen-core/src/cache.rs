//! C9: the incremental signature cache. Computes a canonical structural
//! signature per declaration (spec.md §3.4), persists a key->signature map
//! across runs, and decides "skip vs regenerate" per declaration.
//!
//! Persistence is deliberately the simplest thing that satisfies spec.md's
//! fail-safe contract: a flat `key=value` text file, one entry per line,
//! read greedily on construction and rewritten wholesale on `save()` via a
//! write-to-temp-then-rename so a reader never observes a half-written
//! file. Any I/O or parse failure degrades to an empty cache rather than
//! aborting -- the same "never abort compilation" posture §7 specifies for
//! every cache-adjacent failure mode.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{GenError, GenResult};
use crate::phase_f::{ClassDecl, InterfaceDecl, ValidatedDecl, ValidatedFunction, ValidatedParameter, ValidatedProperty, ValidatedTypeParameter};

const CACHE_FILE_NAME: &str = "fakegen-cache.txt";

/// `<fqName>@<fileName>`, per spec.md §6's cache-file-format line.
pub fn cache_key(decl: &ValidatedDecl) -> String {
    let header = decl.header();
    let file_name = header.location.start.file.url.clone();
    format!("{}@{}", header.fq_name, file_name)
}

/// Deterministic across source ordering: every list that contributes to the
/// signature is sorted before being joined in, so two structurally equal
/// declarations -- regardless of the order their members were declared in
/// -- produce identical strings.
pub fn signature(decl: &ValidatedDecl) -> String {
    match decl {
        ValidatedDecl::Interface(i) => interface_signature(i),
        ValidatedDecl::Class(c) => class_signature(c),
    }
}

fn interface_signature(decl: &InterfaceDecl) -> String {
    let mut properties: Vec<&ValidatedProperty> = decl.properties.iter().chain(decl.inherited_properties.iter()).collect();
    let mut functions: Vec<&ValidatedFunction> = decl.functions.iter().chain(decl.inherited_functions.iter()).collect();
    properties.sort_by(|a, b| a.name.cmp(&b.name));
    functions.sort_by(|a, b| a.name.cmp(&b.name));

    format!(
        "interface|{}|tp:{}|props:{}|funcs:{}",
        decl.header.fq_name,
        type_params_signature(&decl.header.type_parameters),
        properties.iter().map(|p| property_signature(p)).collect::<Vec<_>>().join(";"),
        functions.iter().map(|f| function_signature(f)).collect::<Vec<_>>().join(";"),
    )
}

fn class_signature(decl: &ClassDecl) -> String {
    let mut properties: Vec<&ValidatedProperty> = decl
        .abstract_properties
        .iter()
        .chain(decl.inherited_abstract_properties.iter())
        .chain(decl.open_properties.iter())
        .chain(decl.inherited_open_properties.iter())
        .collect();
    let mut functions: Vec<&ValidatedFunction> = decl
        .abstract_functions
        .iter()
        .chain(decl.inherited_abstract_functions.iter())
        .chain(decl.open_functions.iter())
        .chain(decl.inherited_open_functions.iter())
        .collect();
    properties.sort_by(|a, b| a.name.cmp(&b.name));
    functions.sort_by(|a, b| a.name.cmp(&b.name));

    format!(
        "class|{}|tp:{}|props:{}|funcs:{}",
        decl.header.fq_name,
        type_params_signature(&decl.header.type_parameters),
        properties.iter().map(|p| property_signature(p)).collect::<Vec<_>>().join(";"),
        functions.iter().map(|f| function_signature(f)).collect::<Vec<_>>().join(";"),
    )
}

fn type_params_signature(params: &[ValidatedTypeParameter]) -> String {
    let mut entries: Vec<String> = params
        .iter()
        .map(|p| {
            let mut bounds = p.bounds.clone();
            bounds.sort();
            format!("{}[{}]{:?}", p.name, bounds.join(","), p.variance)
        })
        .collect();
    entries.sort();
    entries.join(",")
}

fn property_signature(p: &ValidatedProperty) -> String {
    format!("{}:{}:{}:{}", p.name, p.type_spelling, p.is_mutable, p.is_nullable)
}

fn function_signature(f: &ValidatedFunction) -> String {
    let params = f.parameters.iter().map(param_signature).collect::<Vec<_>>().join(",");
    format!(
        "{}<{}>({}):{}:suspend={}:op={}:ext={}",
        f.name,
        type_params_signature(&f.type_parameters),
        params,
        f.return_type_spelling,
        f.is_suspend,
        f.operator.as_deref().unwrap_or(""),
        f.extension_receiver_type.as_deref().unwrap_or(""),
    )
}

fn param_signature(p: &ValidatedParameter) -> String {
    format!("{}:{}:vararg={}", p.name, p.type_spelling, p.is_vararg)
}

/// Persistent key->signature map. Disabled persistence (`output_dir: None`)
/// falls back to a session-local, in-memory-only cache: `needsRegeneration`
/// and `recordGeneration` still gate work within a single process, but
/// nothing survives past it -- `save()` is then a no-op.
pub struct SignatureCache {
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl SignatureCache {
    /// Loads from `<output_dir>/fakegen-cache.txt` if `output_dir` is
    /// `Some`; any I/O or parse failure degrades to an empty cache rather
    /// than propagating (spec.md §7: "treated as cache miss; logged at Info").
    pub fn load(output_dir: Option<&Path>) -> Self {
        let path = output_dir.map(|dir| dir.join(CACHE_FILE_NAME));
        let entries = path.as_deref().map(read_cache_file).unwrap_or_default();
        SignatureCache { path, entries: RwLock::new(entries) }
    }

    /// True if no cached value exists for this declaration's key, or the
    /// cached value differs from its current signature.
    pub fn needs_regeneration(&self, decl: &ValidatedDecl) -> bool {
        let key = cache_key(decl);
        let current = signature(decl);
        match self.entries.read().expect("cache lock poisoned").get(&key) {
            Some(cached) => cached != &current,
            None => true,
        }
    }

    /// Atomic per key: a read-compare-swap under a single write-lock
    /// acquisition, so two concurrent calls for different keys never race.
    pub fn record_generation(&self, decl: &ValidatedDecl) {
        let key = cache_key(decl);
        let current = signature(decl);
        self.entries.write().expect("cache lock poisoned").insert(key, current);
    }

    /// Idempotent, atomic-rename write. No-op when persistence is disabled.
    pub fn save(&self) -> GenResult<()> {
        let Some(path) = &self.path else { return Ok(()) };
        let entries = self.entries.read().expect("cache lock poisoned");
        let mut body = String::new();
        for (key, sig) in entries.iter() {
            body.push_str(key);
            body.push('=');
            body.push_str(sig);
            body.push('\n');
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("txt.tmp");
        {
            let mut tmp = std::fs::File::create(&tmp_path)?;
            tmp.write_all(body.as_bytes())?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Malformed lines (no `=`) are ignored rather than rejecting the whole
/// file; a single corrupted entry degrades that one declaration to
/// "always regenerate", never the entire cache.
fn read_cache_file(path: &Path) -> BTreeMap<String, String> {
    let Ok(text) = std::fs::read_to_string(path) else { return BTreeMap::new() };
    let mut map = BTreeMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.to_string(), value.to_string());
        }
    }
    map
}

/// Wraps a malformed-but-present cache file as a hard [`GenError`] for
/// callers that want to surface a diagnostic rather than silently fall
/// back; the fail-safe path above (`load`) never calls this.
pub fn parse_strict(path: &Path) -> GenResult<BTreeMap<String, String>> {
    let text = std::fs::read_to_string(path)?;
    let mut map = BTreeMap::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(GenError::CacheMalformed {
                path: path.display().to_string(),
                reason: format!("line {} has no '=': {line:?}", lineno + 1),
            });
        };
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::*;
    use crate::parse_util::ParseSourceSpan;
    use std::collections::HashSet;
    use tempfile_like::TempDir;

    // A tiny self-contained temp-dir helper so these tests don't need the
    // `tempfile` crate just for a handful of cache-persistence assertions.
    mod tempfile_like {
        use std::path::PathBuf;

        pub struct TempDir(PathBuf);

        impl TempDir {
            pub fn new(label: &str) -> Self {
                let mut dir = std::env::temp_dir();
                dir.push(format!("fakegen-cache-test-{label}-{}", std::process::id()));
                let _ = std::fs::remove_dir_all(&dir);
                std::fs::create_dir_all(&dir).unwrap();
                TempDir(dir)
            }

            pub fn path(&self) -> &std::path::Path {
                &self.0
            }
        }

        impl Drop for TempDir {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
    }

    fn decl(name: &str, method_count: usize) -> ValidatedDecl {
        let mut functions = Vec::new();
        for i in 0..method_count {
            functions.push(RawFunction {
                name: format!("m{i}"),
                parameters: vec![],
                return_type_spelling: "Unit".into(),
                is_suspend: false,
                is_inline: false,
                type_parameters: vec![],
                operator: None,
                extension_receiver_type: None,
            });
        }
        let raw = RawDeclaration {
            fq_name: format!("com.example.{name}"),
            simple_name: name.to_string(),
            package: "com.example".into(),
            kind: DeclarationKind::Interface,
            modifiers: RawModifiers::default(),
            type_parameters: vec![],
            properties: vec![],
            functions,
            abstract_member_names: vec![],
            direct_supertypes: vec![],
            location: ParseSourceSpan::whole_file(format!("{name}.kt")),
        };
        let facts = HostFacts { unit_name: "u".into(), declarations: vec![raw.clone()] };
        let mut annotated = HashSet::new();
        annotated.insert(raw.fq_name.clone());
        crate::phase_f::analyze_unit(&facts, &annotated).remove(0).unwrap()
    }

    #[test]
    fn structurally_equal_declarations_signature_regardless_of_source_order() {
        let a = decl("A", 2);
        let b = decl("A", 2);
        assert_eq!(signature(&a), signature(&b));
    }

    #[test]
    fn first_run_generates_everything() {
        let dir = TempDir::new("first-run");
        let cache = SignatureCache::load(Some(dir.path()));
        let a = decl("A", 1);
        assert!(cache.needs_regeneration(&a));
    }

    #[test]
    fn unchanged_rerun_skips() {
        let dir = TempDir::new("unchanged");
        let cache = SignatureCache::load(Some(dir.path()));
        let a = decl("A", 1);
        cache.record_generation(&a);
        cache.save().unwrap();

        let reloaded = SignatureCache::load(Some(dir.path()));
        assert!(!reloaded.needs_regeneration(&a));
    }

    #[test]
    fn single_change_only_regenerates_that_declaration() {
        let dir = TempDir::new("single-change");
        let cache = SignatureCache::load(Some(dir.path()));
        let a = decl("A", 1);
        let b = decl("B", 1);
        let c = decl("C", 1);
        for d in [&a, &b, &c] {
            cache.record_generation(d);
        }
        cache.save().unwrap();

        let b_changed = decl("B", 2);
        let reloaded = SignatureCache::load(Some(dir.path()));
        assert!(!reloaded.needs_regeneration(&a));
        assert!(reloaded.needs_regeneration(&b_changed));
        assert!(!reloaded.needs_regeneration(&c));
    }

    #[test]
    fn deleted_declaration_never_influences_survivors() {
        let dir = TempDir::new("deleted");
        let cache = SignatureCache::load(Some(dir.path()));
        let a = decl("A", 1);
        let stale = decl("Stale", 5);
        cache.record_generation(&a);
        cache.record_generation(&stale);
        cache.save().unwrap();

        // "Stale" is gone from this run's declaration set entirely; the
        // cache is never consulted for it, so it cannot affect "A".
        let reloaded = SignatureCache::load(Some(dir.path()));
        assert!(!reloaded.needs_regeneration(&a));
    }

    #[test]
    fn missing_output_dir_falls_back_to_session_local_cache() {
        let cache = SignatureCache::load(None);
        let a = decl("A", 1);
        assert!(cache.needs_regeneration(&a));
        cache.record_generation(&a);
        assert!(!cache.needs_regeneration(&a), "same-session skip must still work without persistence");
        cache.save().unwrap(); // no-op, must not error

        let fresh_process = SignatureCache::load(None);
        assert!(fresh_process.needs_regeneration(&a), "cross-session must not skip without persistence");
    }

    #[test]
    fn malformed_cache_file_is_treated_as_empty() {
        let dir = TempDir::new("malformed");
        std::fs::write(dir.path().join(CACHE_FILE_NAME), "not-a-valid-line-at-all\n").unwrap();
        let cache = SignatureCache::load(Some(dir.path()));
        assert!(cache.is_empty());
    }
}
