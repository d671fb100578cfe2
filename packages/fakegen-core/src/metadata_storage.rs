//! C8: the hand-off point between Phase F and Phase T. Phase F writes one
//! validated-declaration per key as it finishes each declaration; Phase T
//! only ever reads, after the phase boundary the host enforces. A
//! `RwLock<HashMap>` is enough to express that discipline: writes are
//! independent per key (no two declarations share a key), and every read
//! happens once the write side of the pass has already completed.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::phase_f::ValidatedDecl;

#[derive(Default)]
pub struct MetadataStorage {
    entries: RwLock<HashMap<String, ValidatedDecl>>,
}

impl MetadataStorage {
    pub fn new() -> Self {
        MetadataStorage::default()
    }

    /// Called by Phase F, once per successfully validated declaration.
    pub fn store(&self, decl: ValidatedDecl) {
        let key = decl.header().fq_name.clone();
        self.entries.write().expect("metadata storage lock poisoned").insert(key, decl);
    }

    /// Called by Phase T; never mutates.
    pub fn get(&self, fq_name: &str) -> Option<ValidatedDecl> {
        self.entries.read().expect("metadata storage lock poisoned").get(fq_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("metadata storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored declarations, in unspecified order -- Phase T fans out
    /// over this set; the host's presentation order (not storage order)
    /// is what ultimately drives emission order (spec.md §5).
    pub fn all(&self) -> Vec<ValidatedDecl> {
        self.entries.read().expect("metadata storage lock poisoned").values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::*;
    use crate::parse_util::ParseSourceSpan;
    use std::collections::HashSet;

    fn greeter() -> HostFacts {
        HostFacts {
            unit_name: "u".into(),
            declarations: vec![RawDeclaration {
                fq_name: "com.example.Greeter".into(),
                simple_name: "Greeter".into(),
                package: "com.example".into(),
                kind: DeclarationKind::Interface,
                modifiers: RawModifiers::default(),
                type_parameters: vec![],
                properties: vec![],
                functions: vec![],
                abstract_member_names: vec![],
                direct_supertypes: vec![],
                location: ParseSourceSpan::whole_file("Greeter.kt"),
            }],
        }
    }

    #[test]
    fn store_then_get_round_trips() {
        let facts = greeter();
        let mut annotated = HashSet::new();
        annotated.insert("com.example.Greeter".to_string());
        let results = crate::phase_f::analyze_unit(&facts, &annotated);
        let storage = MetadataStorage::new();
        for r in results {
            storage.store(r.unwrap());
        }
        assert_eq!(storage.len(), 1);
        let fetched = storage.get("com.example.Greeter").unwrap();
        assert_eq!(fetched.header().simple_name, "Greeter");
        assert!(storage.get("com.example.Missing").is_none());
    }
}
