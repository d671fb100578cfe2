//! The on-disk JSON document a host hands the CLI: the unit's facts plus,
//! for each declaration the host considers annotated, which annotation
//! identifier it found. `HostFacts` itself may additionally carry
//! declarations kept only for supertype resolution, so "annotated" is not
//! simply "every declaration present".

use std::collections::HashSet;
use std::path::Path;

use fakegen_core::{Config, HostFacts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedDeclaration {
    pub fq_name: String,
    /// The annotation's own fully-qualified (or short, host-dependent) name,
    /// matched against `Config::annotation_names`.
    pub annotation_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFactsDocument {
    #[serde(flatten)]
    pub facts: HostFacts,
    pub annotated: Vec<AnnotatedDeclaration>,
}

impl HostFactsDocument {
    /// The fq_names Phase F should actually process: those whose reported
    /// annotation matches one of `config`'s recognized names.
    pub fn annotated_set(&self, config: &Config) -> HashSet<String> {
        self.annotated
            .iter()
            .filter(|a| config.matches_annotation(&a.annotation_name))
            .map(|a| a.fq_name.clone())
            .collect()
    }
}

pub fn load(path: &Path) -> anyhow::Result<HostFactsDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading host facts document {}: {e}", path.display()))?;
    let doc: HostFactsDocument = serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("parsing host facts document {}: {e}", path.display()))?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakegen_core::host::{DeclarationKind, RawDeclaration, RawModifiers};
    use fakegen_core::parse_util::ParseSourceSpan;

    fn doc() -> HostFactsDocument {
        HostFactsDocument {
            facts: HostFacts {
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
            },
            annotated: vec![AnnotatedDeclaration { fq_name: "com.example.Greeter".into(), annotation_name: "Fake".into() }],
        }
    }

    #[test]
    fn annotated_set_matches_recognized_annotation_names() {
        let document = doc();
        let set = document.annotated_set(&Config::default());
        assert!(set.contains("com.example.Greeter"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn unrecognized_annotation_name_is_excluded() {
        let mut document = doc();
        document.annotated[0].annotation_name = "com.other.NotFake".into();
        let set = document.annotated_set(&Config::default());
        assert!(set.is_empty());
    }
}
