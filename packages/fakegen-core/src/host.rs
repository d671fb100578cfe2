//! The abstract-accessor boundary: plain data the host hands over in place
//! of live AST/IR nodes. Phase F consumes only these types, never a real
//! compiler frontend's tree — the same boundary the teacher draws between
//! its output-AST builders and whatever produced the facts upstream.

use crate::parse_util::ParseSourceSpan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

impl Default for Variance {
    fn default() -> Self {
        Variance::Invariant
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTypeParameter {
    pub name: String,
    pub bounds: Vec<String>,
    #[serde(default)]
    pub variance: Variance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParameter {
    pub name: String,
    pub type_spelling: String,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub is_vararg: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProperty {
    pub name: String,
    pub type_spelling: String,
    #[serde(default)]
    pub is_mutable: bool,
    #[serde(default)]
    pub is_nullable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFunction {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub return_type_spelling: String,
    #[serde(default)]
    pub is_suspend: bool,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub extension_receiver_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Interface,
    AbstractClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawModifiers {
    #[serde(default)]
    pub sealed: bool,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub inner: bool,
    #[serde(default)]
    pub object: bool,
    #[serde(default)]
    pub annotation: bool,
}

impl Default for RawModifiers {
    fn default() -> Self {
        RawModifiers { sealed: false, local: false, inner: false, object: false, annotation: false }
    }
}

/// One annotated declaration as the host presents it: unvalidated,
/// supertypes given only as raw spellings for the analyzer to resolve
/// against the rest of the unit's declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub fq_name: String,
    pub simple_name: String,
    pub package: String,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub modifiers: RawModifiers,
    #[serde(default)]
    pub type_parameters: Vec<RawTypeParameter>,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
    #[serde(default)]
    pub functions: Vec<RawFunction>,
    /// True members (not inherited) marked `abstract`; for classes only,
    /// determines whether the class-must-be-abstract check passes.
    #[serde(default)]
    pub abstract_member_names: Vec<String>,
    /// Raw spellings of direct supertypes, resolved against `all_declarations`
    /// in the same [`HostFacts`] document during inheritance-closure computation.
    #[serde(default)]
    pub direct_supertypes: Vec<String>,
    pub location: ParseSourceSpan,
}

/// A whole compilation unit's worth of facts, as something that would
/// otherwise arrive over an in-process accessor call in a real host
/// compiler plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFacts {
    pub unit_name: String,
    pub declarations: Vec<RawDeclaration>,
}

impl HostFacts {
    pub fn find(&self, fq_name: &str) -> Option<&RawDeclaration> {
        self.declarations.iter().find(|d| d.fq_name == fq_name)
    }
}
