//! Phase T: transforms a validated declaration (Phase F's output) into the
//! argument tuple Phase S's "complete fake" recipe consumes. Does no
//! analysis of host-level IR -- every input here is already a plain string
//! or enum that Phase F extracted; this separation is load-bearing, per
//! spec.md §4.7, because it keeps Phase S reimplementable without any
//! host-specific types.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::phase_f::{ClassDecl, DeclHeader, InterfaceDecl, ValidatedDecl, ValidatedFunction, ValidatedProperty, ValidatedTypeParameter};
use crate::type_ref::TypeRef;

/// Drives the factory-function shape the generated `fake{Name}` top-level
/// function takes (spec.md §6's "Generated factory surface").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericPattern {
    NoGenerics,
    ClassLevel,
    MethodLevel,
    Mixed,
}

impl GenericPattern {
    pub fn classify(has_class_level: bool, has_method_level: bool) -> Self {
        match (has_class_level, has_method_level) {
            (false, false) => GenericPattern::NoGenerics,
            (true, false) => GenericPattern::ClassLevel,
            (false, true) => GenericPattern::MethodLevel,
            (true, true) => GenericPattern::Mixed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeParamSpec {
    pub name: String,
    pub bounds: Vec<String>,
    pub variance: crate::host::Variance,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_vararg: bool,
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: String,
    pub parameters: Vec<ParamSpec>,
    pub return_type: TypeRef,
    pub is_suspend: bool,
    /// Method-level type parameters, with bounds; their names are what get
    /// erased to `Any?` in the behavior-holder property's type, and they
    /// are re-declared on the `configure{Name}` method so its parameter
    /// keeps the unerased signature.
    pub method_type_parameters: Vec<TypeParamSpec>,
    pub extension_receiver: Option<TypeRef>,
    pub operator: Option<String>,
    /// True for interface members and abstract class members: behavior
    /// holder is non-nullable with a typed default. False for "open" class
    /// members: nullable, falls through to `super.name(...)`.
    pub is_abstract_or_interface: bool,
}

impl MethodSpec {
    pub fn type_param_names(&self) -> Vec<String> {
        self.method_type_parameters.iter().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_mutable: bool,
    pub is_abstract_or_interface: bool,
}

#[derive(Debug, Clone)]
pub struct CodeGenInputs {
    pub package: String,
    pub target_simple_name: String,
    pub is_class_target: bool,
    pub class_type_parameters: Vec<TypeParamSpec>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<MethodSpec>,
    pub generic_pattern: GenericPattern,
    pub imports: BTreeSet<String>,
}

/// Imports that are always needed once any reactive counter or behavior
/// holder is emitted -- every generated fake has at least one.
const BASE_IMPORTS: &[&str] = &["kotlinx.coroutines.flow.MutableStateFlow", "kotlinx.coroutines.flow.StateFlow"];

pub fn transform(decl: &ValidatedDecl) -> CodeGenInputs {
    let header = decl.header();
    let class_type_param_names: HashSet<String> = header.type_parameters.iter().map(|p| p.name.clone()).collect();

    let (properties, methods) = match decl {
        ValidatedDecl::Interface(i) => transform_interface(i),
        ValidatedDecl::Class(c) => transform_class(c),
    };

    let has_method_level = methods.iter().any(|m| !m.method_type_parameters.is_empty());
    let generic_pattern = GenericPattern::classify(!class_type_param_names.is_empty(), has_method_level);

    let mut imports: BTreeSet<String> = BASE_IMPORTS.iter().map(|s| s.to_string()).collect();
    if properties.iter().any(|p| matches!(p.type_ref, TypeRef::Generic(ref n, _) if n == "Flow"))
        || methods.iter().any(|m| matches!(m.return_type, TypeRef::Generic(ref n, _) if n == "Flow"))
    {
        imports.insert("kotlinx.coroutines.flow.emptyFlow".to_string());
    }

    CodeGenInputs {
        package: header.package.clone(),
        target_simple_name: header.simple_name.clone(),
        is_class_target: decl.is_class(),
        class_type_parameters: header.type_parameters.iter().map(to_type_param_spec).collect(),
        properties,
        methods,
        generic_pattern,
        imports,
    }
}

fn transform_interface(decl: &InterfaceDecl) -> (Vec<PropertySpec>, Vec<MethodSpec>) {
    let properties = decl
        .properties
        .iter()
        .chain(decl.inherited_properties.iter())
        .map(|p| to_property_spec(p, true))
        .collect();
    let methods = decl
        .functions
        .iter()
        .chain(decl.inherited_functions.iter())
        .map(|f| to_method_spec(f, true))
        .collect();
    (properties, methods)
}

fn transform_class(decl: &ClassDecl) -> (Vec<PropertySpec>, Vec<MethodSpec>) {
    let mut properties: Vec<PropertySpec> = decl.abstract_properties.iter().map(|p| to_property_spec(p, true)).collect();
    properties.extend(decl.inherited_abstract_properties.iter().map(|p| to_property_spec(p, true)));
    properties.extend(decl.open_properties.iter().map(|p| to_property_spec(p, false)));
    properties.extend(decl.inherited_open_properties.iter().map(|p| to_property_spec(p, false)));

    let mut methods: Vec<MethodSpec> = decl.abstract_functions.iter().map(|f| to_method_spec(f, true)).collect();
    methods.extend(decl.inherited_abstract_functions.iter().map(|f| to_method_spec(f, true)));
    methods.extend(decl.open_functions.iter().map(|f| to_method_spec(f, false)));
    methods.extend(decl.inherited_open_functions.iter().map(|f| to_method_spec(f, false)));

    (properties, methods)
}

fn to_property_spec(p: &ValidatedProperty, is_abstract_or_interface: bool) -> PropertySpec {
    let mut type_ref = TypeRef::parse(&sanitize_spelling(&p.type_spelling));
    if p.is_nullable && !type_ref.is_nullable() {
        type_ref = TypeRef::Nullable(Box::new(type_ref));
    }
    PropertySpec { name: p.name.clone(), type_ref, is_mutable: p.is_mutable, is_abstract_or_interface }
}

fn to_method_spec(f: &ValidatedFunction, is_abstract_or_interface: bool) -> MethodSpec {
    let parameters = f
        .parameters
        .iter()
        .map(|p| ParamSpec { name: p.name.clone(), type_ref: TypeRef::parse(&sanitize_spelling(&p.type_spelling)), is_vararg: p.is_vararg })
        .collect();
    MethodSpec {
        name: f.name.clone(),
        parameters,
        return_type: TypeRef::parse(&sanitize_spelling(&f.return_type_spelling)),
        is_suspend: f.is_suspend,
        method_type_parameters: f.type_parameters.iter().map(to_type_param_spec).collect(),
        extension_receiver: f.extension_receiver_type.as_deref().map(|s| TypeRef::parse(&sanitize_spelling(s))),
        operator: f.operator.clone(),
        is_abstract_or_interface,
    }
}

fn to_type_param_spec(p: &ValidatedTypeParameter) -> TypeParamSpec {
    TypeParamSpec { name: p.name.clone(), bounds: p.bounds.iter().map(|b| sanitize_spelling(b)).collect(), variance: p.variance }
}

static KOTLIN_COLLECTIONS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bkotlin\.collections\.").unwrap());
static KOTLIN_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bkotlin\.").unwrap());
static SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/").unwrap());

/// Strips host path-like qualification quirks (`kotlin/Any?` ->
/// `kotlin.Any?`) and the two implicitly-imported package prefixes.
/// Third-party qualified names are left intact.
pub fn sanitize_spelling(raw: &str) -> String {
    let dotted = SLASH.replace_all(raw, ".");
    let stripped = KOTLIN_COLLECTIONS_PREFIX.replace_all(&dotted, "");
    KOTLIN_PREFIX.replace_all(&stripped, "").into_owned()
}

/// Replaces every occurrence of a method-level type-parameter name with
/// `Any?` -- the erasure boundary a behavior-holder property's type must
/// cross because properties cannot carry their own type parameters.
pub fn erase(type_ref: &TypeRef, method_type_param_names: &[String]) -> TypeRef {
    if method_type_param_names.is_empty() {
        return type_ref.clone();
    }
    match type_ref {
        TypeRef::Simple(name) if method_type_param_names.iter().any(|n| n == name) => {
            TypeRef::Nullable(Box::new(TypeRef::Simple("Any".to_string())))
        }
        TypeRef::Simple(_) => type_ref.clone(),
        TypeRef::Generic(name, args) => {
            TypeRef::Generic(name.clone(), args.iter().map(|a| erase(a, method_type_param_names)).collect())
        }
        TypeRef::Nullable(inner) => TypeRef::Nullable(Box::new(erase(inner, method_type_param_names))),
        TypeRef::Function { parameters, return_type, suspend } => TypeRef::Function {
            parameters: parameters.iter().map(|p| erase(p, method_type_param_names)).collect(),
            return_type: Box::new(erase(return_type, method_type_param_names)),
            suspend: *suspend,
        },
    }
}

/// Whether `header`'s own type parameters (not a method's) are referenced
/// by `type_ref` -- used by the `Array<T>` special case in the
/// default-value resolver, which needs the class-level scope specifically.
pub fn class_type_param_names(header: &DeclHeader) -> HashSet<String> {
    header.type_parameters.iter().map(|p| p.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_slash_qualified_and_strips_kotlin_prefix() {
        assert_eq!(sanitize_spelling("kotlin/Any?"), "Any?");
        assert_eq!(sanitize_spelling("kotlin/collections/List<T>"), "List<T>");
    }

    #[test]
    fn leaves_third_party_qualified_names_intact() {
        assert_eq!(sanitize_spelling("com.example.UserRepository"), "com.example.UserRepository");
    }

    #[test]
    fn erase_replaces_method_type_param_with_any_nullable() {
        let t = TypeRef::parse("T");
        let erased = erase(&t, &["T".to_string()]);
        assert_eq!(erased.render(), "Any?");
    }

    #[test]
    fn erase_recurses_into_generics_and_function_types() {
        let t = TypeRef::parse("() -> List<T>");
        let erased = erase(&t, &["T".to_string()]);
        assert_eq!(erased.render(), "() -> List<Any?>");
    }

    #[test]
    fn erase_is_identity_when_no_method_type_params() {
        let t = TypeRef::parse("List<T>");
        assert_eq!(erase(&t, &[]), t);
    }

    #[test]
    fn generic_pattern_classification() {
        assert_eq!(GenericPattern::classify(false, false), GenericPattern::NoGenerics);
        assert_eq!(GenericPattern::classify(true, false), GenericPattern::ClassLevel);
        assert_eq!(GenericPattern::classify(false, true), GenericPattern::MethodLevel);
        assert_eq!(GenericPattern::classify(true, true), GenericPattern::Mixed);
    }
}
