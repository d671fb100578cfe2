//! Default-value resolution: maps a type reference to a default expression
//! via a fixed, ordered chain of strategies. The chain order is itself part
//! of the contract -- the first predicate that accepts wins, even if a
//! later strategy would also match.

use crate::code_model::Expression;
use crate::type_ref::TypeRef;
use std::collections::HashSet;

pub struct ResolveContext<'a> {
    /// Class-level type-parameter names in scope, used to special-case
    /// `Array<T>` against an erased `emptyArray()`.
    pub class_type_params: &'a HashSet<String>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(class_type_params: &'a HashSet<String>) -> Self {
        ResolveContext { class_type_params }
    }
}

/// Never fails: strategy 5 always produces *some* expression, a runtime
/// failure call rather than a compile-time error.
pub fn resolve(type_ref: &TypeRef, ctx: &ResolveContext, member_name: &str) -> Expression {
    if let TypeRef::Nullable(_) = type_ref {
        return Expression::raw("null");
    }

    if let Some(expr) = resolve_primitive(type_ref) {
        return expr;
    }

    if let Some(expr) = resolve_stdlib(type_ref, ctx, member_name) {
        return expr;
    }

    if let Some(expr) = resolve_collection(type_ref, ctx) {
        return expr;
    }

    resolve_fallback(type_ref, member_name)
}

fn resolve_primitive(type_ref: &TypeRef) -> Option<Expression> {
    let TypeRef::Simple(name) = type_ref else { return None };
    match name.as_str() {
        "Int" | "Long" | "Short" | "Byte" => Some(Expression::NumberLiteral("0".into())),
        "Float" => Some(Expression::NumberLiteral("0.0f".into())),
        "Double" => Some(Expression::NumberLiteral("0.0".into())),
        "Boolean" => Some(Expression::raw("false")),
        "Char" => Some(Expression::raw("'\\u0000'")),
        "String" => Some(Expression::StringLiteral(String::new())),
        _ => None,
    }
}

fn resolve_stdlib(type_ref: &TypeRef, ctx: &ResolveContext, member_name: &str) -> Option<Expression> {
    match type_ref {
        TypeRef::Simple(name) if name == "Unit" => Some(Expression::raw("Unit")),
        TypeRef::Generic(name, args) if name == "Flow" && args.len() == 1 => Some(Expression::call("emptyFlow", vec![])),
        TypeRef::Generic(name, args) if (name == "StateFlow" || name == "MutableStateFlow") && args.len() == 1 => {
            Some(Expression::call("MutableStateFlow", vec![resolve(&args[0], ctx, member_name)]))
        }
        TypeRef::Generic(name, args) if name == "Result" && args.len() == 1 => {
            Some(Expression::call("Result.success", vec![resolve(&args[0], ctx, member_name)]))
        }
        _ => None,
    }
}

fn resolve_collection(type_ref: &TypeRef, ctx: &ResolveContext) -> Option<Expression> {
    match type_ref {
        TypeRef::Simple(name) | TypeRef::Generic(name, _) => match name.as_str() {
            "Collection" | "List" => Some(Expression::call("emptyList", vec![])),
            "Set" => Some(Expression::call("emptySet", vec![])),
            "Map" => Some(Expression::call("emptyMap", vec![])),
            "MutableList" => Some(Expression::call("mutableListOf", vec![])),
            "MutableSet" => Some(Expression::call("mutableSetOf", vec![])),
            "MutableMap" => Some(Expression::call("mutableMapOf", vec![])),
            "Array" => Some(resolve_array(type_ref, ctx)),
            _ => None,
        },
        _ => None,
    }
}

fn resolve_array(type_ref: &TypeRef, ctx: &ResolveContext) -> Expression {
    let TypeRef::Generic(_, args) = type_ref else { return Expression::call("emptyArray", vec![]) };
    let element_is_class_param = args.first().and_then(|t| t.top_level_name()).map(|n| ctx.class_type_params.contains(n)).unwrap_or(false);
    if element_is_class_param {
        // `T` can't be reified here; suppress the unchecked-cast warning this forces.
        Expression::raw("@Suppress(\"UNCHECKED_CAST\") (emptyArray<Any>() as Array<T>)")
    } else {
        Expression::call("emptyArray", vec![])
    }
}

fn resolve_fallback(type_ref: &TypeRef, member_name: &str) -> Expression {
    let spelling = type_ref.render();
    Expression::call(
        "error",
        vec![Expression::StringLiteral(format!(
            "No default available for '{member_name}' of type '{spelling}'; configure behavior via the generated DSL"
        ))],
    )
}
