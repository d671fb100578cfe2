//! Type-reference spellings: a total parser from raw text to a tagged tree,
//! and a renderer that is the parser's left inverse for any spelling the
//! renderer itself produces.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Simple(String),
    Generic(String, Vec<TypeRef>),
    Nullable(Box<TypeRef>),
    Function { parameters: Vec<TypeRef>, return_type: Box<TypeRef>, suspend: bool },
}

impl TypeRef {
    /// Never fails: unparseable input falls back to `Simple` holding the
    /// original spelling verbatim.
    pub fn parse(raw: &str) -> TypeRef {
        let s = raw.trim();
        let s = strip_outer_parens(s);

        if let Some(stripped) = s.strip_suffix('?') {
            if is_depth_balanced(stripped) {
                return TypeRef::Nullable(Box::new(TypeRef::parse(stripped)));
            }
        }

        if let Some((parameters, return_type, suspend)) = try_parse_function(s) {
            return TypeRef::Function {
                parameters: parameters.iter().map(|p| TypeRef::parse(p)).collect(),
                return_type: Box::new(TypeRef::parse(&return_type)),
                suspend,
            };
        }

        if let Some((name, args)) = try_parse_generic(s) {
            return TypeRef::Generic(name, args.iter().map(|a| TypeRef::parse(a)).collect());
        }

        TypeRef::Simple(s.to_string())
    }

    pub fn render(&self) -> String {
        match self {
            TypeRef::Simple(name) => name.clone(),
            TypeRef::Generic(name, args) => {
                if args.is_empty() {
                    format!("{name}<>")
                } else {
                    let rendered: Vec<String> = args.iter().map(TypeRef::render).collect();
                    format!("{name}<{}>", rendered.join(", "))
                }
            }
            TypeRef::Nullable(inner) => format!("{}?", render_nullable_inner(inner)),
            TypeRef::Function { parameters, return_type, suspend } => {
                let params: Vec<String> = parameters.iter().map(TypeRef::render).collect();
                format!(
                    "{}({}) -> {}",
                    if *suspend { "suspend " } else { "" },
                    params.join(", "),
                    return_type.render()
                )
            }
        }
    }

    /// The class-level type-parameter names this reference mentions at its
    /// top level (used by the default-value resolver's `Array<T>` rule).
    pub fn top_level_name(&self) -> Option<&str> {
        match self {
            TypeRef::Simple(name) => Some(name),
            TypeRef::Generic(name, _) => Some(name),
            TypeRef::Nullable(inner) => inner.top_level_name(),
            TypeRef::Function { .. } => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// Strips one layer of [`TypeRef::Nullable`], if present.
    pub fn non_nullable(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner,
            other => other,
        }
    }
}

fn render_nullable_inner(inner: &TypeRef) -> String {
    match inner {
        TypeRef::Function { .. } => format!("({})", inner.render()),
        other => other.render(),
    }
}

/// Depth counting both angle brackets and parens; used to confirm a
/// substring is internally balanced before treating a trailing character as
/// a top-level operator.
fn is_depth_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for ch in s.chars() {
        match ch {
            '<' | '(' => depth += 1,
            '>' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Repeatedly strips a fully-wrapping `(...)` pair, e.g. turns
/// `((Int) -> String)` into `(Int) -> String`.
fn strip_outer_parens(s: &str) -> &str {
    let mut cur = s;
    loop {
        if cur.len() < 2 || !cur.starts_with('(') || !cur.ends_with(')') {
            return cur;
        }
        let chars: Vec<char> = cur.chars().collect();
        let mut depth = 0i32;
        let mut matched_at_end = false;
        for (i, ch) in chars.iter().enumerate() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        matched_at_end = i == chars.len() - 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if matched_at_end {
            let byte_start = cur.char_indices().nth(1).map(|(i, _)| i).unwrap_or(cur.len());
            let byte_end = cur.char_indices().last().map(|(i, _)| i).unwrap_or(cur.len());
            cur = &cur[byte_start..byte_end];
        } else {
            return cur;
        }
    }
}

/// Finds an unbracketed `->`, counting both angle-bracket and paren depth
/// (per the grammar rule: an arrow nested inside a generic's argument list
/// or a parenthesized function-type parameter does not terminate the outer
/// parse as a function type).
fn find_top_level_arrow(s: &str) -> Option<usize> {
    let chars: Vec<char> = s.chars().collect();
    let mut angle_depth = 0i32;
    let mut paren_depth = 0i32;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '-' && chars.get(i + 1) == Some(&'>') {
            if angle_depth == 0 && paren_depth == 0 {
                return Some(i);
            }
            i += 2;
            continue;
        }
        match chars[i] {
            '<' => angle_depth += 1,
            '>' => angle_depth -= 1,
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn try_parse_function(s: &str) -> Option<(Vec<String>, String, bool)> {
    let (suspend, rest) = match s.strip_prefix("suspend ") {
        Some(r) => (true, r.trim()),
        None => (false, s),
    };

    let chars: Vec<char> = rest.chars().collect();
    let arrow_char_idx = find_top_level_arrow(rest)?;
    let arrow_byte_idx = char_idx_to_byte_idx(rest, arrow_char_idx);
    let params_str = rest[..arrow_byte_idx].trim();
    let return_byte_idx = char_idx_to_byte_idx(rest, arrow_char_idx + 2);
    let return_str = rest[return_byte_idx..].trim();

    if return_str.is_empty() {
        return None;
    }
    let _ = chars;

    if !params_str.starts_with('(') || !params_str.ends_with(')') {
        return None;
    }
    let inner = &params_str[1..params_str.len() - 1];
    let params = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level_commas(inner).into_iter().map(|p| p.trim().to_string()).collect()
    };

    Some((params, return_str.to_string(), suspend))
}

fn try_parse_generic(s: &str) -> Option<(String, Vec<String>)> {
    let open_char_idx = s.chars().position(|c| c == '<')?;
    let open_byte_idx = char_idx_to_byte_idx(s, open_char_idx);
    let name = s[..open_byte_idx].trim();
    if name.is_empty() || !is_identifier_like(name) {
        return None;
    }

    let chars: Vec<char> = s.chars().collect();
    let mut depth = 0i32;
    let mut close_char_idx = None;
    for (i, ch) in chars.iter().enumerate().skip(open_char_idx) {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    close_char_idx = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close_char_idx = close_char_idx?;
    if close_char_idx != chars.len() - 1 {
        return None;
    }

    let args_byte_start = char_idx_to_byte_idx(s, open_char_idx + 1);
    let args_byte_end = char_idx_to_byte_idx(s, close_char_idx);
    let args_str = &s[args_byte_start..args_byte_end];
    let args = if args_str.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level_commas(args_str).into_iter().map(|a| a.trim().to_string()).collect()
    };

    Some((name.to_string(), args))
}

fn is_identifier_like(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

fn char_idx_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}

/// Splits on commas at depth 0, counting both angle brackets and parens, so
/// that a function-typed generic argument's own parameter-list commas don't
/// split the outer argument list.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in s.chars() {
        match ch {
            '<' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(spelling: &str) {
        let tree = TypeRef::parse(spelling);
        assert_eq!(tree.render(), spelling, "roundtrip failed for {spelling:?}: {tree:?}");
    }

    #[test]
    fn simple_name() {
        assert_eq!(TypeRef::parse("String"), TypeRef::Simple("String".into()));
        roundtrip("String");
    }

    #[test]
    fn nullable_simple() {
        assert_eq!(
            TypeRef::parse("String?"),
            TypeRef::Nullable(Box::new(TypeRef::Simple("String".into())))
        );
        roundtrip("String?");
    }

    #[test]
    fn generic_single_arg() {
        assert_eq!(
            TypeRef::parse("List<T>"),
            TypeRef::Generic("List".into(), vec![TypeRef::Simple("T".into())])
        );
        roundtrip("List<T>");
    }

    #[test]
    fn generic_nested() {
        let tree = TypeRef::parse("Map<K, List<V>>");
        assert_eq!(
            tree,
            TypeRef::Generic(
                "Map".into(),
                vec![
                    TypeRef::Simple("K".into()),
                    TypeRef::Generic("List".into(), vec![TypeRef::Simple("V".into())])
                ]
            )
        );
        roundtrip("Map<K, List<V>>");
    }

    #[test]
    fn nullable_generic() {
        roundtrip("List<T>?");
    }

    #[test]
    fn function_no_args() {
        let tree = TypeRef::parse("() -> T");
        assert_eq!(
            tree,
            TypeRef::Function {
                parameters: vec![],
                return_type: Box::new(TypeRef::Simple("T".into())),
                suspend: false
            }
        );
        roundtrip("() -> T");
    }

    #[test]
    fn function_with_args_and_suspend() {
        let tree = TypeRef::parse("suspend (String) -> List<T>");
        assert_eq!(
            tree,
            TypeRef::Function {
                parameters: vec![TypeRef::Simple("String".into())],
                return_type: Box::new(TypeRef::Generic("List".into(), vec![TypeRef::Simple("T".into())])),
                suspend: true,
            }
        );
        roundtrip("suspend (String) -> List<T>");
    }

    #[test]
    fn generic_with_function_type_argument() {
        roundtrip("List<(Int, String) -> Boolean>");
    }

    #[test]
    fn nullable_function_type() {
        roundtrip("((Int) -> String)?");
    }

    #[test]
    fn function_type_with_function_type_parameter() {
        let tree = TypeRef::parse("((Int) -> String) -> Boolean");
        assert_eq!(
            tree,
            TypeRef::Function {
                parameters: vec![TypeRef::Function {
                    parameters: vec![TypeRef::Simple("Int".into())],
                    return_type: Box::new(TypeRef::Simple("String".into())),
                    suspend: false,
                }],
                return_type: Box::new(TypeRef::Simple("Boolean".into())),
                suspend: false,
            }
        );
        roundtrip("((Int) -> String) -> Boolean");
    }

    #[test]
    fn empty_generic_arguments_preserved() {
        let tree = TypeRef::parse("Foo<>");
        assert_eq!(tree, TypeRef::Generic("Foo".into(), vec![]));
        roundtrip("Foo<>");
    }

    #[test]
    fn malformed_input_falls_back_to_simple() {
        let tree = TypeRef::parse("<<not valid>>");
        assert!(matches!(tree, TypeRef::Simple(_)));
    }
}
