//! Deterministic rendering of a code-model tree into source text.
//!
//! One mutable line buffer threaded through the traversal; indent is a
//! scoped counter bumped on block entry/exit so it can never be mis-nested
//! relative to the braces actually emitted.

use crate::code_model::{Block, Class, Expression, File, Function, Member, Parameter, Property, TopLevelDecl, TypeParameter, Visibility};

const INDENT_WIDTH: usize = 4;

pub fn render(file: &File) -> String {
    let mut r = Renderer::new();
    r.render_file(file);
    r.finish()
}

struct Renderer {
    lines: Vec<String>,
    indent: usize,
}

impl Renderer {
    fn new() -> Self {
        Renderer { lines: Vec::new(), indent: 0 }
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", " ".repeat(self.indent * INDENT_WIDTH), text));
        }
    }

    fn blank_line_if_needed(&mut self) {
        if !self.lines.is_empty() && self.lines.last().map(|l| !l.is_empty()).unwrap_or(false) {
            self.lines.push(String::new());
        }
    }

    fn indented<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn render_file(&mut self, file: &File) {
        if let Some(header) = &file.header {
            for line in header.lines() {
                self.push(format!("// {line}"));
            }
            self.push(String::new());
        }
        self.push(format!("package {}", file.package));
        if !file.imports.is_empty() {
            self.push(String::new());
            for import in &file.imports {
                self.push(format!("import {import}"));
            }
        }

        for decl in &file.declarations {
            self.blank_line_if_needed();
            match decl {
                TopLevelDecl::Class(class) => self.render_class(class),
                TopLevelDecl::Function(function) => self.render_function(function, true),
            }
        }

        while self.lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            self.lines.pop();
        }
    }

    fn render_class(&mut self, class: &Class) {
        let header = class_header(class);
        if class.members.is_empty() {
            self.push(format!("{header} {{}}"));
            return;
        }
        self.push(format!("{header} {{"));
        self.indented(|r| {
            let mut first = true;
            for member in &class.members {
                if !first {
                    // Grouped blank lines are inserted by the caller that built
                    // the member list (e.g. between call-count holders and
                    // behavior holders); the renderer itself never guesses
                    // at group boundaries.
                }
                first = false;
                match member {
                    Member::Property(p) => r.render_property(p),
                    Member::Function(f) => r.render_function(f, false),
                }
            }
        });
        self.push("}");
    }

    fn render_property(&mut self, property: &Property) {
        let vis = visibility_prefix(property.visibility);
        let keyword = if property.is_mutable { "var" } else { "val" };
        let override_kw = if property.is_override { "override " } else { "" };
        let mut line = format!("{vis}{override_kw}{keyword} {}: {}", property.name, property.type_text);
        if let Some(init) = &property.initializer {
            line.push_str(" = ");
            line.push_str(&render_expression(init));
        }
        self.push(line);
        self.indented(|r| {
            if let Some(body) = &property.getter_body {
                r.render_accessor("get()", body);
            }
            if let Some(body) = &property.setter_body {
                r.render_accessor("set(value)", body);
            }
        });
    }

    fn render_accessor(&mut self, signature: &str, body: &Block) {
        match body {
            Block::Empty => {}
            Block::Statements(stmts) if stmts.len() == 1 => {
                // A single `return expr` statement inlines as `get() = expr`;
                // `return` has no meaning in an expression-bodied accessor.
                let expr = stmts[0].strip_prefix("return ").unwrap_or(&stmts[0]);
                self.push(format!("{signature} = {expr}"));
            }
            Block::Statements(stmts) => {
                self.push(format!("{signature} {{"));
                self.indented(|r| {
                    for s in stmts {
                        r.push(s.clone());
                    }
                });
                self.push("}");
            }
        }
    }

    fn render_function(&mut self, function: &Function, top_level: bool) {
        let mut modifiers = String::new();
        if !top_level && function.is_override {
            modifiers.push_str("override ");
        }
        if function.is_internal {
            modifiers.push_str("internal ");
        }
        if function.is_inline {
            modifiers.push_str("inline ");
        }
        if function.is_suspend {
            modifiers.push_str("suspend ");
        }
        if function.is_operator {
            modifiers.push_str("operator ");
        }

        let type_params = if function.type_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}> ", type_parameter_list(&function.type_parameters))
        };

        let receiver = function.extension_receiver.as_ref().map(|r| format!("{r}.")).unwrap_or_default();

        let params = function
            .parameters
            .iter()
            .map(render_parameter)
            .collect::<Vec<_>>()
            .join(", ");

        let return_suffix = if function.return_type == "Unit" { String::new() } else { format!(": {}", function.return_type) };

        let signature = format!("{modifiers}fun {type_params}{receiver}{}({params}){return_suffix}", function.name);

        match &function.body {
            Block::Empty => self.push(format!("{signature} {{}}")),
            Block::Statements(stmts) if stmts.len() == 1 && !stmts[0].contains('\n') => {
                self.push(format!("{signature} {{"));
                self.indented(|r| r.push(stmts[0].clone()));
                self.push("}");
            }
            Block::Statements(stmts) => {
                self.push(format!("{signature} {{"));
                self.indented(|r| {
                    for s in stmts {
                        r.push(s.clone());
                    }
                });
                self.push("}");
            }
        }
    }
}

fn class_header(class: &Class) -> String {
    let type_params = if class.type_parameters.is_empty() {
        String::new()
    } else {
        format!("<{}>", type_parameter_list(&class.type_parameters))
    };
    let mut header = format!("class {}{type_params}", class.name);
    if let Some(super_type) = &class.super_type {
        if class.super_is_class {
            header.push_str(&format!(" : {super_type}()"));
        } else {
            header.push_str(&format!(" : {super_type}"));
        }
    }
    if let Some(where_clause) = &class.where_clause {
        header.push_str(&format!(" where {where_clause}"));
    }
    header
}

fn type_parameter_list(params: &[TypeParameter]) -> String {
    params
        .iter()
        .map(|p| {
            let reified = if p.reified { "reified " } else { "" };
            if p.constraints.len() == 1 {
                format!("{reified}{} : {}", p.name, p.constraints[0])
            } else {
                format!("{reified}{}", p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_parameter(param: &Parameter) -> String {
    let vararg = if param.is_vararg { "vararg " } else { "" };
    let mut text = format!("{vararg}{}: {}", param.name, param.type_text);
    if let Some(default) = &param.default {
        text.push_str(" = ");
        text.push_str(&render_expression(default));
    }
    text
}

fn render_expression(expr: &Expression) -> String {
    match expr {
        Expression::Raw(text) => text.clone(),
        Expression::NumberLiteral(text) => text.clone(),
        Expression::StringLiteral(text) => format!("\"{text}\""),
        Expression::FunctionCall { callee, arguments } => {
            let args = arguments.iter().map(render_expression).collect::<Vec<_>>().join(", ");
            format!("{callee}({args})")
        }
    }
}

fn visibility_prefix(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "",
        Visibility::Private => "private ",
        Visibility::Internal => "internal ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_model::{code_file, ClassBuilder, FunctionBuilder, PropertyBuilder};

    #[test]
    fn renders_package_and_imports_sorted_with_blank_line() {
        let file = code_file("com.example")
            .import("b.Thing")
            .import("a.Other")
            .build()
            .unwrap();
        let out = render(&file);
        assert!(out.starts_with("package com.example\n\nimport a.Other\nimport b.Thing\n"));
    }

    #[test]
    fn renders_trivial_class_with_override_method() {
        let hello = FunctionBuilder::new("hello")
            .parameter("name", "String")
            .returns("String")
            .override_()
            .body(vec!["return helloBehavior(name)".to_string()])
            .build()
            .unwrap();
        let class = ClassBuilder::new("FakeGreeterImpl").implements("Greeter", false).function(hello).build().unwrap();
        let file = code_file("com.example").class(class).build().unwrap();
        let out = render(&file);
        assert!(out.contains("class FakeGreeterImpl : Greeter {"));
        assert!(out.contains("    override fun hello(name: String): String {"));
        assert!(out.contains("        return helloBehavior(name)"));
    }

    #[test]
    fn no_trailing_blank_lines() {
        let file = code_file("com.example").build().unwrap();
        let out = render(&file);
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn property_with_single_line_getter_is_inlined() {
        let prop = PropertyBuilder::new("helloCallCount")
            .of_type("StateFlow<Int>")
            .getter(Block::of(vec!["return _helloCallCount".to_string()]))
            .build()
            .unwrap();
        let class = ClassBuilder::new("X").property(prop).build().unwrap();
        let out = render(&code_file("p").class(class).build().unwrap());
        assert!(out.contains("val helloCallCount: StateFlow<Int>"));
        assert!(out.contains("get() = _helloCallCount"), "expected inlined getter without a stray `return`:\n{out}");
        assert!(!out.contains("get() = return"), "`return` has no meaning in an expression-bodied accessor:\n{out}");
    }
}
