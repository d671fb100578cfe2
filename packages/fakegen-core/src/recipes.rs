//! Fake-synthesis recipes (C5): the "complete fake" pattern and its four
//! per-member pieces (call-count holder, behavior holder, override,
//! configure method), composed from the code-model DSL (C3), the
//! default-value resolver (C2), and Phase T's [`CodeGenInputs`].

use std::collections::HashSet;

use crate::code_model::{code_file, Block, Class, ClassBuilder, Expression, File, Function, FunctionBuilder, Property, PropertyBuilder, Visibility};
use crate::default_value::{self, ResolveContext};
use crate::error::GenResult;
use crate::phase_t::{erase, CodeGenInputs, GenericPattern, MethodSpec, ParamSpec, PropertySpec, TypeParamSpec};
use crate::type_ref::TypeRef;
use crate::util::pascal_case;

/// Emits the complete `Fake{Name}Impl` file: the implementation class, its
/// `Fake{Name}Config` builder class, and the top-level `fake{Name}` factory
/// function, per spec.md §4.5 and §6's factory-surface table.
pub fn synthesize(inputs: &CodeGenInputs) -> GenResult<File> {
    let class_type_param_names: HashSet<String> = inputs.class_type_parameters.iter().map(|p| p.name.clone()).collect();

    let mut call_count_props = Vec::new();
    let mut behavior_props = Vec::new();
    let mut property_overrides = Vec::new();
    let mut overrides = Vec::new();
    let mut configures = Vec::new();
    let mut config_fields = Vec::new(); // (member label, configure call args for applyTo)

    for property in &inputs.properties {
        emit_property(
            property,
            inputs.is_class_target,
            &inputs.target_simple_name,
            &class_type_param_names,
            &mut call_count_props,
            &mut behavior_props,
            &mut property_overrides,
            &mut configures,
            &mut config_fields,
        );
    }
    for method in &inputs.methods {
        emit_method(
            method,
            inputs.is_class_target,
            &inputs.target_simple_name,
            &class_type_param_names,
            &mut call_count_props,
            &mut behavior_props,
            &mut overrides,
            &mut configures,
            &mut config_fields,
        );
    }

    let impl_name = format!("Fake{}Impl", inputs.target_simple_name);
    let mut class_builder = ClassBuilder::new(impl_name.clone());
    let mut where_parts = Vec::new();
    for tp in &inputs.class_type_parameters {
        class_builder = apply_type_param(class_builder, tp, &mut where_parts);
    }
    if !where_parts.is_empty() {
        class_builder = class_builder.where_clause(where_parts.join(", "));
    }
    class_builder = class_builder.implements(target_spelling(inputs), inputs.is_class_target);

    for p in call_count_props {
        class_builder = class_builder.property(p);
    }
    for p in behavior_props {
        class_builder = class_builder.property(p);
    }
    for p in property_overrides {
        class_builder = class_builder.property(p);
    }
    for f in overrides {
        class_builder = class_builder.function(f);
    }
    for f in configures {
        class_builder = class_builder.function(f);
    }
    let impl_class = class_builder.build()?;

    let config_class = build_config_class(inputs, &impl_name, &config_fields)?;
    let factory = build_factory(inputs, &impl_name);

    code_file(inputs.package.clone())
        .imports(inputs.imports.iter().cloned())
        .class(impl_class)
        .class(config_class)
        .function(factory)
        .build()
}

fn target_spelling(inputs: &CodeGenInputs) -> String {
    if inputs.class_type_parameters.is_empty() {
        inputs.target_simple_name.clone()
    } else {
        let args = inputs.class_type_parameters.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(", ");
        format!("{}<{}>", inputs.target_simple_name, args)
    }
}

fn apply_type_param(builder: ClassBuilder, tp: &TypeParamSpec, where_parts: &mut Vec<String>) -> ClassBuilder {
    if tp.bounds.len() <= 1 {
        builder.type_param(tp.name.clone(), tp.bounds.clone())
    } else {
        for bound in &tp.bounds {
            where_parts.push(format!("{} : {}", tp.name, bound));
        }
        builder.type_param(tp.name.clone(), vec![])
    }
}

// ---- Methods ---------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn emit_method(
    method: &MethodSpec,
    target_is_class: bool,
    target_simple_name: &str,
    class_type_params: &HashSet<String>,
    call_count_props: &mut Vec<Property>,
    behavior_props: &mut Vec<Property>,
    overrides: &mut Vec<Function>,
    configures: &mut Vec<Function>,
    config_fields: &mut Vec<ConfigField>,
) {
    let backing = format!("_{}CallCount", method.name);
    let view = format!("{}CallCount", method.name);
    call_count_props.push(call_count_backing(&backing));
    call_count_props.push(call_count_view(&view, &backing));

    let method_type_param_names = method.type_param_names();
    let behavior_name = format!("{}Behavior", method.name);
    let holder_type_text = function_type_text(method, &method_type_param_names);
    let is_nullable_holder = !method.is_abstract_or_interface;

    let default_expr =
        if target_is_class && method.is_abstract_or_interface { abstract_error(&method.name, target_simple_name) } else { method_default(method, class_type_params) };

    let mut prop_builder = PropertyBuilder::new(behavior_name.clone())
        .visibility(Visibility::Private)
        .mutable();
    prop_builder = if is_nullable_holder {
        prop_builder.of_type(format!("{holder_type_text}?")).initializer(Expression::raw("null"))
    } else {
        prop_builder.of_type(holder_type_text).initializer(default_expr)
    };
    behavior_props.push(prop_builder.build().expect("behavior property always has a type"));

    let mut override_builder = FunctionBuilder::new(method.name.clone())
        .override_()
        .returns(method.return_type.render())
        .type_parameters(method.method_type_parameters.iter().map(|tp| (tp.name.clone(), tp.bounds.clone())));
    if method.is_suspend {
        override_builder = override_builder.suspend();
    }
    if let Some(op) = &method.operator {
        let _ = op;
        override_builder = override_builder.operator();
    }
    if let Some(receiver) = &method.extension_receiver {
        override_builder = override_builder.extension_receiver(receiver.render());
    }
    for p in &method.parameters {
        override_builder = if p.is_vararg {
            override_builder.vararg_parameter(p.name.clone(), p.type_ref.render())
        } else {
            override_builder.parameter(p.name.clone(), p.type_ref.render())
        };
    }
    let body = override_body(method, &backing, &behavior_name);
    overrides.push(override_builder.body(body).build().expect("override function always has a return type"));

    let configure_name = format!("configure{}", pascal_case(&method.name));
    let unerased_holder_type = function_type_text(method, &[]);
    let needs_cast = !method_type_param_names.is_empty();
    let configure_body = if needs_cast {
        vec!["@Suppress(\"UNCHECKED_CAST\")".to_string(), format!("{behavior_name} = behavior as {holder_type}", holder_type = holder_type_for_assignment(&function_type_text(method, &method_type_param_names), is_nullable_holder))]
    } else {
        vec![format!("{behavior_name} = behavior")]
    };
    let configure_builder = FunctionBuilder::new(configure_name.clone())
        .internal()
        .returns("Unit")
        .parameter("behavior", unerased_holder_type)
        .type_parameters(method.method_type_parameters.iter().map(|tp| (tp.name.clone(), tp.bounds.clone())))
        .body(configure_body);
    configures.push(configure_builder.build().expect("configure function always has a return type"));

    // A method-level type parameter can't be declared on a `FakeXConfig`
    // property (the config class only ever carries the target's
    // class-level parameters), so such a member is configurable only
    // through the impl's own generic `configure{Name}` member above, not
    // through the builder-DSL field below.
    if method.method_type_parameters.is_empty() {
        config_fields.push(ConfigField {
            field_name: format!("{}Override", method.name),
            field_type: function_type_text(method, &[]),
            configure_call: configure_name,
        });
    }
}

fn call_count_backing(name: &str) -> Property {
    PropertyBuilder::new(name)
        .of_type("MutableStateFlow<Int>")
        .visibility(Visibility::Private)
        .mutable()
        .initializer(Expression::call("MutableStateFlow", vec![Expression::NumberLiteral("0".into())]))
        .build()
        .expect("call-count backing always has a type")
}

fn call_count_view(name: &str, backing: &str) -> Property {
    PropertyBuilder::new(name)
        .of_type("StateFlow<Int>")
        .getter(Block::of(vec![format!("return {backing}")]))
        .build()
        .expect("call-count view always has a type")
}

fn abstract_error(member_name: &str, target_simple_name: &str) -> Expression {
    Expression::call(
        "error",
        vec![Expression::StringLiteral(format!("Abstract method '{member_name}' in '{target_simple_name}' must be configured"))],
    )
}

fn method_default(method: &MethodSpec, class_type_params: &HashSet<String>) -> Expression {
    if let Some(expr) = function_invocation_pattern(method) {
        return expr;
    }
    if let Some(expr) = identity_pattern(method) {
        return expr;
    }
    let ctx = ResolveContext::new(class_type_params);
    default_value::resolve(&method.return_type, &ctx, &method.name)
}

/// `<T> execute(step: () -> T): T` -> `{ p0 -> p0() }`.
fn function_invocation_pattern(method: &MethodSpec) -> Option<Expression> {
    if method.parameters.len() != 1 {
        return None;
    }
    let p = &method.parameters[0];
    if p.is_vararg {
        return None;
    }
    let TypeRef::Function { parameters, return_type, .. } = &p.type_ref else { return None };
    if !parameters.is_empty() {
        return None;
    }
    if return_type.non_nullable() != method.return_type.non_nullable() {
        return None;
    }
    Some(Expression::raw("{ p0 -> p0() }"))
}

/// A single non-receiver parameter whose type equals the return type
/// (ignoring nullability) -> `{ it }`. Excluded for extension receivers,
/// since the lambda would then need two parameters, and for vararg
/// parameters, since the holder's declared type wraps the element type in
/// `Array<out T>` (see `param_type_text`) while the return type never is.
fn identity_pattern(method: &MethodSpec) -> Option<Expression> {
    if method.extension_receiver.is_some() {
        return None;
    }
    if method.parameters.len() != 1 {
        return None;
    }
    let p = &method.parameters[0];
    if p.is_vararg {
        return None;
    }
    if p.type_ref.non_nullable() != method.return_type.non_nullable() {
        return None;
    }
    Some(Expression::raw("{ it }"))
}

fn function_type_text(method: &MethodSpec, erasure_names: &[String]) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| param_type_text(p, erasure_names))
        .collect::<Vec<_>>()
        .join(", ");
    let ret = erase_if_needed(&method.return_type, erasure_names).render();
    let suspend = if method.is_suspend { "suspend " } else { "" };
    format!("{suspend}({params}) -> {ret}")
}

fn param_type_text(p: &ParamSpec, erasure_names: &[String]) -> String {
    let rendered = erase_if_needed(&p.type_ref, erasure_names).render();
    if p.is_vararg {
        format!("Array<out {rendered}>")
    } else {
        rendered
    }
}

fn erase_if_needed(type_ref: &TypeRef, erasure_names: &[String]) -> TypeRef {
    if erasure_names.is_empty() {
        type_ref.clone()
    } else {
        erase(type_ref, erasure_names)
    }
}

fn holder_type_for_assignment(holder_type_text: &str, nullable: bool) -> String {
    if nullable {
        format!("({holder_type_text})?")
    } else {
        holder_type_text.to_string()
    }
}

fn override_body(method: &MethodSpec, count_backing: &str, behavior_name: &str) -> Vec<String> {
    let mut stmts = vec![format!("{count_backing}.update {{ it + 1 }}")];
    // The behavior holder's type is `(Array<out T>) -> R` even for a vararg
    // parameter (see param_type_text), so invoking it never spreads -- the
    // parameter's own `Array<out T>` value is passed straight through.
    // Only `super.method(...)`, which really does declare a vararg
    // parameter, needs the spread form to forward it.
    let lambda_args = method.parameters.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(", ");
    let super_args = method
        .parameters
        .iter()
        .map(|p| if p.is_vararg { format!("*{}", p.name) } else { p.name.clone() })
        .collect::<Vec<_>>()
        .join(", ");
    let needs_cast = !method.method_type_parameters.is_empty();
    let return_type_text = method.return_type.render();

    if method.is_abstract_or_interface {
        let call = format!("{behavior_name}({lambda_args})");
        if needs_cast {
            stmts.push("@Suppress(\"UNCHECKED_CAST\")".to_string());
            stmts.push(format!("return {call} as {return_type_text}"));
        } else {
            stmts.push(format!("return {call}"));
        }
    } else {
        let super_call = format!("super.{}({super_args})", method.name);
        if needs_cast {
            stmts.push("@Suppress(\"UNCHECKED_CAST\")".to_string());
            stmts.push(format!("return ({behavior_name}?.invoke({lambda_args}) as {return_type_text}?) ?: {super_call}"));
        } else {
            stmts.push(format!("return {behavior_name}?.invoke({lambda_args}) ?: {super_call}"));
        }
    }
    stmts
}

// ---- Properties --------------------------------------------------------

struct ConfigField {
    field_name: String,
    field_type: String,
    configure_call: String,
}

#[allow(clippy::too_many_arguments)]
fn emit_property(
    property: &PropertySpec,
    target_is_class: bool,
    target_simple_name: &str,
    class_type_params: &HashSet<String>,
    call_count_props: &mut Vec<Property>,
    behavior_props: &mut Vec<Property>,
    property_overrides: &mut Vec<Property>,
    configures: &mut Vec<Function>,
    config_fields: &mut Vec<ConfigField>,
) {
    let getter_backing = format!("_{}GetCallCount", property.name);
    let getter_view = format!("{}GetCallCount", property.name);
    call_count_props.push(call_count_backing(&getter_backing));
    call_count_props.push(call_count_view(&getter_view, &getter_backing));

    let getter_behavior_name = format!("{}GetterBehavior", property.name);
    let is_nullable_holder = !property.is_abstract_or_interface;
    let getter_type_text = format!("() -> {}", property.type_ref.render());
    let default_expr = if target_is_class && property.is_abstract_or_interface {
        abstract_error(&property.name, target_simple_name)
    } else {
        let ctx = ResolveContext::new(class_type_params);
        default_value::resolve(&property.type_ref, &ctx, &property.name)
    };
    let mut getter_prop = PropertyBuilder::new(getter_behavior_name.clone()).visibility(Visibility::Private).mutable();
    getter_prop = if is_nullable_holder {
        getter_prop.of_type(format!("{getter_type_text}?")).initializer(Expression::raw("null"))
    } else {
        getter_prop.of_type(getter_type_text.clone()).initializer(default_expr)
    };
    behavior_props.push(getter_prop.build().expect("getter behavior property always has a type"));

    // Setter pieces (call-count, behavior holder, configure method) are
    // computed before `value_prop` is built so its setter body can be
    // attached in the same builder chain as the getter.
    let setter_info = if property.is_mutable {
        let setter_backing = format!("_{}SetCallCount", property.name);
        let setter_view = format!("{}SetCallCount", property.name);
        call_count_props.push(call_count_backing(&setter_backing));
        call_count_props.push(call_count_view(&setter_view, &setter_backing));

        let setter_behavior_name = format!("{}SetterBehavior", property.name);
        let setter_type_text = format!("({}) -> Unit", property.type_ref.render());
        let setter_prop = PropertyBuilder::new(setter_behavior_name.clone())
            .visibility(Visibility::Private)
            .mutable()
            .of_type(format!("{setter_type_text}?"))
            .initializer(Expression::raw("null"))
            .build()
            .expect("setter behavior property always has a type");
        behavior_props.push(setter_prop);

        Some((setter_backing, setter_behavior_name, setter_type_text))
    } else {
        None
    };

    let mut value_prop_builder = PropertyBuilder::new(property.name.clone())
        .of_type(property.type_ref.render())
        .override_()
        .mutable_if(property.is_mutable)
        .getter(Block::of(vec![
            format!("{getter_backing}.update {{ it + 1 }}"),
            if property.is_abstract_or_interface {
                format!("return {getter_behavior_name}()")
            } else {
                format!("return {getter_behavior_name}?.invoke() ?: super.{}", property.name)
            },
        ]));
    if let Some((setter_backing, setter_behavior_name, _)) = &setter_info {
        value_prop_builder = value_prop_builder.setter(Block::of(vec![
            format!("{setter_backing}.update {{ it + 1 }}"),
            format!("{setter_behavior_name}?.invoke(value) ?: run {{ super.{} = value }}", property.name),
        ]));
    }
    property_overrides.push(value_prop_builder.build().expect("value property always has a type"));

    let configure_getter_name = format!("configure{}Getter", pascal_case(&property.name));
    configures.push(
        FunctionBuilder::new(configure_getter_name.clone())
            .internal()
            .returns("Unit")
            .parameter("behavior", getter_type_text)
            .body(vec![format!("{getter_behavior_name} = behavior")])
            .build()
            .expect("configure function always has a return type"),
    );
    config_fields.push(ConfigField {
        field_name: format!("{}GetterOverride", property.name),
        field_type: format!("() -> {}", property.type_ref.render()),
        configure_call: configure_getter_name,
    });

    if let Some((_, setter_behavior_name, setter_type_text)) = setter_info {
        let configure_setter_name = format!("configure{}Setter", pascal_case(&property.name));
        configures.push(
            FunctionBuilder::new(configure_setter_name.clone())
                .internal()
                .returns("Unit")
                .parameter("behavior", setter_type_text)
                .body(vec![format!("{setter_behavior_name} = behavior")])
                .build()
                .expect("configure function always has a return type"),
        );
        config_fields.push(ConfigField {
            field_name: format!("{}SetterOverride", property.name),
            field_type: format!("({}) -> Unit", property.type_ref.render()),
            configure_call: configure_setter_name,
        });
    }
}

// ---- Config DSL & factory ----------------------------------------------

fn build_config_class(inputs: &CodeGenInputs, impl_name: &str, fields: &[ConfigField]) -> GenResult<Class> {
    let config_name = format!("Fake{}Config", inputs.target_simple_name);
    let mut builder = ClassBuilder::new(config_name);
    let mut where_parts = Vec::new();
    for tp in &inputs.class_type_parameters {
        builder = apply_type_param(builder, tp, &mut where_parts);
    }
    if !where_parts.is_empty() {
        builder = builder.where_clause(where_parts.join(", "));
    }

    for field in fields {
        let prop = PropertyBuilder::new(field.field_name.clone())
            .visibility(Visibility::Private)
            .mutable()
            .of_type(format!("({})?", field.field_type))
            .initializer(Expression::raw("null"))
            .build()?;
        builder = builder.property(prop);
    }

    let apply_to = build_apply_to(impl_name, fields)?;
    builder = builder.function(apply_to);
    builder.build()
}

fn build_apply_to(impl_name: &str, fields: &[ConfigField]) -> GenResult<Function> {
    let statements: Vec<String> = fields
        .iter()
        .map(|f| format!("{}?.let {{ fake.{}(it) }}", f.field_name, f.configure_call))
        .collect();
    FunctionBuilder::new("applyTo")
        .internal()
        .parameter("fake", impl_name)
        .returns("Unit")
        .body(statements)
        .build()
}

fn build_factory(inputs: &CodeGenInputs, impl_name: &str) -> Function {
    let config_name = format!("Fake{}Config", inputs.target_simple_name);
    let target_args = target_spelling(inputs);
    let config_args = if inputs.class_type_parameters.is_empty() {
        config_name.clone()
    } else {
        let names = inputs.class_type_parameters.iter().map(|p| p.name.clone()).collect::<Vec<_>>().join(", ");
        format!("{config_name}<{names}>")
    };

    let mut builder = FunctionBuilder::new(format!("fake{}", inputs.target_simple_name)).returns(target_args);
    let reified = matches!(inputs.generic_pattern, GenericPattern::ClassLevel | GenericPattern::Mixed);
    if reified {
        builder = builder.inline();
        for tp in &inputs.class_type_parameters {
            builder = builder.reified_type_param(tp.name.clone(), tp.bounds.clone());
        }
    }
    builder
        .parameter_with_default("configure", format!("{config_args}.() -> Unit"), Expression::raw("{}"))
        .body(vec![
            format!("val config = {config_name}()"),
            "config.configure()".to_string(),
            format!("val fake = {impl_name}()"),
            "config.applyTo(fake)".to_string(),
            "return fake".to_string(),
        ])
        .build()
        .expect("factory function always has a return type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase_f::ValidatedDecl;
    use crate::phase_t::transform;
    use crate::render::render;

    #[test]
    fn pattern_selection_prefers_function_invocation_over_identity() {
        use crate::phase_t::ParamSpec;
        let method = MethodSpec {
            name: "execute".into(),
            parameters: vec![ParamSpec {
                name: "step".into(),
                type_ref: TypeRef::parse("() -> T"),
                is_vararg: false,
            }],
            return_type: TypeRef::parse("T"),
            is_suspend: false,
            method_type_parameters: vec![TypeParamSpec { name: "T".into(), bounds: vec![], variance: crate::host::Variance::Invariant }],
            extension_receiver: None,
            operator: None,
            is_abstract_or_interface: true,
        };
        let expr = method_default(&method, &HashSet::new());
        assert_eq!(expr, Expression::raw("{ p0 -> p0() }"));
    }

    #[test]
    fn identity_pattern_when_single_param_matches_return() {
        use crate::phase_t::ParamSpec;
        let method = MethodSpec {
            name: "hello".into(),
            parameters: vec![ParamSpec { name: "name".into(), type_ref: TypeRef::parse("String"), is_vararg: false }],
            return_type: TypeRef::parse("String"),
            is_suspend: false,
            method_type_parameters: vec![],
            extension_receiver: None,
            operator: None,
            is_abstract_or_interface: true,
        };
        let expr = method_default(&method, &HashSet::new());
        assert_eq!(expr, Expression::raw("{ it }"));
    }

    fn greeter_unit() -> crate::host::HostFacts {
        use crate::host::*;
        use crate::parse_util::ParseSourceSpan;
        HostFacts {
            unit_name: "test".into(),
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

    #[test]
    fn full_pipeline_renders_trivial_interface_fake() {
        let facts = greeter_unit();
        let raw = &facts.declarations[0];
        let mut annotated = HashSet::new();
        annotated.insert(raw.fq_name.clone());
        let results = crate::phase_f::analyze_unit(&facts, &annotated);
        let ValidatedDecl::Interface(_) = results[0].as_ref().unwrap() else { panic!("expected interface") };
        let validated = results.into_iter().next().unwrap().unwrap();
        let inputs = transform(&validated);
        let file = synthesize(&inputs).unwrap();
        let text = render(&file);
        assert!(text.contains("class FakeGreeterImpl : Greeter {"));
        assert!(text.contains("private var helloBehavior: (String) -> String = { it }"));
        assert!(text.contains("override fun hello(name: String): String {"));
        assert!(text.contains("internal fun configureHello(behavior: (String) -> String) {"));
        assert!(text.contains("fun fakeGreeter(configure: FakeGreeterConfig.() -> Unit = {}): Greeter {"));
    }

    fn counter_unit() -> crate::host::HostFacts {
        use crate::host::*;
        use crate::parse_util::ParseSourceSpan;
        HostFacts {
            unit_name: "test".into(),
            declarations: vec![RawDeclaration {
                fq_name: "com.example.Counter".into(),
                simple_name: "Counter".into(),
                package: "com.example".into(),
                kind: DeclarationKind::Interface,
                modifiers: RawModifiers::default(),
                type_parameters: vec![],
                properties: vec![RawProperty { name: "value".into(), type_spelling: "Int".into(), is_mutable: true, is_nullable: false }],
                functions: vec![],
                abstract_member_names: vec![],
                direct_supertypes: vec![],
                location: ParseSourceSpan::whole_file("Counter.kt"),
            }],
        }
    }

    #[test]
    fn mutable_property_fake_includes_both_getter_and_setter_overrides() {
        let facts = counter_unit();
        let raw = &facts.declarations[0];
        let mut annotated = HashSet::new();
        annotated.insert(raw.fq_name.clone());
        let results = crate::phase_f::analyze_unit(&facts, &annotated);
        let validated = results.into_iter().next().unwrap().unwrap();
        let inputs = transform(&validated);
        let file = synthesize(&inputs).unwrap();
        let text = render(&file);

        // the property override itself must actually be emitted -- this is
        // the piece that a stubbed-out splice point used to silently drop.
        assert!(text.contains("override var value: Int"), "missing property override in:\n{text}");
        assert!(text.contains("_valueGetCallCount.update { it + 1 }"));
        assert!(text.contains("return valueGetterBehavior()"));
        assert!(text.contains("_valueSetCallCount.update { it + 1 }"));
        assert!(text.contains("valueSetterBehavior?.invoke(value) ?: run { super.value = value }"));
        assert!(text.contains("internal fun configureValueGetter(behavior: () -> Int) {"));
        assert!(text.contains("internal fun configureValueSetter(behavior: (Int) -> Unit) {"));
    }
}
