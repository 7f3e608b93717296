//! CJS-to-Namespaced rewriter (spec.md §4.3, §4.4).

pub mod graph;
pub mod suffixer;

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::{AssignmentTarget, Expression, ObjectPropertyKind, Program, Statement};
use oxc_span::Span;

use crate::ast::factory::Factory;
use crate::diagnostics::Reporter;
use crate::module_name::to_module_name;
use graph::DependencySink;

/// CJS-to-Namespaced rewrite pass (spec.md §4.3). Stateless across files —
/// each call to [`rewrite`] owns exactly one script, matching the §5
/// single-threaded-per-script concurrency model.
pub struct CjsRewriter;

impl CjsRewriter {
    /// Rewrite `program` (the script rooted at `source_path`) in place.
    /// `reporter` is accepted for symmetry with the AMD pass and future
    /// diagnostics (spec.md §4.6 names no CJS-specific codes today).
    /// `report_dependencies` gates only the `require` edges registered into
    /// `sink` (spec.md §4.3 point A: "if dependency reporting is enabled,
    /// register ... as a dependency") — the module's own `provide` and its
    /// `ModuleRecord` are always recorded, since §4.3 point C names no such
    /// gate for those.
    pub fn rewrite<'a>(
        factory: &Factory<'a>,
        program: &mut Program<'a>,
        source_path: &str,
        sink: &mut dyn DependencySink,
        _reporter: &mut dyn Reporter,
        report_dependencies: bool,
    ) {
        let module_id = to_module_name(source_path, None);

        let mut requires = Vec::new();
        rewrite_statements(factory, &mut program.body, source_path, &module_id, &mut requires);

        let mut seen = std::collections::HashSet::new();
        let mut ordered_requires = Vec::new();
        for dep in requires {
            if seen.insert(dep.clone()) {
                ordered_requires.push(dep);
            }
        }
        if report_dependencies {
            for dep in &ordered_requires {
                sink.require(&module_id, dep);
            }
        }
        sink.provide(&module_id);
        sink.record_module(graph::ModuleRecord {
            module_id: module_id.clone(),
            source_path: source_path.to_string(),
        });

        let entry_span = program.body.first().map(statement_span).unwrap_or(Span::new(0, 0));

        // Suffix the script's own top-level bindings *before* the wrapper is
        // spliced in, so the synthesized `var <moduleId> = {};` binding never
        // gets caught up and re-suffixed against itself.
        suffixer::suffix_program(factory, program, &module_id);

        prepend_entry(factory, program, &module_id, &ordered_requires, entry_span);
        append_module_exports_epilogue(factory, program, &module_id, entry_span);
    }
}

/// `goog.provide(moduleId); var moduleId = {};` followed by one
/// `goog.require(dep);` per distinct dependency, in first-seen order
/// (spec.md §4.3's script-entry trigger, §8 scenario 8's ordering).
fn prepend_entry<'a>(
    factory: &Factory<'a>,
    program: &mut Program<'a>,
    module_id: &str,
    requires: &[String],
    span: Span,
) {
    let mut prologue = Vec::with_capacity(requires.len() + 2);
    prologue.push(goog_call(factory, span, "provide", module_id));
    let empty_object = factory.empty_object_literal(span);
    prologue.push(factory.var(span, module_id, Some(empty_object)));
    for dep in requires {
        prologue.push(goog_call(factory, span, "require", dep));
    }

    for (i, stmt) in prologue.into_iter().enumerate() {
        program.body.insert(i, stmt);
    }
}

/// `if (moduleId.module$exports) { moduleId = moduleId.module$exports; }`
/// — lets a module that fully replaced `module.exports` with a new value
/// (rather than mutating the shared namespace object) still be referenced
/// by its namespaced identifier elsewhere (spec.md §4.3's indirection epilogue).
fn append_module_exports_epilogue<'a>(factory: &Factory<'a>, program: &mut Program<'a>, module_id: &str, span: Span) {
    let module_ref = factory.name(span, module_id);
    let test = factory.property_access(span, module_ref, "module$exports");

    let module_ref_lhs = factory.name(span, module_id);
    let module_exports_ref = factory.name(span, module_id);
    let rhs = factory.property_access(span, module_exports_ref, "module$exports");
    let assignment = factory.assign(span, module_ref_lhs, rhs);
    let assignment_stmt = factory.expression_statement(span, assignment);

    let mut block_body = factory.builder.vec();
    block_body.push(assignment_stmt);
    let block = factory.block(span, block_body);

    let if_stmt = factory.if_stmt(span, test, block);
    program.body.push(if_stmt);
}

fn goog_call<'a>(factory: &Factory<'a>, span: Span, method: &str, arg: &str) -> Statement<'a> {
    let goog = factory.name(span, "goog");
    let callee = factory.property_access(span, goog, method);
    let mut args = factory.builder.vec();
    args.push(factory.string_arg(span, arg));
    let call = factory.call(span, callee, args);
    factory.expression_statement(span, call)
}

fn statement_span(stmt: &Statement) -> Span {
    match stmt {
        Statement::ExpressionStatement(s) => s.span,
        Statement::VariableDeclaration(s) => s.span,
        Statement::FunctionDeclaration(s) => s.span,
        _ => Span::new(0, 0),
    }
}

/// Walk every statement in `stmts`, rewriting `require(literal)` calls and
/// `module.exports` accesses wherever they appear — including inside nested
/// function bodies, since CJS modules routinely `require` lazily inside a
/// function (spec.md §4.3 places no top-level restriction on these triggers,
/// unlike AMD's `define()`).
fn rewrite_statements<'a>(
    factory: &Factory<'a>,
    stmts: &mut ArenaVec<'a, Statement<'a>>,
    source_path: &str,
    module_id: &str,
    requires: &mut Vec<String>,
) {
    for stmt in stmts.iter_mut() {
        rewrite_statement(factory, stmt, source_path, module_id, requires);
    }
}

fn rewrite_statement<'a>(
    factory: &Factory<'a>,
    stmt: &mut Statement<'a>,
    source_path: &str,
    module_id: &str,
    requires: &mut Vec<String>,
) {
    match stmt {
        Statement::ExpressionStatement(s) => rewrite_expression(factory, &mut s.expression, source_path, module_id, requires),
        Statement::VariableDeclaration(decl) => {
            for d in decl.declarations.iter_mut() {
                if let Some(init) = d.init.as_mut() {
                    rewrite_expression(factory, init, source_path, module_id, requires);
                }
            }
        }
        Statement::ReturnStatement(ret) => {
            if let Some(arg) = ret.argument.as_mut() {
                rewrite_expression(factory, arg, source_path, module_id, requires);
            }
        }
        Statement::ThrowStatement(t) => rewrite_expression(factory, &mut t.argument, source_path, module_id, requires),
        Statement::BlockStatement(b) => rewrite_statements(factory, &mut b.body, source_path, module_id, requires),
        Statement::IfStatement(i) => {
            rewrite_expression(factory, &mut i.test, source_path, module_id, requires);
            rewrite_statement(factory, &mut i.consequent, source_path, module_id, requires);
            if let Some(alt) = i.alternate.as_mut() {
                rewrite_statement(factory, alt, source_path, module_id, requires);
            }
        }
        Statement::WhileStatement(w) => {
            rewrite_expression(factory, &mut w.test, source_path, module_id, requires);
            rewrite_statement(factory, &mut w.body, source_path, module_id, requires);
        }
        Statement::DoWhileStatement(w) => {
            rewrite_expression(factory, &mut w.test, source_path, module_id, requires);
            rewrite_statement(factory, &mut w.body, source_path, module_id, requires);
        }
        Statement::ForStatement(f) => {
            if let Some(test) = f.test.as_mut() {
                rewrite_expression(factory, test, source_path, module_id, requires);
            }
            if let Some(update) = f.update.as_mut() {
                rewrite_expression(factory, update, source_path, module_id, requires);
            }
            rewrite_statement(factory, &mut f.body, source_path, module_id, requires);
        }
        Statement::ForInStatement(f) => {
            rewrite_expression(factory, &mut f.right, source_path, module_id, requires);
            rewrite_statement(factory, &mut f.body, source_path, module_id, requires);
        }
        Statement::ForOfStatement(f) => {
            rewrite_expression(factory, &mut f.right, source_path, module_id, requires);
            rewrite_statement(factory, &mut f.body, source_path, module_id, requires);
        }
        Statement::TryStatement(t) => {
            rewrite_statements(factory, &mut t.block.body, source_path, module_id, requires);
            if let Some(handler) = t.handler.as_mut() {
                rewrite_statements(factory, &mut handler.body.body, source_path, module_id, requires);
            }
            if let Some(finalizer) = t.finalizer.as_mut() {
                rewrite_statements(factory, &mut finalizer.body, source_path, module_id, requires);
            }
        }
        Statement::SwitchStatement(sw) => {
            rewrite_expression(factory, &mut sw.discriminant, source_path, module_id, requires);
            for case in sw.cases.iter_mut() {
                rewrite_statements(factory, &mut case.consequent, source_path, module_id, requires);
            }
        }
        Statement::LabeledStatement(l) => rewrite_statement(factory, &mut l.body, source_path, module_id, requires),
        Statement::FunctionDeclaration(func) => {
            if let Some(body) = func.body.as_mut() {
                rewrite_statements(factory, &mut body.statements, source_path, module_id, requires);
            }
        }
        _ => {}
    }
}

fn rewrite_expression<'a>(
    factory: &Factory<'a>,
    expr: &mut Expression<'a>,
    source_path: &str,
    module_id: &str,
    requires: &mut Vec<String>,
) {
    // `require("literal")`: rewrite the whole call expression to a bare
    // reference to the required module's namespaced identifier.
    if let Expression::CallExpression(call) = expr
        && let Expression::Identifier(callee) = &call.callee
        && callee.name.as_str() == "require"
        && call.arguments.len() == 1
        && let Some(literal) = crate::ast::argument_as_string_literal(&call.arguments[0])
    {
        let dep_id = to_module_name(literal.value.as_str(), Some(source_path));
        requires.push(dep_id.clone());
        let span = call.span;
        *expr = factory.name(span, &dep_id);
        return;
    }

    // `module.exports` (not yet namespaced): rewrite in place to
    // `<moduleId>.module$exports`.
    if let Expression::StaticMemberExpression(member) = expr
        && let Expression::Identifier(object) = &member.object
        && object.name.as_str() == "module"
        && member.property.name.as_str() == "exports"
    {
        let span = member.span;
        member.object = factory.name(span, module_id);
        member.property = factory.builder.identifier_name(span, factory.builder.atom("module$exports"));
        return;
    }

    match expr {
        Expression::BinaryExpression(b) => {
            rewrite_expression(factory, &mut b.left, source_path, module_id, requires);
            rewrite_expression(factory, &mut b.right, source_path, module_id, requires);
        }
        Expression::LogicalExpression(b) => {
            rewrite_expression(factory, &mut b.left, source_path, module_id, requires);
            rewrite_expression(factory, &mut b.right, source_path, module_id, requires);
        }
        Expression::UnaryExpression(u) => rewrite_expression(factory, &mut u.argument, source_path, module_id, requires),
        Expression::UpdateExpression(u) => rewrite_expression(factory, &mut u.argument, source_path, module_id, requires),
        Expression::AssignmentExpression(a) => {
            rewrite_assignment_target(factory, &mut a.left, source_path, module_id, requires);
            rewrite_expression(factory, &mut a.right, source_path, module_id, requires);
        }
        Expression::ConditionalExpression(c) => {
            rewrite_expression(factory, &mut c.test, source_path, module_id, requires);
            rewrite_expression(factory, &mut c.consequent, source_path, module_id, requires);
            rewrite_expression(factory, &mut c.alternate, source_path, module_id, requires);
        }
        Expression::SequenceExpression(seq) => {
            for e in seq.expressions.iter_mut() {
                rewrite_expression(factory, e, source_path, module_id, requires);
            }
        }
        Expression::CallExpression(call) => {
            rewrite_expression(factory, &mut call.callee, source_path, module_id, requires);
            for arg in call.arguments.iter_mut() {
                if let Some(e) = arg.to_expression_mut() {
                    rewrite_expression(factory, e, source_path, module_id, requires);
                }
            }
        }
        Expression::NewExpression(call) => {
            rewrite_expression(factory, &mut call.callee, source_path, module_id, requires);
            for arg in call.arguments.iter_mut() {
                if let Some(e) = arg.to_expression_mut() {
                    rewrite_expression(factory, e, source_path, module_id, requires);
                }
            }
        }
        Expression::StaticMemberExpression(m) => rewrite_expression(factory, &mut m.object, source_path, module_id, requires),
        Expression::ComputedMemberExpression(m) => {
            rewrite_expression(factory, &mut m.object, source_path, module_id, requires);
            rewrite_expression(factory, &mut m.expression, source_path, module_id, requires);
        }
        Expression::ArrayExpression(arr) => {
            for el in arr.elements.iter_mut() {
                if let Some(e) = el.to_expression_mut() {
                    rewrite_expression(factory, e, source_path, module_id, requires);
                }
            }
        }
        Expression::ObjectExpression(obj) => {
            for prop in obj.properties.iter_mut() {
                if let ObjectPropertyKind::ObjectProperty(p) = prop {
                    rewrite_expression(factory, &mut p.value, source_path, module_id, requires);
                }
            }
        }
        Expression::ParenthesizedExpression(p) => rewrite_expression(factory, &mut p.expression, source_path, module_id, requires),
        Expression::AwaitExpression(a) => rewrite_expression(factory, &mut a.argument, source_path, module_id, requires),
        Expression::YieldExpression(y) => {
            if let Some(arg) = y.argument.as_mut() {
                rewrite_expression(factory, arg, source_path, module_id, requires);
            }
        }
        Expression::FunctionExpression(func) => {
            if let Some(body) = func.body.as_mut() {
                rewrite_statements(factory, &mut body.statements, source_path, module_id, requires);
            }
        }
        Expression::ArrowFunctionExpression(func) => {
            rewrite_statements(factory, &mut func.body.statements, source_path, module_id, requires);
        }
        _ => {}
    }
}

/// Rewrite `require(...)`/`module.exports` when they appear on the left side
/// of an assignment (`module.exports = X`) instead of being read as a plain
/// expression.
fn rewrite_assignment_target<'a>(
    factory: &Factory<'a>,
    target: &mut AssignmentTarget<'a>,
    source_path: &str,
    module_id: &str,
    requires: &mut Vec<String>,
) {
    if let AssignmentTarget::StaticMemberExpression(member) = target
        && let Expression::Identifier(object) = &member.object
        && object.name.as_str() == "module"
        && member.property.name.as_str() == "exports"
    {
        let span = member.span;
        member.object = factory.name(span, module_id);
        member.property = factory.builder.identifier_name(span, factory.builder.atom("module$exports"));
        return;
    }

    match target {
        AssignmentTarget::StaticMemberExpression(member) => {
            rewrite_expression(factory, &mut member.object, source_path, module_id, requires);
        }
        AssignmentTarget::ComputedMemberExpression(member) => {
            rewrite_expression(factory, &mut member.object, source_path, module_id, requires);
            rewrite_expression(factory, &mut member.expression, source_path, module_id, requires);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::DependencyGraph;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    use crate::diagnostics::VecReporter;

    fn parse<'a>(allocator: &'a Allocator, src: &'a str) -> Program<'a> {
        Parser::new(allocator, src, SourceType::default()).parse().program
    }

    #[test]
    fn require_becomes_module_reference_and_is_recorded() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut program = parse(&allocator, "var b = require('./b');");
        let mut graph = DependencyGraph::new();
        let mut reporter = VecReporter::new();

        CjsRewriter::rewrite(&factory, &mut program, "a.js", &mut graph, &mut reporter, true);

        assert_eq!(graph.requires_of("module$a"), vec!["module$b"]);
    }

    #[test]
    fn require_edge_not_recorded_when_dependency_reporting_disabled() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut program = parse(&allocator, "var b = require('./b');");
        let mut graph = DependencyGraph::new();
        let mut reporter = VecReporter::new();

        CjsRewriter::rewrite(&factory, &mut program, "a.js", &mut graph, &mut reporter, false);

        // The rewrite itself (require(...) -> bare reference, goog.require in
        // the emitted prologue) is unaffected by the flag; only the sink's
        // bookkeeping is gated.
        assert!(graph.requires_of("module$a").is_empty());
        let rendered = format!("{:?}", program.body);
        assert!(rendered.contains("module$b"));
    }

    #[test]
    fn module_exports_rewritten_to_namespaced_indirection() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut program = parse(&allocator, "module.exports = 42;");
        let mut graph = DependencyGraph::new();
        let mut reporter = VecReporter::new();

        CjsRewriter::rewrite(&factory, &mut program, "a.js", &mut graph, &mut reporter, true);

        let rendered = format!("{:?}", program.body);
        assert!(rendered.contains("module$exports"));
    }

    #[test]
    fn module_exports_assignment_target_is_rewritten_not_just_its_rhs() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut program = parse(&allocator, "var q = require('./c'); module.exports = q;");
        let mut graph = DependencyGraph::new();
        let mut reporter = VecReporter::new();

        CjsRewriter::rewrite(&factory, &mut program, "a/b.js", &mut graph, &mut reporter, true);

        let rendered = format!("{:?}", program.body);
        assert!(
            rendered.contains("module$a$b") && rendered.contains("module$exports"),
            "module.exports on the left of an assignment must be namespaced too: {rendered}"
        );
    }
}
