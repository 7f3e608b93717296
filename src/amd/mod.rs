//! AMD-to-CJS rewriter (spec.md §4.1).

pub mod alias;
pub mod signature;

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::{
    Argument, BindingPatternKind, CallExpression, Expression, Program, Statement,
};
use oxc_span::{Span, SPAN};

use crate::ast;
use crate::ast::factory::Factory;
use crate::ast::walk::replace_top_level_returns;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use crate::scope::ScopeChain;
use alias::AliasCounter;
use signature::DefineShape;

/// The virtual module names AMD treats as already-available in the CJS
/// environment (spec.md §4.1 step 2, §GLOSSARY "Virtual module name").
const VIRTUAL_NAMES: [&str; 3] = ["require", "exports", "module"];

/// AMD-to-CJS rewrite pass. Owns the pass-wide rename counter (spec.md §9).
#[derive(Default)]
pub struct AmdRewriter {
    alias_counter: AliasCounter,
}

impl AmdRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every top-level `define(...)` call in `program`, reporting
    /// diagnostics for malformed or non-top-level ones. Returns `true` if
    /// any rewrite was applied.
    pub fn rewrite<'a>(
        &mut self,
        factory: &Factory<'a>,
        program: &mut Program<'a>,
        source_name: &str,
        reporter: &mut dyn Reporter,
    ) -> bool {
        let mut scope = ScopeChain::new();
        collect_top_level_declarations(&program.body, &mut scope);

        // Diagnose (but never mutate) `define(...)` calls buried below
        // script root, inside the bodies of top-level statements.
        for stmt in program.body.iter() {
            scan_nested_for_define(stmt, source_name, reporter);
        }

        let mut changed = false;
        loop {
            let Some(idx) = find_top_level_define(&program.body) else {
                break;
            };
            match self.rewrite_at(factory, &mut program.body, idx, &mut scope, source_name, reporter) {
                RewriteOutcome::Applied => changed = true,
                RewriteOutcome::Rejected => break,
            }
        }
        changed
    }

    fn rewrite_at<'a>(
        &mut self,
        factory: &Factory<'a>,
        body: &mut ArenaVec<'a, Statement<'a>>,
        idx: usize,
        scope: &mut ScopeChain,
        source_name: &str,
        reporter: &mut dyn Reporter,
    ) -> RewriteOutcome {
        let span = statement_span(&body[idx]);

        // Take the call's arguments out so we can mutate freely without
        // borrowing `body` and the extracted statement at once.
        let shape_result = {
            let Statement::ExpressionStatement(expr_stmt) = &body[idx] else {
                unreachable!("find_top_level_define only returns expression-statement indices");
            };
            let Expression::CallExpression(call) = &expr_stmt.expression else {
                unreachable!("find_top_level_define only returns define(...) calls");
            };
            classify_owned(call)
        };

        match shape_result {
            OwnedShape::ObjectLiteral => {
                // `define({...})` -> `exports = {...};`, the object literal is
                // relocated in place, not rebuilt.
                let Statement::ExpressionStatement(mut expr_stmt) = body.remove(idx) else {
                    unreachable!()
                };
                let Expression::CallExpression(call) = &mut expr_stmt.expression else {
                    unreachable!()
                };
                let Some(Argument::ObjectExpression(obj)) = call.arguments.pop() else {
                    unreachable!("classify_owned verified the sole argument is an object literal")
                };
                let exports_name = factory.name(span, "exports");
                let assignment = factory.assign(span, exports_name, Expression::ObjectExpression(obj));
                let new_stmt = factory.expression_statement(span, assignment);
                body.insert(idx, new_stmt);
                RewriteOutcome::Applied
            }
            OwnedShape::Factory { deps } => {
                self.rewrite_factory(factory, body, idx, deps, scope, span, source_name, reporter);
                RewriteOutcome::Applied
            }
            OwnedShape::Unsupported => {
                reporter.report(Diagnostic::new(
                    source_name,
                    DiagnosticCode::UnsupportedDefineSignature,
                    "define() must be called as define(fn), define(objLit), or define([deps], fn)",
                ));
                RewriteOutcome::Rejected
            }
        }
    }

    /// The canonical rewrite (spec.md §4.1 "Canonical rewrite" steps 1-5),
    /// shared by the 1-arg function form (empty deps) and the 2-arg form.
    fn rewrite_factory<'a>(
        &mut self,
        factory: &Factory<'a>,
        body: &mut ArenaVec<'a, Statement<'a>>,
        idx: usize,
        deps: Vec<Option<String>>,
        scope: &mut ScopeChain,
        span: Span,
        source_name: &str,
        reporter: &mut dyn Reporter,
    ) {
        let Statement::ExpressionStatement(mut expr_stmt) = body.remove(idx) else {
            unreachable!()
        };
        let placeholder = factory.null_literal(span);
        let Expression::CallExpression(mut call) = std::mem::replace(&mut expr_stmt.expression, placeholder) else {
            unreachable!()
        };
        // Pull the factory function out of the call arguments.
        let factory_arg = call.arguments.pop().expect("factory rewrite requires a factory argument");
        let Argument::FunctionExpression(mut func) = factory_arg else {
            unreachable!("classify_owned verified the factory argument is a function")
        };

        let params: Vec<Option<String>> = func
            .params
            .items
            .iter()
            .map(|p| match &p.pattern.kind {
                BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
                _ => None,
            })
            .collect();

        let pair_count = deps.len().max(params.len());
        let mut bindings: Vec<Statement<'a>> = Vec::with_capacity(pair_count);

        let Some(body_ref) = func.body.as_mut() else {
            // A factory with no body (e.g. a native/bound function expression)
            // can't happen for a parsed `function(...) { ... }` literal; guard
            // defensively rather than panic.
            return;
        };

        for i in 0..pair_count {
            let dep = deps.get(i).cloned().flatten();
            let param = params.get(i).cloned().flatten();

            let Some(param_name) = param else { continue };
            if VIRTUAL_NAMES.contains(&param_name.as_str()) {
                continue;
            }

            let dep = dep.and_then(|d| {
                if d.contains('!') {
                    reporter.report(Diagnostic::new(
                        source_name,
                        DiagnosticCode::RequireJsPluginsNotSupported,
                        format!("dependency '{d}' uses a RequireJS plugin loader prefix"),
                    ));
                }
                salvage_plugin_dep(&d)
            });

            match dep {
                Some(dep_name) => {
                    let alias = self.alias_counter.alias_if_colliding(
                        &param_name,
                        scope,
                        &mut body_ref.statements,
                        factory,
                    );
                    let require_name = factory.name(span, "require");
                    let mut args = factory.builder.vec();
                    args.push(factory.string_arg(span, &dep_name));
                    let require_call = factory.call(span, require_name, args);
                    if let Expression::CallExpression(ref call_expr) = require_call {
                        debug_assert!(
                            ast::factory::mark_free_call(call_expr),
                            "synthesized require(...) must be a free call"
                        );
                    }
                    bindings.push(factory.var(span, &alias, Some(require_call)));
                    scope.declare_global(&alias);
                }
                None => {
                    // Dropped dep (virtual name already filtered above, or a
                    // surplus parameter with no matching dep): an
                    // uninitialized binding so references don't fail.
                    bindings.push(factory.var(span, &param_name, None));
                    scope.declare_global(&param_name);
                }
            }
        }

        replace_top_level_returns(factory, &mut body_ref.statements, span);

        // Splice: bindings, then the factory body, land where `define(...)` was.
        // Each binding is inserted at `idx` rather than appended after the
        // previous one, so bindings end up in reverse processing order —
        // matching spec.md §8 scenarios 1-2 (`bar` before `foo` for
        // `define(['foo','bar'], function(foo,bar){...})`).
        let bindings_len = bindings.len();
        for binding in bindings {
            body.insert(idx, binding);
        }
        let mut insert_at = idx + bindings_len;
        for stmt in body_ref.statements.drain(..) {
            body.insert(insert_at, stmt);
            insert_at += 1;
        }
    }
}

enum RewriteOutcome {
    Applied,
    Rejected,
}

enum OwnedShape {
    ObjectLiteral,
    Factory { deps: Vec<Option<String>> },
    Unsupported,
}

/// Re-derive the classification from a borrowed view (signature::classify),
/// turning borrowed dep strings into owned `String`s we can carry across the
/// `body.remove(idx)` that follows (which invalidates the borrow).
fn classify_owned(call: &CallExpression) -> OwnedShape {
    match signature::classify(call) {
        DefineShape::ObjectLiteral(_) => OwnedShape::ObjectLiteral,
        DefineShape::Factory { deps } => OwnedShape::Factory {
            deps: deps.into_iter().map(|d| d.map(str::to_string)).collect(),
        },
        DefineShape::Unsupported => OwnedShape::Unsupported,
    }
}

/// Best-effort salvage of a RequireJS plugin-prefixed dep string (spec.md
/// §4.1 step 2's `!` handling). `cond?real` with no `:` recurses on `real`;
/// anything else drops the dep. Emits no diagnostic here — the caller
/// already knows the dep contained `!` from spec's calling convention; the
/// warning is reported at the point the `!` is first observed.
fn salvage_plugin_dep(dep: &str) -> Option<String> {
    if !dep.contains('!') {
        return Some(dep.to_string());
    }
    if let Some((cond, real)) = dep.split_once('?')
        && !cond.contains(':')
        && !real.contains(':')
    {
        return salvage_plugin_dep(real);
    }
    None
}

/// Seed the script-scope bindings the alias-collision check needs (spec.md
/// §4.2: a `require` alias must not shadow an existing top-level name).
/// Shallow by design — only the names a top-level `var`/`function`
/// declaration introduces, since that's the only thing a synthesized
/// `require` binding could ever collide with.
fn collect_top_level_declarations(body: &ArenaVec<Statement>, scope: &mut ScopeChain) {
    for stmt in body.iter() {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                for d in decl.declarations.iter() {
                    if let BindingPatternKind::BindingIdentifier(ident) = &d.id.kind {
                        scope.declare_global(ident.name.as_str());
                    }
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    scope.declare_global(id.name.as_str());
                }
            }
            _ => {}
        }
    }
}

fn find_top_level_define(body: &ArenaVec<Statement>) -> Option<usize> {
    body.iter().position(|stmt| is_top_level_define(stmt))
}

fn is_top_level_define(stmt: &Statement) -> bool {
    let Some(expr_stmt) = ast::as_expression_statement(stmt) else {
        return false;
    };
    ast::as_free_call(&expr_stmt.expression)
        .map(|(_, name)| name == "define")
        .unwrap_or(false)
}

/// Recurse into `stmt`'s nested statement lists looking for `define(...)`
/// expression-statements that are *not* at script root, emitting
/// `NON_TOP_LEVEL_STATEMENT_DEFINE` for each. `stmt` itself, if it is a
/// top-level define, is not revisited here (handled by the rewrite loop).
fn scan_nested_for_define(stmt: &Statement, source_name: &str, reporter: &mut dyn Reporter) {
    for nested in nested_statement_lists(stmt) {
        for inner in nested {
            if is_top_level_define(inner) {
                reporter.report(Diagnostic::new(
                    source_name,
                    DiagnosticCode::NonTopLevelStatementDefine,
                    "define() found below script root; AMD modules must call define() at the top level",
                ));
            }
            scan_nested_for_define(inner, source_name, reporter);
        }
    }
}

/// Every statement list nested directly inside `stmt` that is *not* a new
/// function scope (control-flow bodies only — function bodies get their own
/// top-level-ness relative to their own script, which this pass doesn't
/// recurse into since AMD `define` always targets the outermost script).
fn nested_statement_lists<'s, 'a>(stmt: &'s Statement<'a>) -> Vec<&'s [Statement<'a>]> {
    match stmt {
        Statement::BlockStatement(b) => vec![&b.body],
        Statement::IfStatement(i) => {
            let mut v = vec![std::slice::from_ref(i.consequent.as_ref())];
            if let Some(alt) = &i.alternate {
                v.push(std::slice::from_ref(alt));
            }
            v
        }
        Statement::WhileStatement(w) => vec![std::slice::from_ref(w.body.as_ref())],
        Statement::DoWhileStatement(w) => vec![std::slice::from_ref(w.body.as_ref())],
        Statement::ForStatement(f) => vec![std::slice::from_ref(f.body.as_ref())],
        Statement::ForInStatement(f) => vec![std::slice::from_ref(f.body.as_ref())],
        Statement::ForOfStatement(f) => vec![std::slice::from_ref(f.body.as_ref())],
        Statement::TryStatement(t) => {
            let mut v = vec![t.block.body.as_slice()];
            if let Some(h) = &t.handler {
                v.push(h.body.body.as_slice());
            }
            if let Some(fin) = &t.finalizer {
                v.push(fin.body.as_slice());
            }
            v
        }
        Statement::SwitchStatement(s) => s.cases.iter().map(|c| c.consequent.as_slice()).collect(),
        Statement::LabeledStatement(l) => vec![std::slice::from_ref(l.body.as_ref())],
        _ => Vec::new(),
    }
}

fn statement_span(stmt: &Statement) -> Span {
    match stmt {
        Statement::ExpressionStatement(s) => s.span,
        _ => SPAN,
    }
}
