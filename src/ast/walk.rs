//! Two small, purpose-built tree walks the passes need. Neither is a general
//! visitor framework (the traversal driver that invokes the passes at each
//! node is itself an assumed external primitive per spec.md §1) — these are
//! the narrower walks the rewrites perform *inside* a subtree they already
//! own: renaming free identifiers, and rewriting top-level `return`s.

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::*;
use oxc_span::Span;

use super::factory::Factory;

/// Rename every `Expression::Identifier` reference equal to `old` to `new`,
/// throughout `stmts` and everything nested inside it — including nested
/// function bodies (spec.md §4.2: "no scope-awareness is required because
/// AMD factories don't redeclare their own parameters"). Binding positions
/// (parameter names, `var` declarators) are untouched; only *references* are
/// renamed, since the binding itself is being replaced by the caller.
pub fn rename_identifier<'a>(stmts: &mut ArenaVec<'a, Statement<'a>>, old: &str, new: &str, factory: &Factory<'a>) {
    for stmt in stmts.iter_mut() {
        rename_in_statement(stmt, old, new, factory);
    }
}

fn rename_in_statement<'a>(stmt: &mut Statement<'a>, old: &str, new: &str, factory: &Factory<'a>) {
    match stmt {
        Statement::ExpressionStatement(expr_stmt) => rename_in_expression(&mut expr_stmt.expression, old, new, factory),
        Statement::VariableDeclaration(decl) => {
            for d in decl.declarations.iter_mut() {
                if let Some(init) = d.init.as_mut() {
                    rename_in_expression(init, old, new, factory);
                }
            }
        }
        Statement::ReturnStatement(ret) => {
            if let Some(arg) = ret.argument.as_mut() {
                rename_in_expression(arg, old, new, factory);
            }
        }
        Statement::ThrowStatement(t) => rename_in_expression(&mut t.argument, old, new, factory),
        Statement::BlockStatement(block) => {
            for s in block.body.iter_mut() {
                rename_in_statement(s, old, new, factory);
            }
        }
        Statement::IfStatement(if_stmt) => {
            rename_in_expression(&mut if_stmt.test, old, new, factory);
            rename_in_statement(&mut if_stmt.consequent, old, new, factory);
            if let Some(alt) = if_stmt.alternate.as_mut() {
                rename_in_statement(alt, old, new, factory);
            }
        }
        Statement::WhileStatement(w) => {
            rename_in_expression(&mut w.test, old, new, factory);
            rename_in_statement(&mut w.body, old, new, factory);
        }
        Statement::DoWhileStatement(w) => {
            rename_in_expression(&mut w.test, old, new, factory);
            rename_in_statement(&mut w.body, old, new, factory);
        }
        Statement::ForStatement(f) => {
            if let Some(test) = f.test.as_mut() {
                rename_in_expression(test, old, new, factory);
            }
            if let Some(update) = f.update.as_mut() {
                rename_in_expression(update, old, new, factory);
            }
            rename_in_statement(&mut f.body, old, new, factory);
        }
        Statement::ForInStatement(f) => {
            rename_in_expression(&mut f.right, old, new, factory);
            rename_in_statement(&mut f.body, old, new, factory);
        }
        Statement::ForOfStatement(f) => {
            rename_in_expression(&mut f.right, old, new, factory);
            rename_in_statement(&mut f.body, old, new, factory);
        }
        Statement::TryStatement(t) => {
            for s in t.block.body.iter_mut() {
                rename_in_statement(s, old, new, factory);
            }
            if let Some(handler) = t.handler.as_mut() {
                for s in handler.body.body.iter_mut() {
                    rename_in_statement(s, old, new, factory);
                }
            }
            if let Some(finalizer) = t.finalizer.as_mut() {
                for s in finalizer.body.iter_mut() {
                    rename_in_statement(s, old, new, factory);
                }
            }
        }
        Statement::SwitchStatement(sw) => {
            rename_in_expression(&mut sw.discriminant, old, new, factory);
            for case in sw.cases.iter_mut() {
                for s in case.consequent.iter_mut() {
                    rename_in_statement(s, old, new, factory);
                }
            }
        }
        Statement::LabeledStatement(l) => rename_in_statement(&mut l.body, old, new, factory),
        // Function/class declarations introduce their own binding but their
        // bodies are still subject to the blanket rename (see doc comment).
        Statement::FunctionDeclaration(func) => {
            if let Some(body) = func.body.as_mut() {
                for s in body.statements.iter_mut() {
                    rename_in_statement(s, old, new, factory);
                }
            }
        }
        _ => {}
    }
}

fn rename_in_expression<'a>(expr: &mut Expression<'a>, old: &str, new: &str, factory: &Factory<'a>) {
    match expr {
        Expression::Identifier(ident) => {
            if ident.name.as_str() == old {
                let atom = factory.builder.atom(new);
                ident.name = atom;
            }
        }
        Expression::BinaryExpression(b) => {
            rename_in_expression(&mut b.left, old, new, factory);
            rename_in_expression(&mut b.right, old, new, factory);
        }
        Expression::LogicalExpression(b) => {
            rename_in_expression(&mut b.left, old, new, factory);
            rename_in_expression(&mut b.right, old, new, factory);
        }
        Expression::UnaryExpression(u) => rename_in_expression(&mut u.argument, old, new, factory),
        Expression::UpdateExpression(u) => rename_in_expression(&mut u.argument, old, new, factory),
        Expression::AssignmentExpression(a) => {
            rename_in_assignment_target(&mut a.left, old, new, factory);
            rename_in_expression(&mut a.right, old, new, factory);
        }
        Expression::ConditionalExpression(c) => {
            rename_in_expression(&mut c.test, old, new, factory);
            rename_in_expression(&mut c.consequent, old, new, factory);
            rename_in_expression(&mut c.alternate, old, new, factory);
        }
        Expression::SequenceExpression(seq) => {
            for e in seq.expressions.iter_mut() {
                rename_in_expression(e, old, new, factory);
            }
        }
        Expression::CallExpression(call) => {
            rename_in_expression(&mut call.callee, old, new, factory);
            for arg in call.arguments.iter_mut() {
                if let Some(e) = arg.to_expression_mut() {
                    rename_in_expression(e, old, new, factory);
                }
            }
        }
        Expression::NewExpression(call) => {
            rename_in_expression(&mut call.callee, old, new, factory);
            for arg in call.arguments.iter_mut() {
                if let Some(e) = arg.to_expression_mut() {
                    rename_in_expression(e, old, new, factory);
                }
            }
        }
        Expression::StaticMemberExpression(m) => rename_in_expression(&mut m.object, old, new, factory),
        Expression::ComputedMemberExpression(m) => {
            rename_in_expression(&mut m.object, old, new, factory);
            rename_in_expression(&mut m.expression, old, new, factory);
        }
        Expression::ArrayExpression(arr) => {
            for el in arr.elements.iter_mut() {
                if let Some(e) = el.to_expression_mut() {
                    rename_in_expression(e, old, new, factory);
                }
            }
        }
        Expression::ObjectExpression(obj) => {
            for prop in obj.properties.iter_mut() {
                if let ObjectPropertyKind::ObjectProperty(p) = prop {
                    rename_in_expression(&mut p.value, old, new, factory);
                }
            }
        }
        Expression::ParenthesizedExpression(p) => rename_in_expression(&mut p.expression, old, new, factory),
        Expression::ChainExpression(c) => {
            if let ChainElement::StaticMemberExpression(m) = &mut c.expression {
                rename_in_expression(&mut m.object, old, new, factory);
            } else if let ChainElement::ComputedMemberExpression(m) = &mut c.expression {
                rename_in_expression(&mut m.object, old, new, factory);
                rename_in_expression(&mut m.expression, old, new, factory);
            } else if let ChainElement::CallExpression(call) = &mut c.expression {
                rename_in_expression(&mut call.callee, old, new, factory);
            }
        }
        Expression::AwaitExpression(a) => rename_in_expression(&mut a.argument, old, new, factory),
        Expression::YieldExpression(y) => {
            if let Some(arg) = y.argument.as_mut() {
                rename_in_expression(arg, old, new, factory);
            }
        }
        Expression::FunctionExpression(func) => {
            if let Some(body) = func.body.as_mut() {
                for s in body.statements.iter_mut() {
                    rename_in_statement(s, old, new, factory);
                }
            }
        }
        Expression::ArrowFunctionExpression(func) => {
            for s in func.body.statements.iter_mut() {
                rename_in_statement(s, old, new, factory);
            }
        }
        _ => {}
    }
}

/// Rename references appearing as the target of an assignment — `old = ...`
/// itself, and the object of a member-expression target (`old.foo = ...`,
/// `old[i] = ...`) — since these are reads of `old`'s binding just as much as
/// any value position, and the blanket rename above otherwise only ever
/// touches `a.right`. Destructuring targets are left alone; neither pass that
/// calls this walk produces or needs to rename through one.
fn rename_in_assignment_target<'a>(target: &mut AssignmentTarget<'a>, old: &str, new: &str, factory: &Factory<'a>) {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(ident) => {
            if ident.name.as_str() == old {
                ident.name = factory.builder.atom(new);
            }
        }
        AssignmentTarget::StaticMemberExpression(member) => {
            rename_in_expression(&mut member.object, old, new, factory);
        }
        AssignmentTarget::ComputedMemberExpression(member) => {
            rename_in_expression(&mut member.object, old, new, factory);
            rename_in_expression(&mut member.expression, old, new, factory);
        }
        _ => {}
    }
}

/// Rewrite every `return X;` in `stmts` into `module.exports = X;` as an
/// expression statement (spec.md §4.1 step 3). Descends into control-flow
/// constructs (`if`/`for`/`while`/`try`/`switch`/block/labeled) but *not*
/// into nested function bodies, since a `return` there belongs to the nested
/// function, not the factory. A bare `return;` is left untouched.
pub fn replace_top_level_returns<'a>(
    factory: &Factory<'a>,
    stmts: &mut ArenaVec<'a, Statement<'a>>,
    donor_span: Span,
) {
    for stmt in stmts.iter_mut() {
        replace_returns_in_statement(factory, stmt, donor_span);
    }
}

fn replace_returns_in_statement<'a>(factory: &Factory<'a>, stmt: &mut Statement<'a>, span: Span) {
    let replacement = if let Statement::ReturnStatement(ret) = stmt {
        ret.argument.take().map(|value| module_exports_assignment(factory, span, value))
    } else {
        None
    };
    if let Some(new_stmt) = replacement {
        *stmt = new_stmt;
        return;
    }

    match stmt {
        Statement::BlockStatement(block) => {
            for s in block.body.iter_mut() {
                replace_returns_in_statement(factory, s, span);
            }
        }
        Statement::IfStatement(if_stmt) => {
            replace_returns_in_statement(factory, &mut if_stmt.consequent, span);
            if let Some(alt) = if_stmt.alternate.as_mut() {
                replace_returns_in_statement(factory, alt, span);
            }
        }
        Statement::WhileStatement(w) => replace_returns_in_statement(factory, &mut w.body, span),
        Statement::DoWhileStatement(w) => replace_returns_in_statement(factory, &mut w.body, span),
        Statement::ForStatement(f) => replace_returns_in_statement(factory, &mut f.body, span),
        Statement::ForInStatement(f) => replace_returns_in_statement(factory, &mut f.body, span),
        Statement::ForOfStatement(f) => replace_returns_in_statement(factory, &mut f.body, span),
        Statement::TryStatement(t) => {
            for s in t.block.body.iter_mut() {
                replace_returns_in_statement(factory, s, span);
            }
            if let Some(handler) = t.handler.as_mut() {
                for s in handler.body.body.iter_mut() {
                    replace_returns_in_statement(factory, s, span);
                }
            }
            if let Some(finalizer) = t.finalizer.as_mut() {
                for s in finalizer.body.iter_mut() {
                    replace_returns_in_statement(factory, s, span);
                }
            }
        }
        Statement::SwitchStatement(sw) => {
            for case in sw.cases.iter_mut() {
                for s in case.consequent.iter_mut() {
                    replace_returns_in_statement(factory, s, span);
                }
            }
        }
        Statement::LabeledStatement(l) => replace_returns_in_statement(factory, &mut l.body, span),
        // FunctionDeclaration/Expression bodies are a new function scope — not descended into.
        _ => {}
    }
}

fn module_exports_assignment<'a>(factory: &Factory<'a>, span: Span, value: Expression<'a>) -> Statement<'a> {
    let module_name = factory.name(span, "module");
    let module_exports = factory.property_access(span, module_name, "exports");
    let assignment = factory.assign(span, module_exports, value);
    factory.expression_statement(span, assignment)
}
