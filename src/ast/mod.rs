//! The "AST node" interface of spec.md §3, realized over `oxc_ast`.
//!
//! Rather than emulating the Java original's homogeneous `Node` class, this
//! crate pattern-matches oxc's tagged-union AST directly — the idiomatic
//! Rust rendition of "kind tests + structural access" is an exhaustive
//! `match`, not a generic node wrapper. This module holds only the small set
//! of kind-test/accessor helpers the two passes actually need, named after
//! the predicates spec.md §3 lists, so the passes read close to the spec.

pub mod factory;

use oxc_ast::ast::{Argument, CallExpression, Expression, ExpressionStatement, Statement, StringLiteral};

/// `is-call` + callee-is-bare-identifier, spec.md §3's "free-call" shape test.
/// Returns the callee name when `expr` is a call whose callee is a plain
/// identifier (not a method call, not a computed call).
pub fn as_free_call<'a, 's>(expr: &'s Expression<'a>) -> Option<(&'s CallExpression<'a>, &'s str)> {
    if let Expression::CallExpression(call) = expr
        && let Expression::Identifier(ident) = &call.callee
    {
        return Some((call, ident.name.as_str()));
    }
    None
}

/// `is-string` on a call argument (arguments are `Argument`, not directly `Expression`).
pub fn argument_as_string_literal<'a, 's>(arg: &'s Argument<'a>) -> Option<&'s StringLiteral<'a>> {
    if let Argument::StringLiteral(lit) = arg {
        Some(lit)
    } else {
        None
    }
}

/// `is-expression-statement`, unwrapping to the inner expression.
pub fn as_expression_statement<'a, 's>(stmt: &'s Statement<'a>) -> Option<&'s ExpressionStatement<'a>> {
    if let Statement::ExpressionStatement(expr_stmt) = stmt {
        Some(expr_stmt)
    } else {
        None
    }
}

/// `is-array-literal`.
pub fn as_array_literal<'a, 's>(expr: &'s Expression<'a>) -> Option<&'s oxc_ast::ast::ArrayExpression<'a>> {
    if let Expression::ArrayExpression(arr) = expr {
        Some(arr)
    } else {
        None
    }
}

/// `is-object-literal`.
pub fn is_object_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::ObjectExpression(_))
}

