//! `define(...)` argument-shape recognition (spec.md §4.1's arity table).

use oxc_ast::ast::{Argument, ArrayExpressionElement, CallExpression, Expression, Function};

use crate::ast;

/// The recognized shape of a `define(...)` call's arguments, or why it was rejected.
///
/// `Factory` carries only the dependency list: the factory function itself is
/// re-extracted from the call's arguments by the caller once it starts
/// mutating (the borrow this classifier could hand back doesn't survive
/// `body.remove(idx)`), so there's no point returning it here.
pub enum DefineShape<'s, 'a> {
    /// `define({...})` — an object literal with no dependency list.
    ObjectLiteral(&'s Expression<'a>),
    /// `define(fn)` or `define([deps], fn)` — deps defaults to an empty list
    /// for the 1-arg function form.
    Factory { deps: Vec<Option<&'s str>> },
    /// Arity 0, arity ≥3, or argument kinds that don't match any recognized shape.
    Unsupported,
}

/// Classify a `define(...)` call's arguments per spec.md §4.1.
pub fn classify<'s, 'a>(call: &'s CallExpression<'a>) -> DefineShape<'s, 'a> {
    match call.arguments.len() {
        0 => DefineShape::Unsupported,
        1 => classify_single(&call.arguments[0]),
        2 => classify_pair(&call.arguments[0], &call.arguments[1]),
        _ => DefineShape::Unsupported,
    }
}

fn classify_single<'s, 'a>(arg: &'s Argument<'a>) -> DefineShape<'s, 'a> {
    let Some(expr) = arg.to_expression_opt() else {
        return DefineShape::Unsupported;
    };
    if ast::is_object_literal(expr) {
        return DefineShape::ObjectLiteral(expr);
    }
    if as_function(expr).is_some() {
        return DefineShape::Factory { deps: Vec::new() };
    }
    DefineShape::Unsupported
}

fn classify_pair<'s, 'a>(deps_arg: &'s Argument<'a>, factory_arg: &'s Argument<'a>) -> DefineShape<'s, 'a> {
    let Some(deps_expr) = deps_arg.to_expression_opt() else {
        return DefineShape::Unsupported;
    };
    let Some(array) = ast::as_array_literal(deps_expr) else {
        return DefineShape::Unsupported;
    };
    let Some(factory_expr) = factory_arg.to_expression_opt() else {
        return DefineShape::Unsupported;
    };
    if as_function(factory_expr).is_none() {
        return DefineShape::Unsupported;
    }

    let deps = array
        .elements
        .iter()
        .map(|el| match el {
            ArrayExpressionElement::StringLiteral(lit) => Some(lit.value.as_str()),
            _ => None,
        })
        .collect();

    DefineShape::Factory { deps }
}

fn as_function<'s, 'a>(expr: &'s Expression<'a>) -> Option<&'s Function<'a>> {
    if let Expression::FunctionExpression(func) = expr {
        Some(func)
    } else {
        None
    }
}

trait ArgumentExt<'a> {
    fn to_expression_opt(&self) -> Option<&Expression<'a>>;
}

impl<'a> ArgumentExt<'a> for Argument<'a> {
    fn to_expression_opt(&self) -> Option<&Expression<'a>> {
        match self {
            Argument::SpreadElement(_) => None,
            other => Some(other.to_expression()),
        }
    }
}
