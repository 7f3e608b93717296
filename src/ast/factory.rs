//! The "AST factory" of spec.md §3 — exactly the constructors it names,
//! wrapping `oxc_ast::AstBuilder` so the passes never call the builder
//! directly. Every constructor takes the donor `Span` to stamp onto the new
//! node, satisfying the "every synthesized node carries source-location
//! metadata copied from a donor" invariant at the one place nodes are born.

use oxc_allocator::{Allocator, Box as ArenaBox, Vec as ArenaVec};
use oxc_ast::ast::*;
use oxc_ast::{AstBuilder, NONE};
use oxc_span::{Atom, Span};

/// Thin factory over `AstBuilder`, scoped to one allocator.
pub struct Factory<'a> {
    pub builder: AstBuilder<'a>,
}

impl<'a> Factory<'a> {
    pub fn new(allocator: &'a Allocator) -> Self {
        Self { builder: AstBuilder::new(allocator) }
    }

    /// `name` — a bare identifier reference expression.
    pub fn name(&self, span: Span, ident: &str) -> Expression<'a> {
        let atom = self.atom(ident);
        self.builder.expression_identifier(span, atom)
    }

    /// `string` — a string literal expression.
    pub fn string(&self, span: Span, value: &str) -> Expression<'a> {
        let atom = self.atom(value);
        self.builder.expression_string_literal(span, atom, None)
    }

    /// `call(callee, args…)` — with the free-call flag meaning preserved: a
    /// call whose callee is a bare `name(...)` is automatically "free" by
    /// construction (it has no member-expression callee), so there is no
    /// separate flag to set here — see [`mark_free_call`] for the one case
    /// that needs an explicit marker on an oxc node.
    pub fn call(&self, span: Span, callee: Expression<'a>, args: ArenaVec<'a, Argument<'a>>) -> Expression<'a> {
        self.builder.expression_call(span, callee, NONE, args, false)
    }

    /// A single string-literal argument, for `require("dep")`.
    pub fn string_arg(&self, span: Span, value: &str) -> Argument<'a> {
        let atom = self.atom(value);
        Argument::StringLiteral(self.builder.alloc_string_literal(span, atom, None))
    }

    /// `var(name, init?)` — a single-declarator `var` statement.
    pub fn var(&self, span: Span, name: &str, init: Option<Expression<'a>>) -> Statement<'a> {
        let binding_ident = self.builder.binding_pattern_kind_binding_identifier(span, self.atom(name));
        let pattern = self.builder.binding_pattern(binding_ident, NONE, false);
        let declarator = self.builder.variable_declarator(
            span,
            VariableDeclarationKind::Var,
            pattern,
            init,
            false,
        );
        let declarations = self.builder.vec1(declarator);
        let decl = self.builder.alloc_variable_declaration(
            span,
            VariableDeclarationKind::Var,
            declarations,
            false,
        );
        Statement::VariableDeclaration(decl)
    }

    /// `assign(lhs, rhs)` — a plain `=` assignment expression.
    pub fn assign(&self, span: Span, lhs: Expression<'a>, rhs: Expression<'a>) -> Expression<'a> {
        let target = self
            .builder
            .simple_assignment_target_from_expression(lhs)
            .expect("assignment target must be a valid simple target");
        self.builder
            .expression_assignment(span, AssignmentOperator::Assign, target, rhs)
    }

    /// `property-access(obj, name)` — `obj.name`.
    pub fn property_access(&self, span: Span, object: Expression<'a>, name: &str) -> Expression<'a> {
        let prop = self.builder.identifier_name(span, self.atom(name));
        self.builder.expression_static_member(span, object, prop, false)
    }

    /// `expression-statement(expr)`.
    pub fn expression_statement(&self, span: Span, expr: Expression<'a>) -> Statement<'a> {
        self.builder.statement_expression(span, expr)
    }

    /// `if(cond, then-block)` — no else branch; this crate never synthesizes one.
    pub fn if_stmt(&self, span: Span, test: Expression<'a>, consequent: Statement<'a>) -> Statement<'a> {
        self.builder.statement_if(span, test, consequent, None)
    }

    /// `block(stmts…)`.
    pub fn block(&self, span: Span, stmts: ArenaVec<'a, Statement<'a>>) -> Statement<'a> {
        self.builder.statement_block(span, stmts)
    }

    /// `null-literal`.
    pub fn null_literal(&self, span: Span) -> Expression<'a> {
        self.builder.expression_null_literal(span)
    }

    /// `object-literal` — an empty `{}` (the only shape this crate ever
    /// synthesizes fresh; `define({...})` object literals are relocated, not
    /// rebuilt, so this only backs `var <moduleId> = {};`).
    pub fn empty_object_literal(&self, span: Span) -> Expression<'a> {
        let props = self.builder.vec();
        self.builder.expression_object(span, props)
    }

    fn atom(&self, s: &str) -> Atom<'a> {
        self.builder.atom(s)
    }
}

/// Marks a synthesized `require(...)` call as a free call (spec.md §3's
/// "free-call" auxiliary flag), so downstream passes don't mistake it for a
/// method call. oxc's `CallExpression` callee shape already makes this
/// unambiguous (`Expression::Identifier` vs `Expression::StaticMemberExpression`),
/// so there is no separate boolean field to flip — this function documents
/// the invariant at the one call site that creates `require(...)` calls.
pub fn mark_free_call(call: &CallExpression) -> bool {
    matches!(call.callee, Expression::Identifier(_))
}
