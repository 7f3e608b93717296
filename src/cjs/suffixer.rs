//! Global-Suffixer (spec.md §4.4): once a script has been wrapped in its own
//! namespace, every top-level `var`/`function` name is rewritten to
//! `<name>$$<moduleId>` so that two independently-rewritten scripts sharing a
//! bundle never collide, and every free `exports` reference becomes a
//! reference to the module's own namespace object.

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::{BindingPatternKind, Program, Statement};

use crate::ast::factory::Factory;
use crate::ast::walk::rename_identifier;

/// Rewrite every top-level binding in `program` to its suffixed form, and
/// every free `exports` reference to `module_id`. Must run *after* the
/// script-entry trigger has already turned `module.exports` accesses into
/// `<moduleId>.module$exports` (spec.md §4.3), so this pass only ever sees
/// `exports` in its free (non-`module.exports`) form.
pub fn suffix_program<'a>(factory: &Factory<'a>, program: &mut Program<'a>, module_id: &str) {
    let globals = collect_top_level_bindings(&program.body);
    for name in &globals {
        let suffixed = format!("{name}$${module_id}");
        rename_declaration_site(&mut program.body, name, &suffixed, factory);
        rename_identifier(&mut program.body, name, &suffixed, factory);
    }
    // `exports` is never declared (it's a virtual CJS binding), so only its
    // references need rewriting — straight to the module identifier, with
    // no `$`-suffix of its own.
    rename_identifier(&mut program.body, "exports", module_id, factory);
}

/// The top-level `var`/`function` names a script introduces — the set
/// subject to suffixing. Deliberately shallow: nested declarations (inside
/// an `if`, a function body) belong to an inner scope and are left alone,
/// matching spec.md §4.4's "script-level bindings only" scope.
fn collect_top_level_bindings(body: &ArenaVec<Statement>) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in body.iter() {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                for d in decl.declarations.iter() {
                    if let BindingPatternKind::BindingIdentifier(ident) = &d.id.kind {
                        names.push(ident.name.to_string());
                    }
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    names.push(id.name.to_string());
                }
            }
            _ => {}
        }
    }
    names
}

/// Rename the binding occurrence itself (the declarator's or function
/// declaration's own name), as opposed to its references, which
/// `rename_identifier` already covers.
fn rename_declaration_site<'a>(
    body: &mut ArenaVec<'a, Statement<'a>>,
    old: &str,
    new: &str,
    factory: &Factory<'a>,
) {
    for stmt in body.iter_mut() {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                for d in decl.declarations.iter_mut() {
                    if let BindingPatternKind::BindingIdentifier(ident) = &mut d.id.kind
                        && ident.name.as_str() == old
                    {
                        ident.name = factory.builder.atom(new);
                    }
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &mut func.id
                    && id.name.as_str() == old
                {
                    id.name = factory.builder.atom(new);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::Statement as Stmt;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn parse<'a>(allocator: &'a Allocator, src: &'a str) -> Program<'a> {
        let source_type = SourceType::default();
        Parser::new(allocator, src, source_type).parse().program
    }

    #[test]
    fn suffixes_top_level_var_and_its_references() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let src = "var foo = 1; bar(foo);";
        let mut program = parse(&allocator, src);
        suffix_program(&factory, &mut program, "module$a$b");

        let Stmt::VariableDeclaration(decl) = &program.body[0] else {
            panic!("expected var decl");
        };
        let BindingPatternKind::BindingIdentifier(ident) = &decl.declarations[0].id.kind else {
            panic!("expected identifier binding");
        };
        assert_eq!(ident.name.as_str(), "foo$$module$a$b");
    }

    #[test]
    fn rewrites_free_exports_to_module_id() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let src = "exports.thing = 1;";
        let mut program = parse(&allocator, src);
        suffix_program(&factory, &mut program, "module$a$b");

        let Stmt::ExpressionStatement(stmt) = &program.body[0] else {
            panic!("expected expression statement");
        };
        let oxc_ast::ast::Expression::AssignmentExpression(assign) = &stmt.expression else {
            panic!("expected assignment");
        };
        let rendered = format!("{:?}", assign.left);
        assert!(rendered.contains("module$a$b"));
    }
}
