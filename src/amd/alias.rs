//! Alias-collision renamer (spec.md §4.2).
//!
//! Picks a fresh name for a `require` binding that would otherwise shadow an
//! existing global, and rewrites the factory body's references to the
//! parameter under its new name.

use oxc_allocator::Vec as ArenaVec;
use oxc_ast::ast::Statement;

use crate::ast::factory::Factory;
use crate::ast::walk::rename_identifier;
use crate::scope::ScopeChain;

/// Pass-wide monotonic counter for alias freshness (spec.md §4.2, §9 — "a
/// simple owned integer on the pass object").
#[derive(Debug, Default)]
pub struct AliasCounter {
    next: usize,
}

impl AliasCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a fresh name for `original` that isn't declared at global scope,
    /// then rename every reference to `original` inside `factory_body` to it.
    /// Returns the fresh name to use for the synthesized `var`.
    pub fn alias_if_colliding<'a>(
        &mut self,
        original: &str,
        scope: &ScopeChain,
        factory_body: &mut ArenaVec<'a, Statement<'a>>,
        factory: &Factory<'a>,
    ) -> String {
        if !scope.declared_at_global(original, false) {
            return original.to_string();
        }

        let mut fresh = format!("{original}__alias{}", self.next);
        self.next += 1;
        while scope.declared_at_global(&fresh, false) {
            fresh = format!("{original}__alias{}", self.next);
            self.next += 1;
        }

        rename_identifier(factory_body, original, &fresh, factory);
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;

    #[test]
    fn no_rename_when_name_is_free() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let scope = ScopeChain::new();
        let mut body: ArenaVec<Statement> = oxc_allocator::Vec::new_in(&allocator);
        let mut counter = AliasCounter::new();
        let chosen = counter.alias_if_colliding("foo", &scope, &mut body, &factory);
        assert_eq!(chosen, "foo");
    }

    #[test]
    fn picks_fresh_name_on_collision() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut scope = ScopeChain::new();
        scope.declare_global("foo");
        let mut body: ArenaVec<Statement> = oxc_allocator::Vec::new_in(&allocator);
        let mut counter = AliasCounter::new();
        let chosen = counter.alias_if_colliding("foo", &scope, &mut body, &factory);
        assert_eq!(chosen, "foo__alias0");
    }

    #[test]
    fn counter_is_monotonic_across_calls() {
        let allocator = Allocator::default();
        let factory = Factory::new(&allocator);
        let mut scope = ScopeChain::new();
        scope.declare_global("foo");
        scope.declare_global("bar");
        let mut body: ArenaVec<Statement> = oxc_allocator::Vec::new_in(&allocator);
        let mut counter = AliasCounter::new();
        let first = counter.alias_if_colliding("foo", &scope, &mut body, &factory);
        let second = counter.alias_if_colliding("bar", &scope, &mut body, &factory);
        assert_eq!(first, "foo__alias0");
        assert_eq!(second, "bar__alias1");
    }
}
