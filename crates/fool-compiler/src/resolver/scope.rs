//! Nested symbol tables and frame offset allocation.

use fool_core::Type;
use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// What resolution knows about a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    /// Nesting level of the declaring scope (0 = global).
    pub depth: u32,
    /// Declared type.
    pub ty: Type,
    /// Offset in the declaring frame or object.
    pub offset: i32,
}

impl SymbolEntry {
    pub fn new(depth: u32, ty: Type, offset: i32) -> Self {
        Self { depth, ty, offset }
    }
}

/// A resolved use: the declaration plus the nesting level of the use site.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub entry: SymbolEntry,
    pub depth: u32,
}

impl Binding {
    /// Number of access links to follow from the use site to the frame
    /// holding the declaration.
    pub fn hops(&self) -> u32 {
        self.depth.saturating_sub(self.entry.depth)
    }
}

// ============================================================================
// OffsetCounter
// ============================================================================

/// Next free offsets of one storage frame.
///
/// Locals grow downward from -2 (slot -1 holds the return address),
/// parameters upward from 1 (slot 0 holds the access link).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetCounter {
    next_local: i32,
    next_param: i32,
}

impl OffsetCounter {
    /// Counter for a fresh frame.
    pub fn frame() -> Self {
        Self {
            next_local: -2,
            next_param: 1,
        }
    }

    /// Reserve `slots` cells for a local. Returns the highest one.
    pub fn allocate_local(&mut self, slots: i32) -> i32 {
        let offset = self.next_local;
        self.next_local -= slots;
        offset
    }

    /// Reserve `slots` cells for a parameter. Returns the highest one.
    pub fn allocate_parameter(&mut self, slots: i32) -> i32 {
        self.next_param += slots - 1;
        let offset = self.next_param;
        self.next_param += 1;
        offset
    }
}

impl Default for OffsetCounter {
    fn default() -> Self {
        Self::frame()
    }
}

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of name tables, one per nesting level. Index 0 is global.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, SymbolEntry>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new, empty nesting level.
    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Enter a nesting level pre-populated with `table`.
    pub fn push_table(&mut self, table: FxHashMap<String, SymbolEntry>) {
        self.scopes.push(table);
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Nesting level of the innermost scope.
    pub fn depth(&self) -> u32 {
        self.scopes.len().saturating_sub(1) as u32
    }

    /// Bind `name` in the innermost scope.
    ///
    /// Returns `false` (and leaves the table unchanged) when the name is
    /// already bound at this level.
    pub fn declare(&mut self, name: &str, entry: SymbolEntry) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), entry);
        true
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_grow_down_from_minus_two() {
        let mut counter = OffsetCounter::frame();
        assert_eq!(counter.allocate_local(1), -2);
        assert_eq!(counter.allocate_local(2), -3);
        assert_eq!(counter.allocate_local(1), -5);
    }

    #[test]
    fn functional_parameters_take_the_higher_slot() {
        let mut counter = OffsetCounter::frame();
        assert_eq!(counter.allocate_parameter(1), 1);
        assert_eq!(counter.allocate_parameter(2), 3);
        assert_eq!(counter.allocate_parameter(1), 4);
    }

    #[test]
    fn shadowing_and_redeclaration() {
        let mut scopes = ScopeStack::new();
        scopes.push();
        assert!(scopes.declare("x", SymbolEntry::new(0, Type::Int, -2)));
        assert!(!scopes.declare("x", SymbolEntry::new(0, Type::Bool, -3)));

        scopes.push();
        assert_eq!(scopes.depth(), 1);
        assert!(scopes.declare("x", SymbolEntry::new(1, Type::Bool, 1)));
        assert_eq!(scopes.lookup("x").map(|e| e.ty.clone()), Some(Type::Bool));

        scopes.pop();
        assert_eq!(scopes.lookup("x").map(|e| e.offset), Some(-2));
        assert!(scopes.lookup("y").is_none());
    }

    #[test]
    fn binding_hops() {
        let binding = Binding {
            entry: SymbolEntry::new(0, Type::Int, -2),
            depth: 2,
        };
        assert_eq!(binding.hops(), 2);
    }
}
