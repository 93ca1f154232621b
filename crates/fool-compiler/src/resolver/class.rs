//! Class records and virtual tables.

use fool_core::{ClassType, Type};
use rustc_hash::FxHashMap;

use super::scope::SymbolEntry;

/// Nesting level of every virtual table entry.
pub const CLASS_DEPTH: u32 = 1;

/// A field or method in a virtual table.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub entry: SymbolEntry,
    /// Field index, or method offset.
    pub position: usize,
}

impl Member {
    pub fn is_method(&self) -> bool {
        matches!(self.entry.ty, Type::Method(_))
    }
}

/// Everything resolution records about a declared class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<String>,
    /// The class's slot in the global frame, holding its dispatch table address.
    pub entry: SymbolEntry,
    pub layout: ClassLayout,
}

impl ClassInfo {
    pub fn class_type(&self) -> &ClassType {
        &self.layout.class_type
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.layout.members.get(name)
    }
}

/// The member layout of a class, inherited members included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassLayout {
    /// Flattened field and method types.
    pub class_type: ClassType,
    /// Virtual table.
    pub members: FxHashMap<String, Member>,
    /// Heap cells taken by the fields.
    pub field_cells: i32,
}

impl ClassLayout {
    /// Lay out a new field after every existing one.
    pub fn add_field(&mut self, name: &str, ty: Type) -> Member {
        let slots = ty.slot_count();
        let member = Member {
            entry: SymbolEntry::new(CLASS_DEPTH, ty.clone(), -self.field_cells - 1),
            position: self.class_type.fields.len(),
        };
        self.field_cells += slots;
        self.class_type.fields.push(ty);
        self.members.insert(name.to_string(), member.clone());
        member
    }

    /// Lay out a new method after every existing one.
    pub fn add_method(&mut self, name: &str, ty: Type) -> Member {
        let offset = self.class_type.methods.len();
        let member = Member {
            entry: SymbolEntry::new(CLASS_DEPTH, ty.clone(), offset as i32),
            position: offset,
        };
        if let Type::Method(sig) = ty {
            self.class_type.methods.push(sig);
        }
        self.members.insert(name.to_string(), member.clone());
        member
    }

    /// Replace an inherited member, keeping its offset and position.
    pub fn override_member(&mut self, name: &str, inherited: &Member, ty: Type) -> Member {
        let member = Member {
            entry: SymbolEntry::new(CLASS_DEPTH, ty.clone(), inherited.entry.offset),
            position: inherited.position,
        };
        match ty {
            Type::Method(sig) => {
                if let Some(slot) = self.class_type.methods.get_mut(inherited.position) {
                    *slot = sig;
                }
            }
            other => {
                if let Some(slot) = self.class_type.fields.get_mut(inherited.position) {
                    *slot = other;
                }
            }
        }
        self.members.insert(name.to_string(), member.clone());
        member
    }

    /// The virtual table as a scope for method bodies.
    pub fn scope(&self) -> FxHashMap<String, SymbolEntry> {
        self.members
            .iter()
            .map(|(name, member)| (name.clone(), member.entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_count_cells() {
        let mut layout = ClassLayout::default();
        let f = layout.add_field("f", Type::arrow(vec![], Type::Int));
        let x = layout.add_field("x", Type::Int);
        assert_eq!((f.entry.offset, f.position), (-1, 0));
        assert_eq!((x.entry.offset, x.position), (-3, 1));
        assert_eq!(layout.field_cells, 3);
    }

    #[test]
    fn methods_count_up_from_zero() {
        let mut layout = ClassLayout::default();
        let m = layout.add_method("m", Type::method(vec![], Type::Int));
        let n = layout.add_method("n", Type::method(vec![Type::Int], Type::Int));
        assert_eq!(m.entry.offset, 0);
        assert_eq!(n.entry.offset, 1);
        assert!(n.is_method());
        assert_eq!(layout.class_type.methods.len(), 2);
    }

    #[test]
    fn override_keeps_slot() {
        let mut layout = ClassLayout::default();
        layout.add_field("a", Type::reference("A"));
        let inherited = layout.add_field("b", Type::reference("A"));
        let child = layout.override_member("b", &inherited, Type::reference("B"));
        assert_eq!(child.entry.offset, inherited.entry.offset);
        assert_eq!(layout.class_type.fields[1], Type::reference("B"));
        assert_eq!(layout.class_type.fields.len(), 2);
    }
}
