//! Semantic types.
//!
//! [`Type`] is what the resolver attaches to declarations and what the type
//! checker computes for expressions. Annotations written in the source are
//! `fool_ast::TypeExpr` values; the resolver converts them into these.

use std::fmt;

/// A semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Integers.
    Int,
    /// Booleans (a subtype of `Int`).
    Bool,
    /// The type of `null`, the bottom of the reference types.
    Empty,
    /// A reference to an instance of the named class.
    Ref(String),
    /// A first-class function.
    Arrow(FunctionType),
    /// A method. Same shape as a function, but dispatched through the
    /// receiver's dispatch table instead of a closure.
    Method(FunctionType),
    /// The type bound to a class name: every field and method, inherited
    /// members first, in offset order.
    Class(ClassType),
}

/// Parameter and return types of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// Parameter types in declaration order.
    pub params: Vec<Type>,
    /// Return type.
    pub ret: Box<Type>,
}

/// Flattened member types of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ClassType {
    /// Field types, indexed by field position (`-offset - 1` for one-slot fields).
    pub fields: Vec<Type>,
    /// Method types, indexed by method offset.
    pub methods: Vec<FunctionType>,
}

impl Type {
    /// Convenience constructor for a reference type.
    pub fn reference(class: impl Into<String>) -> Self {
        Type::Ref(class.into())
    }

    /// Convenience constructor for a function type.
    pub fn arrow(params: Vec<Type>, ret: Type) -> Self {
        Type::Arrow(FunctionType::new(params, ret))
    }

    /// Convenience constructor for a method type.
    pub fn method(params: Vec<Type>, ret: Type) -> Self {
        Type::Method(FunctionType::new(params, ret))
    }

    /// Number of storage cells a value of this type occupies.
    ///
    /// Closures take two cells (declaring frame pointer, code address);
    /// everything else fits in one.
    pub fn slot_count(&self) -> i32 {
        match self {
            Type::Arrow(_) => 2,
            _ => 1,
        }
    }

    /// Whether values of this type are closures.
    pub fn is_functional(&self) -> bool {
        matches!(self, Type::Arrow(_))
    }

    /// The underlying signature of a function or method type.
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Arrow(f) | Type::Method(f) => Some(f),
            _ => None,
        }
    }
}

impl FunctionType {
    /// Create a signature.
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Empty => write!(f, "null"),
            Type::Ref(name) => write!(f, "{name}"),
            Type::Arrow(sig) => write!(f, "{sig}"),
            Type::Method(sig) => write!(f, "method {sig}"),
            Type::Class(class) => {
                write!(f, "class(")?;
                for (i, field) in class.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ") {{")?;
                for (i, method) in class.methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {method}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_counts() {
        assert_eq!(Type::Int.slot_count(), 1);
        assert_eq!(Type::reference("A").slot_count(), 1);
        assert_eq!(Type::arrow(vec![Type::Int], Type::Int).slot_count(), 2);
        // Methods live in dispatch tables, never in frames.
        assert_eq!(Type::method(vec![], Type::Int).slot_count(), 1);
    }

    #[test]
    fn display_function_types() {
        let t = Type::arrow(vec![Type::Int, Type::reference("A")], Type::Bool);
        assert_eq!(t.to_string(), "(int, A) -> bool");
        let m = Type::method(vec![], Type::Int);
        assert_eq!(m.to_string(), "method () -> int");
    }

    #[test]
    fn as_function_sees_through_methods() {
        let m = Type::method(vec![Type::Bool], Type::Int);
        assert_eq!(m.as_function().map(FunctionType::arity), Some(1));
        assert!(Type::Int.as_function().is_none());
    }
}
