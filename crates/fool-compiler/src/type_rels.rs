//! Subtyping and least upper bounds.
//!
//! Nominal inheritance and function variance are decided here and nowhere
//! else. Both operations are parameterised by the [`ClassHierarchy`] that
//! resolution builds.

use fool_core::{FunctionType, Type};
use rustc_hash::{FxHashMap, FxHashSet};

/// Class name to direct superclass name.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    superclass: FxHashMap<String, String>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `class` extends `superclass`.
    pub fn add(&mut self, class: impl Into<String>, superclass: impl Into<String>) {
        self.superclass.insert(class.into(), superclass.into());
    }

    /// The direct superclass of `class`, if it has one.
    pub fn superclass(&self, class: &str) -> Option<&str> {
        self.superclass.get(class).map(String::as_str)
    }

    /// Proper ancestors of `class`, nearest first.
    ///
    /// Stops at a root class or at the first class seen twice.
    pub fn ancestors<'a>(&'a self, class: &'a str) -> Vec<&'a str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(class);
        let mut chain = Vec::new();
        let mut current = class;
        while let Some(parent) = self.superclass(current) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `sub` is `sup` or inherits from it.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.ancestors(sub).contains(&sup)
    }

    /// Whether a value of type `a` can be used where `b` is expected.
    pub fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        match (a, b) {
            (Type::Empty, Type::Ref(_)) => true,
            (Type::Ref(x), Type::Ref(y)) => self.is_subclass(x, y),
            (Type::Arrow(fa), Type::Arrow(fb)) | (Type::Method(fa), Type::Method(fb)) => {
                self.is_function_subtype(fa, fb)
            }
            (Type::Bool, Type::Int) => true,
            (Type::Int, Type::Int) | (Type::Bool, Type::Bool) | (Type::Empty, Type::Empty) => true,
            (Type::Class(x), Type::Class(y)) => x == y,
            _ => false,
        }
    }

    /// Covariant in the return type, contravariant in the parameters.
    fn is_function_subtype(&self, a: &FunctionType, b: &FunctionType) -> bool {
        a.arity() == b.arity()
            && self.is_subtype(&a.ret, &b.ret)
            && a
                .params
                .iter()
                .zip(&b.params)
                .all(|(pa, pb)| self.is_subtype(pb, pa))
    }

    /// The most specific type both `a` and `b` are subtypes of.
    pub fn lowest_common_ancestor(&self, a: &Type, b: &Type) -> Option<Type> {
        match (a, b) {
            (Type::Empty, Type::Ref(_)) => Some(b.clone()),
            (Type::Ref(_), Type::Empty) => Some(a.clone()),
            (Type::Int | Type::Bool, Type::Int | Type::Bool) => {
                if matches!(a, Type::Int) || matches!(b, Type::Int) {
                    Some(Type::Int)
                } else {
                    Some(Type::Bool)
                }
            }
            (Type::Ref(x), Type::Ref(y)) => {
                if self.is_subclass(y, x) {
                    return Some(a.clone());
                }
                if self.is_subclass(x, y) {
                    return Some(b.clone());
                }
                self.ancestors(x)
                    .into_iter()
                    .find(|ancestor| self.is_subclass(y, ancestor))
                    .map(Type::reference)
            }
            (Type::Arrow(fa), Type::Arrow(fb)) => {
                if fa.arity() != fb.arity() {
                    return None;
                }
                let ret = self.lowest_common_ancestor(&fa.ret, &fb.ret)?;
                let params = fa
                    .params
                    .iter()
                    .zip(&fb.params)
                    .map(|(pa, pb)| {
                        if self.is_subtype(pa, pb) {
                            Some(pa.clone())
                        } else if self.is_subtype(pb, pa) {
                            Some(pb.clone())
                        } else {
                            None
                        }
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(Type::arrow(params, ret))
            }
            _ => None,
        }
    }
}
