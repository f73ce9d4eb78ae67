//! Metaclass resolution for class construction.

use crate::{
    exception::{ExcType, RunResult},
    types::TypeRef,
    value::Value,
};

impl TypeRef {
    /// Selects the most derived metaclass among `self` and the classes of `bases`.
    ///
    /// The candidates are `self` followed by `type(base)` for each base, in order and without
    /// duplicates. The winner is the first candidate that is a subtype of every other candidate.
    /// Neither `self` nor the bases are modified.
    ///
    /// # Errors
    /// Returns the metaclass conflict `TypeError` when no candidate is a subtype of all others.
    pub fn calculate_metaclass(&self, bases: &[Value]) -> RunResult<Self> {
        let mut candidates: Vec<Self> = Vec::with_capacity(bases.len() + 1);
        candidates.push(self.clone());
        for base in bases {
            let base_type = base.py_type();
            if !candidates.contains(&base_type) {
                candidates.push(base_type);
            }
        }

        candidates
            .iter()
            .find(|winner| candidates.iter().all(|other| winner.is_subtype_of(other)))
            .cloned()
            .ok_or_else(ExcType::type_error_metaclass_conflict)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::types::{ClassObject, Dict, Type};

    fn class(name: &str, metaclass: TypeRef, bases: Vec<TypeRef>) -> TypeRef {
        TypeRef::Class(Rc::new(ClassObject::new(name.into(), metaclass, bases, Dict::new()).unwrap()))
    }

    #[test]
    fn picks_most_derived_metaclass() {
        let type_ = TypeRef::Builtin(Type::Type);
        let meta = class("Meta", type_.clone(), vec![type_.clone()]);
        let base = class("Base", meta.clone(), vec![]);

        let winner = type_.calculate_metaclass(&[base.into_value()]).unwrap();
        assert_eq!(winner, meta);
    }

    #[test]
    fn unrelated_metaclasses_conflict() {
        let type_ = TypeRef::Builtin(Type::Type);
        let meta_a = class("MetaA", type_.clone(), vec![type_.clone()]);
        let meta_b = class("MetaB", type_.clone(), vec![type_.clone()]);
        let a = class("A", meta_a, vec![]);
        let b = class("B", meta_b, vec![]);

        let err = type_.calculate_metaclass(&[a.into_value(), b.into_value()]).unwrap_err();
        assert!(err.to_string().starts_with("TypeError: metaclass conflict"));
    }

    #[test]
    fn no_bases_keeps_candidate() {
        let type_ = TypeRef::Builtin(Type::Type);
        assert_eq!(type_.calculate_metaclass(&[]).unwrap(), type_);
    }
}
