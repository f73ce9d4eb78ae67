use std::{fmt, rc::Rc};

use crate::{
    builtins::Builtins,
    exception::{ExcType, RunResult},
    types::{Dict, Type},
    value::Value,
};

/// Maximum number of entries a computed MRO may contain.
pub const MAX_MRO_LENGTH: usize = 1000;

/// A reference to any class: a builtin type, an exception class or a user class.
///
/// This is what `type(x)` returns and what class construction works with when it
/// resolves metaclasses and linearizes bases. Equality is identity: two user classes are
/// equal only when they are the same object.
#[derive(Clone)]
pub enum TypeRef {
    Builtin(Type),
    Exc(ExcType),
    Class(Rc<ClassObject>),
}

impl TypeRef {
    /// The class's `__name__`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(t) => (*t).into(),
            Self::Exc(e) => (*e).into(),
            Self::Class(cls) => cls.name(),
        }
    }

    /// The linearized MRO, starting with this class and ending with `object`.
    #[must_use]
    pub fn mro(&self) -> Vec<Self> {
        match self {
            Self::Builtin(t) => t.mro().iter().copied().map(Self::Builtin).collect(),
            Self::Exc(e) => e
                .ancestors()
                .map(Self::Exc)
                .chain(std::iter::once(Self::Builtin(Type::Object)))
                .collect(),
            Self::Class(cls) => std::iter::once(self.clone()).chain(cls.mro.iter().cloned()).collect(),
        }
    }

    /// Checks whether `self` is `other` or inherits from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        match (self, other) {
            (_, Self::Builtin(Type::Object)) => true,
            (Self::Builtin(a), Self::Builtin(b)) => a.mro().contains(b),
            (Self::Exc(a), Self::Exc(b)) => a.is_subclass_of(*b),
            (Self::Class(cls), _) => self == other || cls.mro.contains(other),
            _ => false,
        }
    }

    /// Whether this class is `type` or derives from it, i.e. whether its instances are classes.
    #[must_use]
    pub fn is_metatype(&self) -> bool {
        self.is_subtype_of(&Self::Builtin(Type::Type))
    }

    /// The class of this class: `type` unless a user class was built by another metaclass.
    #[must_use]
    pub fn metaclass(&self) -> Self {
        match self {
            Self::Class(cls) => cls.metaclass.clone(),
            _ => Self::Builtin(Type::Type),
        }
    }

    /// Looks `name` up in the namespaces along the MRO, without binding or descriptors.
    ///
    /// Builtin types and exception classes expose no namespace entries here; their behaviour
    /// is native and reached through the protocol dispatch instead.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Self::Class(cls) => cls.lookup(name),
            _ => None,
        }
    }

    /// Converts the class into the value that represents it at runtime.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Builtin(t) => Value::Builtin(Builtins::Type(t)),
            Self::Exc(e) => Value::Builtin(Builtins::ExcType(e)),
            Self::Class(cls) => Value::Class(cls),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Exc(a), Self::Exc(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name())
    }
}

/// A user-defined class created by `type(name, bases, ns)` or a metaclass deriving from `type`.
///
/// The MRO is stored without the class itself (it cannot hold an `Rc` to itself);
/// [`TypeRef::mro`] prepends it.
pub struct ClassObject {
    name: Rc<str>,
    metaclass: TypeRef,
    bases: Vec<TypeRef>,
    mro: Vec<TypeRef>,
    namespace: Dict,
}

impl ClassObject {
    /// Creates a class, computing its C3 linearization from `bases`.
    ///
    /// The namespace is adopted as-is: later writes through either handle are visible on the class.
    pub(crate) fn new(name: Rc<str>, metaclass: TypeRef, bases: Vec<TypeRef>, namespace: Dict) -> RunResult<Self> {
        let mro = compute_c3_mro(&bases)?;
        Ok(Self {
            name,
            metaclass,
            bases,
            mro,
            namespace,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn metaclass(&self) -> &TypeRef {
        &self.metaclass
    }

    #[must_use]
    pub fn bases(&self) -> &[TypeRef] {
        &self.bases
    }

    #[must_use]
    pub fn namespace(&self) -> &Dict {
        &self.namespace
    }

    /// Raw MRO probe: the class's own namespace first, then each ancestor's.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.namespace
            .get(name)
            .or_else(|| self.mro.iter().find_map(|base| base.lookup(name)))
    }

    /// Whether instances of this class are themselves classes.
    #[must_use]
    pub fn is_metaclass(&self) -> bool {
        self.mro.contains(&TypeRef::Builtin(Type::Type))
    }
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}

/// An instance of a user class, carrying its own attribute dict.
#[derive(Debug)]
pub struct Instance {
    class: Rc<ClassObject>,
    dict: Dict,
}

impl Instance {
    #[must_use]
    pub fn new(class: Rc<ClassObject>) -> Self {
        Self {
            class,
            dict: Dict::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> &Rc<ClassObject> {
        &self.class
    }

    #[must_use]
    pub fn dict(&self) -> &Dict {
        &self.dict
    }
}

/// A function bound to the object it was looked up on; calling it prepends the receiver.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: Value,
    function: Value,
}

impl BoundMethod {
    #[must_use]
    pub fn new(receiver: Value, function: Value) -> Self {
        Self { receiver, function }
    }

    #[must_use]
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    #[must_use]
    pub fn function(&self) -> &Value {
        &self.function
    }
}

/// Computes the C3 linearization for a new class with the given bases.
///
/// Returns the MRO without the new class itself. No bases means an implicit `(object,)`.
///
/// # Errors
/// Returns `TypeError` when a base is duplicated or not subclassable, or when the bases
/// admit no consistent linearization.
pub(crate) fn compute_c3_mro(bases: &[TypeRef]) -> RunResult<Vec<TypeRef>> {
    if bases.is_empty() {
        return Ok(vec![TypeRef::Builtin(Type::Object)]);
    }

    for (i, base) in bases.iter().enumerate() {
        if let TypeRef::Builtin(t) = base
            && !t.is_acceptable_base()
        {
            return Err(ExcType::type_error(format!("type '{t}' is not an acceptable base type")));
        }
        if bases[..i].contains(base) {
            return Err(ExcType::type_error(format!("duplicate base class {base}")));
        }
    }

    // Collect the MROs of all base classes, then the list of bases itself
    let mut linearizations: Vec<Vec<TypeRef>> = bases.iter().map(TypeRef::mro).collect();
    linearizations.push(bases.to_vec());

    let mut result = Vec::new();
    loop {
        linearizations.retain(|l| !l.is_empty());
        if linearizations.is_empty() {
            break;
        }

        // Find a good head: a class that does not appear in the tail of any list
        let found = linearizations
            .iter()
            .map(|lin| &lin[0])
            .find(|candidate| !linearizations.iter().any(|other| other[1..].contains(*candidate)))
            .cloned();

        let Some(next) = found else {
            let base_names: Vec<&str> = bases.iter().map(TypeRef::name).collect();
            return Err(ExcType::type_error(format!(
                "Cannot create a consistent method resolution order (MRO) for bases {}",
                base_names.join(", ")
            )));
        };

        for lin in &mut linearizations {
            if lin[0] == next {
                lin.remove(0);
            }
        }
        result.push(next);

        if result.len() > MAX_MRO_LENGTH {
            return Err(ExcType::type_error("MRO exceeds maximum length"));
        }
    }

    Ok(result)
}
