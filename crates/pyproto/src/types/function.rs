use std::{any::Any, cell::RefCell, fmt, rc::Rc};

use crate::{
    exception::{ExcType, RunError, RunResult},
    types::Dict,
    value::Value,
};

/// A compiled code object.
///
/// The layer treats code as opaque: it is produced by a [`Compiler`](crate::Compiler) and
/// consumed by an [`Executor`](crate::Executor), which recover their own representation
/// through [`Code::payload`]. The layer itself only reads the parameter list and whether the
/// code is a class body.
pub struct Code {
    name: Rc<str>,
    filename: Rc<str>,
    params: Vec<Rc<str>>,
    is_class_body: bool,
    payload: Rc<dyn Any>,
}

impl Code {
    /// Creates a code object for an ordinary function or module body.
    pub fn new(
        name: impl Into<Rc<str>>,
        filename: impl Into<Rc<str>>,
        params: Vec<Rc<str>>,
        payload: Rc<dyn Any>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            params,
            is_class_body: false,
            payload,
        }
    }

    /// Creates a code object for a class body, which runs with the prepared namespace as locals.
    pub fn class_body(name: impl Into<Rc<str>>, filename: impl Into<Rc<str>>, payload: Rc<dyn Any>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            params: Vec::new(),
            is_class_body: true,
            payload,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn params(&self) -> &[Rc<str>] {
        &self.params
    }

    #[must_use]
    pub fn is_class_body(&self) -> bool {
        self.is_class_body
    }

    /// Downcasts the executor-specific payload.
    #[must_use]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Code")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("params", &self.params)
            .field("is_class_body", &self.is_class_body)
            .finish_non_exhaustive()
    }
}

/// A mutable single-value container shared between a scope and its closures.
///
/// A class body returns its `__class__` cell so the constructed class can be stored into it,
/// which makes the class visible to methods that close over the cell.
#[derive(Clone, Default)]
pub struct Cell(Rc<RefCell<Option<Value>>>);

impl Cell {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(value: Value) -> Self {
        Self(Rc::new(RefCell::new(Some(value))))
    }

    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.0.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.borrow_mut() = Some(value);
    }

    /// Stores `value` into an empty cell.
    ///
    /// Fails with an internal error if the cell already holds a value: a `__class__` cell is
    /// filled exactly once, by the class construction that created it.
    pub fn fill(&self, value: Value) -> RunResult<()> {
        let mut slot = self.0.borrow_mut();
        if slot.is_some() {
            return Err(RunError::internal("cell is already filled"));
        }
        *slot = Some(value);
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_none()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the contents may be a class whose methods close over this cell
        if self.is_empty() {
            f.write_str("Cell(<empty>)")
        } else {
            f.write_str("Cell(<filled>)")
        }
    }
}

/// A user function: code plus the globals and closure it was created with.
pub struct Function {
    name: Rc<str>,
    globals: Dict,
    code: Rc<Code>,
    closure: Vec<Cell>,
    defaults: Vec<Value>,
}

impl Function {
    pub fn new(name: impl Into<Rc<str>>, globals: Dict, code: Rc<Code>, closure: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            globals,
            code,
            closure,
            defaults: Vec::new(),
        }
    }

    /// Sets default values for the trailing parameters.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Vec<Value>) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn globals(&self) -> &Dict {
        &self.globals
    }

    #[must_use]
    pub fn code(&self) -> &Rc<Code> {
        &self.code
    }

    #[must_use]
    pub fn closure(&self) -> &[Cell] {
        &self.closure
    }

    /// Materializes the local scope for one invocation.
    ///
    /// For a class body the single positional argument must be the namespace dict; that
    /// same dict is returned, so writes made by the body land in the namespace the caller
    /// holds. For other code a fresh dict is created and the arguments are bound to the
    /// declared parameters, trailing ones falling back to the function's defaults.
    pub fn locals_for_call(&self, args: &[Value], kwargs: Option<&Dict>) -> RunResult<Dict> {
        if self.code.is_class_body() {
            return match (args, kwargs) {
                ([Value::Dict(namespace)], None) => Ok(namespace.clone()),
                _ => Err(RunError::internal("class body must be called with exactly its namespace")),
            };
        }

        let params = self.code.params();
        if args.len() > params.len() {
            return Err(ExcType::type_error(format!(
                "{}() takes {} positional argument{} but {} {} given",
                self.name,
                params.len(),
                if params.len() == 1 { "" } else { "s" },
                args.len(),
                if args.len() == 1 { "was" } else { "were" },
            )));
        }

        let locals = Dict::new();
        for (param, arg) in params.iter().zip(args) {
            locals.set(param.clone(), arg.clone());
        }
        if let Some(kwargs) = kwargs {
            for (key, value) in kwargs.items() {
                match params.iter().position(|p| *p == key) {
                    None => {
                        return Err(ExcType::type_error(format!(
                            "{}() got an unexpected keyword argument '{key}'",
                            self.name
                        )));
                    }
                    Some(index) if index < args.len() => {
                        return Err(ExcType::type_error(format!(
                            "{}() got multiple values for argument '{key}'",
                            self.name
                        )));
                    }
                    Some(_) => locals.set(key, value),
                }
            }
        }

        let first_default = params.len().saturating_sub(self.defaults.len());
        let mut missing = Vec::new();
        for (index, param) in params.iter().enumerate() {
            if locals.contains_key(param) {
                continue;
            }
            match index.checked_sub(first_default).and_then(|d| self.defaults.get(d)) {
                Some(default) => locals.set(param.clone(), default.clone()),
                None => missing.push(format!("'{param}'")),
            }
        }
        if !missing.is_empty() {
            return Err(ExcType::type_error(format!(
                "{}() missing {} required positional argument{}: {}",
                self.name,
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                missing.join(", ")
            )));
        }
        Ok(locals)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(params: &[&str]) -> Rc<Code> {
        Rc::new(Code::new("f", "<test>", params.iter().map(|p| Rc::from(*p)).collect(), Rc::new(())))
    }

    #[test]
    fn class_body_returns_the_namespace_itself() {
        let body = Rc::new(Code::class_body("C", "<test>", Rc::new(())));
        let func = Function::new("C", Dict::new(), body, Vec::new());
        let ns = Dict::new();
        let locals = func.locals_for_call(&[Value::Dict(ns.clone())], None).unwrap();
        assert!(locals.ptr_eq(&ns));
    }

    #[test]
    fn binds_positional_keyword_and_defaults() {
        let func =
            Function::new("f", Dict::new(), code(&["a", "b", "c"]), Vec::new()).with_defaults(vec![Value::Int(3)]);
        let kwargs = Dict::from_pairs([("b", Value::Int(2))]);
        let locals = func.locals_for_call(&[Value::Int(1)], Some(&kwargs)).unwrap();
        assert_eq!(locals.get("a"), Some(Value::Int(1)));
        assert_eq!(locals.get("b"), Some(Value::Int(2)));
        assert_eq!(locals.get("c"), Some(Value::Int(3)));
    }

    #[test]
    fn reports_missing_and_surplus_arguments() {
        let func = Function::new("f", Dict::new(), code(&["a", "b"]), Vec::new());
        let err = func.locals_for_call(&[], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError: f() missing 2 required positional arguments: 'a', 'b'"
        );
        let err = func
            .locals_for_call(&[Value::Int(1), Value::Int(2), Value::Int(3)], None)
            .unwrap_err();
        assert_eq!(err.to_string(), "TypeError: f() takes 2 positional arguments but 3 were given");
    }

    #[test]
    fn cell_fills_once() {
        let cell = Cell::new();
        cell.fill(Value::Int(1)).unwrap();
        assert!(cell.fill(Value::Int(2)).is_err());
        assert_eq!(cell.get(), Some(Value::Int(1)));
    }
}
