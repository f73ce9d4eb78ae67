//! The runtime context threaded through every builtin call.
//!
//! A [`Runtime`] owns the collaborators this layer consumes but does not implement (the
//! [`Executor`] that runs code objects, the [`Compiler`] behind `compile()` and the
//! [`Importer`] behind `__import__()`) together with the print writer, the tracer and the
//! resource limits. Builtins receive `&Runtime` and call back into it, so an executor can
//! in turn call builtins through [`Runtime::call`].

use std::{
    cell::{Cell as StdCell, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    args::ArgValues,
    builtins::{Builtins, CompileMode, lookup_builtin, type_::type_new},
    exception::{ExcType, RunError, RunResult, SimpleException},
    io::{PrintWriter, StdPrint},
    resource::ResourceLimits,
    tracer::{BuiltinTracer, NoopTracer},
    types::{Cell, ClassObject, Code, Dict, Function, Instance, TypeRef},
    value::Value,
};

/// Runs code objects: class bodies, function bodies and compiled modules.
pub trait Executor {
    /// Executes `code` with the given scopes and closure cells.
    ///
    /// Returns `Ok(None)` when the code produced no result. For a class body the result is
    /// the `__class__` cell if the body created one, and `None` tells class construction to
    /// stop without building a class.
    fn run(
        &self,
        rt: &Runtime,
        globals: &Dict,
        locals: &Dict,
        code: &Code,
        closure: &[Cell],
    ) -> RunResult<Option<Value>>;
}

/// Turns source text into a code object for `compile()`.
pub trait Compiler {
    /// Compiles `source`; syntax errors are returned as `SyntaxError` exceptions.
    fn compile(
        &self,
        rt: &Runtime,
        source: &str,
        filename: &str,
        mode: CompileMode,
        flags: i64,
        dont_inherit: bool,
    ) -> RunResult<Value>;
}

/// Resolves modules for `__import__()`.
pub trait Importer {
    /// Imports `name` relative to `globals` at the given `level` and returns the module value.
    fn import_module_level(
        &self,
        rt: &Runtime,
        name: &str,
        globals: &Dict,
        locals: &Dict,
        fromlist: &[Rc<str>],
        level: u32,
    ) -> RunResult<Value>;
}

/// Collaborator used when none was configured.
///
/// Running or compiling code is an embedding error; importing behaves like an empty
/// module path.
#[derive(Debug, Clone, Copy, Default)]
struct Unconfigured;

impl Executor for Unconfigured {
    fn run(&self, _: &Runtime, _: &Dict, _: &Dict, code: &Code, _: &[Cell]) -> RunResult<Option<Value>> {
        Err(RunError::internal(format!(
            "no executor configured to run code object '{}'",
            code.name()
        )))
    }
}

impl Compiler for Unconfigured {
    fn compile(&self, _: &Runtime, _: &str, filename: &str, _: CompileMode, _: i64, _: bool) -> RunResult<Value> {
        Err(RunError::internal(format!("no compiler configured to compile '{filename}'")))
    }
}

impl Importer for Unconfigured {
    fn import_module_level(
        &self,
        _: &Runtime,
        name: &str,
        _: &Dict,
        _: &Dict,
        _: &[Rc<str>],
        _: u32,
    ) -> RunResult<Value> {
        Err(SimpleException::new_msg(ExcType::ModuleNotFoundError, format!("No module named '{name}'")).into())
    }
}

/// Context for builtin calls: collaborators, output, tracing and limits.
///
/// Single threaded: values are `Rc`-shared, so a `Runtime` is neither `Send` nor `Sync`.
pub struct Runtime {
    executor: Box<dyn Executor>,
    compiler: Box<dyn Compiler>,
    importer: Box<dyn Importer>,
    print: RefCell<Box<dyn PrintWriter>>,
    tracer: RefCell<Box<dyn BuiltinTracer>>,
    limits: ResourceLimits,
    depth: StdCell<usize>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("limits", &self.limits)
            .field("depth", &self.depth.get())
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`Runtime`]; every component is optional.
#[derive(Default)]
pub struct RuntimeBuilder {
    executor: Option<Box<dyn Executor>>,
    compiler: Option<Box<dyn Compiler>>,
    importer: Option<Box<dyn Importer>>,
    print: Option<Box<dyn PrintWriter>>,
    tracer: Option<Box<dyn BuiltinTracer>>,
    limits: ResourceLimits,
}

impl RuntimeBuilder {
    #[must_use]
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    #[must_use]
    pub fn compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    #[must_use]
    pub fn importer(mut self, importer: impl Importer + 'static) -> Self {
        self.importer = Some(Box::new(importer));
        self
    }

    /// Sets where `print()` output goes; defaults to [`StdPrint`].
    #[must_use]
    pub fn print(mut self, print: impl PrintWriter + 'static) -> Self {
        self.print = Some(Box::new(print));
        self
    }

    /// Sets the tracer; defaults to [`NoopTracer`].
    #[must_use]
    pub fn tracer(mut self, tracer: impl BuiltinTracer + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn build(self) -> Runtime {
        Runtime {
            executor: self.executor.unwrap_or_else(|| Box::new(Unconfigured)),
            compiler: self.compiler.unwrap_or_else(|| Box::new(Unconfigured)),
            importer: self.importer.unwrap_or_else(|| Box::new(Unconfigured)),
            print: RefCell::new(self.print.unwrap_or_else(|| Box::new(StdPrint))),
            tracer: RefCell::new(self.tracer.unwrap_or_else(|| Box::new(NoopTracer))),
            limits: self.limits,
            depth: StdCell::new(0),
        }
    }
}

/// Decrements the runtime's call depth when dropped.
pub(crate) struct DepthGuard<'a> {
    depth: &'a StdCell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl Runtime {
    #[must_use]
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    #[must_use]
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Current nesting depth of runtime calls.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Enters one level of call nesting, failing with `RecursionError` past the limit.
    pub(crate) fn enter(&self) -> RunResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.limits.max_recursion_depth {
            return Err(ExcType::recursion_error());
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }

    pub(crate) fn compiler(&self) -> &dyn Compiler {
        self.compiler.as_ref()
    }

    pub(crate) fn importer(&self) -> &dyn Importer {
        self.importer.as_ref()
    }

    pub(crate) fn print_writer(&self) -> RunResult<RefMut<'_, Box<dyn PrintWriter>>> {
        self.print
            .try_borrow_mut()
            .map_err(|_| RunError::internal("print writer is already in use"))
    }

    /// Runs `f` against the tracer; a re-entrant hook from inside the tracer is skipped.
    pub(crate) fn trace(&self, f: impl FnOnce(&mut dyn BuiltinTracer)) {
        if let Ok(mut tracer) = self.tracer.try_borrow_mut() {
            f(tracer.as_mut());
        }
    }

    /// Runs a code object through the executor.
    pub fn run_code(&self, globals: &Dict, locals: &Dict, code: &Code, closure: &[Cell]) -> RunResult<Option<Value>> {
        let _guard = self.enter()?;
        self.executor.run(self, globals, locals, code, closure)
    }

    /// Calls any callable value with the given arguments.
    ///
    /// Handles builtins, user functions, bound methods, classes (construction) and
    /// instances whose class defines `__call__`.
    pub fn call(&self, callable: &Value, args: ArgValues) -> RunResult<Value> {
        let _guard = self.enter()?;
        match callable {
            Value::Builtin(builtin) => builtin.call(self, args),
            Value::Function(func) => self.call_function(func, args),
            Value::BoundMethod(method) => self.call(method.function(), args.prepend(method.receiver().clone())),
            Value::Class(cls) => self.call_class(cls, args),
            Value::Instance(inst) => match inst.class().lookup("__call__") {
                Some(call) => self.call(&call, args.prepend(callable.clone())),
                None => Err(ExcType::type_error_not_callable(inst.class().name())),
            },
            other => Err(ExcType::type_error_not_callable(other.py_type().name())),
        }
    }

    /// Looks up a builtin by name and calls it.
    pub fn call_builtin(&self, name: &str, args: ArgValues) -> RunResult<Value> {
        let builtin = lookup_builtin(name).ok_or_else(|| {
            RunError::from(SimpleException::new_msg(
                ExcType::NameError,
                format!("name '{name}' is not defined"),
            ))
        })?;
        self.call(&builtin, args)
    }

    fn call_function(&self, func: &Function, args: ArgValues) -> RunResult<Value> {
        let (positional, kwargs) = args.into_parts();
        let locals = func.locals_for_call(&positional, kwargs.as_ref())?;
        let result = self
            .executor
            .run(self, func.globals(), &locals, func.code(), func.closure())?;
        Ok(result.unwrap_or(Value::None))
    }

    /// Calls a user class: constructs a class when it is a metaclass, an instance otherwise.
    fn call_class(&self, cls: &Rc<ClassObject>, args: ArgValues) -> RunResult<Value> {
        let cls_value = Value::Class(cls.clone());
        let created = if let Some(new) = cls.lookup("__new__") {
            self.call(&new, args.clone().prepend(cls_value))?
        } else if cls.is_metaclass() {
            type_new(TypeRef::Class(cls.clone()), args.clone())?
        } else {
            Value::Instance(Rc::new(Instance::new(cls.clone())))
        };

        if !created.py_type().is_subtype_of(&TypeRef::Class(cls.clone())) {
            return Ok(created);
        }
        match cls.lookup("__init__") {
            Some(init) => {
                let result = self.call(&init, args.prepend(created.clone()))?;
                if !matches!(result, Value::None) {
                    return Err(ExcType::type_error(format!(
                        "__init__() should return None, not '{}'",
                        result.py_type()
                    )));
                }
            }
            None if !cls.is_metaclass()
                && cls.lookup("__new__").is_none()
                && (args.count() > 0 || args.kwargs().is_some()) =>
            {
                return Err(ExcType::type_error(format!("{}() takes no arguments", cls.name())));
            }
            None => {}
        }
        Ok(created)
    }
}

impl Builtins {
    /// Calls the builtin, tracing entry and exit for builtin functions.
    pub(crate) fn call(self, rt: &Runtime, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::Function(func) => {
                let name: &'static str = func.into();
                let depth = rt.depth();
                rt.trace(|t| t.on_builtin_call(name, args.count(), depth));
                let result = func.call(rt, args);
                rt.trace(|t| t.on_builtin_return(name, result.is_ok(), depth));
                result
            }
            Self::Type(t) => t.call(rt, args),
            Self::ExcType(e) => e.call(args),
        }
    }
}
