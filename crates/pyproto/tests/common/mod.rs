//! Test doubles for the collaborators a `Runtime` consumes.
//!
//! Code objects carry a Rust closure as their payload; the [`ScriptExecutor`] simply calls it.
#![allow(dead_code, reason = "each test binary compiles this module and uses a different subset of it")]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use pyproto::{
    ArgValues, Cell, Code, CompileMode, Compiler, Dict, ExcType, Executor, Function, Importer, NoPrint, RunError,
    RunResult, Runtime, SimpleException, Value,
};

/// Scopes visible to a running body.
pub struct Frame<'a> {
    pub globals: &'a Dict,
    pub locals: &'a Dict,
    pub closure: &'a [Cell],
}

pub type Body = Rc<dyn Fn(&Runtime, &Frame<'_>) -> RunResult<Option<Value>>>;

#[derive(Debug, Default)]
pub struct ScriptExecutor;

impl Executor for ScriptExecutor {
    fn run(
        &self,
        rt: &Runtime,
        globals: &Dict,
        locals: &Dict,
        code: &Code,
        closure: &[Cell],
    ) -> RunResult<Option<Value>> {
        let body = code
            .payload::<Body>()
            .ok_or_else(|| RunError::internal("code object without a script payload"))?;
        body(rt, &Frame { globals, locals, closure })
    }
}

/// Compiles sums of integer literals such as `"1+1"`; everything else is a syntax error.
#[derive(Debug, Default)]
pub struct SumCompiler;

impl Compiler for SumCompiler {
    fn compile(
        &self,
        _rt: &Runtime,
        source: &str,
        filename: &str,
        mode: CompileMode,
        _flags: i64,
        _dont_inherit: bool,
    ) -> RunResult<Value> {
        let total = source
            .split('+')
            .map(|term| term.trim().parse::<i64>())
            .sum::<Result<i64, _>>()
            .map_err(|_| SimpleException::new_msg(ExcType::SyntaxError, "invalid syntax"))?;
        let body: Body = Rc::new(move |_: &Runtime, _: &Frame<'_>| {
            Ok(match mode {
                CompileMode::Eval => Some(Value::Int(total)),
                CompileMode::Exec | CompileMode::Single => None,
            })
        });
        Ok(Value::Code(Rc::new(Code::new("<module>", filename, Vec::new(), Rc::new(body)))))
    }
}

/// One recorded `import_module_level` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCall {
    pub name: String,
    pub fromlist: Vec<String>,
    pub level: u32,
    pub globals_len: usize,
}

/// Importer over a fixed set of modules that records every request.
#[derive(Debug, Clone, Default)]
pub struct DictImporter {
    modules: Rc<RefCell<HashMap<String, Value>>>,
    calls: Rc<RefCell<Vec<ImportCall>>>,
}

impl DictImporter {
    pub fn with_module(self, name: &str, module: Value) -> Self {
        self.modules.borrow_mut().insert(name.to_owned(), module);
        self
    }

    pub fn calls(&self) -> Vec<ImportCall> {
        self.calls.borrow().clone()
    }
}

impl Importer for DictImporter {
    fn import_module_level(
        &self,
        _rt: &Runtime,
        name: &str,
        globals: &Dict,
        _locals: &Dict,
        fromlist: &[Rc<str>],
        level: u32,
    ) -> RunResult<Value> {
        self.calls.borrow_mut().push(ImportCall {
            name: name.to_owned(),
            fromlist: fromlist.iter().map(ToString::to_string).collect(),
            level,
            globals_len: globals.len(),
        });
        let target = if fromlist.is_empty() {
            name.split('.').next().unwrap_or(name)
        } else {
            name
        };
        self.modules.borrow().get(target).cloned().ok_or_else(|| {
            SimpleException::new_msg(ExcType::ModuleNotFoundError, format!("No module named '{target}'")).into()
        })
    }
}

pub fn runtime() -> Runtime {
    Runtime::builder()
        .executor(ScriptExecutor)
        .compiler(SumCompiler)
        .print(NoPrint)
        .build()
}

/// A class body function whose script is `f`.
pub fn class_body(name: &str, f: impl Fn(&Runtime, &Frame<'_>) -> RunResult<Option<Value>> + 'static) -> Value {
    let body: Body = Rc::new(f);
    let code = Code::class_body(name, "<test>", Rc::new(body));
    Value::Function(Rc::new(Function::new(name, Dict::new(), Rc::new(code), Vec::new())))
}

/// A plain function with the given parameters whose script is `f`.
pub fn function(
    name: &str,
    params: &[&str],
    f: impl Fn(&Runtime, &Frame<'_>) -> RunResult<Option<Value>> + 'static,
) -> Value {
    let body: Body = Rc::new(f);
    let params = params.iter().map(|p| Rc::from(*p)).collect();
    let code = Code::new(name, "<test>", params, Rc::new(body));
    Value::Function(Rc::new(Function::new(name, Dict::new(), Rc::new(code), Vec::new())))
}

/// A function returning a constant, ignoring its arguments beyond `params`.
pub fn returning(name: &str, params: &[&str], value: Value) -> Value {
    function(name, params, move |_, _| Ok(Some(value.clone())))
}

/// `type(name, bases, namespace)`.
pub fn make_class(rt: &Runtime, name: &str, bases: Vec<Value>, namespace: Dict) -> Value {
    rt.call_builtin(
        "type",
        ArgValues::positional(vec![Value::from(name), Value::from(bases), Value::Dict(namespace)]),
    )
    .unwrap()
}

/// Instantiates a class with no arguments.
pub fn instance(rt: &Runtime, class: &Value) -> Value {
    rt.call(class, ArgValues::default()).unwrap()
}

/// Message of an exception error, e.g. `"TypeError: ..."`.
pub fn err_text<T: std::fmt::Debug>(result: RunResult<T>) -> String {
    result.unwrap_err().to_string()
}
