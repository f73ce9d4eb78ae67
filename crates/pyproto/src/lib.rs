#![doc = include_str!("../../../README.md")]

mod args;
mod builtins;
mod exception;
mod io;
mod protocol;
mod resource;
mod runtime;
pub mod tracer;
pub mod types;
mod value;

pub use crate::{
    args::ArgValues,
    builtins::{Builtins, BuiltinsFunctions, CompileMode, builtins_namespace, lookup_builtin},
    exception::{ExcType, RunError, RunResult, SimpleException},
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    resource::{DEFAULT_MAX_INT_BITS, DEFAULT_MAX_RECURSION_DEPTH, ResourceLimits},
    runtime::{Compiler, Executor, Importer, Runtime, RuntimeBuilder},
    tracer::{BuiltinTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::{
        BoundMethod, Cell, ClassObject, Code, Dict, Function, Instance, MAX_MRO_LENGTH, Module, NextResult, PyIter,
        Type, TypeRef,
    },
    value::Value,
};
