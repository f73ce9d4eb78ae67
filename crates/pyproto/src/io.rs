use std::{
    borrow::Cow,
    cell::RefCell,
    io::{self, Write as _},
    rc::Rc,
};

use crate::exception::{ExcType, RunResult, SimpleException};

/// Trait for handling output from the `print()` builtin function.
///
/// Implement this trait to capture or redirect print output.
/// The default implementation `StdPrint` writes to stdout.
pub trait PrintWriter: std::fmt::Debug {
    /// Called once per `print()` call with the complete text, separators and terminator included.
    ///
    /// # Arguments
    /// * `output` - The formatted output, e.g. `"1 2\n"` for `print(1, 2)`.
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()>;

    /// Called for `print(..., flush=True)` after the output was written.
    fn flush(&mut self) -> RunResult<()> {
        Ok(())
    }
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()> {
        io::stdout().lock().write_all(output.as_bytes()).map_err(os_error)
    }

    fn flush(&mut self) -> RunResult<()> {
        io::stdout().lock().flush().map_err(os_error)
    }
}

fn os_error(err: io::Error) -> crate::RunError {
    SimpleException::new_msg(ExcType::OSError, err).into()
}

/// A `PrintWriter` that collects all output into a string.
///
/// Clones share one buffer: keep a clone to read what was printed after handing the
/// writer to a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Default)]
pub struct CollectStringPrint(Rc<RefCell<String>>);

impl CollectStringPrint {
    /// Creates a new empty `CollectStringPrint`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected output.
    #[must_use]
    pub fn output(&self) -> String {
        self.0.borrow().clone()
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) -> RunResult<()> {
        self.0.borrow_mut().push_str(&output);
        Ok(())
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) -> RunResult<()> {
        Ok(())
    }
}
