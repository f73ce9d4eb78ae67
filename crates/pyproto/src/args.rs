use crate::{
    exception::{ExcType, RunError, RunResult, SimpleException},
    types::Dict,
    value::Value,
};

/// Arguments of a single call: positional values plus optional keyword arguments.
///
/// The binder methods consume `self` and either return exactly the values a builtin
/// expects or a `TypeError` describing the mismatch. They never mutate the caller's
/// kwargs dict; an empty kwargs dict is treated as no kwargs at all.
#[derive(Debug, Clone, Default)]
pub struct ArgValues {
    args: Vec<Value>,
    kwargs: Option<Dict>,
}

impl ArgValues {
    #[must_use]
    pub fn new(args: Vec<Value>, kwargs: Option<Dict>) -> Self {
        Self {
            args,
            kwargs: kwargs.filter(|k| !k.is_empty()),
        }
    }

    #[must_use]
    pub fn positional(args: Vec<Value>) -> Self {
        Self { args, kwargs: None }
    }

    #[must_use]
    pub fn one(arg: Value) -> Self {
        Self::positional(vec![arg])
    }

    #[must_use]
    pub fn two(a: Value, b: Value) -> Self {
        Self::positional(vec![a, b])
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn count(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn kwargs(&self) -> Option<&Dict> {
        self.kwargs.as_ref()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Value>, Option<Dict>) {
        (self.args, self.kwargs)
    }

    /// Inserts `receiver` as the first positional argument, as a bound method call does.
    #[must_use]
    pub fn prepend(mut self, receiver: Value) -> Self {
        self.args.insert(0, receiver);
        self
    }

    /// Fails with `TypeError` if any keyword argument was passed.
    pub fn check_no_kwargs(&self, name: &str) -> RunResult<()> {
        match &self.kwargs {
            Some(_) => Err(ExcType::type_error_no_kwargs(name)),
            None => Ok(()),
        }
    }

    /// Checks that exactly one positional argument was passed, returning it.
    pub fn get_one_arg(self, name: &str) -> RunResult<Value> {
        let [a] = self.get_exact(name)?;
        Ok(a)
    }

    /// Checks that exactly two positional arguments were passed, returning them as a tuple.
    pub fn get_two_args(self, name: &str) -> RunResult<(Value, Value)> {
        let [a, b] = self.get_exact(name)?;
        Ok((a, b))
    }

    /// Checks that exactly three positional arguments were passed, returning them as a tuple.
    pub fn get_three_args(self, name: &str) -> RunResult<(Value, Value, Value)> {
        let [a, b, c] = self.get_exact(name)?;
        Ok((a, b, c))
    }

    /// Checks that one or two positional arguments were passed.
    ///
    /// The second element is `None` when the optional argument was omitted, which keeps
    /// "not given" distinct from an explicit Python `None`.
    pub fn get_one_two_args(self, name: &str) -> RunResult<(Value, Option<Value>)> {
        let [a, b] = self.get_range(name, 1)?;
        match a {
            Some(a) => Ok((a, b)),
            None => Err(RunError::internal("required argument missing after count check")),
        }
    }

    /// Checks that two or three positional arguments were passed.
    pub fn get_two_three_args(self, name: &str) -> RunResult<(Value, Value, Option<Value>)> {
        let [a, b, c] = self.get_range(name, 2)?;
        match (a, b) {
            (Some(a), Some(b)) => Ok((a, b, c)),
            _ => Err(RunError::internal("required argument missing after count check")),
        }
    }

    /// Unpacks between `min` and `N` positional arguments.
    ///
    /// Every slot starts out as the matching entry of `defaults`, so unsupplied trailing
    /// optionals come back as their declared default and all outputs are always set.
    /// Entries of `defaults` below `min` are placeholders and are always overwritten.
    pub fn unpack_tuple<const N: usize>(self, name: &str, min: usize, defaults: [Value; N]) -> RunResult<[Value; N]> {
        let supplied = self.get_range::<N>(name, min)?;
        let mut out = defaults;
        for (slot, value) in out.iter_mut().zip(supplied) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        Ok(out)
    }

    /// Binds positional-only arguments against a format descriptor such as `"i:chr"`.
    ///
    /// See [`ArgValues::parse_tuple_and_keywords`] for the descriptor language.
    pub fn parse_tuple<const N: usize>(self, format: &str, defaults: [Value; N]) -> RunResult<[Value; N]> {
        self.bind_format(format, None, defaults)
    }

    /// Binds positional and keyword arguments against a format descriptor.
    ///
    /// The descriptor lists one code per parameter, then `:` and the function name used in
    /// error messages:
    /// - `O`: any value
    /// - `s` / `U`: a `str`
    /// - `i`: an integer; `bool` is accepted and converted to `int`
    /// - `|`: the parameters after it are optional
    ///
    /// `kwlist` names the parameters for keyword binding. A parameter supplied both by
    /// position and by keyword, an unknown keyword, or a missing required parameter is a
    /// `TypeError`. Optional parameters that were not supplied take their `defaults` entry.
    ///
    /// # Example
    /// ```
    /// # use pyproto::{ArgValues, Dict, Value};
    /// let args = ArgValues::new(
    ///     vec![Value::from("1"), Value::from("<f>")],
    ///     Some(Dict::from_pairs([("mode", Value::from("eval"))])),
    /// );
    /// let [_, filename, mode, flags] = args
    ///     .parse_tuple_and_keywords(
    ///         "Oss|i:compile",
    ///         ["source", "filename", "mode", "flags"],
    ///         [Value::None, Value::None, Value::None, Value::Int(0)],
    ///     )
    ///     .unwrap();
    /// assert_eq!(filename, Value::from("<f>"));
    /// assert_eq!(mode, Value::from("eval"));
    /// assert_eq!(flags, Value::Int(0));
    /// ```
    pub fn parse_tuple_and_keywords<const N: usize>(
        self,
        format: &str,
        kwlist: [&str; N],
        defaults: [Value; N],
    ) -> RunResult<[Value; N]> {
        self.bind_format(format, Some(kwlist), defaults)
    }

    fn get_exact<const N: usize>(self, name: &str) -> RunResult<[Value; N]> {
        self.check_no_kwargs(name)?;
        <[Value; N]>::try_from(self.args).map_err(|args| ExcType::type_error_arg_count(name, N, args.len()))
    }

    fn get_range<const N: usize>(self, name: &str, min: usize) -> RunResult<[Option<Value>; N]> {
        self.check_no_kwargs(name)?;
        let count = self.args.len();
        if count < min || count > N {
            return Err(if min == N {
                ExcType::type_error_arg_count(name, N, count)
            } else if count < min {
                ExcType::type_error_at_least(name, min, count)
            } else {
                ExcType::type_error_at_most(name, N, count)
            });
        }
        let mut out: [Option<Value>; N] = std::array::from_fn(|_| None);
        for (slot, arg) in out.iter_mut().zip(self.args) {
            *slot = Some(arg);
        }
        Ok(out)
    }

    fn bind_format<const N: usize>(
        self,
        format: &str,
        kwlist: Option<[&str; N]>,
        defaults: [Value; N],
    ) -> RunResult<[Value; N]> {
        let spec = ArgFormat::parse(format)?;
        if spec.kinds.len() != N {
            return Err(RunError::internal(format!(
                "format {format:?} describes {} arguments, caller expects {N}",
                spec.kinds.len()
            )));
        }
        let name = spec.name;
        let count = self.args.len();
        if count > N {
            return Err(ExcType::type_error(format!(
                "{name}() takes at most {N} argument{} ({count} given)",
                if N == 1 { "" } else { "s" }
            )));
        }

        let mut slots: [Option<Value>; N] = std::array::from_fn(|_| None);
        for (i, arg) in self.args.into_iter().enumerate() {
            slots[i] = Some(spec.kinds[i].convert(arg, name, &Param::Position(i + 1))?);
        }

        if let Some(kwargs) = self.kwargs {
            let Some(kwlist) = kwlist else {
                return Err(ExcType::type_error_no_kwargs(name));
            };
            for (key, value) in kwargs.items() {
                let Some(i) = kwlist.iter().position(|k| **k == *key) else {
                    return Err(ExcType::type_error_unexpected_keyword(name, &key));
                };
                if slots[i].is_some() {
                    return Err(ExcType::type_error_duplicate_arg(name, &key, i + 1));
                }
                slots[i] = Some(spec.kinds[i].convert(value, name, &Param::Keyword(&key))?);
            }
        }

        let mut out = defaults;
        for (i, (slot, value)) in out.iter_mut().zip(slots).enumerate() {
            match value {
                Some(value) => *slot = value,
                None if i < spec.required => {
                    return Err(match kwlist {
                        Some(kwlist) => ExcType::type_error_missing_arg(name, kwlist[i], i + 1),
                        None if spec.required == N => ExcType::type_error_arg_count(name, N, count),
                        None => ExcType::type_error_at_least(name, spec.required, count),
                    });
                }
                None => {}
            }
        }
        Ok(out)
    }
}

/// How a parameter was supplied, for error messages.
enum Param<'a> {
    Position(usize),
    Keyword(&'a str),
}

impl std::fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position(pos) => write!(f, "argument {pos}"),
            Self::Keyword(key) => write!(f, "argument '{key}'"),
        }
    }
}

/// Value kind accepted by one format descriptor code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    /// `O`
    Object,
    /// `s` or `U`
    Str,
    /// `i`
    Int,
}

impl ArgKind {
    fn convert(self, value: Value, name: &str, param: &Param<'_>) -> RunResult<Value> {
        match (self, value) {
            (Self::Object, value) => Ok(value),
            (Self::Str, value @ Value::Str(_)) => Ok(value),
            (Self::Str, other) => Err(ExcType::type_error(format!(
                "{name}() {param} must be str, not {}",
                other.py_type()
            ))),
            (Self::Int, Value::Bool(b)) => Ok(Value::Int(i64::from(b))),
            (Self::Int, value @ Value::Int(_)) => Ok(value),
            (Self::Int, Value::LongInt(_)) => Err(SimpleException::new_msg(
                ExcType::OverflowError,
                "Python int too large to convert to C long",
            )
            .into()),
            (Self::Int, other) => Err(ExcType::type_error_not_integer(other.py_type().name())),
        }
    }
}

/// A parsed format descriptor, e.g. `Oss|iii:compile`.
#[derive(Debug)]
struct ArgFormat<'a> {
    name: &'a str,
    kinds: Vec<ArgKind>,
    /// Number of leading parameters that must be supplied.
    required: usize,
}

impl<'a> ArgFormat<'a> {
    fn parse(format: &'a str) -> RunResult<Self> {
        let (codes, name) = format
            .split_once(':')
            .ok_or_else(|| RunError::internal(format!("format {format:?} has no function name")))?;
        let mut kinds = Vec::with_capacity(codes.len());
        let mut required = None;
        for code in codes.chars() {
            match code {
                'O' => kinds.push(ArgKind::Object),
                's' | 'U' => kinds.push(ArgKind::Str),
                'i' => kinds.push(ArgKind::Int),
                '|' if required.is_none() => required = Some(kinds.len()),
                _ => {
                    return Err(RunError::internal(format!(
                        "unsupported code {code:?} in format {format:?}"
                    )));
                }
            }
        }
        Ok(Self {
            name,
            required: required.unwrap_or(kinds.len()),
            kinds,
        })
    }
}
