//! Binding of call arguments to named parameters.

use crate::{Error, Unpack, Value};

/// Positional and keyword arguments of one builtin call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Appends a keyword argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// Positional arguments, in call order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments, in call order.
    #[must_use]
    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }
}

/// A named parameter and the slot its argument unpacks into.
pub struct Param<'a> {
    name: &'a str,
    optional: bool,
    target: &'a mut dyn Unpack,
}

impl<'a> Param<'a> {
    /// A parameter that must receive a value.
    pub fn required(name: &'a str, target: &'a mut dyn Unpack) -> Self {
        Self {
            name,
            optional: false,
            target,
        }
    }

    /// A parameter that may be omitted or passed `None`.
    pub fn optional(name: &'a str, target: &'a mut dyn Unpack) -> Self {
        Self {
            name,
            optional: true,
            target,
        }
    }

    /// Parameter name as seen by callers.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }
}

/// Binds `args` to `params`: positional arguments first, in declaration
/// order, then keyword arguments by name.
///
/// Omitted optional parameters leave their targets untouched, and so does an
/// explicit `None` passed to an optional parameter.
///
/// # Errors
///
/// Fails on surplus positional arguments, unknown or repeated keywords,
/// missing required parameters, and any unpack failure (wrapped in
/// [`Error::Argument`]).
pub fn unpack_args(function: &str, args: &Arguments, params: &mut [Param<'_>]) -> Result<(), Error> {
    if args.positional.len() > params.len() {
        return Err(Error::TooManyArguments {
            function: function.to_owned(),
            got: args.positional.len(),
            max: params.len(),
        });
    }

    let mut seen = vec![false; params.len()];
    for ((param, slot), value) in params.iter_mut().zip(seen.iter_mut()).zip(&args.positional) {
        *slot = true;
        bind(function, param, value)?;
    }

    for (name, value) in &args.named {
        let Some(index) = params.iter().position(|param| param.name == name.as_str()) else {
            return Err(Error::UnexpectedKeyword {
                function: function.to_owned(),
                param: name.clone(),
            });
        };
        let (Some(param), Some(slot)) = (params.get_mut(index), seen.get_mut(index)) else {
            continue;
        };
        if *slot {
            return Err(Error::DuplicateArgument {
                function: function.to_owned(),
                param: name.clone(),
            });
        }
        *slot = true;
        bind(function, param, value)?;
    }

    for (param, slot) in params.iter().zip(&seen) {
        if !param.optional && !*slot {
            return Err(Error::MissingArgument {
                function: function.to_owned(),
                param: param.name.to_owned(),
            });
        }
    }
    Ok(())
}

fn bind(function: &str, param: &mut Param<'_>, value: &Value) -> Result<(), Error> {
    if param.optional && value.is_none() {
        return Ok(());
    }
    param.target.unpack(value).map_err(|err| Error::Argument {
        function: function.to_owned(),
        param: param.name.to_owned(),
        source: Box::new(err),
    })
}
