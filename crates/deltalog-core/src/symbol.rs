//! Ground terms exchanged with the grounding engine and delta functions.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A ground (variable-free) term.
///
/// Symbols are the currency of the delta-term boundary: parameters and
/// signatures of delta calls, drawn outcomes, and the atoms of stable models
/// are all symbols. The total order is used wherever deterministic reporting
/// is required.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Integer constant.
    Number(i64),
    /// Quoted string constant.
    Text(String),
    /// Function term; a zero-arity function is a plain constant and a
    /// function with an empty name is a tuple.
    Function {
        /// Function name, empty for tuples.
        name: String,
        /// Ordered argument terms.
        args: Vec<Symbol>,
    },
}

impl Symbol {
    /// Creates an integer symbol.
    pub fn number(value: i64) -> Self {
        Symbol::Number(value)
    }

    /// Creates a string symbol.
    pub fn text(value: impl Into<String>) -> Self {
        Symbol::Text(value.into())
    }

    /// Creates a named constant (zero-arity function).
    pub fn constant(name: impl Into<String>) -> Self {
        Symbol::Function {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Creates a named function term.
    pub fn function(name: impl Into<String>, args: Vec<Symbol>) -> Self {
        Symbol::Function {
            name: name.into(),
            args,
        }
    }

    /// Creates an anonymous tuple.
    pub fn tuple(args: Vec<Symbol>) -> Self {
        Symbol::Function {
            name: String::new(),
            args,
        }
    }

    /// Returns the integer value if this symbol is a number.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Symbol::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Number(value) => write!(f, "{value}"),
            Symbol::Text(value) => write!(f, "\"{value}\""),
            Symbol::Function { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() || name.is_empty() {
                    write!(f, "(")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}
