//! Scalar SQL functions recognised by the planner

use std::fmt;

/// Scalar function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFunction {
    /// First non-NULL argument
    Coalesce,
    /// NULL if both arguments are equal, else the first
    NullIf,
    Upper,
    Lower,
    /// String concatenation, NULL if any argument is NULL
    Concat,
    /// Character length
    Length,
    Abs,
    Trim,
}

/// Accepted argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "{}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

impl ScalarFunction {
    /// Look up a function by name (case-insensitive)
    pub fn lookup(name: &str) -> Option<Self> {
        let func = match name.to_ascii_lowercase().as_str() {
            "coalesce" => ScalarFunction::Coalesce,
            "nullif" => ScalarFunction::NullIf,
            "upper" => ScalarFunction::Upper,
            "lower" => ScalarFunction::Lower,
            "concat" => ScalarFunction::Concat,
            "length" | "len" => ScalarFunction::Length,
            "abs" => ScalarFunction::Abs,
            "trim" => ScalarFunction::Trim,
            _ => return None,
        };
        Some(func)
    }

    pub fn arity(&self) -> Arity {
        match self {
            ScalarFunction::Coalesce | ScalarFunction::Concat => Arity::AtLeast(1),
            ScalarFunction::NullIf => Arity::Exactly(2),
            ScalarFunction::Upper
            | ScalarFunction::Lower
            | ScalarFunction::Length
            | ScalarFunction::Abs
            | ScalarFunction::Trim => Arity::Exactly(1),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarFunction::Coalesce => "coalesce",
            ScalarFunction::NullIf => "nullif",
            ScalarFunction::Upper => "upper",
            ScalarFunction::Lower => "lower",
            ScalarFunction::Concat => "concat",
            ScalarFunction::Length => "length",
            ScalarFunction::Abs => "abs",
            ScalarFunction::Trim => "trim",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(ScalarFunction::lookup("COALESCE"), Some(ScalarFunction::Coalesce));
        assert_eq!(ScalarFunction::lookup("len"), Some(ScalarFunction::Length));
        assert_eq!(ScalarFunction::lookup("soundex"), None);
    }

    #[test]
    fn test_arity() {
        assert!(ScalarFunction::Coalesce.arity().accepts(3));
        assert!(!ScalarFunction::Coalesce.arity().accepts(0));
        assert!(!ScalarFunction::NullIf.arity().accepts(1));
        assert_eq!(ScalarFunction::Concat.arity().to_string(), "at least 1");
    }
}
