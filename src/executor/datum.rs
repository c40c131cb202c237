//! Datum type - runtime values flowing through operators

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use crate::catalog::DataType;
use crate::projection::Literal;

/// A single value in a row
#[derive(Debug, Clone, Default)]
pub enum Datum {
    /// NULL value
    #[default]
    Null,
    Bool(bool),
    /// Integer value (covers Int, BigInt)
    Int(i64),
    /// Floating point value
    Float(f64),
    String(String),
    Uuid(Uuid),
    /// Timestamp as unix milliseconds
    Timestamp(i64),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Numeric type tag for ordering values of different types
    fn type_tag(&self) -> u8 {
        match self {
            Datum::Null => 0,
            Datum::Bool(_) => 1,
            Datum::Int(_) | Datum::Float(_) => 2,
            Datum::String(_) => 4,
            Datum::Uuid(_) => 5,
            Datum::Timestamp(_) => 6,
        }
    }

    /// Runtime type of this datum, `None` for NULL
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Datum::Null => None,
            Datum::Bool(_) => Some(DataType::Boolean),
            Datum::Int(_) => Some(DataType::BigInt),
            Datum::Float(_) => Some(DataType::Double),
            Datum::String(_) => Some(DataType::Text),
            Datum::Uuid(_) => Some(DataType::Uuid),
            Datum::Timestamp(_) => Some(DataType::Timestamp),
        }
    }

    /// Convert to boolean, returns None if NULL or not boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to i64, returns None if NULL or not integral
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Datum::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64, returns None if NULL or not numeric
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Datum::Float(f) => Some(*f),
            Datum::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Datum::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Datum::Null,
            Literal::Boolean(b) => Datum::Bool(*b),
            Literal::Integer(i) => Datum::Int(*i),
            Literal::Float(f) => Datum::Float(*f),
            Literal::String(s) => Datum::String(s.clone()),
        }
    }

    /// SQL LIKE; NULL on either side yields NULL
    pub fn like(&self, pattern: &str) -> Datum {
        match self {
            Datum::String(s) => Datum::Bool(like_match(s, pattern)),
            Datum::Null => Datum::Null,
            other => Datum::Bool(like_match(&other.to_string(), pattern)),
        }
    }
}

/// SQL LIKE pattern matching
/// % matches any sequence of characters
/// _ matches any single character
fn like_match(s: &str, pattern: &str) -> bool {
    let s_chars: Vec<char> = s.chars().collect();
    let p_chars: Vec<char> = pattern.chars().collect();
    like_match_impl(&s_chars, &p_chars)
}

fn like_match_impl(s: &[char], p: &[char]) -> bool {
    match p.first() {
        None => s.is_empty(),
        Some('%') => (0..=s.len()).any(|i| like_match_impl(&s[i..], &p[1..])),
        Some('_') => !s.is_empty() && like_match_impl(&s[1..], &p[1..]),
        Some('\\') if p.len() > 1 => {
            !s.is_empty() && s[0] == p[1] && like_match_impl(&s[1..], &p[2..])
        }
        Some(c) => !s.is_empty() && s[0] == *c && like_match_impl(&s[1..], &p[1..]),
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Float(x) => write!(f, "{}", x),
            Datum::String(s) => f.write_str(s),
            Datum::Uuid(u) => write!(f, "{}", u),
            Datum::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // NULLs sort first (smallest)
            (Datum::Null, Datum::Null) => Ordering::Equal,
            (Datum::Null, _) => Ordering::Less,
            (_, Datum::Null) => Ordering::Greater,

            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Int(a), Datum::Int(b)) => a.cmp(b),
            (Datum::Float(a), Datum::Float(b)) => a.total_cmp(b),
            (Datum::String(a), Datum::String(b)) => a.cmp(b),
            (Datum::Uuid(a), Datum::Uuid(b)) => a.cmp(b),
            (Datum::Timestamp(a), Datum::Timestamp(b)) => a.cmp(b),

            // Cross-type numeric comparisons
            (Datum::Int(a), Datum::Float(b)) => (*a as f64).total_cmp(b),
            (Datum::Float(a), Datum::Int(b)) => a.total_cmp(&(*b as f64)),

            _ => self.type_tag().cmp(&other.type_tag()),
        }
    }
}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_tag().hash(state);
        match self {
            Datum::Null => {}
            Datum::Bool(b) => b.hash(state),
            // Int and Float compare equal across types; hash both as f64 bits
            Datum::Int(i) => (*i as f64).to_bits().hash(state),
            Datum::Float(f) => f.to_bits().hash(state),
            Datum::String(s) => s.hash(state),
            Datum::Uuid(u) => u.hash(state),
            Datum::Timestamp(t) => t.hash(state),
        }
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::String(v.to_string())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::String(v)
    }
}

impl From<Uuid> for Datum {
    fn from(v: Uuid) -> Self {
        Datum::Uuid(v)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(v: Option<T>) -> Self {
        v.map_or(Datum::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_datum_null() {
        let d = Datum::Null;
        assert!(d.is_null());
        assert!(d.data_type().is_none());
    }

    #[test]
    fn test_datum_conversions() {
        assert_eq!(Datum::Int(42).as_int(), Some(42));
        assert_eq!(Datum::Int(42).as_float(), Some(42.0));
        assert_eq!(Datum::Float(2.5).as_int(), None);
        assert_eq!(Datum::from("hello").as_str(), Some("hello"));
        assert_eq!(Datum::from(None::<&str>), Datum::Null);
    }

    #[test]
    fn test_datum_comparison() {
        assert!(Datum::Int(1) < Datum::Int(2));
        assert!(Datum::Null < Datum::Int(0));
        assert!(Datum::Null < Datum::from(""));
        assert_eq!(Datum::Int(1), Datum::Float(1.0));
        // Byte order: upper case before lower case
        assert!(Datum::from("Zebra") < Datum::from("apple"));
    }

    #[test]
    fn test_datum_hash_consistent_with_eq() {
        let mut set = HashSet::new();
        set.insert(Datum::Int(3));
        assert!(set.contains(&Datum::Float(3.0)));
        assert!(!set.contains(&Datum::Float(3.5)));
    }

    #[test]
    fn test_datum_like() {
        let s = Datum::from("hello world");
        assert_eq!(s.like("hello%"), Datum::Bool(true));
        assert_eq!(s.like("%world"), Datum::Bool(true));
        assert_eq!(s.like("h_llo%"), Datum::Bool(true));
        assert_eq!(s.like("world%"), Datum::Bool(false));
        assert_eq!(Datum::Null.like("%"), Datum::Null);
    }

    #[test]
    fn test_datum_from_literal() {
        assert!(Datum::from_literal(&Literal::Null).is_null());
        assert_eq!(Datum::from_literal(&Literal::Integer(42)), Datum::Int(42));
    }
}
