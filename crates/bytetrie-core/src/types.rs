//! Canonical core types used across the bytetrie workspace.
//!
//! These live in `bytetrie-core` and are re-exported at the crate root so
//! other crates can import via `bytetrie_core::Symbol`, `bytetrie_core::NodeId`, etc.
//!
//! Serialized forms stay conservative and portable (serde): a byte symbol is
//! a bare integer and the wildcard is the string `"*"`, both as values and as
//! map keys.

use crate::error::Error;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Payload attached to an accepting node.
///
/// Compared and hashed by value. Blanket-implemented for every type with the
/// required bounds, so callers never implement it by hand.
pub trait AcceptInfo: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> AcceptInfo for T {}

/// One transition label: a concrete byte, or "any single byte".
///
/// Ordering puts every byte (ascending) before `Wildcard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A concrete byte value.
    Byte(u8),
    /// Any single byte. Exclusive with all byte transitions on the same node.
    Wildcard,
}

impl Symbol {
    /// Text form of the wildcard, used in encodings and on the command line.
    pub const WILDCARD_TEXT: &'static str = "*";

    /// Returns `true` for [`Symbol::Wildcard`].
    #[inline]
    #[must_use]
    pub const fn is_wildcard(self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// The concrete byte, if any.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(b),
            Self::Wildcard => None,
        }
    }
}

impl From<u8> for Symbol {
    #[inline]
    fn from(b: u8) -> Self {
        Self::Byte(b)
    }
}

impl TryFrom<i64> for Symbol {
    type Error = Error;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u8::try_from(v)
            .map(Self::Byte)
            .map_err(|_| Error::InvalidSymbol(v.to_string()))
    }
}

impl FromStr for Symbol {
    type Err = Error;

    /// Accepts `*`, a decimal byte, or a `0x`-prefixed hex byte.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t == Self::WILDCARD_TEXT {
            return Ok(Self::Wildcard);
        }
        let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => t.parse::<i64>(),
        };
        match parsed {
            Ok(v) => Self::try_from(v),
            Err(_) => Err(Error::InvalidSymbol(s.to_owned())),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(b) => write!(f, "{b:#04x}"),
            Self::Wildcard => f.write_str(Self::WILDCARD_TEXT),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Byte(b) => serializer.serialize_u8(*b),
            Self::Wildcard => serializer.serialize_str(Self::WILDCARD_TEXT),
        }
    }
}

struct SymbolVisitor;

impl Visitor<'_> for SymbolVisitor {
    type Value = Symbol;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a byte in [0,255] or \"*\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Symbol, E> {
        u8::try_from(v)
            .map(Symbol::Byte)
            .map_err(|_| E::custom(Error::InvalidSymbol(v.to_string())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Symbol, E> {
        Symbol::try_from(v).map_err(E::custom)
    }

    // JSON object keys always arrive as strings.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Symbol, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SymbolVisitor)
    }
}

/// Index of a node inside the arena of its owning `NodeCache`.
///
/// Ids are only meaningful for the cache that issued them, so they have no
/// serialized form; persisted tries use [`TrieDict`](crate::TrieDict) keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Render a symbol path as `[0x00 0x01 *]` for messages.
#[must_use]
pub fn format_path(path: &[Symbol]) -> String {
    let parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(" "))
}

/// Convert a slice of raw integers into symbols, rejecting out-of-range values.
pub fn symbols_from_ints(values: &[i64]) -> crate::Result<Vec<Symbol>> {
    values.iter().map(|&v| Symbol::try_from(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_order_puts_wildcard_last() {
        assert!(Symbol::Byte(0) < Symbol::Byte(255));
        assert!(Symbol::Byte(255) < Symbol::Wildcard);
    }

    #[test]
    fn symbol_parse_forms() {
        assert_eq!("*".parse::<Symbol>().unwrap(), Symbol::Wildcard);
        assert_eq!("17".parse::<Symbol>().unwrap(), Symbol::Byte(17));
        assert_eq!("0x0f".parse::<Symbol>().unwrap(), Symbol::Byte(15));
        assert!(matches!(
            "256".parse::<Symbol>(),
            Err(Error::InvalidSymbol(_))
        ));
        assert!(matches!("-1".parse::<Symbol>(), Err(Error::InvalidSymbol(_))));
        assert!(matches!("zz".parse::<Symbol>(), Err(Error::InvalidSymbol(_))));
    }

    #[test]
    fn symbol_from_ints_rejects_out_of_range() {
        assert_eq!(
            symbols_from_ints(&[0, 255]).unwrap(),
            vec![Symbol::Byte(0), Symbol::Byte(255)]
        );
        assert_eq!(
            symbols_from_ints(&[1, 300]),
            Err(Error::InvalidSymbol("300".into()))
        );
    }

    #[test]
    fn symbol_serde_json_values_and_keys() {
        let v = vec![Symbol::Byte(3), Symbol::Wildcard];
        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, r#"[3,"*"]"#);
        let back: Vec<Symbol> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);

        let mut m = std::collections::BTreeMap::new();
        m.insert(Symbol::Byte(7), 1u32);
        let s = serde_json::to_string(&m).unwrap();
        assert_eq!(s, r#"{"7":1}"#);
        let back: std::collections::BTreeMap<Symbol, u32> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, m);

        assert!(serde_json::from_str::<Symbol>("256").is_err());
    }

    #[test]
    fn path_formatting() {
        assert_eq!(
            format_path(&[Symbol::Byte(0), Symbol::Byte(0x1f), Symbol::Wildcard]),
            "[0x00 0x1f *]"
        );
    }
}
