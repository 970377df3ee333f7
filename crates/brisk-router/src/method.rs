//! HTTP method enum and a dense per-method map.
//!
//! `Method::All` is not a verb: a route registered under it is the fallback
//! for any verb that has no route of its own at the same node.

use crate::RouteError;
use std::fmt;
use std::str::FromStr;

/// HTTP Method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Method {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
    Head = 5,
    Options = 6,
    Connect = 7,
    Trace = 8,
    /// Fallback marker matched when no exact-verb route exists
    All = 9,
}

impl Method {
    /// Number of variants, including `All`
    pub const COUNT: usize = 10;

    /// Every variant in discriminant order
    pub const VARIANTS: [Method; Self::COUNT] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
        Method::Connect,
        Method::Trace,
        Method::All,
    ];

    /// Parse method from bytes - optimized with early first-byte dispatch
    #[inline(always)]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes.first()? {
            b'G' if bytes == b"GET" => Some(Method::Get),
            b'P' => match bytes {
                b"POST" => Some(Method::Post),
                b"PUT" => Some(Method::Put),
                b"PATCH" => Some(Method::Patch),
                _ => None,
            },
            b'D' if bytes == b"DELETE" => Some(Method::Delete),
            b'H' if bytes == b"HEAD" => Some(Method::Head),
            b'O' if bytes == b"OPTIONS" => Some(Method::Options),
            b'C' if bytes == b"CONNECT" => Some(Method::Connect),
            b'T' if bytes == b"TRACE" => Some(Method::Trace),
            b'A' if bytes == b"ALL" => Some(Method::All),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
            Method::All => "ALL",
        }
    }

    /// Convert from u8 code
    pub fn from_u8(code: u8) -> Option<Self> {
        Self::VARIANTS.get(code as usize).copied()
    }

    /// Dense index used by [`MethodMap`]
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Method {
    type Err = RouteError;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RouteError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size map keyed by [`Method`].
///
/// One slot per variant, so lookups are an array index and the map never
/// allocates after construction.
#[derive(Debug, Clone)]
pub struct MethodMap<T> {
    slots: [Option<T>; Method::COUNT],
}

impl<T> Default for MethodMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> MethodMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, method: Method) -> Option<&T> {
        self.slots[method.index()].as_ref()
    }

    /// Exact verb first, then the `All` fallback.
    #[inline]
    pub fn resolve(&self, method: Method) -> Option<&T> {
        self.get(method).or_else(|| self.get(Method::All))
    }

    /// Store a value, returning the one it replaced.
    pub fn insert(&mut self, method: Method, value: T) -> Option<T> {
        self.slots[method.index()].replace(value)
    }

    pub fn remove(&mut self, method: Method) -> Option<T> {
        self.slots[method.index()].take()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Method, &T)> + '_ {
        Method::VARIANTS
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(m, slot)| slot.as_ref().map(|v| (*m, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_bytes() {
        assert_eq!(Method::parse(b"GET"), Some(Method::Get));
        assert_eq!(Method::parse(b"POST"), Some(Method::Post));
        assert_eq!(Method::parse(b"PUT"), Some(Method::Put));
        assert_eq!(Method::parse(b"DELETE"), Some(Method::Delete));
        assert_eq!(Method::parse(b"PATCH"), Some(Method::Patch));
        assert_eq!(Method::parse(b"HEAD"), Some(Method::Head));
        assert_eq!(Method::parse(b"OPTIONS"), Some(Method::Options));
        assert_eq!(Method::parse(b"CONNECT"), Some(Method::Connect));
        assert_eq!(Method::parse(b"TRACE"), Some(Method::Trace));
        assert_eq!(Method::parse(b"ALL"), Some(Method::All));
        assert_eq!(Method::parse(b"INVALID"), None);
        assert_eq!(Method::parse(b""), None);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("All".parse::<Method>().unwrap(), Method::All);
        assert_eq!(
            "BREW".parse::<Method>(),
            Err(RouteError::InvalidMethod("BREW".to_string()))
        );
    }

    #[test]
    fn test_method_from_u8() {
        assert_eq!(Method::from_u8(0), Some(Method::Get));
        assert_eq!(Method::from_u8(9), Some(Method::All));
        assert_eq!(Method::from_u8(10), None);
        for m in Method::VARIANTS {
            assert_eq!(Method::from_u8(m as u8), Some(m));
        }
    }

    #[test]
    fn test_method_map_fallback() {
        let mut map = MethodMap::new();
        assert!(map.is_empty());
        map.insert(Method::All, "any");
        map.insert(Method::Get, "get");

        assert_eq!(map.resolve(Method::Get), Some(&"get"));
        assert_eq!(map.resolve(Method::Post), Some(&"any"));
        assert_eq!(map.get(Method::Post), None);
        assert_eq!(map.len(), 2);

        assert_eq!(map.insert(Method::Get, "get2"), Some("get"));
        assert_eq!(map.remove(Method::All), Some("any"));
        assert_eq!(map.resolve(Method::Post), None);

        let collected: Vec<_> = map.iter().collect();
        assert_eq!(collected, vec![(Method::Get, &"get2")]);

        map.clear();
        assert!(map.is_empty());
    }
}
