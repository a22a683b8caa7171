//! HTTP method and capability-set types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The HTTP methods a plugin capability can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET requests.
    Get,
    /// POST requests.
    Post,
    /// PUT requests.
    Put,
    /// DELETE requests.
    Delete,
}

impl HttpMethod {
    /// All methods, in wire-reporting order.
    pub const ALL: [HttpMethod; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    /// Parse a method string, case-insensitively.
    ///
    /// Returns `None` for anything outside GET/POST/PUT/DELETE; callers
    /// fall back to the generic capability in that case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The uppercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Get => 1 << 0,
            Self::Post => 1 << 1,
            Self::Put => 1 << 2,
            Self::Delete => 1 << 3,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of HTTP methods a plugin unit overrides with a specific
/// capability.
///
/// An empty set means the unit only implements the generic handler; such a
/// unit reports all four methods as supported, since the generic handler
/// serves any of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet {
    bits: u8,
}

impl MethodSet {
    /// The empty set.
    pub const EMPTY: MethodSet = MethodSet { bits: 0 };

    /// Build a set from a slice of methods.
    pub fn from_methods(methods: &[HttpMethod]) -> Self {
        let mut set = Self::EMPTY;
        for m in methods {
            set = set.with(*m);
        }
        set
    }

    /// Returns a copy of the set with `method` added.
    #[must_use]
    pub fn with(self, method: HttpMethod) -> Self {
        Self {
            bits: self.bits | method.bit(),
        }
    }

    /// Whether `method` is in the set.
    pub fn contains(&self, method: HttpMethod) -> bool {
        self.bits & method.bit() != 0
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The methods in the set, in wire-reporting order.
    pub fn methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .iter()
            .copied()
            .filter(|m| self.contains(*m))
            .collect()
    }

    /// The methods a unit with these overrides supports: the overrides
    /// themselves, or all four when nothing is overridden.
    pub fn supported(&self) -> Vec<HttpMethod> {
        if self.is_empty() {
            HttpMethod::ALL.to_vec()
        } else {
            self.methods()
        }
    }
}
