//! The representation of a JavaScript symbol.

use crate::JsString;
use std::{
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

/// The fixed set of well-known symbols.
///
/// A well-known symbol has no description of its own; it is identified by
/// this discriminant and renders as `Symbol.<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    /// `Symbol.asyncIterator`
    AsyncIterator,
    /// `Symbol.hasInstance`
    HasInstance,
    /// `Symbol.isConcatSpreadable`
    IsConcatSpreadable,
    /// `Symbol.iterator`
    Iterator,
    /// `Symbol.match`
    Match,
    /// `Symbol.matchAll`
    MatchAll,
    /// `Symbol.replace`
    Replace,
    /// `Symbol.search`
    Search,
    /// `Symbol.species`
    Species,
    /// `Symbol.split`
    Split,
    /// `Symbol.toPrimitive`
    ToPrimitive,
    /// `Symbol.toStringTag`
    ToStringTag,
    /// `Symbol.unscopables`
    Unscopables,
}

impl WellKnownSymbol {
    /// All well-known symbols, in the order they hang off the `Symbol`
    /// constructor.
    pub const ALL: [Self; 13] = [
        Self::AsyncIterator,
        Self::HasInstance,
        Self::IsConcatSpreadable,
        Self::Iterator,
        Self::Match,
        Self::MatchAll,
        Self::Replace,
        Self::Search,
        Self::Species,
        Self::Split,
        Self::ToPrimitive,
        Self::ToStringTag,
        Self::Unscopables,
    ];

    /// A dense index for per-context caches.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::AsyncIterator => 0,
            Self::HasInstance => 1,
            Self::IsConcatSpreadable => 2,
            Self::Iterator => 3,
            Self::Match => 4,
            Self::MatchAll => 5,
            Self::Replace => 6,
            Self::Search => 7,
            Self::Species => 8,
            Self::Split => 9,
            Self::ToPrimitive => 10,
            Self::ToStringTag => 11,
            Self::Unscopables => 12,
        }
    }

    /// The property name on the `Symbol` constructor.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AsyncIterator => "asyncIterator",
            Self::HasInstance => "hasInstance",
            Self::IsConcatSpreadable => "isConcatSpreadable",
            Self::Iterator => "iterator",
            Self::Match => "match",
            Self::MatchAll => "matchAll",
            Self::Replace => "replace",
            Self::Search => "search",
            Self::Species => "species",
            Self::Split => "split",
            Self::ToPrimitive => "toPrimitive",
            Self::ToStringTag => "toStringTag",
            Self::Unscopables => "unscopables",
        }
    }

    /// The descriptive string, `Symbol.<name>`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AsyncIterator => "Symbol.asyncIterator",
            Self::HasInstance => "Symbol.hasInstance",
            Self::IsConcatSpreadable => "Symbol.isConcatSpreadable",
            Self::Iterator => "Symbol.iterator",
            Self::Match => "Symbol.match",
            Self::MatchAll => "Symbol.matchAll",
            Self::Replace => "Symbol.replace",
            Self::Search => "Symbol.search",
            Self::Species => "Symbol.species",
            Self::Split => "Symbol.split",
            Self::ToPrimitive => "Symbol.toPrimitive",
            Self::ToStringTag => "Symbol.toStringTag",
            Self::Unscopables => "Symbol.unscopables",
        }
    }
}

#[derive(Debug)]
struct Inner {
    description: Option<JsString>,
    well_known: Option<WellKnownSymbol>,
}

/// A JavaScript symbol, unique by identity.
#[derive(Debug, Clone)]
pub struct JsSymbol {
    inner: Rc<Inner>,
}

impl JsSymbol {
    /// Creates a new unique symbol with an optional description.
    #[must_use]
    pub fn new(description: Option<JsString>) -> Self {
        Self {
            inner: Rc::new(Inner {
                description,
                well_known: None,
            }),
        }
    }

    /// Creates one of the well-known symbols. Each call site must reuse the
    /// instance cached on the context; two calls produce distinct symbols.
    #[must_use]
    pub fn well_known(which: WellKnownSymbol) -> Self {
        Self {
            inner: Rc::new(Inner {
                description: None,
                well_known: Some(which),
            }),
        }
    }

    /// The description passed to `Symbol(…)`, if any.
    #[must_use]
    pub fn description(&self) -> Option<&JsString> {
        self.inner.description.as_ref()
    }

    /// The well-known discriminant, when this is a well-known symbol.
    #[must_use]
    pub fn as_well_known(&self) -> Option<WellKnownSymbol> {
        self.inner.well_known
    }

    /// The string produced by `String(sym)` and `sym.toString()`.
    #[must_use]
    pub fn descriptive_string(&self) -> JsString {
        if let Some(well_known) = self.inner.well_known {
            return JsString::from(format!("Symbol({})", well_known.description()));
        }
        match &self.inner.description {
            Some(description) => JsString::from(format!("Symbol({description})")),
            None => JsString::from("Symbol()"),
        }
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JsSymbol {}

impl Hash for JsSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptive_string())
    }
}
