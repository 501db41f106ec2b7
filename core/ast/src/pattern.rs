//! Destructuring patterns for `var` declarations and assignments.
//!
//! Formal parameters do not accept patterns in this engine; only declarations
//! and plain assignments do.

/// A destructuring pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// An array pattern, `[a, , b, ...rest]`.
    Array(ArrayPattern),
    /// An object pattern, `{a, b: c}`.
    Object(ObjectPattern),
}

/// A binding inside a pattern: either a plain name or a nested pattern.
#[derive(Debug, Clone)]
pub enum PatternBinding {
    /// Binds the matched value to a variable.
    Identifier(Box<str>),
    /// Destructures the matched value further.
    Pattern(Box<Pattern>),
}

/// An element of an array pattern.
#[derive(Debug, Clone)]
pub enum ArrayPatternElement {
    /// A skipped index, `[, a]`.
    Elision,
    /// A bound element.
    Binding(PatternBinding),
}

/// An array destructuring pattern.
#[derive(Debug, Clone)]
pub struct ArrayPattern {
    /// Elements matched by index.
    pub elements: Box<[ArrayPatternElement]>,
    /// Trailing rest element collecting the remaining items.
    pub rest: Option<PatternBinding>,
}

/// A single property of an object pattern.
#[derive(Debug, Clone)]
pub struct ObjectPatternProperty {
    /// The property name looked up on the source object.
    pub name: Box<str>,
    /// The binding the property value lands in.
    pub binding: PatternBinding,
}

/// An object destructuring pattern.
#[derive(Debug, Clone)]
pub struct ObjectPattern {
    /// The matched properties.
    pub properties: Box<[ObjectPatternProperty]>,
}

impl Pattern {
    /// Calls `f` once for every identifier bound by this pattern.
    pub fn for_each_bound_name<F>(&self, f: &mut F)
    where
        F: FnMut(&str),
    {
        match self {
            Self::Array(array) => {
                for element in &*array.elements {
                    if let ArrayPatternElement::Binding(binding) = element {
                        binding.for_each_bound_name(f);
                    }
                }
                if let Some(rest) = &array.rest {
                    rest.for_each_bound_name(f);
                }
            }
            Self::Object(object) => {
                for property in &*object.properties {
                    property.binding.for_each_bound_name(f);
                }
            }
        }
    }
}

impl PatternBinding {
    fn for_each_bound_name<F>(&self, f: &mut F)
    where
        F: FnMut(&str),
    {
        match self {
            Self::Identifier(name) => f(name),
            Self::Pattern(pattern) => pattern.for_each_bound_name(f),
        }
    }
}
