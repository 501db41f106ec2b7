//! Strict and abstract equality.

use super::{conversions::PreferredType, JsValue};
use crate::{error::JsNativeError, Context, JsResult};

impl JsValue {
    /// Strict equality (`===`): tags first, then content.
    #[must_use]
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Undefined | Self::Invalid, Self::Undefined | Self::Invalid) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            // IEEE-754 equality: NaN != NaN, -0 == +0.
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::External(a), Self::External(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Abstract equality (`==`) with the standard coercion ladder. Any
    /// comparison that would coerce a symbol throws.
    pub fn equals(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        match (self, other) {
            // Same type: strict semantics.
            (Self::Null | Self::Undefined, Self::Null | Self::Undefined) => Ok(true),
            (Self::Boolean(_), Self::Boolean(_))
            | (Self::Number(_), Self::Number(_))
            | (Self::String(_), Self::String(_))
            | (Self::Symbol(_), Self::Symbol(_))
            | (Self::Object(_), Self::Object(_)) => Ok(self.strict_equals(other)),

            (Self::Number(_), Self::String(_)) => {
                let rhs = other.to_number(context)?;
                Ok(self.strict_equals(&Self::Number(rhs)))
            }
            (Self::String(_), Self::Number(_)) => {
                let lhs = self.to_number(context)?;
                Ok(Self::Number(lhs).strict_equals(other))
            }
            (Self::Boolean(_), _) => {
                let lhs = self.to_number(context)?;
                Self::Number(lhs).equals(other, context)
            }
            (_, Self::Boolean(_)) => {
                let rhs = other.to_number(context)?;
                self.equals(&Self::Number(rhs), context)
            }
            (Self::Symbol(_), Self::Number(_) | Self::String(_))
            | (Self::Number(_) | Self::String(_), Self::Symbol(_)) => Err(JsNativeError::typ()
                .with_message("Cannot convert a Symbol value to a number")
                .into()),
            (Self::Object(_) | Self::External(_), Self::Number(_) | Self::String(_) | Self::Symbol(_)) => {
                let lhs = self.to_primitive(PreferredType::Default, context)?;
                lhs.equals(other, context)
            }
            (Self::Number(_) | Self::String(_) | Self::Symbol(_), Self::Object(_) | Self::External(_)) => {
                let rhs = other.to_primitive(PreferredType::Default, context)?;
                self.equals(&rhs, context)
            }
            _ => Ok(false),
        }
    }
}

/// `SameValue`: like strict equality, but `NaN` equals `NaN` and the zero
/// signs are distinguished.
#[must_use]
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => {
            if x.is_nan() && y.is_nan() {
                return true;
            }
            x == y && x.is_sign_negative() == y.is_sign_negative()
        }
        _ => a.strict_equals(b),
    }
}

/// `SameValueZero`: `SameValue` except that the zeros collapse.
#[must_use]
pub fn same_value_zero(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => a.strict_equals(b),
    }
}
