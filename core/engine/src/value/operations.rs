//! The binary and unary operator semantics of the vm.

use super::{
    conversions::{f64_to_uint32, PreferredType},
    JsValue,
};
use crate::{Context, JsResult};

impl JsValue {
    /// `+`: string concatenation when either primitive is a string,
    /// numeric addition otherwise.
    pub fn add(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_primitive(PreferredType::Default, context)?;
        let rhs = other.to_primitive(PreferredType::Default, context)?;
        if lhs.is_string() || rhs.is_string() {
            let lhs = lhs.to_string(context)?;
            let rhs = rhs.to_string(context)?;
            return Ok(Self::String(lhs.concat(&rhs)));
        }
        let lhs = lhs.to_number(context)?;
        let rhs = rhs.to_number(context)?;
        Ok(Self::Number(context.canonicalize_number(lhs + rhs)))
    }

    /// `-`
    pub fn sub(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_number(context)?;
        let rhs = other.to_number(context)?;
        Ok(Self::Number(context.canonicalize_number(lhs - rhs)))
    }

    /// `*`
    pub fn mul(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_number(context)?;
        let rhs = other.to_number(context)?;
        Ok(Self::Number(context.canonicalize_number(lhs * rhs)))
    }

    /// `/`
    pub fn div(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_number(context)?;
        let rhs = other.to_number(context)?;
        Ok(Self::Number(context.canonicalize_number(lhs / rhs)))
    }

    /// `%` with ECMAScript sign rules (the result takes the dividend's
    /// sign).
    pub fn rem(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_number(context)?;
        let rhs = other.to_number(context)?;
        Ok(Self::Number(context.canonicalize_number(lhs % rhs)))
    }

    /// `**`
    pub fn pow(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_number(context)?;
        let rhs = other.to_number(context)?;
        // IEEE-754 pow differs from ECMAScript for 1 ** Infinity and
        // friends: ECMAScript wants NaN there.
        let result = if rhs.is_infinite() && lhs.abs() == 1.0 {
            f64::NAN
        } else {
            lhs.powf(rhs)
        };
        Ok(Self::Number(context.canonicalize_number(result)))
    }

    /// `-a`
    pub fn neg(&self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::Number(-self.to_number(context)?))
    }

    /// `&`
    pub fn bitand(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_int32(context)?;
        let rhs = other.to_int32(context)?;
        Ok(Self::from(lhs & rhs))
    }

    /// `|`
    pub fn bitor(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_int32(context)?;
        let rhs = other.to_int32(context)?;
        Ok(Self::from(lhs | rhs))
    }

    /// `^`
    pub fn bitxor(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_int32(context)?;
        let rhs = other.to_int32(context)?;
        Ok(Self::from(lhs ^ rhs))
    }

    /// `~a`
    pub fn bitnot(&self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::from(!self.to_int32(context)?))
    }

    /// `<<`
    pub fn shl(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_int32(context)?;
        let rhs = other.to_uint32(context)?;
        Ok(Self::from(lhs.wrapping_shl(rhs)))
    }

    /// `>>`
    pub fn shr(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = self.to_int32(context)?;
        let rhs = other.to_uint32(context)?;
        Ok(Self::from(lhs.wrapping_shr(rhs)))
    }

    /// `>>>`
    pub fn ushr(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        let lhs = f64_to_uint32(self.to_number(context)?);
        let rhs = f64_to_uint32(other.to_number(context)?);
        Ok(Self::from(lhs.wrapping_shr(rhs % 32)))
    }

    /// `<`
    pub fn lt(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::Boolean(matches!(
            abstract_relational(self, other, true, context)?,
            Some(true)
        )))
    }

    /// `<=`
    pub fn le(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::Boolean(matches!(
            abstract_relational(other, self, false, context)?,
            Some(false)
        )))
    }

    /// `>`
    pub fn gt(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::Boolean(matches!(
            abstract_relational(other, self, false, context)?,
            Some(true)
        )))
    }

    /// `>=`
    pub fn ge(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(Self::Boolean(matches!(
            abstract_relational(self, other, true, context)?,
            Some(false)
        )))
    }
}

// The abstract relational comparison: `None` means "undefined" (a NaN was
// involved). Strings compare by code point, everything else numerically.
fn abstract_relational(
    lhs: &JsValue,
    rhs: &JsValue,
    left_first: bool,
    context: &mut Context,
) -> JsResult<Option<bool>> {
    let (px, py) = if left_first {
        let px = lhs.to_primitive(PreferredType::Number, context)?;
        let py = rhs.to_primitive(PreferredType::Number, context)?;
        (px, py)
    } else {
        let py = rhs.to_primitive(PreferredType::Number, context)?;
        let px = lhs.to_primitive(PreferredType::Number, context)?;
        (px, py)
    };
    if let (JsValue::String(x), JsValue::String(y)) = (&px, &py) {
        return Ok(Some(x < y));
    }
    let nx = px.to_number(context)?;
    let ny = py.to_number(context)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}
