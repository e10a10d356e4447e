//! The `**` operator

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::JsValue;

use super::arg;

/// exponentiationOperator(base, exponent)
pub fn exponentiation_operator(
    rt: &mut Runtime,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let base = rt.to_number(&arg(args, 0))?;
    let exponent = rt.to_number(&arg(args, 1))?;
    Ok(JsValue::Number(exponentiate(base, exponent)))
}

/// Number::exponentiate
///
/// Differs from IEEE `pow` in two places: a NaN exponent always yields NaN
/// (`pow(1, NaN)` is 1), and so does `(±1) ** ±Infinity`.
pub fn exponentiate(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() {
        return f64::NAN;
    }
    if exponent == 0.0 {
        return 1.0;
    }
    if base.abs() == 1.0 && exponent.is_infinite() {
        return f64::NAN;
    }
    libm::pow(base, exponent)
}
