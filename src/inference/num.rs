use ordered_float::OrderedFloat;

use crate::ir::PrimitiveKind;
use crate::value::Value;

/// Numeric evidence for one population: integral vs fractional plus range.
#[derive(Clone, Debug, Default)]
pub struct NumC {
    pub min: Option<OrderedFloat<f64>>,
    pub max: Option<OrderedFloat<f64>>,
    pub saw_integral: bool,
    pub saw_fractional: bool,
}

impl NumC {
    pub fn observe(v: &Value) -> Option<Self> {
        let (f, integral) = match v {
            Value::Int(i) => (*i as f64, true),
            Value::Real(f) => (f.0, f.0.is_finite() && f.0.fract() == 0.0),
            _ => return None,
        };
        let f = OrderedFloat(f);
        Some(NumC {
            min: Some(f),
            max: Some(f),
            saw_integral: integral,
            saw_fractional: !integral,
        })
    }

    pub(super) fn join(a: &Self, b: &Self) -> Self {
        NumC {
            min: min_opt(a.min, b.min),
            max: max_opt(a.max, b.max),
            saw_integral: a.saw_integral || b.saw_integral,
            saw_fractional: a.saw_fractional || b.saw_fractional,
        }
    }

    /// Integer only when no fractional (or non-finite) number was seen.
    pub fn kind(&self) -> PrimitiveKind {
        if self.saw_fractional { PrimitiveKind::Real } else { PrimitiveKind::Integer }
    }
}

fn min_opt(a: Option<OrderedFloat<f64>>, b: Option<OrderedFloat<f64>>) -> Option<OrderedFloat<f64>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn max_opt(a: Option<OrderedFloat<f64>>, b: Option<OrderedFloat<f64>>) -> Option<OrderedFloat<f64>> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(values: &[Value]) -> NumC {
        values
            .iter()
            .filter_map(NumC::observe)
            .fold(NumC::default(), |acc, n| NumC::join(&acc, &n))
    }

    #[test]
    fn integral_reals_stay_integer() {
        let n = fold(&[Value::Int(1), Value::real(4.0)]);
        assert_eq!(n.kind(), PrimitiveKind::Integer);
        assert_eq!(n.min, Some(OrderedFloat(1.0)));
        assert_eq!(n.max, Some(OrderedFloat(4.0)));
    }

    #[test]
    fn one_fraction_makes_real() {
        let n = fold(&[Value::Int(1), Value::real(2.5), Value::Int(3)]);
        assert_eq!(n.kind(), PrimitiveKind::Real);
    }

    #[test]
    fn non_finite_is_real() {
        let n = fold(&[Value::real(f64::INFINITY)]);
        assert_eq!(n.kind(), PrimitiveKind::Real);
    }

    #[test]
    fn non_numbers_are_ignored() {
        assert!(NumC::observe(&Value::Str("1".into())).is_none());
    }
}
