//! Dependency values and same-value comparison
//!
//! Memoized hooks decide whether to reuse a cached value by comparing the
//! dependency list they received this pass against the one stored on the
//! previous pass. Comparison follows same-value semantics:
//!
//! - `NaN` equals `NaN`
//! - `+0.0` and `-0.0` are distinct
//! - objects compare by identity (pointer equality), never structurally
//!
//! ```rust
//! use blinc_hooks::deps;
//! use blinc_hooks::equality::are_hook_inputs_equal;
//!
//! let prev = deps![1, f64::NAN, "label"];
//! let next = deps![1, f64::NAN, "label"];
//! assert!(are_hook_inputs_equal(&next, Some(&prev[..])));
//! ```

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A dependency list. Inline storage covers the common short lists.
pub type Deps = SmallVec<[DepValue; 4]>;

/// A single value in a dependency list
#[derive(Clone)]
pub enum DepValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Compared by `Rc` pointer identity
    Object(Rc<dyn Any>),
}

impl DepValue {
    /// Wrap a shared object so it compares by identity
    pub fn object<T: 'static>(value: &Rc<T>) -> Self {
        DepValue::Object(value.clone() as Rc<dyn Any>)
    }
}

impl fmt::Debug for DepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepValue::Undefined => f.write_str("undefined"),
            DepValue::Null => f.write_str("null"),
            DepValue::Bool(b) => write!(f, "{b}"),
            DepValue::Int(i) => write!(f, "{i}"),
            DepValue::Float(x) => write!(f, "{x:?}"),
            DepValue::Str(s) => write!(f, "{s:?}"),
            DepValue::Object(o) => write!(f, "[object {:p}]", Rc::as_ptr(o) as *const ()),
        }
    }
}

impl PartialEq for DepValue {
    fn eq(&self, other: &Self) -> bool {
        same_value(self, other)
    }
}

macro_rules! dep_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DepValue {
                fn from(value: $ty) -> Self {
                    DepValue::Int(value as i64)
                }
            }
        )*
    };
}

dep_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

macro_rules! dep_from_wide_uint {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DepValue {
                /// Values past `i64::MAX` fall back to the float arm
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or(DepValue::Float(value as f64), DepValue::Int)
                }
            }
        )*
    };
}

dep_from_wide_uint!(u64, usize);

impl From<bool> for DepValue {
    fn from(value: bool) -> Self {
        DepValue::Bool(value)
    }
}

impl From<f32> for DepValue {
    fn from(value: f32) -> Self {
        DepValue::Float(value as f64)
    }
}

impl From<f64> for DepValue {
    fn from(value: f64) -> Self {
        DepValue::Float(value)
    }
}

impl From<&str> for DepValue {
    fn from(value: &str) -> Self {
        DepValue::Str(Rc::from(value))
    }
}

impl From<String> for DepValue {
    fn from(value: String) -> Self {
        DepValue::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for DepValue {
    fn from(value: Rc<str>) -> Self {
        DepValue::Str(value)
    }
}

impl<T: Into<DepValue>> From<Option<T>> for DepValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DepValue::Null, Into::into)
    }
}

/// Build a [`Deps`] list from values convertible into [`DepValue`]
#[macro_export]
macro_rules! deps {
    () => {
        $crate::equality::Deps::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut deps = $crate::equality::Deps::new();
        $(deps.push($crate::equality::DepValue::from($value));)+
        deps
    }};
}

/// Same-value equality between two dependency values
pub fn same_value(a: &DepValue, b: &DepValue) -> bool {
    match (a, b) {
        (DepValue::Undefined, DepValue::Undefined) | (DepValue::Null, DepValue::Null) => true,
        (DepValue::Bool(x), DepValue::Bool(y)) => x == y,
        (DepValue::Int(x), DepValue::Int(y)) => x == y,
        (DepValue::Float(x), DepValue::Float(y)) => same_value_f64(*x, *y),
        // Integers and floats are the same number space
        (DepValue::Int(i), DepValue::Float(x)) | (DepValue::Float(x), DepValue::Int(i)) => {
            int_equals_f64(*i, *x)
        }
        (DepValue::Str(x), DepValue::Str(y)) => x == y,
        (DepValue::Object(x), DepValue::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Exact comparison: `i as f64` would round above 2^53
fn int_equals_f64(i: i64, x: f64) -> bool {
    // 2^63, exactly representable
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if x.fract() != 0.0 || !(-LIMIT..LIMIT).contains(&x) {
        return false;
    }
    // integer zero is +0
    x as i64 == i && !(i == 0 && x.is_sign_negative())
}

fn same_value_f64(x: f64, y: f64) -> bool {
    if x.is_nan() && y.is_nan() {
        return true;
    }
    x == y && x.is_sign_negative() == y.is_sign_negative()
}

/// Result of comparing two dependency lists
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepsComparison {
    Equal,
    Changed,
    /// No previous list was stored for the slot
    MissingPrevious,
    /// The lists have different lengths
    LengthChanged { previous: usize, next: usize },
}

/// Compare `next` against `prev`, reporting why they differ
///
/// Only [`DepsComparison::Equal`] permits cache reuse.
pub fn compare_deps(next: &[DepValue], prev: Option<&[DepValue]>) -> DepsComparison {
    let Some(prev) = prev else {
        return DepsComparison::MissingPrevious;
    };

    if prev.len() != next.len() {
        return DepsComparison::LengthChanged {
            previous: prev.len(),
            next: next.len(),
        };
    }

    if prev.iter().zip(next).all(|(p, n)| same_value(n, p)) {
        DepsComparison::Equal
    } else {
        DepsComparison::Changed
    }
}

/// True when a memoized value may be reused
pub fn are_hook_inputs_equal(next: &[DepValue], prev: Option<&[DepValue]>) -> bool {
    compare_deps(next, prev) == DepsComparison::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_equals_nan() {
        assert!(same_value(&f64::NAN.into(), &f64::NAN.into()));
        assert_ne!(f64::NAN, f64::NAN);
    }

    #[test]
    fn test_signed_zero_distinct() {
        assert!(!same_value(&0.0f64.into(), &(-0.0f64).into()));
        assert!(same_value(&(-0.0f64).into(), &(-0.0f64).into()));
    }

    #[test]
    fn test_int_float_same_number() {
        assert!(same_value(&DepValue::Int(3), &DepValue::Float(3.0)));
        assert!(!same_value(&DepValue::Int(0), &DepValue::Float(-0.0)));
    }

    #[test]
    fn test_int_float_exact_above_2_pow_53() {
        let big = 9_007_199_254_740_993i64;

        assert!(!same_value(&DepValue::Int(big), &DepValue::Float(9_007_199_254_740_992.0)));
        assert!(same_value(&DepValue::Int(big - 1), &DepValue::Float(9_007_199_254_740_992.0)));
        assert!(!same_value(&DepValue::Int(i64::MAX), &DepValue::Float(9_223_372_036_854_775_808.0)));
        assert!(same_value(&DepValue::Int(i64::MIN), &DepValue::Float(-9_223_372_036_854_775_808.0)));
        assert!(!same_value(&DepValue::Int(1), &DepValue::Float(1.5)));
        assert!(!same_value(&DepValue::Int(0), &DepValue::Float(f64::NAN)));
        assert!(!same_value(&DepValue::Int(i64::MAX), &DepValue::Float(f64::INFINITY)));
    }

    #[test]
    fn test_wide_unsigned_conversions() {
        assert_eq!(DepValue::from(7usize), DepValue::Int(7));
        assert!(matches!(DepValue::from(u64::MAX), DepValue::Float(_)));
        assert!(are_hook_inputs_equal(&deps![3usize, 4u64], Some(&deps![3, 4][..])));
    }

    #[test]
    fn test_object_identity() {
        let a = Rc::new(vec![1, 2, 3]);
        let b = Rc::new(vec![1, 2, 3]);

        assert!(same_value(&DepValue::object(&a), &DepValue::object(&a)));
        assert!(!same_value(&DepValue::object(&a), &DepValue::object(&b)));
    }

    #[test]
    fn test_null_and_undefined_distinct() {
        assert!(!same_value(&DepValue::Null, &DepValue::Undefined));
        assert_eq!(DepValue::from(None::<i32>), DepValue::Null);
    }

    #[test]
    fn test_compare_equal_lists() {
        let prev = deps![1, "a", true, f64::NAN];
        let next = deps![1, "a", true, f64::NAN];
        assert_eq!(compare_deps(&next, Some(&prev[..])), DepsComparison::Equal);
    }

    #[test]
    fn test_compare_changed_element() {
        let prev = deps![1, 2];
        let next = deps![1, 3];
        assert_eq!(compare_deps(&next, Some(&prev[..])), DepsComparison::Changed);
    }

    #[test]
    fn test_compare_missing_previous() {
        let next = deps![1];
        assert_eq!(compare_deps(&next, None), DepsComparison::MissingPrevious);
        assert!(!are_hook_inputs_equal(&next, None));
    }

    #[test]
    fn test_compare_length_change() {
        let prev = deps![1, 2];
        let next = deps![1, 2, 3];
        assert_eq!(
            compare_deps(&next, Some(&prev[..])),
            DepsComparison::LengthChanged {
                previous: 2,
                next: 3
            }
        );
        assert!(!are_hook_inputs_equal(&next, Some(&prev[..])));
    }

    #[test]
    fn test_empty_lists_equal() {
        let prev = deps![];
        let next = deps![];
        assert!(are_hook_inputs_equal(&next, Some(&prev[..])));
    }
}
