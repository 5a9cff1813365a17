///
/// probability calculation in log space
/// implements logaddexp
///
use approx::{AbsDiffEq, RelativeEq};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

///
/// log-space representation of `p = 0`.
///
#[inline]
pub fn log_zero() -> f64 {
    f64::NEG_INFINITY
}

///
/// `log(exp(a) + exp(b))` without overflow.
///
/// log-zero is the identity element: if either side is log-zero,
/// the other side is returned unchanged.
///
/// If `a >= b`:
///
/// ```text
/// log(exp(a) + exp(b))
///  = log(exp(a) (1 + exp(b-a)))
///  = a + log(1 + exp(b-a))
/// ```
#[inline]
pub fn add_log(a: f64, b: f64) -> f64 {
    let (x, y) = if a >= b { (a, b) } else { (b, a) };
    if y == f64::NEG_INFINITY {
        x
    } else if x == y {
        x + 2f64.ln()
    } else {
        x + (y - x).exp().ln_1p()
    }
}

///
/// Wrapper of f64 that represents probability `0 <= p <= 1` in log space
///
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, SerializeDisplay, DeserializeFromStr)]
pub struct Prob(f64);

///
/// short-hand of `Prob::from_prob`
///
pub fn p(p: f64) -> Prob {
    Prob::from_prob(p)
}

///
/// short-hand of `Prob::from_log_prob`
///
pub fn lp(lp: f64) -> Prob {
    Prob::from_log_prob(lp)
}

impl Prob {
    ///
    ///
    pub fn from_prob(value: f64) -> Prob {
        Prob(value.ln())
    }
    ///
    ///
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob(log_value)
    }
    ///
    /// Get the probability (in `[0, 1]`)
    pub fn to_value(self) -> f64 {
        self.0.exp()
    }
    ///
    /// Get the log probability
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    ///
    /// Is `p == 0` or not? (log p = -inf)
    ///
    pub fn is_zero(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }
    ///
    /// Is `p == 1`? (log p = 0)
    ///
    pub fn is_one(self) -> bool {
        self.0 == 0.0
    }
    ///
    /// prob=0.0
    ///
    pub fn zero() -> Prob {
        Prob(log_zero())
    }
    ///
    /// prob=1.0
    ///
    pub fn one() -> Prob {
        Prob(0.0)
    }
    ///
    /// abs diff of two log probs `= |log p_a - log p_b|`
    ///
    /// Two log-zeros are regarded as equal.
    ///
    pub fn log_diff(&self, other: Prob) -> f64 {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => 0.0,
            (true, false) | (false, true) => f64::INFINITY,
            (false, false) => (self.to_log_value() - other.to_log_value()).abs(),
        }
    }
}

/// p=0 (Prob(-inf)) as a default value
impl Default for Prob {
    fn default() -> Self {
        Prob::zero()
    }
}

///
/// Prob has multiplicative identity element
/// `num_traits::One`
///
impl num_traits::One for Prob {
    fn one() -> Self {
        Prob::one()
    }
}

///
/// Prob has additive identity element
/// `num_traits::Zero`
///
impl num_traits::Zero for Prob {
    fn zero() -> Self {
        Prob::zero()
    }
    fn is_zero(&self) -> bool {
        Prob::is_zero(*self)
    }
}

// display
impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({:.4})", self.0, self.to_value())
    }
}
impl FromStr for Prob {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let front = match s.split_once('(') {
            Some((front, _)) => front,
            None => s,
        };
        front.parse::<f64>().map(Prob)
    }
}

/// Addition of two probabilities `px + py` in log space
/// (see `add_log`)
impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Prob(add_log(self.0, other.0))
    }
}

/// Multiplication of two probabilities `px * py` in log space
///
/// ```text
/// log(px * py) = log(px) + log(py)
/// ```
///
/// `p * 0 = 0` holds because `-inf + x = -inf` for finite `x`.
impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Prob(self.0 + other.0)
    }
}

// assign
impl std::ops::AddAssign for Prob {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::MulAssign for Prob {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}
// sum/prod
impl std::iter::Sum for Prob {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::zero(), |a, b| a + b)
    }
}
impl<'a> std::iter::Sum<&'a Self> for Prob {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::zero(), |a, b| a + *b)
    }
}
impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * b)
    }
}
impl<'a> std::iter::Product<&'a Self> for Prob {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * *b)
    }
}

/// for approx `assert_abs_diff_eq`
impl AbsDiffEq for Prob {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.log_diff(*other) <= epsilon
    }
}

/// for approx `assert_relative_eq`
impl RelativeEq for Prob {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        if self.is_zero() || other.is_zero() {
            self.is_zero() && other.is_zero()
        } else {
            f64::relative_eq(&self.0, &other.0, epsilon, max_relative)
        }
    }
}

///
/// Single precision log probability
///
/// Storage form of `Prob` in the reduced-precision backward table.
/// Arithmetic is always done after widening back to `Prob`.
///
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ReducedProb(f32);

impl ReducedProb {
    pub fn zero() -> ReducedProb {
        ReducedProb(f32::NEG_INFINITY)
    }
    pub fn is_zero(self) -> bool {
        self.0 == f32::NEG_INFINITY
    }
}

impl Default for ReducedProb {
    fn default() -> Self {
        ReducedProb::zero()
    }
}

impl From<Prob> for ReducedProb {
    fn from(p: Prob) -> ReducedProb {
        ReducedProb(p.0 as f32)
    }
}

impl From<ReducedProb> for Prob {
    fn from(p: ReducedProb) -> Prob {
        Prob(p.0 as f64)
    }
}

impl std::fmt::Display for ReducedProb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", Prob::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use test_case::test_case;

    #[test]
    fn test_id() {
        let x = Prob::from_prob(0.3);
        let e = Prob::from_prob(0.0);
        assert_relative_eq!((x + e).0, x.0);
        assert_relative_eq!((e + x).0, x.0);
        assert_relative_eq!((x * e).0, e.0);
    }
    #[test_case(0.0 ; "zero")]
    #[test_case(-1.5 ; "negative")]
    #[test_case(3.25 ; "positive")]
    #[test_case(-700.0 ; "tiny")]
    fn add_log_zero_is_identity(x: f64) {
        assert_eq!(add_log(log_zero(), x), x);
        assert_eq!(add_log(x, log_zero()), x);
    }
    #[test]
    fn add_log_zero_zero() {
        assert_eq!(add_log(log_zero(), log_zero()), log_zero());
        assert!((Prob::zero() + Prob::zero()).is_zero());
    }
    #[test]
    fn add_log_no_overflow() {
        // exp(1000) overflows, but the log sum does not
        let s = add_log(1000.0, 1000.0);
        assert_abs_diff_eq!(s, 1000.0 + 2f64.ln(), epsilon = 1e-12);
        let s = add_log(1000.0, 0.0);
        assert_abs_diff_eq!(s, 1000.0, epsilon = 1e-12);
        let s = add_log(-1000.0, -1001.0);
        assert_abs_diff_eq!(s, -1000.0 + (-1f64).exp().ln_1p(), epsilon = 1e-12);
    }
    #[test]
    fn add_log_commutative_associative() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for _ in 0..100 {
            let a: f64 = rng.gen_range(-50.0..5.0);
            let b: f64 = rng.gen_range(-50.0..5.0);
            let c: f64 = rng.gen_range(-50.0..5.0);
            assert_eq!(add_log(a, b), add_log(b, a));
            assert_relative_eq!(
                add_log(add_log(a, b), c),
                add_log(a, add_log(b, c)),
                max_relative = 1e-12
            );
        }
    }
    #[test]
    fn add_log_fold_is_order_invariant() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut xs: Vec<f64> = (0..50).map(|_| rng.gen_range(-30.0..0.0)).collect();
        xs.push(log_zero());
        let s0 = xs.iter().fold(log_zero(), |acc, &x| add_log(acc, x));
        for _ in 0..10 {
            xs.shuffle(&mut rng);
            let s = xs.iter().fold(log_zero(), |acc, &x| add_log(acc, x));
            assert_relative_eq!(s, s0, max_relative = 1e-12);
        }
        // compare with the direct sum in probability space
        let direct: f64 = xs.iter().map(|x| x.exp()).sum();
        assert_relative_eq!(s0, direct.ln(), max_relative = 1e-10);
    }
    #[test]
    fn prob_add_mul() {
        assert_eq!(p(0.0) + p(1.0), p(1.0));
        assert_eq!(p(0.0) * p(1.0), p(0.0));
        assert_abs_diff_eq!((p(0.3) + p(0.3)).0, p(0.6).0);
        assert_abs_diff_eq!((p(0.3) * p(0.3)).0, p(0.09).0);
        assert_abs_diff_eq!((p(0.5) + p(0.00001)).0, p(0.50001).0);
        assert_abs_diff_eq!((p(0.5) * p(0.00001)).0, p(0.000005).0);
    }
    #[test]
    fn prob_sum_prod() {
        // sum/prod of zero element vec
        let xs: Vec<Prob> = vec![];
        let sum: Prob = xs.iter().sum();
        let product: Prob = xs.iter().product();
        assert_eq!(sum, p(0.0));
        assert_eq!(product, p(1.0));

        // sum/prod of vec of p=0
        let xs: Vec<Prob> = vec![p(0.0), p(0.0)];
        let sum: Prob = xs.iter().sum();
        let product: Prob = xs.iter().product();
        assert_eq!(sum, p(0.0));
        assert_eq!(product, p(0.0));

        let xs = vec![p(0.1), p(0.1), p(0.1)];
        let sum: Prob = xs.iter().sum();
        assert_relative_eq!(sum.to_value(), 0.3, max_relative = 1e-12);
    }
    #[test]
    fn test_prob_assign() {
        let mut x = p(0.4);
        let y = p(0.2);
        x += y;
        assert_abs_diff_eq!(x, p(0.6), epsilon = 1e-12);
        let z = p(0.5);
        x *= z;
        assert_abs_diff_eq!(x, p(0.3), epsilon = 1e-12);
        let z = p(0.0);
        x += z;
        assert_abs_diff_eq!(x, p(0.3), epsilon = 1e-12);
        x *= z;
        assert!(x.is_zero());
    }
    #[test]
    fn prob_zero_one() {
        assert_eq!(Prob::one(), Prob::from_prob(1.0));
        assert_eq!(Prob::zero(), Prob::from_prob(0.0));
        assert!(Prob::zero().is_zero());
        assert!(!Prob::from_prob(0.00001).is_zero());
        assert!(abs_diff_eq!(Prob::zero(), Prob::zero()));
        assert!(relative_eq!(Prob::zero(), Prob::zero()));
        assert!(!relative_eq!(Prob::zero(), p(0.1)));
    }
    #[test]
    fn prob_diff() {
        let p1 = Prob::one();
        let p05 = Prob::from_prob(0.5);
        let p0 = Prob::zero();
        assert_eq!(0.0, p1.log_diff(p1));
        assert_eq!(0.0, p05.log_diff(p05));
        assert_eq!(0.0, p0.log_diff(p0));
        assert_eq!(f64::INFINITY, p0.log_diff(p1));
        assert_eq!(f64::INFINITY, p1.log_diff(p0));
    }
    #[test]
    fn prob_serialize() {
        let p1 = Prob::one();
        let p05 = Prob::from_prob(0.5);
        let p0 = Prob::zero();
        assert_eq!(Prob::from_str(&p1.to_string()).unwrap(), p1);
        assert_eq!(Prob::from_str(&p05.to_string()).unwrap(), p05);
        assert_eq!(Prob::from_str(&p0.to_string()).unwrap(), p0);
        assert_eq!(Prob::from_str("-0.5").unwrap(), lp(-0.5));

        let f = |p: Prob| -> Prob {
            let json = serde_json::to_string(&p).unwrap();
            serde_json::from_str(&json).unwrap()
        };
        assert_eq!(p1, f(p1));
        assert_eq!(p05, f(p05));
        assert_eq!(p0, f(p0));
    }
    #[test]
    fn reduced_prob_roundtrip() {
        assert!(Prob::from(ReducedProb::from(Prob::zero())).is_zero());
        assert!(ReducedProb::from(Prob::zero()).is_zero());
        assert_eq!(Prob::from(ReducedProb::from(Prob::one())), Prob::one());
        let x = p(0.123);
        let y = Prob::from(ReducedProb::from(x));
        assert_abs_diff_eq!(x, y, epsilon = 1e-6);
    }
}
