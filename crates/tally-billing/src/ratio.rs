use serde::{Deserialize, Serialize};

/// An exact rational number, reduced to lowest terms.
///
/// The denominator is always positive; zero is represented as `0/1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    numer: i128,
    denom: i128,
}

impl Ratio {
    /// Build a reduced ratio. A zero denominator yields zero.
    pub fn new(numer: i128, denom: i128) -> Self {
        if denom == 0 || numer == 0 {
            return Self { numer: 0, denom: 1 };
        }
        let sign = if (numer < 0) != (denom < 0) { -1 } else { 1 };
        let n = numer.unsigned_abs();
        let d = denom.unsigned_abs();
        let g = gcd(n, d);
        Self {
            numer: sign * (n / g) as i128,
            denom: (d / g) as i128,
        }
    }

    pub fn zero() -> Self {
        Self { numer: 0, denom: 1 }
    }

    pub fn from_integer(value: i128) -> Self {
        Self {
            numer: value,
            denom: 1,
        }
    }

    pub fn numer(&self) -> i128 {
        self.numer
    }

    pub fn denom(&self) -> i128 {
        self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
