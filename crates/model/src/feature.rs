use hseg_core::*;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Div;
use std::ops::Index;
use std::ops::Mul;
use std::ops::Sub;
use std::ops::SubAssign;

/// A per-pixel feature vector: color channels followed by normalized (x, y).
///
/// Also used as a cluster's running sum and mean, so it supports the
/// vector-space operations those accumulators need.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Feature([Cost; FEATURE_DIM]);

impl Feature {
    pub const fn zero() -> Self {
        Self([0.; FEATURE_DIM])
    }
    pub fn values(&self) -> &[Cost; FEATURE_DIM] {
        &self.0
    }
    pub fn dot(&self, other: &Self) -> Cost {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
    /// dot product against the leading FEATURE_DIM entries of a weight row
    pub fn project(&self, row: &[Cost]) -> Cost {
        debug_assert!(row.len() >= FEATURE_DIM);
        self.0.iter().zip(row.iter()).map(|(a, b)| a * b).sum()
    }
    pub fn norm2(&self) -> Cost {
        self.dot(self)
    }
    /// color channels only
    pub fn color(&self) -> &[Cost] {
        &self.0[..COLOR_DIM]
    }
    /// normalized (x, y) position
    pub fn position(&self) -> (Cost, Cost) {
        (self.0[COLOR_DIM], self.0[COLOR_DIM + 1])
    }
}

impl From<[Cost; FEATURE_DIM]> for Feature {
    fn from(values: [Cost; FEATURE_DIM]) -> Self {
        Self(values)
    }
}

impl Index<usize> for Feature {
    type Output = Cost;
    fn index(&self, i: usize) -> &Cost {
        &self.0[i]
    }
}

impl Add for Feature {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}
impl Sub for Feature {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}
impl Mul<Cost> for Feature {
    type Output = Self;
    fn mul(self, rhs: Cost) -> Self {
        Self(self.0.map(|x| x * rhs))
    }
}
impl Div<Cost> for Feature {
    type Output = Self;
    fn div(self, rhs: Cost) -> Self {
        Self(self.0.map(|x| x / rhs))
    }
}
impl AddAssign for Feature {
    fn add_assign(&mut self, rhs: Self) {
        self.0
            .iter_mut()
            .zip(rhs.0.iter())
            .for_each(|(a, b)| *a += b);
    }
}
impl SubAssign for Feature {
    fn sub_assign(&mut self, rhs: Self) {
        self.0
            .iter_mut()
            .zip(rhs.0.iter())
            .for_each(|(a, b)| *a -= b);
    }
}

impl std::iter::Sum for Feature {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Self::add)
    }
}

impl Arbitrary for Feature {
    fn random() -> Self {
        Self(std::array::from_fn(|_| rand::random::<Cost>()))
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", x)?;
        }
        write!(f, "]")
    }
}
