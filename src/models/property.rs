use std::collections::BTreeMap;
use std::fmt;

use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::{ One, Pow };

use crate::errors::{ SweepError, SweepResult };

/// Weight pair for one predicate symbol: the factor contributed by each true
/// ground atom and by each false one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weight {
    pub positive: BigRational,
    pub negative: BigRational,
}

impl Weight {
    pub fn new(positive: impl Into<BigInt>, negative: impl Into<BigInt>) -> Self {
        Self {
            positive: BigRational::from_integer(positive.into()),
            negative: BigRational::from_integer(negative.into()),
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Symbol -> weight; symbols missing from the map count as unweighted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightMap {
    weights: BTreeMap<String, Weight>,
}

impl WeightMap {
    pub fn insert(&mut self, symbol: impl Into<String>, weight: Weight) {
        self.weights.insert(symbol.into(), weight);
    }

    /// Weight of `symbol`, `(1, 1)` when unlisted
    pub fn get(&self, symbol: &str) -> Weight {
        self.weights.get(symbol).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Weight)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Normalizer applied to the raw count, as a function of the scaled size
#[derive(Clone, Copy)]
pub enum Divisor {
    One,
    Constant(u64),
    /// `base^m`
    Power(u64),
    Function(fn(u64) -> BigInt),
}

impl Divisor {
    pub fn apply(&self, size: u64) -> BigInt {
        match self {
            Divisor::One => BigInt::one(),
            Divisor::Constant(k) => BigInt::from(*k),
            Divisor::Power(base) => Pow::pow(BigInt::from(*base), size),
            Divisor::Function(f) => f(size),
        }
    }
}

impl Default for Divisor {
    fn default() -> Self {
        Divisor::One
    }
}

impl fmt::Debug for Divisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Divisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divisor::One => write!(f, "1"),
            Divisor::Constant(k) => write!(f, "{}", k),
            Divisor::Power(base) => write!(f, "{}^m", base),
            Divisor::Function(_) => write!(f, "fn(m)"),
        }
    }
}

/// Cardinality constraint: `symbol` must have exactly `factor * m` true tuples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityConstraint {
    pub symbol: String,
    pub factor: u64,
}

/// Declarative description of one counting problem. Immutable once built.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    name: String,
    formula: String,
    cardinality_constraints: Vec<CardinalityConstraint>,
    weights: WeightMap,
    increment: u64,
    divisor: Divisor,
}

impl PropertySpec {
    pub fn builder(name: impl Into<String>, formula: impl AsRef<str>) -> PropertySpecBuilder {
        PropertySpecBuilder {
            name: name.into(),
            formula: formula
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect(),
            cardinality_constraints: Vec::new(),
            weights: WeightMap::default(),
            increment: 1,
            divisor: Divisor::One,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn cardinality_constraints(&self) -> &[CardinalityConstraint] {
        &self.cardinality_constraints
    }

    pub fn weights(&self) -> &WeightMap {
        &self.weights
    }

    pub fn increment(&self) -> u64 {
        self.increment
    }

    pub fn divisor(&self) -> Divisor {
        self.divisor
    }

    /// Oracle domain size for index `n`
    pub fn scaled_size(&self, n: u64) -> Option<u64> {
        n.checked_mul(self.increment)
    }

    /// Constraints with their targets scaled to `size`
    pub fn scaled_constraints(&self, size: u64) -> Option<Vec<(String, u64)>> {
        self.cardinality_constraints
            .iter()
            .map(|cc| cc.factor.checked_mul(size).map(|target| (cc.symbol.clone(), target)))
            .collect()
    }
}

pub struct PropertySpecBuilder {
    name: String,
    formula: String,
    cardinality_constraints: Vec<CardinalityConstraint>,
    weights: WeightMap,
    increment: u64,
    divisor: Divisor,
}

impl PropertySpecBuilder {
    pub fn cardinality(mut self, symbol: impl Into<String>, factor: u64) -> Self {
        self.cardinality_constraints.push(CardinalityConstraint { symbol: symbol.into(), factor });
        self
    }

    pub fn weight(
        mut self,
        symbol: impl Into<String>,
        positive: impl Into<BigInt>,
        negative: impl Into<BigInt>
    ) -> Self {
        self.weights.insert(symbol, Weight::new(positive, negative));
        self
    }

    pub fn rational_weight(
        mut self,
        symbol: impl Into<String>,
        positive: BigRational,
        negative: BigRational
    ) -> Self {
        self.weights.insert(symbol, Weight { positive, negative });
        self
    }

    pub fn increment(mut self, increment: u64) -> Self {
        self.increment = increment;
        self
    }

    pub fn divisor(mut self, divisor: Divisor) -> Self {
        self.divisor = divisor;
        self
    }

    pub fn build(self) -> SweepResult<PropertySpec> {
        if !is_valid_name(&self.name) {
            return Err(
                SweepError::InvalidProperty(
                    format!("name '{}' must be non-empty and use only [A-Za-z0-9_-]", self.name)
                )
            );
        }
        if self.formula.is_empty() {
            return Err(SweepError::InvalidProperty(format!("{}: empty formula", self.name)));
        }
        if self.increment == 0 {
            return Err(SweepError::InvalidProperty(format!("{}: increment must be positive", self.name)));
        }
        match self.divisor {
            Divisor::Constant(0) | Divisor::Power(0) => {
                return Err(
                    SweepError::InvalidProperty(format!("{}: divisor must be positive", self.name))
                );
            }
            _ => {}
        }

        Ok(PropertySpec {
            name: self.name,
            formula: self.formula,
            cardinality_constraints: self.cardinality_constraints,
            weights: self.weights,
            increment: self.increment,
            divisor: self.divisor,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
