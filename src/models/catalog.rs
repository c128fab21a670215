use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::{ SweepError, SweepResult };
use crate::models::property::{ Divisor, PropertySpec };

/// Immutable, cheaply clonable list of properties with unique names
#[derive(Debug, Clone)]
pub struct Catalog {
    properties: Arc<[PropertySpec]>,
}

impl Catalog {
    pub fn new(properties: Vec<PropertySpec>) -> SweepResult<Self> {
        let mut seen = HashSet::new();
        for property in &properties {
            if !seen.insert(property.name()) {
                return Err(SweepError::DuplicateProperty(property.name().to_string()));
            }
        }
        Ok(Self { properties: properties.into() })
    }

    /// The nine counting problems this tool ships with
    pub fn builtin() -> SweepResult<Self> {
        Self::new(builtin_properties()?)
    }

    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn get_index(&self, index: usize) -> Option<&PropertySpec> {
        self.properties.get(index)
    }

    /// Sub-catalog holding `names`, in catalog order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> SweepResult<Self> {
        for name in names {
            if self.get(name.as_ref()).is_none() {
                return Err(SweepError::UnknownProperty(name.as_ref().to_string()));
            }
        }
        let wanted: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        Self::new(
            self.properties
                .iter()
                .filter(|p| wanted.contains(p.name()))
                .cloned()
                .collect()
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySpec> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

// Constraints shared by the graph properties: E is a simple undirected graph,
// F is E, and F1..Fk split F with each Fi total on its first argument.
const SIMPLE_GRAPH: &str = "~E(x, x) & (~E(x, y) | E(y, x))";
const EDGE_COPY: &str = "(~F(x, y) | E(x, y)) & (F(x, y) | ~E(x, y))";

const TWO_REGULAR: &str =
    "(S1(x) | ~F1(x, y)) &
     (S2(x) | ~F2(x, y)) &
     (~F(x, y) | F1(x, y) | F2(x, y)) &
     (F(x, y) | ~F1(x, y)) &
     (F(x, y) | ~F2(x, y)) &
     (~F1(x, y) | ~F2(x, y))";

const THREE_REGULAR: &str =
    "(S1(x) | ~F1(x, y)) &
     (S2(x) | ~F2(x, y)) &
     (S3(x) | ~F3(x, y)) &
     (~F(x, y) | F1(x, y) | F2(x, y) | F3(x, y)) &
     (F(x, y) | ~F1(x, y)) &
     (F(x, y) | ~F2(x, y)) &
     (F(x, y) | ~F3(x, y)) &
     (~F1(x, y) | ~F2(x, y)) &
     (~F1(x, y) | ~F3(x, y)) &
     (~F2(x, y) | ~F3(x, y))";

const TWO_COLORED: &str =
    "(C1(x) | C2(x)) &
     (~C1(x) | ~C2(x)) &
     (~E(x, y) | (~(C1(x) & C1(y)) & ~(C2(x) & C2(y))))";

const THREE_COLORED: &str =
    "(C1(x) | C2(x) | C3(x)) &
     (~C1(x) | ~C2(x)) &
     (~C2(x) | ~C3(x)) &
     (~C1(x) | ~C3(x)) &
     (~E(x, y) | (~(C1(x) & C1(y)) & ~(C2(x) & C2(y)) & ~(C3(x) & C3(y))))";

fn join(parts: &[&str]) -> String {
    parts.join(" & ")
}

fn builtin_properties() -> SweepResult<Vec<PropertySpec>> {
    Ok(vec![
        PropertySpec::builder("permutations", "(~F(x, y) | S1(x)) & (~F(x, y) | S2(y))")
            .cardinality("F", 1)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .build()?,
        PropertySpec::builder("involutions", "(~F(x, y) | S1(x)) & (~F(x, y) | F(y, x))")
            .cardinality("F", 1)
            .weight("S1", 1, -1)
            .build()?,
        PropertySpec::builder(
            "derangements",
            "~F(x, x) &
             (S1(x) | ~F1(x, y)) &
             (S2(x) | ~F2(y, x)) &
             (F1(x, y) | ~F(x, y)) &
             (~F1(x, y) | F(x, y)) &
             (F2(x, y) | ~F(x, y)) &
             (~F2(x, y) | F(x, y))"
        )
            .cardinality("F1", 1)
            .cardinality("F2", 1)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .build()?,
        PropertySpec::builder("two_regularity", join(&[SIMPLE_GRAPH, EDGE_COPY, TWO_REGULAR]))
            .cardinality("E", 2)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .divisor(Divisor::Power(2))
            .build()?,
        PropertySpec::builder("three_regularity", join(&[SIMPLE_GRAPH, EDGE_COPY, THREE_REGULAR]))
            .cardinality("E", 3)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .weight("S3", 1, -1)
            .increment(2)
            .divisor(Divisor::Power(6))
            .build()?,
        PropertySpec::builder("three_coloredness", join(&[SIMPLE_GRAPH, THREE_COLORED])).build()?,
        PropertySpec::builder("two_coloredness", join(&[SIMPLE_GRAPH, TWO_COLORED])).build()?,
        PropertySpec::builder(
            "three_regularity_and_two_coloredness",
            join(&[SIMPLE_GRAPH, EDGE_COPY, THREE_REGULAR, TWO_COLORED])
        )
            .cardinality("E", 3)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .weight("S3", 1, -1)
            .increment(2)
            .divisor(Divisor::Power(6))
            .build()?,
        PropertySpec::builder(
            "two_regularity_and_three_coloredness",
            join(&[SIMPLE_GRAPH, EDGE_COPY, TWO_REGULAR, THREE_COLORED])
        )
            .cardinality("E", 2)
            .weight("S1", 1, -1)
            .weight("S2", 1, -1)
            .divisor(Divisor::Power(2))
            .build()?,
    ])
}
