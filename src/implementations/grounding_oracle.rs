use log::debug;
use num::rational::BigRational;
use num::traits::{ One, Zero };

use crate::errors::OracleFault;
use crate::implementations::formula::Formula;
use crate::traits::counting_oracle::{ CountingOracle, OracleQuery };

/// Hard ceiling from the `u64` interpretation mask
const MASK_BITS: u32 = 63;

/// Reference counter that enumerates every interpretation of every predicate.
///
/// Exponential in the number of ground atoms, so it only answers queries up to
/// `max_ground_atoms`. Weighted symbols that never occur in the formula are
/// ignored.
#[derive(Debug, Clone)]
pub struct GroundingOracle {
    max_ground_atoms: u32,
}

impl GroundingOracle {
    pub fn new(max_ground_atoms: u32) -> Self {
        Self { max_ground_atoms: max_ground_atoms.min(MASK_BITS) }
    }
}

impl Default for GroundingOracle {
    fn default() -> Self {
        Self::new(24)
    }
}

enum Node {
    Atom { offset: u32, vars: Vec<usize> },
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
}

struct Predicate {
    offset: u32,
    atoms: u32,
    targets: Vec<u32>,
    positive_powers: Vec<BigRational>,
    negative_powers: Vec<BigRational>,
}

struct Grounding {
    root: Node,
    predicates: Vec<Predicate>,
    bindings: Vec<Vec<u64>>,
    domain_size: u64,
    total_atoms: u32,
}

impl Grounding {
    fn atom_index(&self, offset: u32, vars: &[usize], binding: &[u64]) -> u32 {
        let local = vars
            .iter()
            .fold(0u64, |acc, &v| acc * self.domain_size + binding[v]);
        offset + (local as u32)
    }

    fn holds(&self, node: &Node, mask: u64, binding: &[u64]) -> bool {
        match node {
            Node::Atom { offset, vars } => {
                (mask >> self.atom_index(*offset, vars, binding)) & 1 == 1
            }
            Node::Not(inner) => !self.holds(inner, mask, binding),
            Node::And(parts) => parts.iter().all(|p| self.holds(p, mask, binding)),
            Node::Or(parts) => parts.iter().any(|p| self.holds(p, mask, binding)),
        }
    }

    fn weight(&self, mask: u64) -> Option<BigRational> {
        let mut product = BigRational::one();
        for predicate in &self.predicates {
            let slice = (mask >> predicate.offset) & ((1u64 << predicate.atoms) - 1);
            let true_atoms = slice.count_ones();
            if predicate.targets.iter().any(|&t| t != true_atoms) {
                return None;
            }
            product *= &predicate.positive_powers[true_atoms as usize];
            product *= &predicate.negative_powers[(predicate.atoms - true_atoms) as usize];
        }
        Some(product)
    }

    fn count(&self) -> BigRational {
        let mut total = BigRational::zero();
        for mask in 0..1u64 << self.total_atoms {
            let Some(weight) = self.weight(mask) else {
                continue;
            };
            if weight.is_zero() {
                continue;
            }
            if self.bindings.iter().all(|b| self.holds(&self.root, mask, b)) {
                total += weight;
            }
        }
        total
    }
}

fn powers(base: &BigRational, upto: u32) -> Vec<BigRational> {
    let mut out = Vec::with_capacity(upto as usize + 1);
    let mut acc = BigRational::one();
    for _ in 0..=upto {
        out.push(acc.clone());
        acc *= base;
    }
    out
}

fn compile(
    formula: &Formula,
    offsets: &std::collections::BTreeMap<String, u32>,
    variables: &[String]
) -> Node {
    match formula {
        Formula::Atom { predicate, args } => Node::Atom {
            offset: offsets[predicate],
            vars: args
                .iter()
                .filter_map(|a| variables.iter().position(|v| v == a))
                .collect(),
        },
        Formula::Not(inner) => Node::Not(Box::new(compile(inner, offsets, variables))),
        Formula::And(parts) => Node::And(parts.iter().map(|p| compile(p, offsets, variables)).collect()),
        Formula::Or(parts) => Node::Or(parts.iter().map(|p| compile(p, offsets, variables)).collect()),
    }
}

impl GroundingOracle {
    fn ground(&self, query: &OracleQuery<'_>) -> Result<Grounding, OracleFault> {
        let formula = Formula::parse(query.formula).map_err(|e| OracleFault::Failed(format!("parse error {}", e)))?;
        let arities = formula.predicates().map_err(OracleFault::Failed)?;
        let variables = formula.variables();
        let m = query.domain_size;

        for (symbol, _) in query.cardinality_constraints {
            if !arities.contains_key(symbol) {
                return Err(
                    OracleFault::Unsupported(format!("constrained symbol {} does not occur in the formula", symbol))
                );
            }
        }

        let too_large = || {
            OracleFault::Unsupported(
                format!("more than {} ground atoms at domain size {}", self.max_ground_atoms, m)
            )
        };

        let mut offsets = std::collections::BTreeMap::new();
        let mut predicates = Vec::new();
        let mut total: u64 = 0;
        for (symbol, &arity) in &arities {
            let atoms = m.checked_pow(arity as u32).ok_or_else(too_large)?;
            let offset = total;
            total = total.checked_add(atoms).ok_or_else(too_large)?;
            if total > self.max_ground_atoms as u64 {
                return Err(too_large());
            }
            let atoms = atoms as u32;
            let weight = query.weights.get(symbol);
            predicates.push(Predicate {
                offset: offset as u32,
                atoms,
                targets: query.cardinality_constraints
                    .iter()
                    .filter(|(s, _)| s == symbol)
                    .map(|&(_, t)| u32::try_from(t).unwrap_or(u32::MAX))
                    .collect(),
                positive_powers: powers(&weight.positive, atoms),
                negative_powers: powers(&weight.negative, atoms),
            });
            offsets.insert(symbol.clone(), offset as u32);
        }

        let mut bindings: Vec<Vec<u64>> = vec![Vec::new()];
        for _ in &variables {
            bindings = bindings
                .into_iter()
                .flat_map(|b| {
                    (0..m).map(move |value| {
                        let mut next = b.clone();
                        next.push(value);
                        next
                    })
                })
                .collect();
        }

        Ok(Grounding {
            root: compile(&formula, &offsets, &variables),
            predicates,
            bindings,
            domain_size: m,
            total_atoms: total as u32,
        })
    }
}

impl CountingOracle for GroundingOracle {
    fn name(&self) -> &str {
        "grounding"
    }

    fn count(&self, query: &OracleQuery<'_>) -> Result<BigRational, OracleFault> {
        let grounding = self.ground(query)?;
        debug!(
            "Grounding {} atoms and {} bindings at domain size {}",
            grounding.total_atoms,
            grounding.bindings.len(),
            query.domain_size
        );
        Ok(grounding.count())
    }
}
