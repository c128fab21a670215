use crate::errors::{ OracleFault, SweepError };
use crate::implementations::evaluator::Evaluator;
use crate::implementations::grounding_oracle::GroundingOracle;
use crate::models::catalog::Catalog;
use crate::models::property::{ Divisor, PropertySpec };
use crate::tests::support::{ int, setup };

fn sequence(catalog: &Catalog, name: &str, upto: u64) -> Vec<num::rational::BigRational> {
    let evaluator = Evaluator::new(GroundingOracle::default());
    let spec = catalog.get(name).expect("property in catalog");
    (0..upto).map(|n| evaluator.evaluate(spec, n).unwrap()).collect()
}

#[test]
fn test_builtin_catalog_contents() {
    let catalog = Catalog::builtin().unwrap();
    let names: Vec<&str> = catalog.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec![
        "permutations",
        "involutions",
        "derangements",
        "two_regularity",
        "three_regularity",
        "three_coloredness",
        "two_coloredness",
        "three_regularity_and_two_coloredness",
        "two_regularity_and_three_coloredness"
    ]);

    let three_regular = catalog.get("three_regularity").unwrap();
    assert_eq!(three_regular.increment(), 2);
    assert_eq!(three_regular.divisor().apply(2), 36.into());
    assert_eq!(three_regular.cardinality_constraints()[0].symbol, "E");
    assert_eq!(three_regular.cardinality_constraints()[0].factor, 3);
    assert!(!three_regular.formula().contains(char::is_whitespace));

    let two_colored = catalog.get("two_coloredness").unwrap();
    assert!(two_colored.cardinality_constraints().is_empty());
    assert!(two_colored.weights().is_empty());
    assert!(matches!(two_colored.divisor(), Divisor::One));
}

#[test]
fn test_builtin_formulas_parse() {
    let catalog = Catalog::builtin().unwrap();
    for spec in catalog.iter() {
        let formula = crate::implementations::formula::Formula::parse(spec.formula())
            .unwrap_or_else(|e| panic!("{} does not parse: {}", spec.name(), e));
        let predicates = formula.predicates().unwrap();
        for cc in spec.cardinality_constraints() {
            assert!(predicates.contains_key(&cc.symbol), "{} lacks {}", spec.name(), cc.symbol);
        }
    }
}

#[test]
fn test_permutations_are_factorials() {
    setup();
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(sequence(&catalog, "permutations", 4), vec![int(1), int(1), int(2), int(6)]);
}

#[test]
fn test_involutions() {
    setup();
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(sequence(&catalog, "involutions", 4), vec![int(1), int(1), int(2), int(4)]);
}

#[test]
fn test_derangements() {
    setup();
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(sequence(&catalog, "derangements", 3), vec![int(1), int(0), int(1)]);
}

#[test]
fn test_two_colored_graphs() {
    setup();
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(sequence(&catalog, "two_coloredness", 3), vec![int(1), int(2), int(6)]);
}

#[test]
fn test_grounding_refuses_large_domains() {
    let catalog = Catalog::builtin().unwrap();
    let evaluator = Evaluator::new(GroundingOracle::new(10));
    let spec = catalog.get("permutations").unwrap();
    assert!(matches!(
        evaluator.evaluate(spec, 3),
        Err(SweepError::Oracle { fault: OracleFault::Unsupported(_), .. })
    ));
}

#[test]
fn test_select_keeps_catalog_order() {
    let catalog = Catalog::builtin().unwrap();
    let subset = catalog.select(&["two_coloredness", "permutations"]).unwrap();
    let names: Vec<&str> = subset.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["permutations", "two_coloredness"]);

    assert!(matches!(catalog.select(&["nope"]), Err(SweepError::UnknownProperty(name)) if name == "nope"));
}

#[test]
fn test_duplicate_names_rejected() {
    let a = PropertySpec::builder("same", "P(x)").build().unwrap();
    let b = PropertySpec::builder("same", "Q(x)").build().unwrap();
    assert!(matches!(Catalog::new(vec![a, b]), Err(SweepError::DuplicateProperty(_))));
}
