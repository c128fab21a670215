use anyhow::Result;

use wfomc_sweep::Catalog;

use crate::cli::ui;

pub fn execute(catalog: &Catalog) -> Result<()> {
    ui::print_header("Property Catalog");

    for spec in catalog.iter() {
        ui::print_result(spec.name(), spec.formula());

        let constraints = spec
            .cardinality_constraints()
            .iter()
            .map(|cc| format!("|{}| = {}m", cc.symbol, cc.factor))
            .collect::<Vec<_>>();
        let weights = spec
            .weights()
            .iter()
            .map(|(symbol, w)| format!("{}: ({}, {})", symbol, w.positive, w.negative))
            .collect::<Vec<_>>();

        println!(
            "    increment {}, divisor {}, constraints [{}], weights [{}]",
            spec.increment(),
            spec.divisor(),
            constraints.join(", "),
            weights.join(", ")
        );
    }

    Ok(())
}
