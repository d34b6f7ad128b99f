use anyhow::Result;
use owo_colors::OwoColorize;
use repeatcal_core::recurrence::generate;

use crate::commands::new::NewArgs;
use crate::render::{Render, pluralize};

/// Preview the occurrences `new` would create. Nothing is saved.
pub fn run(args: &NewArgs) -> Result<()> {
    let seed = args.seed()?;

    if !seed.repeat.is_recurring() {
        println!("{}", seed.render());
        return Ok(());
    }

    let occurrences = generate(&seed);
    if occurrences.is_empty() {
        println!(
            "{}",
            "No occurrences. A recurring event needs --until on or after its --date".dimmed()
        );
        return Ok(());
    }

    for occurrence in &occurrences {
        println!("{}", occurrence.render());
    }
    println!();
    println!(
        "{}",
        format!(
            "  {} {}",
            occurrences.len(),
            pluralize("occurrence", occurrences.len())
        )
        .dimmed()
    );

    Ok(())
}
