//! `--list-phases`

use crate::error::Result;
use crate::phase::{PHASES, Phase};
use crate::variant::Variant;

fn variants_of(phase: &Phase) -> String {
    let applies: Vec<&str> = Variant::ALL
        .into_iter()
        .filter(|variant| phase.applies_to(*variant))
        .map(Variant::as_str)
        .collect();
    if applies.len() == Variant::ALL.len() {
        "all variants".to_string()
    } else {
        applies.join(", ")
    }
}

fn render() -> Vec<String> {
    PHASES
        .iter()
        .map(|phase| {
            format!(
                "{:<10}{:<16}{}",
                phase.id.name(),
                variants_of(phase),
                phase.summary
            )
        })
        .collect()
}

/// Print the phase table in execution order
pub fn run() -> Result<()> {
    for line in render() {
        println!("{line}");
    }
    Ok(())
}
