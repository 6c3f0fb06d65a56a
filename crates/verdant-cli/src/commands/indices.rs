use anyhow::Result;
use clap::Args;
use console::Style;
use verdant_core::index::SpectralIndex;

#[derive(Args)]
pub struct IndicesArgs {}

/// List every supported index with its formula and band inputs.
pub fn run(_args: &IndicesArgs) -> Result<()> {
    let name = Style::new().green().bold();
    let family = Style::new().dim();

    println!();
    for index in SpectralIndex::all() {
        let (a, b) = index.bands();
        println!(
            "  {:<8}{:<40}{:<14}{}",
            name.apply_to(index.to_string()),
            index.formula(),
            format!("{a}, {b}"),
            family.apply_to(index.style().to_string()),
        );
    }
    println!();
    Ok(())
}
