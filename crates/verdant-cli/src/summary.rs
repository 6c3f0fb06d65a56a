use console::Style;
use verdant_core::pipeline::config::PipelineConfig;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Verdant Pipeline"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Index"),
        s.method.apply_to(config.index)
    );
    println!(
        "  {:<14}{} ({})",
        s.label.apply_to("Season"),
        s.value.apply_to(config.season),
        config.statistic
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Baseline"),
        s.value.apply_to(config.baseline_year)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Primary"),
        s.method.apply_to(config.primary.product.as_str())
    );
    match &config.secondary {
        Some(sensor) => println!(
            "  {:<14}{}",
            s.label.apply_to("Secondary"),
            s.method.apply_to(sensor.product.as_str())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Secondary"),
            s.disabled.apply_to("none")
        ),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Extent"),
        s.value.apply_to(format!(
            "x {:.0}..{:.0}  y {:.0}..{:.0}",
            config.extent.x_min, config.extent.x_max, config.extent.y_min, config.extent.y_max
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    if config.write_composites {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Composites"),
            s.value.apply_to("written per year")
        );
    }
    println!();
}
