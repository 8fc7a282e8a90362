use console::Style;
use sensorcal_core::consts::VIGNETTE_PARAMETER_LABELS;
use sensorcal_core::flat::VignetteFit;
use sensorcal_core::CalibrationConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    warn: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            warn: Style::new().yellow(),
        }
    }
}

/// Relative errors above this (percent) are highlighted.
const LARGE_RELATIVE_ERROR: f64 = 10.0;

pub fn print_flatfield_settings(config: &CalibrationConfig, label: &str) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Flat field"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(10)));
    println!(
        "  {:<16}{}",
        s.label.apply_to("Camera"),
        s.value.apply_to(&config.camera)
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Label"),
        s.value.apply_to(label)
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("Clip border"),
        s.value.apply_to(format!("{} px", config.clip_border))
    );
    println!();

    println!("  {}", s.header.apply_to("Smoothing"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Normalise"),
        s.value.apply_to(format!("σ = {}", config.smoothing.normalisation_sigma))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Flat map"),
        s.value.apply_to(format!("σ = {}", config.smoothing.flat_sigma))
    );
    println!();
}

pub fn print_vignette_fit(fit: &VignetteFit) {
    let s = Styles::new();
    let relative = fit.relative_errors_percent();

    println!();
    println!("  {}", s.header.apply_to("Vignetting model"));
    println!(
        "    {:<6}{:>12}   {:>10}   {:>10}",
        s.label.apply_to("Param"),
        s.label.apply_to("Value"),
        s.label.apply_to("Error"),
        s.label.apply_to("Relative")
    );
    for (i, label) in VIGNETTE_PARAMETER_LABELS.iter().enumerate() {
        let rel = format!("{:.3} %", relative[i]);
        let rel = if relative[i] > LARGE_RELATIVE_ERROR || !relative[i].is_finite() {
            s.warn.apply_to(rel)
        } else {
            s.value.apply_to(rel)
        };
        println!(
            "    {:<6}{:>+12.6} ± {:>10.6} ; {:>10}",
            s.label.apply_to(label),
            fit.params[i],
            fit.standard_errors[i],
            rel
        );
    }
    println!();
}
