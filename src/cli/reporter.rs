// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::detector::Detector;
use crate::material::MaterialCatalog;
use crate::registry::DetectorRole;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a finished construction: placement tree down to `depth`,
    /// registries and mass
    pub fn report_build(detector: &Detector, depth: usize, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {}",
            "Detector:".bold(),
            format!("target {}", detector.target().material.name).cyan()
        );
        println!("{}", "━".repeat(80).bright_black());

        println!("\n{}", "Placements:".bold());
        for line in Self::tree_lines(detector, depth) {
            println!("  {}", line);
        }

        let sensitive = detector.sensitive();
        println!("\n{}", "Sensitive volumes:".bold());
        println!(
            "  {} {}",
            "Tracker planes:".bright_black(),
            sensitive.count(DetectorRole::TrackerHit).to_string().cyan()
        );
        println!(
            "  {} {}",
            "Calorimeter modules:".bright_black(),
            sensitive.count(DetectorRole::CalorimeterHit).to_string().cyan()
        );

        println!("\n{}", "Field regions:".bold());
        if detector.fields().is_empty() {
            println!("  {}", "none".bright_black());
        }
        for (volume, region) in detector.fields().entries() {
            println!(
                "  {} {:?} {:.3} T",
                format!("{}:", detector.hierarchy().volume(volume).name).bright_black(),
                region.axis,
                region.magnitude
            );
        }

        println!("\n{}", "Summary:".bold());
        println!(
            "  {} {}",
            "Mass:".bright_black(),
            Self::format_mass(detector.total_mass()).cyan()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Every material the catalog knows, with density
    pub fn report_materials(catalog: &MaterialCatalog) {
        println!("{}", "Materials:".bold());
        for name in MaterialCatalog::names() {
            match catalog.resolve(name) {
                Ok(material) if material.name == name => println!(
                    "  {:<16} {} g/cm³",
                    name.cyan(),
                    format!("{:.6}", material.density).yellow()
                ),
                Ok(material) => println!(
                    "  {:<16} {}",
                    name.cyan(),
                    format!("-> {}", material.name).bright_black()
                ),
                Err(err) => Self::report_error(&err.to_string()),
            }
        }
    }

    /// Indented placement lines, one per physical instance
    pub fn tree_lines(detector: &Detector, depth: usize) -> Vec<String> {
        let hierarchy = detector.hierarchy();
        hierarchy
            .touchables()
            .into_iter()
            .filter(|t| t.depth() <= depth)
            .map(|t| {
                let volume = hierarchy.volume(t.volume);
                let daughters = hierarchy.daughters(t.volume).len();
                let mut line = format!(
                    "{}{} [{}] z={:.3}",
                    "  ".repeat(t.depth()),
                    hierarchy.placement_label(t.placement()),
                    volume.material.name,
                    t.translation.z
                );
                if daughters > 0 && t.depth() == depth {
                    line.push_str(&format!(" (+{daughters} daughters)"));
                }
                line
            })
            .collect()
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Grams, switched to kg or t when large
    fn format_mass(grams: f64) -> String {
        if grams < 1_000.0 {
            format!("{:.2} g", grams)
        } else if grams < 1_000_000.0 {
            format!("{:.2} kg", grams / 1_000.0)
        } else {
            format!("{:.2} t", grams / 1_000_000.0)
        }
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::detector::build;

    #[test]
    fn test_format_duration() {
        assert_eq!(Reporter::format_duration(Duration::from_micros(500)), "500µs");
        assert_eq!(Reporter::format_duration(Duration::from_millis(5)), "5.00ms");
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_format_mass() {
        assert_eq!(Reporter::format_mass(12.5), "12.50 g");
        assert_eq!(Reporter::format_mass(7_874.0), "7.87 kg");
        assert_eq!(Reporter::format_mass(2_500_000.0), "2.50 t");
    }

    #[test]
    fn test_tree_lines_top_level() {
        let catalog = MaterialCatalog::new();
        let detector = build(&catalog, &DetectorConfig::default()).unwrap();
        let lines = Reporter::tree_lines(&detector, 1);

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("World [G4_Galactic]"));
        assert!(lines[1].starts_with("  Target [G4_W]"));
        assert!(lines[5].contains("HCal"));
        assert!(lines[5].ends_with("(+4 daughters)"));
    }
}
