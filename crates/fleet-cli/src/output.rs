//! Output formatting for the fleetops CLI

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact text format
    Text,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Table
    }
}

impl OutputFormat {
    /// Whether this format is machine-readable
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

/// Trait for types that can be rendered as a table row
pub trait Formattable {
    fn table_headers() -> Vec<String>;
    fn table_row(&self) -> Vec<String>;

    /// Key-value pairs for the compact text format
    fn key_value_pairs(&self) -> Vec<(String, String)>;
}

/// Output formatter
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Serialize a whole value in the structured formats.
    ///
    /// Only meaningful for JSON and YAML; table callers render rows
    /// through [`print_list`](Self::print_list) instead.
    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    /// Format and print a list of items
    pub fn print_list<T>(&self, items: &[T]) -> Result<()>
    where
        T: Serialize + Formattable,
    {
        if items.is_empty() {
            match self.format {
                OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
                OutputFormat::Table | OutputFormat::Text => {
                    println!("{}", "No items found".dimmed());
                }
            }
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
            OutputFormat::Yaml => println!("{}", serde_yaml::to_string(items)?),
            OutputFormat::Table => self.print_table(items),
            OutputFormat::Text => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    for (key, value) in item.key_value_pairs() {
                        println!("{}: {}", key, value);
                    }
                }
            }
        }
        Ok(())
    }

    fn print_table<T: Formattable>(&self, items: &[T]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let header_cells: Vec<Cell> = T::table_headers()
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan))
            .collect();
        table.set_header(header_cells);

        for item in items {
            table.add_row(item.table_row());
        }

        println!("{}", table);
    }

    /// Print a success message
    pub fn print_success(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                self.print_value(&serde_json::json!({
                    "status": "success",
                    "message": message
                }))?;
            }
            OutputFormat::Table | OutputFormat::Text => {
                println!("{} {}", "✓".green().bold(), message.green());
            }
        }
        Ok(())
    }

    /// Print a warning message
    pub fn print_warning(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                self.print_value(&serde_json::json!({
                    "status": "warning",
                    "message": message
                }))?;
            }
            OutputFormat::Table | OutputFormat::Text => {
                eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
            }
        }
        Ok(())
    }

    /// Print an info message
    pub fn print_info(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {}
            OutputFormat::Table | OutputFormat::Text => {
                println!("{} {}", "ℹ".blue().bold(), message.blue());
            }
        }
        Ok(())
    }

    /// Print a section heading (interactive formats only)
    pub fn print_heading(&self, heading: &str) {
        if !self.format.is_structured() {
            println!("\n{}", heading.bold().underline());
        }
    }
}

/// Colorize a derived host status for terminal output
pub fn colorize_status(status: &str) -> ColoredString {
    match status.to_uppercase().as_str() {
        "AVAILABLE" | "RUNNING" => status.green(),
        "RUNNING_DEGRADED" | "UNAVAILABLE_DEGRADED" | "IN_REPAIR" => status.yellow(),
        "UNAVAILABLE" => status.red(),
        _ => status.normal(),
    }
}

/// Render a bandwidth figure, colored by whether it met the threshold
pub fn format_bandwidth(bandwidth_gbps: Option<f64>, threshold_gbps: f64) -> String {
    match bandwidth_gbps {
        Some(bw) if bw >= threshold_gbps => format!("{:.1}", bw).green().to_string(),
        Some(bw) => format!("{:.1}", bw).red().to_string(),
        None => "failed".red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestRow {
        host: String,
        status: String,
    }

    impl Formattable for TestRow {
        fn table_headers() -> Vec<String> {
            vec!["Host".to_string(), "Status".to_string()]
        }

        fn table_row(&self) -> Vec<String> {
            vec![self.host.clone(), self.status.clone()]
        }

        fn key_value_pairs(&self) -> Vec<(String, String)> {
            vec![
                ("Host".to_string(), self.host.clone()),
                ("Status".to_string(), self.status.clone()),
            ]
        }
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
        assert!(OutputFormat::Json.is_structured());
        assert!(!OutputFormat::Table.is_structured());
    }

    #[test]
    fn test_print_list_does_not_error() {
        let rows = vec![TestRow {
            host: "gpu-1".to_string(),
            status: "AVAILABLE".to_string(),
        }];
        for format in [
            OutputFormat::Table,
            OutputFormat::Json,
            OutputFormat::Yaml,
            OutputFormat::Text,
        ] {
            let formatter = OutputFormatter::new(format);
            formatter.print_list(&rows).unwrap();
            formatter.print_list::<TestRow>(&[]).unwrap();
        }
    }

    #[test]
    fn test_colorize_status_covers_fleet_statuses() {
        // Colors are hard to assert; the mapping must at least not lose text.
        for status in [
            "AVAILABLE",
            "RUNNING",
            "RUNNING_DEGRADED",
            "UNAVAILABLE_DEGRADED",
            "IN_REPAIR",
            "UNAVAILABLE",
            "FIRMWARE_UPDATE",
        ] {
            assert!(colorize_status(status).to_string().contains(status));
        }
    }

    #[test]
    fn test_format_bandwidth() {
        assert!(format_bandwidth(Some(390.1), 365.0).contains("390.1"));
        assert!(format_bandwidth(Some(120.0), 365.0).contains("120.0"));
        assert!(format_bandwidth(None, 365.0).contains("failed"));
    }
}
