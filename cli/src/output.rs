//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse a name from the config file, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    pub fn print<R: Serialize + Tabled>(&self, rows: &[R]) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(rows)?),
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "(none)".dimmed());
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
        }
        Ok(())
    }

    /// Single value; tables fall back to pretty JSON
    pub fn print_value<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            OutputFormat::Json | OutputFormat::Table => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    pub fn is_table(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}

/// Colored percentage for terminal output
pub fn percent_badge(percent: u8) -> String {
    let text = format!("{}%", percent);
    match percent {
        100 => text.green().bold().to_string(),
        50..=99 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert!(matches!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json)));
        assert!(matches!(OutputFormat::from_name("yaml"), Some(OutputFormat::Yaml)));
        assert!(OutputFormat::from_name("xml").is_none());
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some(170)), "170");
        assert_eq!(or_dash(None::<String>), "-");
    }
}
