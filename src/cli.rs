use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::{Cuisine, DietType, Language, UserPreferences};

#[derive(Parser, Debug)]
#[command(author, version, about = "Blood report to personalised Indian meal plan", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract biomarkers from a blood report (PDF or image)
    Parse {
        /// Path to the report file
        report_file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a report and generate a 7-day meal plan from it
    Plan {
        /// Path to the report file
        report_file: PathBuf,

        #[arg(long, default_value_t = DietType::Veg)]
        diet: DietType,

        #[arg(long, default_value_t = Cuisine::Mixed)]
        cuisine: Cuisine,

        #[arg(long, default_value_t = Language::English)]
        language: Language,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also print a share message for this day (0 = first day)
        #[arg(long)]
        share_day: Option<usize>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Command {
    pub fn preferences(&self) -> Option<UserPreferences> {
        match self {
            Command::Plan {
                diet,
                cuisine,
                language,
                ..
            } => Some(UserPreferences {
                diet_type: *diet,
                cuisine: *cuisine,
                language: *language,
            }),
            Command::Parse { .. } => None,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
