use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lipi_cli::commands::{config_ops, convert_ops, open_registry, script_ops};
use lipi_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "lipitool", about = "Indic script transliteration tool")]
struct Cli {
    /// Directory searched for <code>.toml / <code>.lpsd tables (repeatable)
    #[arg(long = "data-dir", global = true)]
    data_dirs: Vec<PathBuf>,
    /// Settings TOML to use instead of the embedded defaults
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert text between two scripts
    Convert {
        /// Source script code or alias
        from: String,
        /// Target script code or alias
        to: String,
        /// Text to convert (reads stdin line by line when omitted)
        text: Option<String>,
        /// Print fallback substitutions to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Show every pipeline stage for one conversion
    Explain {
        from: String,
        to: String,
        text: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List loadable scripts
    Scripts,
    /// Describe a loadable script
    Show {
        /// Script code or alias
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Validate a script table file and describe it
    Check {
        /// Path to a .toml or .lpsd table
        file: String,
        #[arg(long)]
        json: bool,
    },
    /// Compile a TOML script table to the binary format
    Compile {
        /// Input TOML table
        input: String,
        /// Output .lpsd file
        output: String,
    },
    /// Print an embedded script table
    ScriptExport {
        code: String,
    },
    /// Print the default settings TOML
    SettingsExport,
    /// Validate a settings TOML file
    SettingsValidate {
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(path) = &cli.settings {
        let content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read settings {}: {}", path, e);
            std::process::exit(1);
        });
        if let Err(e) = lipi_core::settings::init_custom(content) {
            eprintln!("Invalid settings {}: {}", path, e);
            std::process::exit(1);
        }
    }

    match cli.command {
        Command::Convert {
            from,
            to,
            text,
            trace,
        } => {
            let registry = open_registry(&cli.data_dirs);
            convert_ops::convert_cmd(&registry, &from, &to, text.as_deref(), trace);
        }
        Command::Explain {
            from,
            to,
            text,
            json,
        } => {
            let registry = open_registry(&cli.data_dirs);
            convert_ops::explain_cmd(&registry, &from, &to, &text, json);
        }
        Command::Scripts => script_ops::list(&open_registry(&cli.data_dirs)),
        Command::Show { name, json } => {
            script_ops::show(&open_registry(&cli.data_dirs), &name, json)
        }
        Command::Check { file, json } => script_ops::check(&file, json),
        Command::Compile { input, output } => script_ops::compile(&input, &output),
        Command::ScriptExport { code } => config_ops::script_export(&code),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
