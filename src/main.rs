//! TouchOSC Compiler CLI
//!
//! Usage:
//!   touchosc-compiler [OPTIONS] <DESCRIPTION_FILE>
//!   touchosc-compiler --list-templates [-t <DIR>]
//!
//! Options:
//!   -n, --name <NAME>               Output name (default: description file name)
//!   -o, --output-dir <DIR>          Output directory (default: output/<name>)
//!   -t, --templates-dir <DIR>       Template directory
//!   -c, --create-components-file    Keep the unzipped index.xml
//!   -z, --no-zipped-output          Do not create the .touchosc archive
//!   -s, --config <FILE>             Settings file (TOML format)
//!   -h, --help                      Print help

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use touchosc_compiler::template::TemplateSource;
use touchosc_compiler::{render_with_config, write_output, Description, OutputOptions, Settings};

#[derive(Parser)]
#[command(name = "touchosc-compiler")]
#[command(about = "Compile JSON control-surface descriptions to TouchOSC layouts")]
struct Cli {
    /// JSON file containing the description of the components
    #[arg(required_unless_present = "list_templates")]
    description_file: Option<PathBuf>,

    /// Name of the output file (default: description file name without extension)
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory (default: <settings output dir>/<name>)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Template directory (default: from settings, "templates")
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,

    /// Keep the unzipped index.xml file for further processing
    #[arg(short = 'c', long)]
    create_components_file: bool,

    /// Do not create the zipped .touchosc file
    #[arg(short = 'z', long)]
    no_zipped_output: bool,

    /// Replace unresolved {{args.…}} tokens with nothing instead of failing
    #[arg(long)]
    ignore_missing_args: bool,

    /// Replace unresolved {{data.…}} tokens with nothing instead of failing
    #[arg(long)]
    ignore_missing_data: bool,

    /// Settings file (TOML format)
    #[arg(short = 's', long = "config")]
    config: Option<PathBuf>,

    /// List the available templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Log progress details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    // Empty arguments (e.g. from unset shell variables) confuse the parser
    let cli = Cli::parse_from(std::env::args_os().filter(|arg| !arg.is_empty()));
    init_logging(cli.verbose);

    // Load settings
    let settings = match &cli.config {
        Some(path) => match Settings::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading settings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    // Command-line flags only ever loosen the configured policy
    let mut policy = settings.policy();
    if cli.ignore_missing_args {
        policy = policy.with_ignore_missing_args(true);
    }
    if cli.ignore_missing_data {
        policy = policy.with_ignore_missing_data(true);
    }
    let mut config = settings.render_config().with_policy(policy);
    if let Some(dir) = &cli.templates_dir {
        config = config.with_templates_dir(dir);
    }

    if cli.list_templates {
        match config.composer().list_templates() {
            Ok(names) => {
                for name in names {
                    println!("{}", name);
                }
                return;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if cli.no_zipped_output && !cli.create_components_file {
        eprintln!("Error: --no-zipped-output without --create-components-file would produce no output");
        std::process::exit(1);
    }

    let Some(description_file) = cli.description_file.as_deref() else {
        eprintln!("Error: no description file given");
        std::process::exit(1);
    };

    // Read input
    let description = match Description::from_file(description_file) {
        Ok(description) => description,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", description_file.display(), e);
            std::process::exit(1);
        }
    };

    let name = cli.name.clone().unwrap_or_else(|| {
        description_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "layout".to_string())
    });
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output.dir.join(&name));

    let xml = match render_with_config(&description, &config) {
        Ok(xml) => xml,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = OutputOptions::new(name, output_dir)
        .with_extension(settings.output.extension.clone())
        .with_keep_xml(cli.create_components_file)
        .with_archive(!cli.no_zipped_output);
    match write_output(&xml, &options) {
        Ok(paths) => {
            for path in paths.archive.iter().chain(paths.xml.iter()) {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
