//! lessonmark CLI - render and validate educational documents

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;

use lessonmark::render::{self, PageOptions, RenderOptions};
use lessonmark::{
    load_document, sanitize, validate, FindingKind, JsonFormat, MathMode, SectionizeOptions,
    ValidationOptions, ValidationPreset,
};

#[derive(Parser)]
#[command(name = "lessonmark")]
#[command(version)]
#[command(about = "Render, validate and sanitize lessonmark documents", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE", env = "LESSONMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Prefix for image paths in output
    #[arg(long, global = true, env = "LESSONMARK_IMAGE_PREFIX")]
    image_prefix: Option<String>,

    /// Math output mode
    #[arg(long, global = true, value_enum, env = "LESSONMARK_MATH")]
    math: Option<MathArg>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML
    Render {
        /// Input document (.tex, .txt or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit a complete printable page instead of a body fragment
        #[arg(long)]
        page: bool,

        /// Do not group headings into sections
        #[arg(long)]
        no_sections: bool,
    },

    /// Dump the parsed node tree as JSON
    Tree {
        /// Input document (.tex, .txt or .json)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Validate generated content
    Validate {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Validation preset
        #[arg(long, value_enum, env = "LESSONMARK_PRESET")]
        preset: Option<PresetArg>,
    },

    /// Repair generated content
    Sanitize {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render every document in a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Emit complete printable pages
        #[arg(long)]
        page: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MathArg {
    /// Typeset in the page with the client-side engine
    Client,
    /// Emit escaped math sources
    Plain,
}

impl From<MathArg> for MathMode {
    fn from(arg: MathArg) -> Self {
        match arg {
            MathArg::Client => MathMode::Client,
            MathArg::Plain => MathMode::Plain,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    /// Tolerate more malformed math
    Lenient,
    /// Default thresholds
    Standard,
    /// Reject on any malformed math
    Strict,
}

impl From<PresetArg> for ValidationPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Lenient => ValidationPreset::Lenient,
            PresetArg::Standard => ValidationPreset::Standard,
            PresetArg::Strict => ValidationPreset::Strict,
        }
    }
}

/// Configuration file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    render: RenderOptions,
    page: PageOptions,
    validation: ValidationOptions,
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
        config.render = config.render.resolved();
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    };
    let render_options = apply_overrides(config.render, cli.image_prefix, cli.math);

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            page,
            no_sections,
        }) => {
            let options = if no_sections {
                render_options.with_sectionize(SectionizeOptions::disabled())
            } else {
                render_options
            };
            let page_options = page.then_some(&config.page);
            cmd_render(&input, output.as_deref(), &options, page_options)
        }
        Some(Commands::Tree {
            input,
            output,
            compact,
        }) => cmd_tree(&input, output.as_deref(), &render_options, compact),
        Some(Commands::Validate {
            input,
            json,
            preset,
        }) => {
            let options = match preset {
                Some(preset) => ValidationOptions::from_preset(preset.into()),
                None => config.validation,
            };
            match cmd_validate(&input, &options, json) {
                Ok(true) => std::process::exit(2),
                other => other.map(|_| ()),
            }
        }
        Some(Commands::Sanitize { input, output }) => cmd_sanitize(&input, output.as_deref()),
        Some(Commands::Batch {
            input,
            output,
            page,
        }) => {
            let page_options = page.then_some(&config.page);
            cmd_batch(&input, output.as_deref(), &render_options, page_options)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: lessonmark <COMMAND> <FILE>".yellow());
            println!("       lessonmark --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn apply_overrides(
    mut options: RenderOptions,
    image_prefix: Option<String>,
    math: Option<MathArg>,
) -> RenderOptions {
    if let Some(prefix) = image_prefix {
        options = options.with_image_prefix(prefix);
    }
    if let Some(math) = math {
        options = options.with_math_mode(math.into());
    }
    options
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn render_one(
    input: &Path,
    options: &RenderOptions,
    page: Option<&PageOptions>,
) -> lessonmark::Result<String> {
    let doc = load_document(input)?;
    Ok(match page {
        Some(page) => render::render_page(&doc, options, page),
        None => render::to_html(&doc, options),
    })
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
    page: Option<&PageOptions>,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = render_one(input, options, page)?;
    write_output(output, &html)
}

fn cmd_tree(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(input)?;
    let nodes = render::parse_document(&doc, options);

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = render::to_json(&nodes, format)?;
    write_output(output, &json)
}

/// Returns whether the content must be rejected.
fn cmd_validate(
    input: &Path,
    options: &ValidationOptions,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let report = validate(&text, options);

    if json {
        println!("{}", report.to_json()?);
        return Ok(report.should_reject);
    }

    println!("{}", "Validation Report".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Findings".bold(), report.findings.len());

    for finding in &report.findings {
        let label = finding.kind.as_str();
        let label = match finding.kind {
            FindingKind::CorruptedToken | FindingKind::FalseIdentity => label.red().bold(),
            FindingKind::RepeatedSentence | FindingKind::MalformedMath => label.yellow(),
        };
        println!("  {} {}: {}", "•".dimmed(), label, finding.detail);
    }

    println!();
    if report.should_reject {
        println!("{}", "REJECT: regenerate this content".red().bold());
    } else if report.is_clean() {
        println!("{}", "OK".green().bold());
    } else {
        println!("{}", "OK with warnings".yellow().bold());
    }

    Ok(report.should_reject)
}

fn cmd_sanitize(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let result = sanitize(&text);
    if result.was_modified {
        log::info!("{} repaired", input.display());
    }
    write_output(output, &result.text)
}

fn is_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("tex" | "txt" | "json")
    )
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    options: &RenderOptions,
    page: Option<&PageOptions>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_document(path))
        .collect();
    files.sort();

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.join("html"));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|path| {
            let result = render_one(path, options, page).and_then(|html| {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                fs::write(output_dir.join(format!("{}.html", stem)), html)?;
                Ok(())
            });
            pb.inc(1);
            result
                .err()
                .map(|e| format!("{}: {}", path.display(), e))
        })
        .collect();

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} documents rendered into {}",
        "Done!".green().bold(),
        files.len() - failures.len(),
        files.len(),
        output_dir.display()
    );
    for failure in &failures {
        eprintln!("  {} {}", "✗".red(), failure);
    }

    if !failures.is_empty() {
        return Err(format!(
            "{} of {} documents failed to render",
            failures.len(),
            files.len()
        )
        .into());
    }
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "lessonmark".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Educational document rendering tool");
    println!();
    println!("License: MIT");
}
