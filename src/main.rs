//! widget-stats - Widget statistics aggregation engine
//!
//! Command line harness: computes widget content from a JSON request file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use widget_stats::record::source::load_request;
use widget_stats::{ConfigLoader, Registry, ReportFormat, WidgetError, WidgetReport};

#[derive(Parser)]
#[command(name = "widget-stats")]
#[command(version)]
#[command(about = "Aggregate test-run records into dashboard widget content", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Explicit config file, applied over user and project config
    #[arg(short, long, global = true, env = "WIDGET_STATS_CONFIG")]
    config: Option<PathBuf>,

    /// Ignore the user-level config file
    #[arg(long, global = true)]
    no_user_config: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute widget content from a request or record file
    Aggregate {
        /// JSON file holding a request or a bare record array
        #[arg(short, long)]
        input: PathBuf,

        /// Widget type key (overrides the request's)
        #[arg(short, long)]
        widget: Option<String>,

        /// Widget option as key=value (repeatable)
        #[arg(short, long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Maximum number of records to consider
        #[arg(short, long)]
        quantity: Option<usize>,

        /// Output format: json or markdown
        #[arg(short, long, default_value = "json")]
        format: ReportFormat,

        /// Write the output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List registered widget types
    Widgets {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration
    Config {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "widget_stats=debug,info"
    } else {
        "widget_stats=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        let code = e.downcast_ref::<WidgetError>().map_or(1, WidgetError::exit_code);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(code);
    }
}

fn parse_option(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid option '{}': expected KEY=VALUE", raw))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());
    if !project_path.exists() {
        anyhow::bail!("Project directory does not exist: {}", project_path.display());
    }

    let mut loader = ConfigLoader::new().with_explicit_path(cli.config.clone());
    if cli.no_user_config {
        loader = loader.without_user_config();
    }

    match cli.command {
        Commands::Aggregate {
            input,
            widget,
            options,
            quantity,
            format,
            output,
        } => {
            let config = loader.load(&project_path)?;
            let mut request = load_request(&input, widget.as_deref())?;
            if let Some(widget) = widget {
                request.widget_type = widget;
            }
            if let Some(quantity) = quantity {
                request.quantity = Some(quantity);
            }
            for raw in &options {
                let (key, value) = parse_option(raw)?;
                request.options.insert(key, vec![value]);
            }

            let content = Registry::standard().dispatch(&request, &config)?;
            let rendered = WidgetReport::new(request.widget_type.clone(), content).export(format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "{} Wrote {} report to {}",
                        "✓".green(),
                        format,
                        path.display()
                    );
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Widgets { json } => {
            let registry = Registry::standard();
            if json {
                let widgets: Vec<serde_json::Value> = registry
                    .widget_types()
                    .map(|w| {
                        serde_json::json!({
                            "key": w.key(),
                            "requiredOptions": w.required_options(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&widgets)?);
            } else {
                println!("\n{} Registered widgets", "Widgets:".cyan().bold());
                println!("{}", "─".repeat(60));
                for widget in registry.widget_types() {
                    let required = widget.required_options();
                    if required.is_empty() {
                        println!("   {}", widget.key());
                    } else {
                        println!(
                            "   {} {}",
                            widget.key(),
                            format!("(requires: {})", required.join(", ")).dimmed()
                        );
                    }
                }
            }
        }

        Commands::Config { json } => {
            let (config, chain) = loader.load_with_chain(&project_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("{}", chain.describe());
                println!("\n{} Resolved values", "Config:".cyan().bold());
                println!("{}", "─".repeat(60));
                println!("   History top N:       {}", config.history_top_n);
                println!("   Comparison quantity: {}", config.comparison_quantity);
                println!("   Sort field:          {}", config.sort_field);
                println!(
                    "   Default timeline:    {}",
                    config.default_timeline.as_deref().unwrap_or("none")
                );
            }
        }
    }

    Ok(())
}
