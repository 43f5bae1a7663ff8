//! convkit CLI - text and data conversions from the command line

mod config;
mod suggest;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use config::Config;
use convkit_core::catalog::{self, OperationInfo};
use convkit_core::dispatch::dispatch_json;
use convkit_core::{
    ConversionRequest, ConversionResponse, FieldKind, FieldSpec, OptionValue, Options, Registry,
    Status, dispatch,
};
use serde::Serialize;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Output verbosity level.
#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Decorations around primary output (headers, totals).
    fn info(self, msg: &str) {
        if !matches!(self, Verbosity::Quiet) {
            println!("{msg}");
        }
    }

    fn debug(self, msg: &str) {
        if matches!(self, Verbosity::Verbose) {
            eprintln!("[debug] {msg}");
        }
    }

    fn is_verbose(self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

#[derive(Parser)]
#[command(name = "convkit")]
#[command(version, about = "Text and data conversions", long_about = None)]
struct Cli {
    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (only results and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Path to config file (default: ~/.config/convkit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available operations
    List {
        /// Only list operations in this category
        #[arg(long)]
        category: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one operation's descriptor
    Show {
        /// Operation ID (e.g. base64-encode)
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories with their operations
    Categories {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search operations by name, description or tag
    Search {
        query: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show registry statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an operation
    Convert {
        /// Operation ID (e.g. base64-encode)
        id: String,
        /// Input text (default: read --file, or stdin when piped)
        input: Option<String>,
        /// Read input from a file
        #[arg(short, long, conflicts_with = "input")]
        file: Option<PathBuf>,
        /// Operation option as KEY=VALUE (repeatable)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
        options: Vec<(String, String)>,
        /// Apply a named preset (options given with --option take precedence)
        #[arg(short, long)]
        preset: Option<String>,
        /// Print the full response envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Process a JSON request envelope ({"operationId", "input", "options"})
    Request {
        /// Request file (default: stdin)
        file: Option<PathBuf>,
    },

    /// List available presets
    Presets,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse a `--option KEY=VALUE` argument.
///
/// `\t` and `\n` in the value are unescaped so delimiters can be typed.
/// Typing happens later, against the operation's declared fields.
fn parse_option(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid option '{s}'. Use KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid option '{s}'. Option name is empty"));
    }
    let value = value.replace("\\t", "\t").replace("\\n", "\n");
    Ok((key.to_string(), value))
}

/// Give an option value the type its field expects.
///
/// Text and select fields always take strings, so `pattern=42` stays `"42"`.
/// Other fields get booleans and numbers inferred from string values.
/// Undeclared options are inferred too.
fn coerce_option(field: Option<&FieldSpec>, value: OptionValue) -> OptionValue {
    let wants_string = field.is_some_and(|f| {
        matches!(
            f.kind,
            FieldKind::Text | FieldKind::Textarea | FieldKind::Select { .. }
        )
    });
    match value {
        OptionValue::String(raw) if !wants_string => OptionValue::infer(&raw),
        OptionValue::String(raw) => OptionValue::String(raw),
        other if wants_string => OptionValue::String(other.to_string()),
        other => other,
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logging is configured from flags alone so config warnings are visible
    init_tracing(cli.verbose, cli.quiet);

    let config = if let Some(ref path) = cli.config {
        Config::load_from_path(Some(path.clone()))
    } else {
        Config::load()
    };

    let registry = convkit_ops::default_registry();

    // Apply config defaults, CLI flags override
    let verbose = cli.verbose || config.defaults.verbose;
    let quiet = cli.quiet || config.defaults.quiet;
    let pretty = cli.pretty || config.defaults.pretty;
    let verbosity = Verbosity::from_flags(verbose, quiet);

    verbosity.debug(&format!(
        "{} operations from groups: {}",
        registry.len(),
        convkit_ops::enabled_groups().join(", ")
    ));

    match cli.command {
        Commands::List { category, json } => {
            cmd_list(&registry, category.as_deref(), json, pretty, verbosity)
        }
        Commands::Show { id, json } => cmd_show(&registry, &id, json, pretty),
        Commands::Categories { json } => cmd_categories(&registry, json, pretty, verbosity),
        Commands::Search { query, json } => cmd_search(&registry, &query, json, pretty, verbosity),
        Commands::Stats { json } => cmd_stats(&registry, json, pretty),
        Commands::Convert {
            id,
            input,
            file,
            options,
            preset,
            json,
        } => {
            let request = build_request(
                &registry,
                &config,
                id,
                input,
                file.as_deref(),
                options,
                preset.as_deref(),
                verbosity,
            )?;
            cmd_convert(&registry, &request, json, pretty, verbosity)
        }
        Commands::Request { file } => cmd_request(&registry, file.as_deref(), pretty),
        Commands::Presets => cmd_presets(&config, verbosity),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "convkit", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Map a dispatch status onto a process exit code.
fn exit_code(status: Status) -> ExitCode {
    match status {
        Status::Ok => ExitCode::SUCCESS,
        Status::BadRequest | Status::Internal => ExitCode::from(1),
        Status::NotFound => ExitCode::from(2),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize JSON output")?;
    println!("{out}");
    Ok(())
}

fn print_operation_line(info: &OperationInfo, v: Verbosity) {
    let marker = if info.featured { "*" } else { " " };
    println!("  {marker}{:<22} {}", info.id, info.name);
    if v.is_verbose() && !info.description.is_empty() {
        println!("    {:<22}{}", "", info.description);
    }
}

fn cmd_list(
    registry: &Registry,
    category: Option<&str>,
    json: bool,
    pretty: bool,
    v: Verbosity,
) -> Result<ExitCode> {
    if let Some(category) = category {
        let Some(group) = catalog::category_groups(registry)
            .into_iter()
            .find(|g| g.id == category)
        else {
            bail!("{}", suggest::unknown_category_error(category, registry));
        };

        if json {
            print_json(&group, pretty)?;
        } else {
            v.info(&format!("{} ({}):\n", group.name, group.id));
            for info in &group.operations {
                print_operation_line(info, v);
            }
            v.info(&format!("\nTotal: {} operations", group.count));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let listing = catalog::listing(registry);
    if json {
        print_json(&listing, pretty)?;
        return Ok(ExitCode::SUCCESS);
    }

    v.info("Available operations (* = featured):\n");
    for info in &listing.operations {
        print_operation_line(info, v);
    }
    v.info(&format!(
        "\nTotal: {} operations in {} categories",
        listing.stats.total, listing.stats.categories
    ));
    Ok(ExitCode::SUCCESS)
}

fn cmd_show(registry: &Registry, id: &str, json: bool, pretty: bool) -> Result<ExitCode> {
    let Some(info) = catalog::describe(registry, id) else {
        eprintln!("Error: {}", suggest::unknown_operation_error(id, registry));
        eprintln!("Hint: run 'convkit search <term>' to find operations");
        return Ok(exit_code(Status::NotFound));
    };

    if json {
        print_json(&info, pretty)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} - {}", info.id, info.name);
    if !info.description.is_empty() {
        println!("  {}", info.description);
    }
    println!(
        "  category: {} ({})",
        info.category,
        catalog::category_label(&info.category)
    );
    if !info.tags.is_empty() {
        println!("  tags:     {}", info.tags.join(", "));
    }
    println!("  input:    {}", info.input_kind.as_str());
    println!("  output:   {}", info.output_kind.as_str());
    if info.featured {
        println!("  featured");
    }

    if !info.fields.is_empty() {
        println!("\n  options:");
        for field in &info.fields {
            println!("    {:<18} {}", field.name, describe_field(field));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// One-line summary of a field: kind, bounds or choices, default.
fn describe_field(field: &FieldSpec) -> String {
    let mut parts = vec![match &field.kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::Textarea => "textarea".to_string(),
        FieldKind::Range { min, max } => format!("integer {min}..={max}"),
        FieldKind::Checkbox => "true|false".to_string(),
        FieldKind::Select { choices } => choices
            .iter()
            .map(|c| format!("{:?}", c.value))
            .collect::<Vec<_>>()
            .join("|"),
    }];
    if field.required {
        parts.push("required".to_string());
    }
    if let Some(default) = &field.default {
        parts.push(format!("default {default}"));
    }
    let label = if field.description.is_empty() {
        &field.label
    } else {
        &field.description
    };
    format!("{} - {label}", parts.join(", "))
}

fn cmd_categories(registry: &Registry, json: bool, pretty: bool, v: Verbosity) -> Result<ExitCode> {
    let groups = catalog::category_groups(registry);
    if json {
        print_json(&groups, pretty)?;
        return Ok(ExitCode::SUCCESS);
    }

    for group in &groups {
        println!("{:<18} {:<22} {}", group.id, group.name, group.count);
        if v.is_verbose() {
            for info in &group.operations {
                println!("    {}", info.id);
            }
        }
    }
    v.info(&format!("\nTotal: {} categories", groups.len()));
    Ok(ExitCode::SUCCESS)
}

fn cmd_search(
    registry: &Registry,
    query: &str,
    json: bool,
    pretty: bool,
    v: Verbosity,
) -> Result<ExitCode> {
    let results = catalog::search(registry, query)?;
    if json {
        print_json(&results, pretty)?;
        return Ok(ExitCode::SUCCESS);
    }

    v.info(&format!(
        "Found {} operation(s) matching '{}':\n",
        results.result_count, results.query
    ));
    for info in &results.operations {
        print_operation_line(info, v);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_stats(registry: &Registry, json: bool, pretty: bool) -> Result<ExitCode> {
    let stats = registry.stats();
    if json {
        print_json(&stats, pretty)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("Operations: {}", stats.total);
    println!("Categories: {}", stats.categories);
    println!();
    for (category, count) in &stats.by_category {
        println!("  {category:<18} {count}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Assemble a request from arguments, preset and input source.
#[allow(clippy::too_many_arguments)]
fn build_request(
    registry: &Registry,
    config: &Config,
    id: String,
    input: Option<String>,
    file: Option<&Path>,
    cli_options: Vec<(String, String)>,
    preset: Option<&str>,
    v: Verbosity,
) -> Result<ConversionRequest> {
    let mut options = Options::new();
    if let Some(name) = preset {
        let Some(preset) = config.get_preset(name) else {
            bail!(
                "{}",
                suggest::unknown_preset_error(name, &config.preset_names())
            );
        };
        if !preset.applies_to(&id) {
            bail!(
                "Preset '{name}' is for '{}', not '{id}'",
                preset.operation.as_deref().unwrap_or_default()
            );
        }
        v.debug(&format!("preset {name}: {}", preset.summary()));
        options = preset.options;
    }
    // IndexMap::extend overwrites values in place, keeping preset order
    options.extend(
        cli_options
            .into_iter()
            .map(|(key, raw)| (key, OptionValue::String(raw))),
    );

    let descriptor = registry.get_descriptor(&id);
    let field = |key: &str| descriptor.and_then(|d| d.field_spec(key));
    let options: Options = options
        .into_iter()
        .map(|(key, value)| {
            let value = coerce_option(field(key.as_str()), value);
            (key, value)
        })
        .collect();
    if descriptor.is_some() {
        for key in options.keys().filter(|key| field(key.as_str()).is_none()) {
            tracing::warn!(operation = %id, option = %key, "option is not declared; ignored");
        }
    }
    let is_generator = descriptor.is_some_and(|d| d.is_generator());

    let input = match (input, file) {
        (Some(input), _) => Some(input),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!(suggest::file_read_error(path, &e)))?,
        ),
        (None, None) if !is_generator && !std::io::stdin().is_terminal() => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Some(strip_trailing_newline(buf))
        }
        (None, None) => None,
    };

    let mut request = ConversionRequest::new(id).options(options);
    if let Some(input) = input {
        v.debug(&format!("input: {} chars", input.chars().count()));
        request = request.input(input);
    }
    Ok(request)
}

/// Drop the single line terminator that shells append to piped text.
fn strip_trailing_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

fn cmd_convert(
    registry: &Registry,
    request: &ConversionRequest,
    json: bool,
    pretty: bool,
    v: Verbosity,
) -> Result<ExitCode> {
    let (status, response) = dispatch(registry, request);

    if json {
        print_json(&response, pretty)?;
        return Ok(exit_code(status));
    }

    report(registry, request, &response, status, v);
    Ok(exit_code(status))
}

/// Print a response in plain form: output on stdout, errors on stderr.
fn report(
    registry: &Registry,
    request: &ConversionRequest,
    response: &ConversionResponse,
    status: Status,
    v: Verbosity,
) {
    if let Some(output) = &response.output {
        if output.ends_with('\n') {
            print!("{output}");
        } else {
            println!("{output}");
        }
    }

    if status == Status::NotFound {
        eprintln!(
            "Error: {}",
            suggest::unknown_operation_error(&request.operation_id, registry)
        );
    } else if let Some(error) = response.error_message() {
        eprintln!("Error: {error}");
    }

    if let Some(meta) = &response.metadata {
        v.debug(&format!(
            "{}: {} -> {} chars in {:.3} ms",
            meta.operation_id, meta.input_length, meta.output_length, meta.processing_time_ms
        ));
    }
}

/// An unreadable request body is reported as an internal error envelope.
fn cmd_request(registry: &Registry, file: Option<&Path>, pretty: bool) -> Result<ExitCode> {
    let body = match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| suggest::file_read_error(path, &e)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("Failed to read from stdin: {e}"))
        }
    };
    let body = match body {
        Ok(body) => body,
        Err(msg) => {
            tracing::error!("{msg}");
            print_json(&ConversionResponse::internal_error(), pretty)?;
            return Ok(exit_code(Status::Internal));
        }
    };

    let (status, response) = dispatch_json(registry, &body);
    print_json(&response, pretty)?;
    Ok(exit_code(status))
}

/// List available presets.
fn cmd_presets(config: &Config, v: Verbosity) -> Result<ExitCode> {
    v.info("Built-in presets:\n");

    for (name, _) in config::list_presets() {
        let Some(preset) = config::builtin_preset(name) else {
            continue;
        };
        if config.presets.contains_key(*name) {
            println!("  {:<16} {} (overridden by user preset)", name, preset.summary());
        } else {
            println!("  {:<16} {}", name, preset.summary());
        }
    }

    if !config.presets.is_empty() {
        v.info("\nUser-defined presets:\n");
        for (name, preset) in &config.presets {
            println!("  {:<16} {}", name, preset.summary());
        }
    }

    if let Some(path) = Config::default_path() {
        v.info(&format!("\nConfig file: {}", path.display()));
    }

    Ok(ExitCode::SUCCESS)
}
