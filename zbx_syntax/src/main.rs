use std::env;
use std::path::Path;
use zbx_syntax::config::RuntimeConfig;
use zbx_syntax::expression;
use zbx_syntax::logging::{self, codes};
use zbx_syntax::pipeline::{self, PipelineError, PipelineOutput};
use zbx_syntax::rules::{self, RuleValue};
use zbx_syntax::{batch, log_success};

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Diagnostics,
    Expression(String),
    Rule(String),
    ReplaceHost {
        src: String,
        dst: String,
        expression: String,
    },
    Path(String),
}

#[derive(Debug)]
struct CliOptions {
    batch: batch::BatchConfig,
    json: bool,
    config_path: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    let (command, rest) = parse_command(&args[1..])?;
    if command == Command::Help {
        print_help(&args[0]);
        return Ok(());
    }

    let mut options = parse_options(rest)?;
    if let Some(path) = &options.config_path {
        let runtime = RuntimeConfig::from_toml_file(path)?;
        logging::config::init_runtime_preferences(runtime.logging.clone())?;
        options.batch.runtime = runtime;
    }

    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    match command {
        Command::Help => {}
        Command::Diagnostics => print!("{}", logging::get_system_diagnostics()),
        Command::Expression(expr) => check_expression(&expr, &options)?,
        Command::Rule(rule) => check_rule(&rule, options.json)?,
        Command::ReplaceHost {
            src,
            dst,
            expression,
        } => {
            let replaced = expression::replace_host(&expression, &src, &dst);
            log_success!(
                codes::success::HOST_REPLACEMENT_COMPLETE,
                "Host replaced",
                "from" => src,
                "to" => dst
            );
            println!("{}", replaced);
        }
        Command::Path(input) => {
            let input_path = Path::new(&input);
            if input_path.is_file() {
                process_single_file(&input, &options)?;
            } else if input_path.is_dir() {
                process_directory_batch(input_path, &options)?;
            } else {
                eprintln!("Error: Input must be a definition file or directory");
                eprintln!("  Path: {}", input_path.display());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Split the command from its trailing options
fn parse_command(args: &[String]) -> Result<(Command, &[String]), String> {
    let value = |index: usize, flag: &str| {
        args.get(index)
            .cloned()
            .ok_or_else(|| format!("{} requires a value", flag))
    };

    match args.first().map(String::as_str) {
        None | Some("--help") => Ok((Command::Help, &args[args.len()..])),
        Some("--diagnostics") => Ok((Command::Diagnostics, &args[1..])),
        Some("--expression") => Ok((Command::Expression(value(1, "--expression")?), &args[2..])),
        Some("--rule") => Ok((Command::Rule(value(1, "--rule")?), &args[2..])),
        Some("--replace-host") => Ok((
            Command::ReplaceHost {
                src: value(1, "--replace-host")?,
                dst: value(2, "--replace-host")?,
                expression: value(3, "--replace-host")?,
            },
            &args[4..],
        )),
        Some(path) => Ok((Command::Path(path.to_string()), &args[1..])),
    }
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        batch: batch::BatchConfig::default(),
        json: false,
        config_path: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file path")?;
                options.config_path = Some(path.clone());
            }
            "--sequential" => options.batch.max_threads = 1,
            "--parallel" => {}
            "--threads" => {
                i += 1;
                match args.get(i).map(|v| v.parse::<usize>()) {
                    Some(Ok(threads)) => options.batch.max_threads = threads.max(1),
                    Some(Err(_)) => {
                        eprintln!("Warning: Invalid thread count '{}', using default", args[i])
                    }
                    None => eprintln!("Warning: --threads requires a number"),
                }
            }
            "--no-recursive" => options.batch.recursive = false,
            "--max-files" => {
                i += 1;
                match args.get(i).map(|v| v.parse::<usize>()) {
                    Some(Ok(max_files)) => options.batch.max_files = Some(max_files),
                    Some(Err(_)) => eprintln!("Warning: Invalid max files '{}', ignoring", args[i]),
                    None => eprintln!("Warning: --max-files requires a number"),
                }
            }
            "--fail-fast" => options.batch.fail_fast = true,
            "--quiet" => options.batch.progress_reporting = false,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    Ok(options)
}

fn print_help(program_name: &str) {
    println!("zbx_syntax v{}", env!("CARGO_PKG_VERSION"));
    println!("Trigger function macro and field validation rule checker");
    println!();
    println!("USAGE:");
    println!("    {} <file> [options]                  # Check one definition file", program_name);
    println!("    {} <directory> [options]             # Check a directory", program_name);
    println!("    {} --expression EXPR [--json]        # List function macros", program_name);
    println!("    {} --rule RULE [--json]              # Parse a rule string", program_name);
    println!("    {} --replace-host SRC DST EXPR       # Rewrite a host name", program_name);
    println!("    {} --diagnostics [--config FILE]     # Show logging settings", program_name);
    println!();
    println!("FILES:");
    println!("    .expr, .trigger    One trigger expression per line");
    println!("    .rules             One validation rule string per line");
    println!("    Blank lines and lines starting with '#' are skipped");
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print results as JSON");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --parallel          Force parallel processing (default)");
    println!("    --threads N         Set maximum number of threads (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first failed file");
    println!("    --quiet             Suppress progress reporting");
    println!();
    println!("EXAMPLES:");
    println!("    {} triggers/cpu.expr", program_name);
    println!("    {} definitions/ --threads 4 --fail-fast", program_name);
    println!("    {} --expression '{{web:net.tcp.service[http].last(0)}}=0'", program_name);
    println!("    {} --rule 'required|in 0,1|db hosts.status' --json", program_name);
    println!();

    let pipeline_info = pipeline::get_pipeline_info();
    println!("PIPELINE LIMITS:");
    for line in pipeline_info.report().lines().skip(1) {
        println!("    {}", line.trim_start_matches("- "));
    }
}

fn check_expression(expr: &str, options: &CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    let scan = expression::scan_expression(expr, options.batch.runtime.expression.skip_other_macros);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&scan.macros)?);
    } else if scan.macros.is_empty() {
        println!("No function macros found");
    } else {
        println!("Found {} function macro(s):", scan.macros.len());
        for found in &scan.macros {
            println!("  {}..{} {}", found.position, found.end(), found.match_text);
            println!("      host:      {}", found.host);
            println!("      item:      {}", found.item);
            println!("      function:  {}", found.function_name);
            println!("      params:    {:?}", found.function_param_list);
        }
    }

    if !scan.malformed.is_empty() {
        for error in &scan.malformed {
            eprintln!("error[{}]: {}", error.error_code(), error);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn check_rule(rule: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match rules::parse_validation_rule(rule) {
        Ok(set) if json => println!("{}", serde_json::to_string_pretty(&set)?),
        Ok(set) => {
            println!("Parsed {} validation rule(s):", set.len());
            for (kind, value) in set.iter() {
                println!("  {:<10} {}", kind.keyword(), describe_rule_value(value));
            }
        }
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn describe_rule_value(value: &RuleValue) -> String {
    match value {
        RuleValue::Flag => String::new(),
        RuleValue::Scalar(literal) => literal.clone(),
        RuleValue::List(values) => values.join(", "),
        RuleValue::Db { table, field } => format!("{}.{}", table, field),
    }
}

fn process_single_file(
    file_path: &str,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if !options.json {
        println!("Processing file: {}", file_path);
    }

    match pipeline::process_file_with_config(file_path, &options.batch.runtime) {
        Ok(result) => {
            if options.json {
                println!(
                    "{}",
                    PipelineOutput::new(Some(file_path), &result.analysis).to_json()?
                );
                return Ok(());
            }

            let analysis = &result.analysis;
            println!(
                "\nSUCCESS: {} {} line(s) checked",
                analysis.item_lines(),
                analysis.kind.as_str()
            );
            if !analysis.expressions.is_empty() {
                println!(
                    "  {} function macro(s), hosts: {}",
                    analysis.macro_count(),
                    analysis.hosts().join(", ")
                );
            }
            for warning in &analysis.warnings {
                println!(
                    "  warning[{}] {}:{}: {}",
                    warning.code, warning.line, warning.column, warning.message
                );
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            if options.json {
                let report = serde_json::json!({
                    "file": file_path,
                    "valid": false,
                    "error": error.to_string(),
                    "failures": error.failures(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                eprintln!("\nFAILED: {}", error);
                print_detailed_error(&error, file_path);
                logging::print_cargo_style_summary();
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

fn process_directory_batch(
    dir_path: &Path,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &options.batch;
    if !options.json {
        println!("Starting batch processing: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.effective_threads(),
            config.recursive,
            config.fail_fast
        );
        if let Some(max_files) = config.max_files {
            println!("File limit: {} files maximum", max_files);
        }
    }

    match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => {
            if options.json {
                print_batch_json(&results)?;
            } else {
                println!("\nBatch processing completed!");
                print_batch_results(&results);
                logging::print_cargo_style_summary();
            }

            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            logging::safe_log_error(
                error.error_code(),
                &format!("Batch processing failed: {}", error),
            );
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_batch_json(results: &batch::BatchResults) -> Result<(), serde_json::Error> {
    let mut files = Vec::new();
    for (path, result) in &results.successful_files {
        let file = path.display().to_string();
        files.push(serde_json::to_value(PipelineOutput::new(
            Some(file.as_str()),
            &result.analysis,
        ))?);
    }
    for (path, error) in &results.failed_files {
        files.push(serde_json::json!({
            "file": path.display().to_string(),
            "valid": false,
            "error": error.to_string(),
            "failures": error.failures(),
        }));
    }

    let report = serde_json::json!({
        "files_discovered": results.files_discovered,
        "files_processed": results.files_processed,
        "successful": results.success_count(),
        "failed": results.failure_count(),
        "files": files,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("Batch Processing Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), get_error_summary(error));
        }
    }

    let shown = if results.success_count() > 10 { 5 } else { 10 };
    if results.success_count() > 0 {
        println!("\nSuccessful Files:");
        for (file_path, result) in results.successful_files.iter().take(shown) {
            let analysis = &result.analysis;
            match analysis.kind {
                zbx_syntax::file_processor::SourceKind::Expression => println!(
                    "  {}: {} expressions, {} macros",
                    file_path.display(),
                    analysis.expressions.len(),
                    analysis.macro_count()
                ),
                zbx_syntax::file_processor::SourceKind::Rules => println!(
                    "  {}: {} rule lines",
                    file_path.display(),
                    analysis.rules.len()
                ),
            }
        }
        if results.success_count() > shown {
            println!("  ... and {} more", results.success_count() - shown);
        }
    }
}

fn get_error_summary(error: &PipelineError) -> String {
    match error {
        PipelineError::FileProcessing(_) => "File processing error".to_string(),
        PipelineError::UnsupportedSource { .. } => "Unsupported file".to_string(),
        PipelineError::InvalidLines { failed, total, .. } => {
            format!("{} of {} lines invalid", failed, total)
        }
        PipelineError::Pipeline { .. } => "Pipeline error".to_string(),
    }
}

fn print_detailed_error(error: &PipelineError, file_path: &str) {
    match error {
        PipelineError::FileProcessing(file_err) => {
            eprintln!("File processing stage failed:");
            eprintln!("  {}", file_err);
        }
        PipelineError::UnsupportedSource { path } => {
            eprintln!("Unsupported definition file: {}", path);
            eprintln!("  Use .expr, .trigger or .rules");
        }
        PipelineError::InvalidLines { failures, .. } => {
            if let Ok(source) = std::fs::read_to_string(file_path) {
                eprintln!("{}", pipeline::render_failures(&source, failures));
                return;
            }
            for failure in failures {
                eprintln!(
                    "  {}:{} error[{}]: {}",
                    failure.line, failure.column, failure.code, failure.message
                );
            }
        }
        PipelineError::Pipeline { message } => {
            eprintln!("Pipeline error: {}", message);
        }
    }
}
