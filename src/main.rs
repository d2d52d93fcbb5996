use clap::Parser;
use hicoo_timing::{
    config::DEFAULT_CONFIG_FILE, Cli, Config, HicooTiming, OutputFormatter, OutputMode,
    PathLayout, RunParameters, TimingError, UserFriendlyError,
};
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    if cli.list_groups {
        return handle_list_groups(&cli);
    }

    let Some(params) = cli.run_parameters() else {
        eprintln!("BLOCK_SIZE, PARTITION_COUNT and THREAD_COUNT are required");
        return 1;
    };

    if cli.dry_run {
        return match cli.load_config() {
            Ok(config) => handle_dry_run(&config, &params),
            Err(e) => {
                print_startup_error(&e);
                exit_code_for(&e)
            }
        };
    }

    let app = match HicooTiming::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    tracing::info!(
        "Run parameters: sb={} sk={} tk={}",
        params.block_size,
        params.partition_count,
        params.thread_count
    );

    match app.extract_timings(&params) {
        Ok(report) => {
            app.output_formatter().print_extraction_report(&report);

            if let Some(ref report_path) = cli.report {
                if let Err(e) = report.save_json(report_path) {
                    app.handle_error(&e);
                    return exit_code_for(&e);
                }
            }

            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &TimingError) -> i32 {
    match error {
        TimingError::Cancelled => 130, // Interrupted (SIGINT)
        TimingError::InputOpen { .. } | TimingError::InputRead { .. } => 3,
        TimingError::OutputWrite { .. } => 4,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    match HicooTiming::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  hicoo-timing <block> <partitions> <threads> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_list_groups(cli: &Cli) -> i32 {
    let mut config = match Config::load_with_defaults(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };
    config.merge_with_cli_args(&cli.create_cli_overrides());

    for (name, datasets) in &config.input.dataset_groups {
        let marker = if *name == config.input.active_group { "*" } else { " " };
        println!("{} {:<6} {}", marker, name, datasets.join(", "));
    }

    0
}

fn handle_dry_run(config: &Config, params: &RunParameters) -> i32 {
    let datasets = match config.active_datasets() {
        Ok(datasets) => datasets,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let layout = PathLayout::new(config);
    let plan = layout.plan(&datasets, &config.input.modes, params);

    println!("dry run: no log is read and no output is written");
    println!("output file: {}", layout.output_path(params).display());
    println!("input logs ({}):", plan.len());

    let mut missing = 0;
    for input in &plan {
        let status = if input.path.is_file() {
            "found"
        } else {
            missing += 1;
            "missing"
        };
        println!("  [{}] {}", status, input.path.display());
    }

    if missing > 0 {
        println!(
            "{} of {} logs missing, a real run stops at the first one",
            missing,
            plan.len()
        );
    }

    0
}

fn print_startup_error(error: &TimingError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "hicoo_timing=warn",
        1 => "hicoo_timing=info",
        _ => "hicoo_timing=debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
