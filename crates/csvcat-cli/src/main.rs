//! csvcat CLI
//!
//! Command-line tool for concatenating same-named CSV files scattered across a
//! directory tree.

use clap::{Parser, Subcommand};
use csvcat_core::{
    scan_directory, ErrorPolicy, JobResources, MergeConfig, MergeEngine, MergeReport, ScanOptions,
};
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "csvcat")]
#[command(about = "Concatenate same-named CSV files across a directory tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every group of same-named CSV files into one file per name
    Concat {
        /// Directory to search for CSV files
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving the <name>_concat.csv files
        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prepend each row's index within its source file
        #[arg(long)]
        index: bool,

        /// Merge groups in parallel
        #[arg(long)]
        parallel: bool,

        /// Skip groups that fail to load instead of stopping
        #[arg(long)]
        keep_going: bool,

        /// Create the output directory if it is missing
        #[arg(long)]
        create_output: bool,

        /// Follow symbolic links while scanning
        #[arg(long)]
        follow_links: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the groups that would be merged
    Scan {
        /// Directory to search for CSV files
        #[arg(short, long)]
        input: PathBuf,

        /// Show member files for each group
        #[arg(long)]
        members: bool,

        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate batch job walltime from resource choices
    Estimate {
        #[arg(long, default_value_t = 20)]
        images_per_batch: u32,

        #[arg(long, default_value_t = 5)]
        minutes_per_image: u32,

        #[arg(long, default_value_t = 1)]
        cpus: u32,

        #[arg(long, default_value_t = 4)]
        ram_gb: u32,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Output path for the configuration file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .format_module_path(false)
        .init();
}

fn run(command: Commands) -> csvcat_core::Result<()> {
    match command {
        Commands::Concat {
            input,
            output,
            config,
            index,
            parallel,
            keep_going,
            create_output,
            follow_links,
            json,
        } => {
            let mut config = match config {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    MergeConfig::load(&path)?
                }
                None => MergeConfig::default(),
            };
            config.include_index |= index;
            config.parallel |= parallel;
            config.create_output_dir |= create_output;
            config.follow_links |= follow_links;
            if keep_going {
                config.on_error = ErrorPolicy::SkipGroup;
            }
            cmd_concat(&input, &output, config, json)
        }
        Commands::Scan {
            input,
            members,
            json,
        } => cmd_scan(&input, members, json),
        Commands::Estimate {
            images_per_batch,
            minutes_per_image,
            cpus,
            ram_gb,
        } => cmd_estimate(JobResources {
            images_per_batch,
            minutes_per_image,
            cpus_per_node: cpus,
            ram_per_worker_gb: ram_gb,
        }),
        Commands::InitConfig { output } => cmd_init_config(&output),
    }
}

fn cmd_concat(
    input: &Path,
    output: &Path,
    config: MergeConfig,
    json: bool,
) -> csvcat_core::Result<()> {
    let report = MergeEngine::new(config).run(input, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &MergeReport) {
    println!(
        "Merged {} files into {} outputs",
        report.files_scanned,
        report.artifacts.len()
    );
    for artifact in &report.artifacts {
        println!(
            "  {} ({} rows, {} columns, {} sources)",
            artifact.path.display(),
            artifact.rows,
            artifact.columns,
            artifact.sources.len()
        );
    }

    if !report.collisions.is_empty() {
        println!("\nOutput name collisions ({}):", report.collisions.len());
        for collision in &report.collisions {
            println!("  {} <- {}", collision.file_name, collision.groups.join(", "));
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped ({}):", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.name, skipped.error);
        }
    }
}

fn cmd_scan(input: &Path, members: bool, json: bool) -> csvcat_core::Result<()> {
    let config = MergeConfig::default();
    // Earlier *_concat.csv files are listed too; they are only skipped inside a real output dir
    let options = ScanOptions {
        extension: config.extension.clone(),
        ..ScanOptions::default()
    };
    let result = scan_directory(input, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "Found {} files in {} groups below {}",
        result.total_files,
        result.groups.len(),
        result.root.display()
    );
    println!();

    for group in &result.groups {
        let output = csvcat_core::output_file_name(&group.name, &config.extension, &config.suffix);
        println!("{} ({} files) -> {}", group.name, group.entries.len(), output);
        if members {
            for entry in &group.entries {
                println!("  {}", entry.path.display());
            }
        }
    }

    Ok(())
}

fn cmd_estimate(job: JobResources) -> csvcat_core::Result<()> {
    job.validate()?;

    println!("{}", job);
    println!("CPUs per node: {}", job.cpus_per_node);
    println!("GB of RAM per worker: {}", job.ram_per_worker_gb);

    Ok(())
}

fn cmd_init_config(output: &Path) -> csvcat_core::Result<()> {
    MergeConfig::default().save(output)?;
    info!("Created configuration file: {}", output.display());
    Ok(())
}
