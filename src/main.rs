mod db;
mod inspect;
mod parser;
mod report;
mod units;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "gbase_inspect", about = "GBase 8a inspection-dump extractor and health checker")]
struct Cli {
    /// SQLite store path
    #[arg(long, default_value = db::DEFAULT_DB_PATH)]
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the store and ingest an extracted archive tree
    Ingest {
        /// Directory holding the extracted dump files
        dir: PathBuf,
    },
    /// Run the health-check battery and write renderer handoff documents
    Inspect {
        /// Inspect one system only (default: every system in the store)
        #[arg(short, long)]
        system: Option<String>,
        /// Output directory for handoff documents
        #[arg(long, default_value = "output/reports")]
        out: PathBuf,
    },
    /// Ingest + inspect in one pipeline
    Run {
        dir: PathBuf,
        #[arg(long, default_value = "output/reports")]
        out: PathBuf,
    },
    /// Row counts per table
    Stats,
    /// Node overview table
    Overview {
        #[arg(short, long)]
        system: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest { dir } => {
            let conn = db::connect(&cli.db)?;
            ingest(&conn, &dir)?;
            Ok(())
        }
        Commands::Inspect { system, out } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            inspect_systems(&conn, system.as_deref(), &out)
        }
        Commands::Run { dir, out } => {
            let conn = db::connect(&cli.db)?;
            ingest(&conn, &dir)?;
            inspect_systems(&conn, None, &out)
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Files:     {}", s.files);
            println!("Systems:   {}", s.systems);
            println!("Machines:  {}", s.machines);
            println!("Processes: {}", s.processes);
            println!("Logs:      {}", s.logs);
            println!("Variables: {}", s.variables);
            Ok(())
        }
        Commands::Overview { system } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, system.as_deref())?;
            if rows.is_empty() {
                println!("No machines found. Run 'ingest' first.");
                return Ok(());
            }
            println!(
                "{:<12} | {:<10} | {:<15} | {:<16} | {:<30}",
                "System", "Cluster", "IP", "Hostname", "OS"
            );
            println!("{}", "-".repeat(95));
            for r in rows {
                println!(
                    "{:<12} | {:<10} | {:<15} | {:<16} | {:<30}",
                    r.system_name, r.cluster_name, r.ip_address, r.hostname, r.os_version
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// The system identifier is the file-name prefix before the first `__`.
fn system_from_filename(filename: &str) -> String {
    match filename.split_once("__") {
        Some((prefix, _)) => prefix.to_string(),
        None => String::new(),
    }
}

/// Index every file under `dir`, then run all extraction passes against
/// each one in index order. A file that cannot be read or parsed is logged
/// and skipped; the loop always continues.
fn ingest(conn: &Connection, dir: &Path) -> Result<()> {
    db::reset_schema(conn)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let filename = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .to_string();
        files.push(db::FileRow {
            system_name: system_from_filename(&filename),
            filename,
            fullpath: entry.path().to_string_lossy().to_string(),
        });
    }
    let indexed = db::insert_files(conn, &files)?;
    println!("Indexed {indexed} files from {}", dir.display());

    let rows = db::fetch_files(conn)?;
    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut ok = 0usize;
    let mut errors = 0usize;
    for (id, filename, fullpath) in rows {
        pb.set_message(filename.clone());
        match std::fs::read_to_string(&fullpath) {
            Ok(text) => {
                let extract = parser::process_file(&text);
                db::save_extract(conn, &extract)?;
                info!("[{id}] {filename}: system '{}'", extract.system_name);
                ok += 1;
            }
            Err(e) => {
                warn!("[{id}] {filename}: {e}");
                errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("Ingested {ok} files ({errors} skipped).");
    Ok(())
}

/// Run the battery for each system and write one handoff JSON per system.
fn inspect_systems(conn: &Connection, system: Option<&str>, out: &Path) -> Result<()> {
    let systems = match system {
        Some(s) => vec![s.to_string()],
        None => db::fetch_system_names(conn)?,
    };
    if systems.is_empty() {
        println!("No systems in the store. Run 'ingest' first.");
        return Ok(());
    }

    std::fs::create_dir_all(out)?;
    for system in systems {
        println!("\n========== {system} ==========");
        let ctx = inspect::inspect_system(conn, &system)?;

        let ma_one = ctx.get("MA_ONE_IP").unwrap_or_default();
        let date = ctx.get("DATE_TEAR").unwrap_or_default();
        let out_name = format!("ZH-GBase8a集群-{system}系统-[{ma_one}]-月度巡检报告-{date}.json");
        let path = out.join(out_name);
        std::fs::write(&path, ctx.to_json()?)?;
        println!("✅ 报告数据已保存：{}", path.display());
    }
    Ok(())
}

// ── Tests ──
