use std::path::{Path, PathBuf};

use cellmerge_tools::address::CellAddress;
use cellmerge_tools::mapping::{MappingEditor, MappingStore};
use cellmerge_tools::merge::{self, MergeEvent, MergeJob, OutputNaming};
use cellmerge_tools::model::HeaderEntry;
use cellmerge_tools::{Result, ToolError, logging};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

const DEFAULT_MAPPING: &str = "default";

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("error: {error}");
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge(args) => execute_merge(&cli.config_dir, args),
        Command::Mapping { action } => execute_mapping(&cli.config_dir, action),
    }
}

fn execute_merge(config_dir: &Path, args: MergeArgs) -> Result<()> {
    if !args.source.is_dir() {
        return Err(ToolError::MissingInput(args.source));
    }

    let (store, default_mapping) = MappingStore::initialize(config_dir, DEFAULT_MAPPING)?;
    let name = store.resolve_selected(args.mapping.as_deref(), DEFAULT_MAPPING)?;
    let mapping = if name == DEFAULT_MAPPING {
        default_mapping
    } else {
        store.load(&name)?
    };
    info!(mapping = %name, "mapping selected");
    let naming = OutputNaming {
        merged_marker: args.merged_marker,
        unit_marker: args.unit_marker,
        ..OutputNaming::default()
    };
    let job = MergeJob::new(&args.source, &args.output, mapping).with_naming(naming);

    let mut report = |event: &MergeEvent| match event {
        MergeEvent::Status(status) => info!(
            file = %status.file_name,
            progress = %format!("{}/{}", status.processed, status.total),
            remaining = %merge::format_hms(status.remaining),
            "processed file"
        ),
        MergeEvent::Progress { percent } => debug!(percent, "progress"),
        MergeEvent::Started { .. } | MergeEvent::FileFailed(_) | MergeEvent::Finished { .. } => {}
    };
    let result = job.run(&mut report)?;
    store.remember_selected(&name)?;

    println!("{}", result.output_path.display());
    println!("rows: {}", result.row_count);
    if !result.failures.is_empty() {
        println!("skipped: {}", result.failures.len());
    }
    Ok(())
}

fn execute_mapping(config_dir: &Path, action: MappingAction) -> Result<()> {
    std::fs::create_dir_all(config_dir)?;
    let store = MappingStore::open(config_dir);

    match action {
        MappingAction::List => {
            for name in store.list()? {
                println!("{name}");
            }
        }
        MappingAction::Show { name } => {
            let mapping = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&mapping)?);
        }
        MappingAction::New { name } => {
            store.create(&name)?;
            store.remember_selected(&name)?;
            info!(%name, "mapping created");
        }
        MappingAction::Add { name, header, cell } => {
            let address: CellAddress = cell.parse()?;
            let mut editor = MappingEditor::new(store.load(&name)?);
            editor.push_entry(HeaderEntry::new(header, address.to_string()));
            store.save(editor.mapping(), &name)?;
        }
        MappingAction::RemoveLast { name } => {
            let mut editor = MappingEditor::new(store.load(&name)?);
            match editor.remove_last() {
                Some(entry) => {
                    store.save(editor.mapping(), &name)?;
                    info!(header = %entry.name, cell = %entry.cell, "entry removed");
                }
                None => warn!(%name, "mapping has no entries"),
            }
        }
        MappingAction::Rename { old, new } => {
            if store.rename(&old, &new)? {
                store.remember_selected(&new)?;
                info!(%old, %new, "mapping renamed");
            } else {
                return Err(ToolError::NotFound(old));
            }
        }
        MappingAction::Import { path, force } => {
            let name = if force {
                store.import_from(&path)?
            } else {
                store.import_new(&path)?
            };
            store.remember_selected(&name)?;
            info!(%name, "mapping imported");
        }
        MappingAction::Export { name, path } => {
            store.export_to(&name, &path)?;
            info!(%name, destination = %path.display(), "mapping exported");
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    name = "cellmerge",
    author,
    version,
    about = "Merge single-record spreadsheets into one table using a header → cell mapping."
)]
struct Cli {
    /// Directory holding the mapping records.
    #[arg(long, global = true, default_value = "configs")]
    config_dir: PathBuf,

    /// Increase log verbosity (repeatable). `RUST_LOG` overrides it.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every workbook of a directory into a single workbook.
    Merge(MergeArgs),
    /// Manage mapping records.
    Mapping {
        #[command(subcommand)]
        action: MappingAction,
    },
}

#[derive(clap::Args)]
struct MergeArgs {
    /// Directory containing the input workbooks.
    #[arg(long)]
    source: PathBuf,

    /// Directory receiving the merged workbook.
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Mapping record to apply. Defaults to the mapping used last, or
    /// `default` when that one no longer exists.
    #[arg(long)]
    mapping: Option<String>,

    /// Marker placed after the folder name in the output file name.
    #[arg(long, default_value = "merged")]
    merged_marker: String,

    /// Marker placed after the row count in the output file name.
    #[arg(long, default_value = "rows")]
    unit_marker: String,
}

#[derive(Subcommand)]
enum MappingAction {
    /// List mapping records.
    List,
    /// Print a mapping record.
    Show { name: String },
    /// Create an empty mapping record.
    New { name: String },
    /// Append a header → cell entry.
    Add {
        name: String,
        #[arg(long)]
        header: String,
        #[arg(long)]
        cell: String,
    },
    /// Drop the last entry.
    RemoveLast { name: String },
    /// Rename a mapping record; the target must not exist.
    Rename { old: String, new: String },
    /// Copy an external record into the mapping directory.
    Import {
        path: PathBuf,
        /// Replace a record that already has the same name.
        #[arg(long)]
        force: bool,
    },
    /// Copy a mapping record to an external path.
    Export { name: String, path: PathBuf },
}
