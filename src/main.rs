use log::{error, info, warn};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use weft::{
    ConversionConfig, Converter, FilesystemEmitter, FilesystemResourceProvider,
    PipelineError, ResourceImageLoader, Severity, SnapshotError, SnapshotProvider,
};

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn usage(program: &str) -> ! {
    eprintln!("Converts a measured box-tree snapshot into Android layouts and resources.");
    eprintln!();
    eprintln!(
        "Usage: {} <path/to/snapshot.json> <output/dir> [path/to/config.json]",
        program
    );
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see every classification decision.");
    std::process::exit(1);
}

fn run(snapshot_path: &Path, out_dir: &Path, config_path: Option<&Path>) -> Result<bool, CliError> {
    let config = match config_path {
        Some(path) => ConversionConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => ConversionConfig::default(),
    };

    info!("Loading snapshot from {}", snapshot_path.display());
    let provider = SnapshotProvider::from_reader(fs::File::open(snapshot_path)?)?;

    // Image paths in a snapshot are relative to the snapshot itself.
    let asset_root = snapshot_path.parent().unwrap_or(Path::new("."));
    let assets = Arc::new(FilesystemResourceProvider::new(asset_root));
    let converter = Converter::builder()
        .with_config(config)
        .with_image_loader(Arc::new(ResourceImageLoader::new(assets)))
        .build()?;

    let output = converter.convert_blocking(&provider)?;
    for diagnostic in output.diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => error!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Info => info!("{}", diagnostic),
        }
    }

    fs::create_dir_all(out_dir)?;
    let written = output.emit(&FilesystemEmitter::new(out_dir))?;
    info!(
        "Wrote {} file(s) for {} document(s) to {}",
        written,
        output.documents.len(),
        out_dir.display()
    );
    Ok(!output.diagnostics.has_errors())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        usage(args.first().map(String::as_str).unwrap_or("weft"));
    }
    let config_path = args.get(3).map(Path::new);

    match run(Path::new(&args[1]), Path::new(&args[2]), config_path) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
