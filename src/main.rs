use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use informe::{generate, records_json, InputFile, ProgressSink, Stage};
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "informe")]
#[command(author, version, about = "Genera informes PDF de cambio de uso de suelo")]
struct Args {
    /// Report stage to generate
    #[arg(value_enum)]
    stage: Stage,

    /// Input files or directories (.csv, .dcf, .xlsx)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF path (default: informe-<stage>-<timestamp>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stage name shown in the report title
    #[arg(long)]
    name: Option<String>,

    /// Also dump the parsed records as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Suppress the progress bar and summary lines
    #[arg(short, long)]
    quiet: bool,
}

/// Extensions any stage can consume. Per-stage dispatch happens later.
const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "dcf", "xlsx", "xlsm"];

fn collect_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let supported = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false);
                if supported {
                    files.push(read_input(entry.path())?);
                }
            }
        } else {
            files.push(read_input(path)?);
        }
    }
    Ok(files)
}

fn read_input(path: &std::path::Path) -> anyhow::Result<InputFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("no se pudo leer {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(InputFile::new(name, bytes))
}

fn default_stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Transition => "Etapa 1",
        Stage::Weights => "Etapa 2",
        Stage::Correlation => "Etapa 3",
    }
}

fn stage_slug(stage: Stage) -> &'static str {
    match stage {
        Stage::Transition => "transition",
        Stage::Weights => "weights",
        Stage::Correlation => "correlation",
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        bail!("no se encontraron archivos de entrada (admitidos: csv, dcf, xlsx)");
    }

    if !args.quiet {
        eprintln!("\x1b[1mInforme - Reportes de cambio de uso de suelo\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Encontrado(s) {} archivo(s) de entrada\n", files.len());
    }

    let pb = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    };

    let stage_name = args
        .name
        .clone()
        .unwrap_or_else(|| default_stage_name(args.stage).to_string());

    let mut sink: Box<dyn ProgressSink> = match &pb {
        Some(pb) => {
            let pb = pb.clone();
            Box::new(move |percent: u8| pb.set_position(percent as u64))
        }
        None => Box::new(|_: u8| {}),
    };

    let pdf = generate(args.stage, &files, &stage_name, sink.as_mut())?;
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let output = args.output.clone().unwrap_or_else(|| {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        PathBuf::from(format!("informe-{}-{}.pdf", stage_slug(args.stage), stamp))
    });
    std::fs::write(&output, &pdf)
        .with_context(|| format!("no se pudo escribir {}", output.display()))?;

    if let Some(json_path) = &args.json {
        let json = records_json(args.stage, &files)?;
        std::fs::write(json_path, json)
            .with_context(|| format!("no se pudo escribir {}", json_path.display()))?;
    }

    if !args.quiet {
        eprintln!("Informe generado: {} ({} bytes)", output.display(), pdf.len());
    }
    Ok(())
}
