//! Headless export commands
//!
//! Usage:
//!   osu-export <library.json> <files-dir> list              Show collections and selection
//!   osu-export <library.json> <files-dir> export <format>   Export the selection
//!
//! Formats: beatmap, audio, background, replay
//!
//! Options:
//!   --filter <rule>        Add a filter rule (repeatable)
//!   --output <dir>         Output directory
//!   --compression <level>  Archive compression: fast, normal, best
//!   --ffmpeg <path>        ffmpeg binary used for audio transcoding
//!   --json                 Output in JSON format
//!   --verbose              Debug logging

use std::path::PathBuf;
use std::sync::Arc;

use osu_export_core::{
    CompressionLevel, Config, ExportConfig, ExportFormat, ExportPipeline, ExportReport,
    FfmpegTranscoder, HashedFileStore, JsonLibrarySource, LibrarySource,
};

/// CLI command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    List,
    Export(ExportFormat),
}

/// CLI options
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub library: PathBuf,
    pub files: PathBuf,
    pub filters: Vec<String>,
    pub output: Option<PathBuf>,
    pub compression: Option<CompressionLevel>,
    pub ffmpeg: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a String, String> {
    args.get(i).ok_or_else(|| format!("{} requires a value", flag))
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut positional: Vec<&String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--verbose" | "-v" => options.verbose = true,
            "--filter" | "-f" => {
                i += 1;
                options.filters.push(value_of(args, i, arg)?.clone());
            }
            "--output" | "-o" => {
                i += 1;
                options.output = Some(PathBuf::from(value_of(args, i, arg)?));
            }
            "--compression" => {
                i += 1;
                let level = value_of(args, i, arg)?
                    .parse::<CompressionLevel>()
                    .map_err(|e| e.to_string())?;
                options.compression = Some(level);
            }
            "--ffmpeg" => {
                i += 1;
                options.ffmpeg = Some(PathBuf::from(value_of(args, i, arg)?));
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => positional.push(arg),
        }
        i += 1;
    }

    let (library, files, rest) = match positional.as_slice() {
        [library, files, rest @ ..] => (library, files, rest),
        _ => return Err("Expected <library.json> <files-dir> <command>".to_string()),
    };
    options.library = PathBuf::from(library.as_str());
    options.files = PathBuf::from(files.as_str());

    let command = match rest {
        [cmd] if cmd.as_str() == "list" => CliCommand::List,
        [cmd, format] if cmd.as_str() == "export" => {
            CliCommand::Export(format.parse::<ExportFormat>().map_err(|e| e.to_string())?)
        }
        [cmd] if cmd.as_str() == "export" => {
            return Err("export requires a format: beatmap, audio, background or replay".to_string())
        }
        [] => return Err("No command specified. Use: list or export <format>".to_string()),
        [cmd, ..] => return Err(format!("Unknown command: {}", cmd)),
    };

    Ok((command, options))
}

/// Run CLI command
pub async fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(output) = options.output.clone() {
        config.output_path = output;
    }
    if options.ffmpeg.is_some() {
        config.ffmpeg_path = options.ffmpeg.clone();
    }
    config.filters.extend(options.filters.iter().cloned());

    let mut export_config = ExportConfig::from_config(&config)?;
    if let Some(level) = options.compression {
        export_config = export_config.with_compression(level);
    }
    let library = JsonLibrarySource::new(&options.library).load()?;
    let store = Arc::new(HashedFileStore::new(&options.files));

    let mut pipeline = ExportPipeline::new(library, store, export_config);
    if !options.json {
        pipeline = pipeline.with_progress(Box::new(|p| {
            eprint!("\r  [{:>5.1}%] {:<60.60}", p.percentage(), p.current);
        }));
    }
    pipeline.refresh_selection(|e| eprintln!("Warning: {}", e));

    let format = match command {
        CliCommand::List => {
            print_list(&pipeline, &options);
            return Ok(());
        }
        CliCommand::Export(format) => format,
    };

    let report = match format {
        ExportFormat::Beatmap => pipeline.export_archives()?,
        ExportFormat::Background => pipeline.export_backgrounds()?,
        ExportFormat::Replay => pipeline.export_replays()?,
        ExportFormat::Audio => {
            let transcoder = FfmpegTranscoder::detect(config.ffmpeg_path.clone()).await;
            pipeline
                .export_audio(&transcoder, config.concurrency, |e| {
                    eprintln!("\nWarning: {}", e)
                })
                .await?
        }
    };

    if !options.json && report.total() > 0 {
        eprintln!(); // New line after progress
    }
    print_report(format, &report, &options);

    Ok(())
}

fn print_list(pipeline: &ExportPipeline, options: &CliOptions) {
    let selection = pipeline.selection();

    if options.json {
        let collections: Vec<_> = pipeline
            .collections()
            .entries()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "id": entry.id,
                    "name": entry.name,
                    "beatmaps": entry.beatmap_ids.len(),
                })
            })
            .collect();
        let filters: Vec<_> = pipeline
            .filters()
            .iter()
            .map(|filter| {
                serde_json::json!({
                    "rule": filter.to_string(),
                    "template": filter.template.to_string(),
                })
            })
            .collect();
        let sets: Vec<_> = pipeline
            .selected_sets()
            .map(|selected| {
                serde_json::json!({
                    "set_id": selected.set.online_id,
                    "name": selected.set.generate_folder_name(),
                    "selected": selected.beatmaps.iter().map(|b| b.version.as_str()).collect::<Vec<_>>(),
                    "difficulty_count": selected.set.beatmaps.len(),
                })
            })
            .collect();

        println!(
            "{}",
            serde_json::json!({
                "summary": {
                    "sets": selection.set_count(),
                    "beatmaps": selection.beatmap_count(),
                    "library_sets": pipeline.library().sets().len(),
                },
                "filters": filters,
                "collections": collections,
                "sets": sets,
            })
        );
        return;
    }

    let collections = pipeline.collections();
    if collections.is_empty() {
        println!("No collections.");
    } else {
        println!("Collections:");
        for entry in collections.entries() {
            println!(
                "  #{:<4} {} ({} beatmaps)",
                entry.id,
                entry.name,
                entry.beatmap_ids.len()
            );
        }
    }
    println!();

    if !pipeline.filters().is_empty() {
        println!("Filters:");
        for filter in pipeline.filters() {
            println!("  [{}] {}", filter.template, filter);
        }
        println!();
    }

    println!(
        "Selected {} beatmaps in {} of {} sets:",
        selection.beatmap_count(),
        selection.set_count(),
        pipeline.library().sets().len()
    );
    for selected in pipeline.selected_sets() {
        let versions: Vec<_> = selected.beatmaps.iter().map(|b| b.version.as_str()).collect();
        println!(
            "  [{}] {} ({}/{}: {})",
            selected.set.id_or_zero(),
            selected.set.generate_folder_name(),
            selected.beatmaps.len(),
            selected.set.beatmaps.len(),
            versions.join(", ")
        );
    }
}

fn print_report(format: ExportFormat, report: &ExportReport, options: &CliOptions) {
    if options.json {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "unit": f.unit,
                    "message": f.error.to_string(),
                })
            })
            .collect();

        println!(
            "{}",
            serde_json::json!({
                "format": format.to_string(),
                "exported": report.exported,
                "skipped": report.skipped,
                "tagging_warnings": report.tagging_warnings,
                "failures": failures,
            })
        );
    } else {
        println!("{} Export Complete:", format);
        println!("  Exported: {}", report.exported.len());
        println!("  Skipped:  {}", report.skipped);
        println!("  Failed:   {}", report.failures.len());
        if report.tagging_warnings > 0 {
            println!("  Tagging warnings: {}", report.tagging_warnings);
        }

        if report.has_failures() {
            println!();
            println!("Errors:");
            for failure in &report.failures {
                println!("  - {}", failure);
            }
        }
    }
}

/// Print CLI help
pub fn print_help() {
    println!("osu-export v{}", env!("CARGO_PKG_VERSION"));
    println!("Select beatmaps from an osu! library and export them");
    println!();
    println!("USAGE:");
    println!("    osu-export <library.json> <files-dir> <command> [options]");
    println!();
    println!("COMMANDS:");
    println!("    list                        Show collections and the current selection");
    println!("    export <format>             Export the current selection");
    println!();
    println!("FORMATS:");
    println!("    beatmap, osz                One .osz archive per set");
    println!("    audio, mp3                  One tagged .mp3 per distinct track");
    println!("    background, bg              One image per distinct background");
    println!("    replay, osr                 One .osr per score with a replay");
    println!();
    println!("OPTIONS:");
    println!("    --filter, -f <rule>         Add a filter rule (repeatable)");
    println!("    --output, -o <dir>          Output directory");
    println!("    --compression <level>       Archive compression: fast, normal, best");
    println!("    --ffmpeg <path>             ffmpeg binary for audio transcoding");
    println!("    --json                      Output in JSON format");
    println!("    --verbose, -v               Enable debug logging");
    println!("    --help, -h                  Show this help message");
    println!();
    println!("FILTER RULES:");
    println!("    stars 5-6.5, length 90+, bpm 180");
    println!("    mode taiko,mania             status ranked,loved");
    println!("    artist <text>, title <text>, mapper <text>, tag <text>, difficulty <text>");
    println!("    played, unplayed");
    println!("    collection #1,Favorites      collection -all");
    println!("    Prefix a rule with ! to negate it.");
    println!();
    println!("EXAMPLES:");
    println!("    osu-export library.json files list --filter \"collection #2\"");
    println!("    osu-export library.json files export beatmap --filter \"stars 6+\" -o out");
    println!("    osu-export library.json files export audio --filter \"!played\" --json");
}
