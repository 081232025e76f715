use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use teeshot_contracts::events::{now_utc_iso, EventKind, EventWriter};
use teeshot_contracts::prompts::build_prompt;
use teeshot_contracts::runs::summary::{write_summary, RunSummary};
use teeshot_contracts::shell::{parse_command, shell_help_lines, DownloadTarget, ShellCommand};
use teeshot_contracts::{DataUrl, DownloadSize, ImageSource, ShirtColor, ShotType, CATALOG};
use teeshot_engine::artifacts::save_run_artifacts;
use teeshot_engine::config::load_dotenv;
use teeshot_engine::export::{ExportFormat, DOWNLOAD_ALL_PAUSE};
use teeshot_engine::state::Phase;
use teeshot_engine::{
    compose_collage, default_generator_registry, resize_and_save, AppState, BulkObserver,
    DirectorySink, ExportOutcome, GenerationError, GeneratorConfig, GeneratorRegistry,
    MockupGenerator, Session, UploadedImage,
};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "teeshot", version, about = "AI t-shirt mockup generator")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the shirt color catalog.
    Colors,
    /// Print the prompt sent for one color.
    Prompt(PromptArgs),
    /// Generate mockups for a set of colors in one run.
    Generate(GenerateArgs),
    /// Compose a collage from at least five images.
    Collage(CollageArgs),
    /// Resize one image to a square download.
    Resize(ResizeArgs),
    /// Interactive shell over the same state as the web UI.
    Shell(ShellArgs),
}

#[derive(Debug, Args)]
struct PromptArgs {
    #[arg(long)]
    color: ShirtColor,
    #[arg(long, default_value = "full")]
    shot: ShotType,
}

#[derive(Debug, Args)]
struct GeneratorArgs {
    #[arg(long, default_value = "gemini")]
    provider: String,
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long = "color", required_unless_present = "all_colors")]
    colors: Vec<ShirtColor>,
    #[arg(long, conflicts_with = "colors")]
    all_colors: bool,
    #[arg(long, default_value = "full")]
    shot: ShotType,
    #[arg(long, default_value = "2048")]
    size: DownloadSize,
    #[command(flatten)]
    generator: GeneratorArgs,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CollageArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ResizeArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    size: u32,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    jpeg: bool,
}

#[derive(Debug, Args)]
struct ShellArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[command(flatten)]
    generator: GeneratorArgs,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("teeshot error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    load_dotenv(Path::new(".env"))?;
    match cli.command {
        Command::Colors => {
            print_colors();
            Ok(0)
        }
        Command::Prompt(args) => {
            println!("{}", build_prompt(args.color, args.shot));
            Ok(0)
        }
        Command::Generate(args) => run_generate(args),
        Command::Collage(args) => run_collage(args),
        Command::Resize(args) => run_resize(args),
        Command::Shell(args) => {
            run_shell(args)?;
            Ok(0)
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_colors() {
    for color in CATALOG {
        let tone = if color.is_dark() { "dark" } else { "light" };
        println!("{:<12} {:<8} {tone}", color.name(), color.hex());
    }
}

/// Prints one progress line per color as the run advances.
struct ProgressPrinter;

impl BulkObserver for ProgressPrinter {
    fn mockup_started(&mut self, index: usize, total: usize, color: ShirtColor) {
        println!("[{}/{}] Generating {color}...", index + 1, total);
    }

    fn mockup_failed(&mut self, index: usize, color: ShirtColor, error: &GenerationError) {
        println!("[{}] {color} failed: {error}", index + 1);
    }
}

fn resolve_generator<'r>(
    registry: &'r GeneratorRegistry,
    provider: &str,
) -> Result<&'r dyn MockupGenerator> {
    registry
        .resolve(&provider.to_ascii_lowercase())
        .with_context(|| format!("available providers: {}", registry.names().join(", ")))
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let config = GeneratorConfig::from_env().with_model(args.generator.model.clone());
    let registry = default_generator_registry(&config);
    let generator = resolve_generator(&registry, &args.generator.provider)?;
    generate_run(&args, generator, DOWNLOAD_ALL_PAUSE)
}

fn generate_run(
    args: &GenerateArgs,
    generator: &dyn MockupGenerator,
    download_pause: Duration,
) -> Result<i32> {
    let upload = UploadedImage::from_path(&args.image)?;
    let provider = generator.name().to_string();

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let run_id = run_id_for(&args.out);
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let events = EventWriter::new(&events_path, run_id.clone());
    let started_at = now_utc_iso();
    tracing::info!(%run_id, %provider, out = %args.out.display(), "run started");
    events.emit(
        EventKind::RunStarted,
        json_object(json!({
            "out_dir": args.out.to_string_lossy().to_string(),
            "provider": provider,
        })),
    )?;

    let mut state = AppState::new();
    state.upload(upload);
    if args.all_colors {
        state.select_all_colors();
    } else {
        for color in &args.colors {
            if !state.selection().contains(*color) {
                state.toggle_color(*color);
            }
        }
    }
    state.set_shot(args.shot);
    state.set_download_size(args.size);
    let colors = state.selection().sorted();

    let session = Session::new(generator, events).with_download_pause(download_pause);
    session.generate(&mut state, &mut ProgressPrinter)?;

    let mut summary = RunSummary {
        run_id: run_id.clone(),
        started_at,
        finished_at: String::new(),
        shot: args.shot.id().to_string(),
        colors: colors.iter().map(|color| color.name().to_string()).collect(),
        total_mockups: 0,
        collage: None,
        error: state.error().map(str::to_string),
    };
    let summary_path = args.out.join("summary.json");

    let (Some(results), Some(source)) = (state.results(), state.source()) else {
        let message = state.error().unwrap_or("generation produced no results").to_string();
        finish_run(session.events(), &summary_path, summary)?;
        tracing::warn!(%run_id, error = %message, "run failed");
        bail!(message);
    };

    let artifacts = save_run_artifacts(
        &args.out,
        &run_id,
        session.generator(),
        source.encoded(),
        results,
        state.collage(),
    )?;
    for saved in &artifacts.mockups {
        println!("Saved {}", saved.image_path.display());
    }
    summary.total_mockups = artifacts.mockups.len() as u64;
    summary.collage = artifacts
        .collage
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());

    let sink = DirectorySink::new(args.out.join("downloads"));
    let mut outcomes = session.download(&state, DownloadTarget::All, &sink)?;
    if state.collage().is_some() {
        outcomes.extend(session.download(&state, DownloadTarget::Collage, &sink)?);
    }
    for outcome in &outcomes {
        print_outcome(outcome);
    }
    println!("Downloads saved to {}", sink.dir().display());

    let total_mockups = summary.total_mockups;
    finish_run(session.events(), &summary_path, summary)?;
    tracing::info!(%run_id, total_mockups, "run finished");
    Ok(0)
}

fn finish_run(events: &EventWriter, summary_path: &Path, mut summary: RunSummary) -> Result<()> {
    summary.finished_at = now_utc_iso();
    write_summary(summary_path, &summary, None)?;
    events.emit(
        EventKind::RunFinished,
        json_object(json!({
            "summary_path": summary_path.to_string_lossy().to_string(),
        })),
    )?;
    Ok(())
}

fn run_collage(args: CollageArgs) -> Result<i32> {
    let sources: Vec<ImageSource> = args.images.iter().cloned().map(ImageSource::from).collect();
    let collage = compose_collage(&sources)?;
    write_data_url(&args.out, &collage)?;
    println!("Collage written to {}", args.out.display());
    Ok(0)
}

fn run_resize(args: ResizeArgs) -> Result<i32> {
    let format = if args.jpeg {
        ExportFormat::Jpeg
    } else {
        ExportFormat::Png
    };
    let file_name = args
        .name
        .clone()
        .unwrap_or_else(|| default_resize_name(&args.image, args.size, format));
    let sink = DirectorySink::new(&args.out);
    let source = ImageSource::File(args.image.clone());
    let outcome = resize_and_save(&source, args.size, &file_name, format, &sink)?;
    print_outcome(&outcome);
    Ok(0)
}

fn run_shell(args: ShellArgs) -> Result<()> {
    let config = GeneratorConfig::from_env().with_model(args.generator.model.clone());
    let registry = default_generator_registry(&config);
    let generator = resolve_generator(&registry, &args.generator.provider)?;
    let provider = generator.name().to_string();

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let run_id = run_id_for(&args.out);
    let events = EventWriter::new(&events_path, run_id.clone());
    tracing::info!(%run_id, %provider, "shell started");
    events.emit(
        EventKind::RunStarted,
        json_object(json!({
            "out_dir": args.out.to_string_lossy().to_string(),
            "provider": provider,
        })),
    )?;
    let session = Session::new(generator, events);
    let sink = DirectorySink::new(args.out.join("downloads"));
    let mut state = AppState::new();

    let stdin = io::stdin();
    let mut line = String::new();

    println!("Teeshot shell started ({provider}). Type /help for commands.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        match parse_command(input) {
            ShellCommand::Noop => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                for help_line in shell_help_lines() {
                    println!("{help_line}");
                }
            }
            ShellCommand::Colors => print_colors(),
            ShellCommand::Upload(path) => match UploadedImage::from_path(&path) {
                Ok(image) => {
                    println!("Uploaded {} ({})", image.file_name(), image.encoded().mime_type);
                    state.upload(image);
                }
                Err(err) => println!("Upload failed: {err:#}"),
            },
            ShellCommand::ToggleColors(colors) => {
                for color in colors {
                    let selected = state.toggle_color(color);
                    println!("{color}: {}", if selected { "selected" } else { "removed" });
                }
            }
            ShellCommand::SelectAll => {
                state.select_all_colors();
                println!("Selected all {} colors", CATALOG.len());
            }
            ShellCommand::ClearColors => {
                state.clear_colors();
                println!("Selection cleared");
            }
            ShellCommand::Shot(shot) => {
                state.set_shot(shot);
                println!("Shot set to {}", shot.label());
            }
            ShellCommand::Size(size) => {
                state.set_download_size(size);
                println!("Download size set to {}", size.label());
            }
            ShellCommand::Generate => {
                tracing::info!(%run_id, colors = state.selection().len(), "generation requested");
                if let Err(err) = session.generate(&mut state, &mut ProgressPrinter) {
                    println!("{err}");
                    continue;
                }
                print_run_result(&state);
            }
            ShellCommand::Download(target) => match session.download(&state, target, &sink) {
                Ok(outcomes) => {
                    for outcome in &outcomes {
                        print_outcome(outcome);
                    }
                }
                Err(err) => println!("Download failed: {err:#}"),
            },
            ShellCommand::Status => {
                for status_line in status_lines(&state) {
                    println!("{status_line}");
                }
            }
            ShellCommand::Invalid { message, .. } => println!("{message}"),
            ShellCommand::Unknown { command, .. } if command.is_empty() => {
                println!("Commands start with '/'. Type /help for the list.");
            }
            ShellCommand::Unknown { command, .. } => {
                println!("Unknown command /{command}. Type /help for the list.");
            }
        }
    }
    tracing::info!(%run_id, "shell finished");
    Ok(())
}

fn print_run_result(state: &AppState) {
    if let Some(error) = state.error() {
        println!("Error: {error}");
        return;
    }
    let Some(results) = state.results() else {
        return;
    };
    for (index, color) in results.colors.iter().enumerate() {
        println!("  {}. {color}", index + 1);
    }
    if state.collage().is_some() {
        println!("Collage ready (/download collage)");
    }
}

fn status_lines(state: &AppState) -> Vec<String> {
    let source = state
        .source()
        .map(|image| image.file_name().to_string())
        .unwrap_or_else(|| "none".to_string());
    let selected: Vec<&str> = state
        .selection()
        .sorted()
        .into_iter()
        .map(ShirtColor::name)
        .collect();
    let selected = if selected.is_empty() {
        "none".to_string()
    } else {
        selected.join(", ")
    };
    let phase = match state.phase() {
        Phase::Idle => "idle".to_string(),
        Phase::Generating => "generating".to_string(),
        Phase::ShowingResults => format!(
            "{} mockups{}",
            state.results().map(|results| results.len()).unwrap_or(0),
            if state.collage().is_some() { " + collage" } else { "" }
        ),
        Phase::ShowingError => format!("error: {}", state.error().unwrap_or_default()),
    };
    vec![
        format!("Source:   {source}"),
        format!("Colors:   {selected}"),
        format!("Shot:     {}", state.shot().label()),
        format!("Download: {}", state.download_size().label()),
        format!("Status:   {phase}"),
    ]
}

fn print_outcome(outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Resized { path, size } => {
            println!("Saved {} ({size}x{size})", path.display());
        }
        ExportOutcome::FellBackToOriginal { path, reason } => {
            println!("Saved original {} (resize failed: {reason})", path.display());
        }
    }
}

fn default_resize_name(image: &Path, size: u32, format: ExportFormat) -> String {
    let stem = image
        .file_stem()
        .and_then(|value| value.to_str())
        .filter(|value| !value.is_empty())
        .unwrap_or("image");
    format!("{stem}-{size}px.{}", format.extension())
}

fn run_id_for(out_dir: &Path) -> String {
    out_dir
        .file_name()
        .and_then(|value| value.to_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("run-{}", compact_timestamp()))
}

fn write_data_url(path: &Path, image: &DataUrl) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, image.decode()?).with_context(|| format!("failed to write {}", path.display()))
}

fn compact_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

fn json_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use clap::Parser;
    use serde_json::Value;
    use teeshot_contracts::{DataUrl, DownloadSize, EncodedImage, ShirtColor, ShotType};
    use teeshot_engine::dryrun::DryrunGenerator;
    use teeshot_engine::export::ExportFormat;
    use teeshot_engine::{
        default_generator_registry, AppState, GenerationError, GeneratorConfig, MockupGenerator,
        UploadedImage,
    };

    use super::{
        default_resize_name, generate_run, resolve_generator, run_id_for, status_lines, Cli,
        Command, GenerateArgs, GeneratorArgs,
    };

    const PNG_DESIGN: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct NoImageGenerator;

    impl MockupGenerator for NoImageGenerator {
        fn name(&self) -> &str {
            "empty"
        }

        fn generate(
            &self,
            _source: &EncodedImage,
            color: ShirtColor,
            _shot: ShotType,
        ) -> Result<DataUrl, GenerationError> {
            Err(GenerationError::NoImageData { color })
        }
    }

    fn generate_args(image: PathBuf, out: PathBuf, colors: Vec<ShirtColor>) -> GenerateArgs {
        GenerateArgs {
            image,
            colors,
            all_colors: false,
            shot: ShotType::Full,
            size: DownloadSize::Web,
            generator: GeneratorArgs {
                provider: "dryrun".to_string(),
                model: None,
            },
            out,
            events: None,
        }
    }

    fn read_json(path: &Path) -> anyhow::Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn event_types(path: &Path) -> anyhow::Result<Vec<String>> {
        fs::read_to_string(path)?
            .lines()
            .map(|line| {
                let event: Value = serde_json::from_str(line)?;
                Ok(event["type"].as_str().unwrap_or_default().to_string())
            })
            .collect()
    }

    #[test]
    fn generate_args_parse_colors_shot_and_size() {
        let cli = Cli::try_parse_from([
            "teeshot",
            "generate",
            "--image",
            "design.png",
            "--color",
            "blue-jean",
            "--color",
            "Black",
            "--shot",
            "close-up",
            "--size",
            "4096",
            "--provider",
            "dryrun",
            "--out",
            "runs/one",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.colors, vec![ShirtColor::BlueJean, ShirtColor::Black]);
        assert_eq!(args.shot, ShotType::CloseUp);
        assert_eq!(args.size, DownloadSize::Print);
        assert_eq!(args.generator.provider, "dryrun");
    }

    #[test]
    fn generate_requires_colors_or_all_colors() {
        assert!(Cli::try_parse_from(["teeshot", "generate", "--image", "a.png", "--out", "o"]).is_err());
        assert!(Cli::try_parse_from([
            "teeshot",
            "generate",
            "--image",
            "a.png",
            "--out",
            "o",
            "--all-colors"
        ])
        .is_ok());
        assert!(Cli::try_parse_from([
            "teeshot", "generate", "--image", "a.png", "--out", "o", "--color", "teal"
        ])
        .is_err());
    }

    #[test]
    fn resize_name_defaults_to_stem_and_size() {
        assert_eq!(
            default_resize_name(Path::new("art/shirt.webp"), 2048, ExportFormat::Png),
            "shirt-2048px.png"
        );
        assert_eq!(
            default_resize_name(Path::new("art/shirt.png"), 512, ExportFormat::Jpeg),
            "shirt-512px.jpg"
        );
    }

    #[test]
    fn run_id_comes_from_out_dir_name() {
        assert_eq!(run_id_for(Path::new("/tmp/runs/spring-drop")), "spring-drop");
        assert!(run_id_for(Path::new("/")).starts_with("run-"));
    }

    #[test]
    fn status_reports_selection_in_catalog_order() {
        let mut state = AppState::new();
        state.upload(UploadedImage::from_bytes("art.png", b"png", None).expect("upload"));
        state.toggle_color(ShirtColor::White);
        state.toggle_color(ShirtColor::Black);
        let lines = status_lines(&state);
        assert_eq!(lines[0], "Source:   art.png");
        assert_eq!(lines[1], "Colors:   Black, White");
        assert_eq!(lines[4], "Status:   idle");
    }

    #[test]
    fn generate_run_writes_mockups_collage_downloads_and_summary() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("design.png");
        fs::write(&image, PNG_DESIGN)?;
        let out = temp.path().join("spring-drop");
        let colors = vec![
            ShirtColor::White,
            ShirtColor::BlueJean,
            ShirtColor::Black,
            ShirtColor::Moss,
            ShirtColor::Yam,
        ];
        let args = generate_args(image, out.clone(), colors);

        let code = generate_run(&args, &DryrunGenerator::with_side(32), Duration::ZERO)?;
        assert_eq!(code, 0);

        for name in [
            "mockup-01-black.png",
            "mockup-05-blue-jean.png",
            "collage.jpg",
            "downloads/ai-variation-white-2048px.png",
            "downloads/ai-variation-yam-2048px.png",
            "downloads/ai-collage-2048px.jpg",
        ] {
            assert!(out.join(name).is_file(), "missing {name}");
        }

        let summary = read_json(&out.join("summary.json"))?;
        assert_eq!(summary["run_id"], "spring-drop");
        assert_eq!(summary["total_mockups"], 5);
        assert_eq!(
            summary["collage"].as_str(),
            Some(out.join("collage.jpg").to_string_lossy().as_ref())
        );
        assert!(summary["error"].is_null());

        let types = event_types(&out.join("events.jsonl"))?;
        assert_eq!(types.first().map(String::as_str), Some("run_started"));
        assert!(types.iter().any(|kind| kind == "collage_created"));
        assert_eq!(types.last().map(String::as_str), Some("run_finished"));
        Ok(())
    }

    #[test]
    fn failed_generate_run_records_error_in_summary() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("design.png");
        fs::write(&image, PNG_DESIGN)?;
        let out = temp.path().join("broken");
        let args = generate_args(image, out.clone(), vec![ShirtColor::Black]);

        let err = generate_run(&args, &NoImageGenerator, Duration::ZERO).err();
        let message = err.map(|err| err.to_string()).unwrap_or_default();
        assert!(message.contains("No image data found"), "{message}");

        let summary = read_json(&out.join("summary.json"))?;
        assert_eq!(summary["total_mockups"], 0);
        assert!(summary["collage"].is_null());
        assert_eq!(summary["error"].as_str(), Some(message.as_str()));
        assert!(!out.join("mockup-01-black.png").exists());

        let types = event_types(&out.join("events.jsonl"))?;
        assert!(types.iter().any(|kind| kind == "generation_failed"));
        assert_eq!(types.last().map(String::as_str), Some("run_finished"));
        Ok(())
    }

    #[test]
    fn generate_run_refuses_non_image_upload_before_starting() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let image = temp.path().join("notes.txt");
        fs::write(&image, b"not a graphic")?;
        let out = temp.path().join("never");
        let args = generate_args(image, out.clone(), vec![ShirtColor::Black]);

        let err = generate_run(&args, &DryrunGenerator::default(), Duration::ZERO).err();
        let message = err.map(|err| format!("{err:#}")).unwrap_or_default();
        assert!(message.contains("'notes.txt' is not a PNG, JPEG or WEBP image"), "{message}");
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn unknown_provider_lists_available_ones() {
        let registry = default_generator_registry(&GeneratorConfig::default());
        assert!(resolve_generator(&registry, "DRYRUN").is_ok());
        let message = resolve_generator(&registry, "replicate")
            .err()
            .map(|err| format!("{err:#}"))
            .unwrap_or_default();
        assert!(message.starts_with("available providers: dryrun, gemini"), "{message}");
        assert!(message.contains("unknown generation provider 'replicate'"));
    }
}
