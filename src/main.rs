//! # Delve Command Line
//!
//! Generates, inspects and batch-scores dungeon maps.

use clap::{Args as ClapArgs, Parser, Subcommand};
use delve::{
    create_rng, load_from_path, save_to_path, CandidateSearch, DelveError, DelveResult,
    DungeonGenerator, GeneratedMap, GenerationConfig, Generator, GraphValidator, Map, MapKind,
    QualityAnalyzer, QualityReport, SpacingScope, ValidationReport, ValidatorOptions,
};
use log::{error, info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon layouts with validation and quality scoring")]
#[command(version)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Only check spacing between connected regions
    #[arg(long, global = true)]
    connected_spacing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one map and report on it
    Generate {
        #[command(flatten)]
        map: MapArgs,

        /// Write the map as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Retry with derived seeds up to N times until the map validates
        #[arg(long)]
        search: Option<u32>,
    },
    /// Load a map from JSON, validate and score it
    Inspect {
        /// Path to a map JSON file
        file: PathBuf,
    },
    /// Generate many maps in parallel and print a score table
    Batch {
        #[command(flatten)]
        map: MapArgs,

        /// Number of maps to generate
        #[arg(short, long, default_value_t = 8)]
        count: u32,
    },
}

#[derive(ClapArgs, Debug)]
struct MapArgs {
    /// Random seed for generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map flavour (dungeon, cave or tower)
    #[arg(long, default_value = "dungeon")]
    kind: MapKind,

    #[arg(long, default_value_t = 1200)]
    width: u32,

    #[arg(long, default_value_t = 1200)]
    height: u32,

    /// Number of regions to place
    #[arg(long, default_value_t = 8)]
    rooms: usize,

    #[arg(long, default_value_t = 100)]
    min_size: u32,

    #[arg(long, default_value_t = 220)]
    max_size: u32,

    #[arg(long, default_value_t = 3)]
    difficulty: u32,

    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Shortcuts added per region (0.0 to 1.0)
    #[arg(long, default_value_t = 0.15)]
    shortcuts: f64,
}

impl MapArgs {
    fn to_config(&self) -> GenerationConfig {
        GenerationConfig {
            kind: self.kind,
            width: self.width,
            height: self.height,
            room_count: self.rooms,
            min_room_size: self.min_size,
            max_room_size: self.max_size,
            difficulty: self.difficulty,
            level: self.level,
            extra_connection_chance: self.shortcuts,
            ..GenerationConfig::new(self.seed.unwrap_or_else(rand::random))
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> DelveResult<()> {
    let validator = GraphValidator::with_options(ValidatorOptions {
        spacing_scope: if args.connected_spacing {
            SpacingScope::ConnectedPairs
        } else {
            SpacingScope::AllPairs
        },
    });

    match args.command {
        Command::Generate {
            map,
            output,
            search,
        } => run_generate(&map.to_config(), output, search, validator),
        Command::Inspect { file } => run_inspect(file, &validator),
        Command::Batch { map, count } => run_batch(map.to_config(), count, validator).await,
    }
}

/// Initializes the logging system based on the specified log level.
///
/// `RUST_LOG` still overrides the level when set.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .init();
}

fn run_generate(
    config: &GenerationConfig,
    output: Option<PathBuf>,
    search: Option<u32>,
    validator: GraphValidator,
) -> DelveResult<()> {
    let generator = DungeonGenerator::new().with_validator(validator);

    let (generated, quality) = match search {
        Some(attempts) => {
            let outcome = CandidateSearch::new(attempts)
                .with_generator(generator)
                .search(config)?;
            println!("Search ran {} attempts", outcome.attempts);
            (outcome.best, outcome.quality)
        }
        None => {
            let mut rng = create_rng(config);
            let generated = generator.generate(config, &mut rng)?;
            let quality = QualityAnalyzer::new().analyze(&generated.map);
            (generated, quality)
        }
    };

    print_generated(&generated);
    print_report(&generated.validation, &quality);

    if let Some(path) = output {
        save_to_path(&generated.map, &path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_inspect(file: PathBuf, validator: &GraphValidator) -> DelveResult<()> {
    let map = load_from_path(&file)?;
    print_map(&map);

    let validation = validator.validate(&map);
    let quality = QualityAnalyzer::new().analyze(&map);
    print_report(&validation, &quality);
    Ok(())
}

/// Each map is built on the blocking pool with its own generator state.
async fn run_batch(
    config: GenerationConfig,
    count: u32,
    validator: GraphValidator,
) -> DelveResult<()> {
    let mut tasks = Vec::with_capacity(count as usize);

    for index in 0..count {
        let config = config.with_seed(config.seed.wrapping_add(u64::from(index)));
        let validator = validator.clone();

        tasks.push(tokio::task::spawn_blocking(move || {
            let mut rng = create_rng(&config);
            let generated = DungeonGenerator::new()
                .with_validator(validator)
                .generate(&config, &mut rng)?;
            let quality = QualityAnalyzer::new().analyze(&generated.map);
            Ok::<_, DelveError>((generated, quality))
        }));
    }

    println!(
        "{:>20}  {:>7}  {:>6}  {:>8}  {:>7}  {:>5}",
        "seed", "regions", "errors", "warnings", "score", "grade"
    );

    for task in tasks {
        let (generated, quality) = task
            .await
            .map_err(|e| DelveError::GenerationFailed(format!("batch task failed: {}", e)))??;
        println!(
            "{:>20}  {:>7}  {:>6}  {:>8}  {:>7.1}  {:>5}",
            generated.seed,
            generated.map.regions().len(),
            generated.validation.errors().count(),
            generated.validation.warnings().count(),
            quality.overall,
            quality.grade()
        );
    }
    Ok(())
}

fn print_generated(generated: &GeneratedMap) {
    println!("{}", generated);
    for warning in &generated.warnings {
        println!("  warning: {}", warning);
    }
    print_map(&generated.map);
}

fn print_map(map: &Map) {
    let stats = map.statistics();
    println!(
        "{} [{}x{}] level {} difficulty {}",
        map.name(),
        map.size().width,
        map.size().height,
        map.level(),
        map.difficulty()
    );
    println!(
        "  density {:.3}, connectivity {:.3}, complexity {:.2}, corridors {:.0}",
        stats.density, stats.connectivity_ratio, stats.complexity, stats.total_corridor_length
    );
    for region in map.regions() {
        println!(
            "  {:>4} {:<20} {:>4},{:<4} {:>3}x{:<3} difficulty {}",
            region.id.to_string(),
            region.name,
            region.rect.x,
            region.rect.y,
            region.rect.width,
            region.rect.height,
            region.difficulty
        );
    }
    for conn in map.connections() {
        println!(
            "  {:>4} {} -> {} ({})",
            conn.id.to_string(),
            conn.source,
            conn.target,
            conn.kind
        );
    }
}

fn print_report(validation: &ValidationReport, quality: &QualityReport) {
    println!("Validation: {}", validation);
    println!("Quality: {}", quality);
}
