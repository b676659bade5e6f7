//! sprite-dataset - builds a canonical creature sprite dataset

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sprite_dataset::config::BuildConfig;
use sprite_dataset::dataset::{BuildOptions, DatasetBuilder};
use sprite_dataset::normalize::Normalizer;
use sprite_dataset::sources;
use sprite_dataset::stats::{self, SpriteSets};

#[derive(Parser)]
#[command(name = "sprite-dataset")]
#[command(version)]
#[command(about = "Builds a canonical, de-duplicated sprite dataset from historical sprite archives")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/sprite-dataset/config.json)
    #[arg(short, long, global = true, env = "SPRITE_DATASET_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, canonicalize and normalize sprites into the repository
    Build {
        /// Only build these sources (repeatable, case-insensitive)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Download archives even if a cached copy exists
        #[arg(short, long)]
        force: bool,

        /// Copy images without normalizing them
        #[arg(long)]
        skip_normalize: bool,

        /// Directory for archives and intermediate sprite sets
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Output repository directory
        #[arg(short, long)]
        repository: Option<PathBuf>,
    },

    /// List known sources and their sprite sets
    Sources,

    /// Normalize image files in place
    Normalize {
        /// Images to normalize
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Count repository images per sprite set and entity
    Stats {
        /// Repository directory (default: from config)
        #[arg(short, long)]
        repository: Option<PathBuf>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(if cli.verbose {
                "sprite_dataset=debug".parse()?
            } else {
                "sprite_dataset=warn".parse()?
            }))
            .init();
    }

    let mut config = BuildConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            sources: names,
            force,
            skip_normalize,
            scratch_dir,
            repository,
        } => {
            if let Some(dir) = scratch_dir {
                config.scratch_dir = dir;
            }
            if let Some(dir) = repository {
                config.repository_dir = dir;
            }

            let selected = sources::select_sources(&names)?;

            println!("sprite-dataset build");
            println!("Sources:    {}", selected.len());
            println!("Scratch:    {}", config.scratch_dir.display());
            println!("Repository: {}", config.repository_dir.display());
            println!();

            let builder = DatasetBuilder::new(config)?;
            let options = BuildOptions {
                force_download: force,
                skip_normalize,
            };
            let stats = builder.build(&selected, &options).await?;

            println!("\n=== Build Summary ===");
            println!(
                "Sources: {} built, {} failed",
                stats.sources_built,
                stats.failed_sources.len()
            );
            println!(
                "Images:  {} kept, {} duplicates removed, {} copied",
                stats.images, stats.duplicates_removed, stats.copied
            );
            println!("Time:    {:.1}s", stats.elapsed.as_secs_f64());

            for (name, error) in &stats.failed_sources {
                println!("\n{} failed:\n  {}", name, error);
            }
            for (path, error) in &stats.normalize_failures {
                println!("\nCould not normalize {}:\n  {}", path.display(), error);
            }

            if stats.is_success() {
                println!("\nBuild complete!");
            } else {
                println!("\nSome sources or images failed. Fix issues and run again.");
                std::process::exit(1);
            }
        }

        Commands::Sources => {
            for source in sources::all_sources()? {
                println!("{}", source.name);
                println!("  {}", source.download.description());
                println!("  Archive: {}", source.archive_name);
                for set in &source.sprite_sets {
                    println!("  - {:<28} <- {}/{}", set.name(), set.src, set.glob);
                }
                println!();
            }
        }

        Commands::Normalize { files } => {
            let normalizer = Normalizer::from_config(&config);
            let sprite_sets = known_sprite_sets()?;
            let mut failed = 0;
            for file in &files {
                // Repository files carry their set and entity in the path
                let result = match sprite_sets.classify(file) {
                    Some((entity, set)) => normalizer.normalize_in_set(file, &set, entity),
                    None => normalizer.normalize(file),
                };
                match result {
                    Ok(()) => println!("Normalized {}", file.display()),
                    Err(e) => {
                        eprintln!("Failed {}: {:#}", file.display(), e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} files failed", failed, files.len());
            }
        }

        Commands::Stats { repository, output } => {
            let repository = repository.unwrap_or(config.repository_dir);
            let stats = stats::collect(&repository, &known_sprite_sets()?)?;
            match output {
                Some(path) => {
                    stats.save(&path)?;
                    println!("Wrote stats for {} images to {}", stats.total, path.display());
                }
                None => println!("{}", stats.to_json()?),
            }
        }
    }

    Ok(())
}

/// Sprite set names of every known source
fn known_sprite_sets() -> Result<SpriteSets> {
    let sources = sources::all_sources()?;
    Ok(SpriteSets::new(sources.iter().flat_map(|s| {
        s.sprite_sets.iter().map(|set| set.name().to_string())
    })))
}
