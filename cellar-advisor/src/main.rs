//! cellar-advisor - readiness and recommendation CLI
//!
//! Reads an inventory JSON file, resolves structural profiles through the
//! provider chain (SQLite cache, optional AI generator, heuristic) and prints
//! results as JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cellar_advisor::services::recommender::{
    Candidate, RecommendationConstraints, RecommendationContext,
};
use cellar_advisor::services::{
    classify_wine, plan_courses, Course, HttpProfileGenerator, PairingBottle, ProfileChain,
    ProfileGenerator, RecommendationService, ServiceSettings,
};
use cellar_advisor::stores::{SqliteConsumptionHistory, SqliteProfileCache, SqliteRotationStore};
use cellar_advisor::validators::{validate_family, ClassifiedBottle};
use cellar_advisor::{RandomSource, ReadinessContext, SeededRandom, ThreadRandom};
use cellar_common::config::{load_config, RootFolderInitializer, RootFolderResolver, TomlConfig};
use cellar_common::models::{InventoryBottle, ReadinessVerdict, StructuralProfile, Wine};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for cellar-advisor
#[derive(Parser, Debug)]
#[command(name = "cellar-advisor")]
#[command(about = "Wine readiness and recommendation engine")]
#[command(version)]
struct Args {
    /// Config file (overrides CELLAR_CONFIG and the default location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data folder holding cellar.db
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Classify as of this year instead of the current one
    #[arg(long, global = true)]
    year: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a readiness verdict for every bottle
    Classify {
        #[arg(long)]
        inventory: PathBuf,
    },

    /// Check readiness ordering across vintages of each wine
    Validate {
        #[arg(long)]
        inventory: PathBuf,
    },

    /// Recommend bottles for an occasion
    Recommend {
        #[arg(long)]
        inventory: PathBuf,
        #[arg(long)]
        meal: Option<String>,
        #[arg(long)]
        occasion: Option<String>,
        #[arg(long)]
        vibe: Option<String>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        ready_only: bool,
        /// Shortlist size (defaults to advisor.top_k)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        top_k: Option<u64>,
        #[arg(long, default_value = "default")]
        user: String,
        /// Seed the score jitter for a reproducible ranking
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record that a bottle was opened
    Opened {
        #[arg(long)]
        bottle: String,
        #[arg(long, default_value = "default")]
        user: String,
    },

    /// Plan one bottle per course
    Pair {
        #[arg(long)]
        inventory: PathBuf,
        #[arg(long)]
        courses: PathBuf,
    },
}

#[derive(Serialize)]
struct ClassifiedOutput {
    bottle_id: String,
    wine: String,
    vintage: Option<i32>,
    profile_source: &'static str,
    profile: StructuralProfile,
    verdict: ReadinessVerdict,
}

/// A bottle with its wine record, resolved profile and verdict
struct Evaluated {
    bottle: InventoryBottle,
    wine: Wine,
    provider: &'static str,
    verdict: ReadinessVerdict,
}

impl Evaluated {
    fn bottle_id(&self) -> String {
        self.bottle.id.clone().unwrap_or_else(|| self.wine.id.clone())
    }

    fn profile(&self) -> Option<&StructuralProfile> {
        self.wine.profile.as_ref()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config);

    info!("Starting cellar-advisor v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_toml_value(config.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = cellar_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let ctx = match args.year {
        Some(year) => ReadinessContext::for_year(year),
        None => ReadinessContext::now(),
    };

    match args.command {
        Command::Classify { inventory } => {
            let chain = build_chain(&config, &pool);
            let evaluated = evaluate(&chain, read_inventory(&inventory)?, &ctx).await;
            let output: Vec<ClassifiedOutput> = evaluated
                .into_iter()
                .filter_map(|e| {
                    let profile = e.profile().cloned()?;
                    Some(ClassifiedOutput {
                        bottle_id: e.bottle_id(),
                        wine: e.wine.display_name(),
                        vintage: e.wine.vintage,
                        profile_source: e.provider,
                        profile,
                        verdict: e.verdict,
                    })
                })
                .collect();
            print_json(&output)?;
        }

        Command::Validate { inventory } => {
            let chain = build_chain(&config, &pool);
            let evaluated = evaluate(&chain, read_inventory(&inventory)?, &ctx).await;
            let classified: Vec<ClassifiedBottle> = evaluated
                .into_iter()
                .map(|e| ClassifiedBottle {
                    bottle_id: Some(e.bottle_id()),
                    producer: e.wine.producer,
                    name: e.wine.name,
                    vintage: e.wine.vintage,
                    verdict: e.verdict,
                })
                .collect();
            let report = validate_family(&classified);
            if !report.valid {
                warn!(issues = report.issues.len(), "Vintage inversions found");
            }
            print_json(&report)?;
        }

        Command::Recommend {
            inventory,
            meal,
            occasion,
            vibe,
            max_price,
            ready_only,
            top_k,
            user,
            seed,
        } => {
            let chain = build_chain(&config, &pool);
            let evaluated = evaluate(&chain, read_inventory(&inventory)?, &ctx).await;
            let candidates: Vec<Candidate> = evaluated
                .into_iter()
                .map(|e| Candidate::from_bottle(&e.bottle, e.verdict))
                .collect();

            let context = RecommendationContext {
                meal_type: meal,
                occasion,
                vibe,
                constraints: RecommendationConstraints {
                    max_price,
                    prefer_ready_only: ready_only,
                },
            };

            let mut settings = ServiceSettings::from(&config.advisor);
            if let Some(k) = top_k {
                settings.top_k = usize::try_from(k).unwrap_or(usize::MAX);
            }
            let service = RecommendationService::new(
                Arc::new(SqliteConsumptionHistory::new(pool.clone())),
                Arc::new(SqliteRotationStore::new(pool.clone())),
                settings,
            );

            let mut rng: Box<dyn RandomSource + Send> = match seed {
                Some(seed) => Box::new(SeededRandom::new(seed)),
                None => Box::new(ThreadRandom),
            };
            let recommendation = service
                .recommend_for(&user, &context, candidates, rng.as_mut())
                .await;
            print_json(&recommendation)?;
        }

        Command::Opened { bottle, user } => {
            let service = RecommendationService::new(
                Arc::new(SqliteConsumptionHistory::new(pool.clone())),
                Arc::new(SqliteRotationStore::new(pool.clone())),
                ServiceSettings::from(&config.advisor),
            );
            service
                .record_opened(&user, &bottle)
                .await
                .context("Failed to record consumption")?;
            info!(user = %user, bottle = %bottle, "Consumption recorded");
        }

        Command::Pair { inventory, courses } => {
            let chain = build_chain(&config, &pool);
            let evaluated = evaluate(&chain, read_inventory(&inventory)?, &ctx).await;
            let bottles: Vec<PairingBottle> = evaluated
                .iter()
                .filter(|e| e.bottle.quantity > 0)
                .filter_map(|e| {
                    Some(PairingBottle {
                        bottle_id: e.bottle_id(),
                        name: e.wine.display_name(),
                        profile: e.profile()?.clone(),
                    })
                })
                .collect();
            let courses: Vec<Course> = read_json(&courses)?;
            print_json(&plan_courses(&courses, &bottles))?;
        }
    }

    pool.close().await;
    Ok(())
}

fn init_tracing(config: &TomlConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_chain(config: &TomlConfig, pool: &SqlitePool) -> ProfileChain {
    let generator: Option<Arc<dyn ProfileGenerator>> =
        match HttpProfileGenerator::from_settings(&config.ai) {
            Ok(Some(client)) => Some(Arc::new(client) as Arc<dyn ProfileGenerator>),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "AI profile generator disabled");
                None
            }
        };

    ProfileChain::new(
        Arc::new(SqliteProfileCache::new(pool.clone())),
        generator,
        config.advisor.profile_max_age_days,
        config.ai.timeout_ms,
    )
}

/// Resolve a profile and classify readiness for every bottle
async fn evaluate(
    chain: &ProfileChain,
    bottles: Vec<InventoryBottle>,
    ctx: &ReadinessContext,
) -> Vec<Evaluated> {
    let mut evaluated = Vec::with_capacity(bottles.len());
    for bottle in bottles {
        let mut wine = bottle.to_wine();
        let resolved = chain.resolve(&wine).await;
        wine.profile = Some(resolved.profile);
        let verdict = classify_wine(&wine, ctx);
        evaluated.push(Evaluated {
            bottle,
            wine,
            provider: resolved.provider,
            verdict,
        });
    }
    evaluated
}

fn read_inventory(path: &Path) -> Result<Vec<InventoryBottle>> {
    let bottles: Vec<InventoryBottle> = read_json(path)?;
    info!(bottles = bottles.len(), "Inventory loaded from {}", path.display());
    Ok(bottles)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("cellar-advisor").chain(args.iter().copied()))
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let result = parse(&["recommend", "--inventory", "cellar.json", "--top-k", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_positive_top_k_accepted() {
        let args = parse(&["recommend", "--inventory", "cellar.json", "--top-k", "5"]).unwrap();
        match args.command {
            Command::Recommend { top_k, .. } => assert_eq!(top_k, Some(5)),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
