// Batch stat processor entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so the leaderboard stays clean on stdout)
// 2. Load config
// 3. Collect CSV files (command-line args, or every *.csv in the games dir)
// 4. Ingest each file into the in-memory store
// 5. Write season_totals.csv and leaderboard.json to the output dir
// 6. Print the leaderboard

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use stat_tracker::config::{self, Config};
use stat_tracker::ingest;
use stat_tracker::model::UploadMeta;
use stat_tracker::report;
use stat_tracker::store::{LeaderboardFilter, StatStore};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Stat tracker starting up");

    // 2. Load config
    let config = Config::load(Path::new(config::DEFAULT_CONFIG_PATH))
        .context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season={}",
        config.league, config.season
    );

    // 3. Collect CSV files
    let files = collect_files(&config)?;
    if files.is_empty() {
        bail!(
            "no CSV files to process (pass paths as arguments or drop files in {})",
            config.games_dir.display()
        );
    }
    info!("Processing {} file(s)", files.len());

    // 4. Ingest each file
    let store = StatStore::new();
    let mut failed = 0usize;
    for path in &files {
        if let Err(e) = process_file(&store, &config, path) {
            warn!("Skipping {}: {:#}", path.display(), e);
            failed += 1;
        }
    }
    if failed == files.len() {
        bail!("all {} file(s) failed to ingest", failed);
    }

    // 5. Write outputs
    let totals = store.query(&LeaderboardFilter {
        league: Some(config.league.clone()),
        season: Some(config.season.clone()),
        team: None,
    });

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output dir {}",
            config.output_dir.display()
        )
    })?;

    let csv_path = config.output_dir.join("season_totals.csv");
    let csv_file = std::fs::File::create(&csv_path)
        .with_context(|| format!("failed to create {}", csv_path.display()))?;
    report::write_totals_csv(csv_file, &totals)?;
    info!("Wrote {}", csv_path.display());

    let json_path = config.output_dir.join("leaderboard.json");
    let json_file = std::fs::File::create(&json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    report::write_leaderboard_json(json_file, &totals)?;
    info!("Wrote {}", json_path.display());

    // 6. Print the leaderboard
    println!(
        "\n{} {} season leaderboard ({} players, {} games)\n",
        config.league,
        config.season,
        totals.len(),
        store.games(Some(&config.league), Some(&config.season)).len()
    );
    print!("{}", report::format_leaderboard(&totals));

    Ok(())
}

/// Ingest one CSV file: read bytes, derive the game date from the filename,
/// run the pipeline, and log the per-file summary.
fn process_file(store: &StatStore, config: &Config, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let meta = UploadMeta {
        league: config.league.clone(),
        season: config.season.clone(),
        date: date_from_filename(path).unwrap_or_else(|| Utc::now().date_naive()),
        home_team: None,
        away_team: None,
    };

    let summary = ingest::ingest(store, &bytes, &meta)
        .with_context(|| format!("ingestion failed for {}", path.display()))?;

    info!(
        "{}: game {} ({} vs {}, {}-{}), {} rows ingested, {} skipped",
        path.display(),
        summary.game_id,
        summary.home_team.name,
        summary.away_team.name,
        summary.home_score,
        summary.away_score,
        summary.rows_ingested,
        summary.rows_skipped,
    );
    for w in &summary.warnings {
        warn!("{}: {}", path.display(), w);
    }
    for e in &summary.errors {
        warn!("{}: line {}: {}", path.display(), e.row, e.reason);
    }

    // Advisory only: an earlier game with the same date and team pairing
    // suggests the same file was processed twice.
    if let Some(earlier) = store.find_duplicate_game(
        meta.date,
        &meta.league,
        &meta.season,
        &summary.home_team.name,
        &summary.away_team.name,
    ) {
        if earlier.id != summary.game_id {
            warn!(
                "{}: possible duplicate of game {} ({} vs {} on {}); totals now count both",
                path.display(),
                earlier.id,
                earlier.home_team,
                earlier.away_team,
                earlier.date,
            );
        }
    }

    Ok(())
}

/// CSV paths from the command line, or every `*.csv` under the configured
/// games dir (sorted by name) when no arguments are given.
fn collect_files(config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if !args.is_empty() {
        return Ok(args);
    }

    let dir = &config.games_dir;
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read games dir {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Game date from a `YYYY-MM-DD` filename prefix (e.g. `2025-06-14_tigers.csv`).
fn date_from_filename(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let prefix = stem.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Initialize tracing to stderr so stdout carries only the leaderboard.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stat_tracker=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
