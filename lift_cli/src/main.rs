use clap::{Parser, Subcommand};
use lift_core::csv_rollup::{cleanup_processed_wals, wal_to_csv_and_archive};
use lift_core::progress::{exercise_names, session_volumes, weight_history};
use lift_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Voice-driven strength training log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transcript and print the set it describes
    Parse {
        /// Transcript text, e.g. "bench press, 185 pounds, 8 reps"
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,

        /// Print the parsed set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a transcript and log the set to the active session
    Log {
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,
    },

    /// Log a set by hand
    Add {
        #[arg(long)]
        exercise: String,

        /// Weight in pounds
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: i64,
    },

    /// Start a workout session
    Start,

    /// End the active session and write it to the log
    End,

    /// Show the active session
    Status,

    /// List or search the exercise catalog
    Exercises {
        /// Matches exercise names and muscle groups
        query: Option<String>,

        /// Restrict to one muscle group (e.g. chest, lower_back)
        #[arg(long)]
        group: Option<String>,
    },

    /// Show progress for an exercise, or list logged exercises
    Stats {
        exercise: Vec<String>,
    },

    /// List finished sessions, newest first
    History {
        /// Show at most this many sessions
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Roll up WAL sessions to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// Locations of the files under the data directory
struct DataPaths {
    wal_dir: PathBuf,
    state: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            state: wal_dir.join("state.json"),
            wal: wal_dir.join("sessions.wal"),
            csv: data_dir.join("sessions.csv"),
            wal_dir,
        }
    }
}

fn main() -> Result<()> {
    lift_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let errors = get_default_catalog().validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);

    match cli.command {
        Commands::Parse { transcript, json } => cmd_parse(&transcript.join(" "), json),
        Commands::Log { transcript } => cmd_log(&paths, &transcript.join(" "), &config),
        Commands::Add {
            exercise,
            weight,
            reps,
        } => cmd_add(&paths, &exercise, weight, reps),
        Commands::Start => cmd_start(&paths),
        Commands::End => cmd_end(&paths),
        Commands::Status => cmd_status(&paths),
        Commands::Exercises { query, group } => cmd_exercises(query.as_deref(), group.as_deref()),
        Commands::Stats { exercise } => cmd_stats(&paths, &exercise.join(" ")),
        Commands::History { limit } => cmd_history(&paths, limit),
        Commands::Rollup { cleanup } => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_parse(transcript: &str, json: bool) -> Result<()> {
    let candidate = match parse_transcript(transcript, get_default_catalog()) {
        Ok(candidate) => candidate,
        Err(failure) => {
            println!("No match: {}", failure);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string(&candidate)?);
    } else {
        println!("Exercise: {}", candidate.exercise_name);
        println!("Weight:   {} lbs", candidate.weight);
        println!("Reps:     {}", candidate.reps);
    }
    Ok(())
}

fn cmd_log(paths: &DataPaths, transcript: &str, config: &Config) -> Result<()> {
    let candidate = parse_transcript(transcript, get_default_catalog())?;
    tracing::debug!(?candidate, "Parsed transcript");
    if config.voice.require_positive {
        candidate.validate()?;
    }

    let now = chrono::Utc::now();
    let set = WorkoutSet::from((&candidate, now));
    record_set(paths, set)
}

fn cmd_add(paths: &DataPaths, exercise: &str, weight: f64, reps: i64) -> Result<()> {
    // Known exercises are stored under their catalog spelling
    let name = get_default_catalog()
        .find_exercise(exercise)
        .map_or_else(|| exercise.trim().to_string(), |e| e.name.clone());
    if name.is_empty() {
        return Err(Error::Other("Exercise name must not be empty".into()));
    }

    let candidate = ParsedSetCandidate {
        exercise_name: name,
        weight,
        reps,
    };
    candidate.validate()?;

    let now = chrono::Utc::now();
    record_set(paths, WorkoutSet::from((&candidate, now)))
}

fn record_set(paths: &DataPaths, set: WorkoutSet) -> Result<()> {
    let line = format!(
        "{}: {} lbs × {} reps",
        set.exercise_name, set.weight_lbs, set.reps
    );

    let total = TrackerState::update(&paths.state, |state| {
        Ok(state.log_set(set, chrono::Utc::now()).total_sets())
    })?;

    println!("✓ Logged {}", line);
    println!("  Sets this session: {}", total);
    Ok(())
}

fn cmd_start(paths: &DataPaths) -> Result<()> {
    let id = TrackerState::update(&paths.state, |state| {
        Ok(state.start_session(chrono::Utc::now())?.id)
    })?;

    println!("✓ Started session {}", id);
    Ok(())
}

fn cmd_end(paths: &DataPaths) -> Result<()> {
    let now = chrono::Utc::now();

    // WAL first: if the append fails the state is not saved and the session stays active
    let finished = TrackerState::update(&paths.state, |state| {
        let Some(session) = state.finish_session(now) else {
            return Ok(None);
        };
        JsonlSink::new(&paths.wal).append(&session)?;
        Ok(Some(session))
    })?;

    let Some(session) = finished else {
        println!("No active session.");
        return Ok(());
    };

    println!("✓ Session saved!");
    println!("  Duration:  {} min", session.duration(now).num_minutes());
    println!("  Sets:      {}", session.total_sets());
    println!("  Exercises: {}", session.exercise_count());
    Ok(())
}

fn cmd_status(paths: &DataPaths) -> Result<()> {
    let state = TrackerState::load(&paths.state)?;

    let Some(session) = state.active_session else {
        println!("No active session.");
        return Ok(());
    };

    let now = chrono::Utc::now();
    println!("Active session {}", session.id);
    println!("  Started:   {}", session.start_time.to_rfc3339());
    println!("  Duration:  {} min", session.duration(now).num_minutes());
    println!("  Sets:      {}", session.total_sets());
    println!("  Exercises: {}", session.exercise_count());
    for set in &session.sets {
        println!("  → {}: {} lbs × {} reps", set.exercise_name, set.weight_lbs, set.reps);
    }
    Ok(())
}

fn cmd_exercises(query: Option<&str>, group: Option<&str>) -> Result<()> {
    let catalog = get_default_catalog();
    let group = group.map(str::parse::<MuscleGroup>).transpose()?;

    let matches: Vec<_> = catalog
        .search_exercises(query.unwrap_or(""))
        .into_iter()
        .filter(|e| group.map_or(true, |g| e.muscle_group == g))
        .collect();

    if matches.is_empty() {
        println!("No matching exercises.");
        return Ok(());
    }

    for exercise in matches {
        println!("{:<28} {}", exercise.name, exercise.muscle_group);
    }
    Ok(())
}

fn cmd_stats(paths: &DataPaths, exercise: &str) -> Result<()> {
    let mut sessions = load_sessions(&paths.wal, &paths.csv)?;
    if let Some(active) = TrackerState::load(&paths.state)?.active_session {
        sessions.push(active);
    }

    if exercise.trim().is_empty() {
        let names = exercise_names(&sessions);
        if names.is_empty() {
            println!("No sets logged yet.");
        }
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let name = get_default_catalog()
        .find_exercise(exercise)
        .map_or_else(|| exercise.trim().to_string(), |e| e.name.clone());

    let progress = exercise_progress(&sessions, &name);
    if progress.total_sets == 0 {
        println!("No sets logged for {}.", name);
        return Ok(());
    }

    println!("{}", name);
    println!("  Max weight:   {} lbs", progress.max_weight);
    println!("  Total volume: {} lbs", progress.total_volume);
    println!("  Total sets:   {}", progress.total_sets);

    println!();
    println!("  Weight history:");
    for (at, weight) in weight_history(&sessions, &name) {
        println!("    {}  {} lbs", at.format("%Y-%m-%d %H:%M"), weight);
    }

    println!();
    println!("  Volume per session:");
    for volume in session_volumes(&sessions, &name) {
        println!(
            "    {}  {} lbs",
            volume.start_time.format("%Y-%m-%d"),
            volume.volume
        );
    }
    Ok(())
}

fn cmd_history(paths: &DataPaths, limit: usize) -> Result<()> {
    let sessions = load_sessions(&paths.wal, &paths.csv)?;
    if sessions.is_empty() {
        println!("No finished sessions yet.");
        return Ok(());
    }

    let now = chrono::Utc::now();
    for (i, session) in sessions.iter().take(limit).enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{}  ({} min)",
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.duration(now).num_minutes()
        );
        println!(
            "  Sets: {}  Exercises: {}",
            session.total_sets(),
            session.exercise_count()
        );
        let names = session.exercise_names();
        if !names.is_empty() {
            println!("  {}", names.join(", "));
        }
    }

    if sessions.len() > limit {
        println!();
        println!("... {} older sessions", sessions.len() - limit);
    }
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}
