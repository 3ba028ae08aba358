use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::sync::mpsc;

use context_monitor::capture::{FileImportRecorder, MediaKind, MediaRecorder};
use context_monitor::config::AppConfig;
use context_monitor::db::acquire_store_lock;
use context_monitor::symptoms::{find_symptom, symptom_labels, SYMPTOM_OPTIONS};
use context_monitor::{RecordingProgress, RecordingStore, SessionError, SessionTracker};

#[derive(Parser, Debug)]
#[command(author, version, about = "Capture heart-rate video, breathing audio and symptoms into local sessions")]
struct Args {
    /// Path to config file (TOML format); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the progress of the session in progress
    Status,
    /// Attach a heart-rate video to the session
    CaptureVideo {
        /// Existing video file to import
        file: PathBuf,
    },
    /// Attach a respiratory audio clip to the session
    CaptureAudio {
        /// Existing audio file to import
        file: PathBuf,
    },
    /// Record the symptom checklist (replaces any previous selection)
    Symptoms {
        /// Symptom ids, see `catalog`
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove the heart-rate video from the session
    ClearVideo,
    /// Remove the respiratory audio from the session
    ClearAudio,
    /// Save the completed session to history
    Finalize,
    /// List saved sessions, newest first
    History {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the symptom ids that can be recorded
    Catalog,
    /// Delete the session in progress and all history
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(args.config.as_deref())?;
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .format_target(false)
        .init();

    match args.command {
        Command::Catalog => print_catalog(),
        Command::Status => with_tracker(&config, |tracker| print_status(tracker))?,
        Command::CaptureVideo { file } => {
            let mut recorder = FileImportRecorder::new(MediaKind::Video, file);
            with_tracker(&config, |tracker| capture(tracker, &config, &mut recorder))?
        }
        Command::CaptureAudio { file } => {
            let mut recorder = FileImportRecorder::new(MediaKind::Audio, file);
            with_tracker(&config, |tracker| capture(tracker, &config, &mut recorder))?
        }
        Command::Symptoms { ids } => {
            with_tracker(&config, |tracker| record_symptoms(tracker, ids))?
        }
        Command::ClearVideo => with_tracker(&config, |tracker| {
            print_progress(&tracker.clear_heart_rate()?);
            Ok(())
        })?,
        Command::ClearAudio => with_tracker(&config, |tracker| {
            print_progress(&tracker.clear_respiratory()?);
            Ok(())
        })?,
        Command::Finalize => with_tracker(&config, finalize)?,
        Command::History { json } => {
            with_tracker(&config, |tracker| print_history(tracker, json))?
        }
        Command::DeleteAll { yes } => {
            with_tracker(&config, |tracker| delete_all(tracker, yes))?
        }
    }
    Ok(())
}

/// Lock the store, open it and resume the stored draft before running `f`
fn with_tracker<F>(config: &AppConfig, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut SessionTracker<'_>) -> Result<(), Box<dyn std::error::Error>>,
{
    // Held until the command finishes
    let _lock_file = acquire_store_lock(&config.data_dir, &config.db_name)?;
    let store = RecordingStore::open(&config.database_path())?;
    let mut tracker = SessionTracker::new(&store);
    tracker.load()?;
    f(&mut tracker)
}

fn capture(
    tracker: &mut SessionTracker<'_>,
    config: &AppConfig,
    recorder: &mut dyn MediaRecorder,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = recorder.kind();
    let output = config.media_dirs().new_output_path(kind);
    let ticket = tracker.begin_capture(kind);

    let (tx, rx) = mpsc::channel();
    recorder.start(
        &output,
        Box::new(move |path: Option<PathBuf>| {
            // receiver outlives the recorder; a send error only means nobody is listening
            let _ = tx.send(path);
        }),
    )?;
    recorder.stop();

    let path = rx.recv().ok().flatten();
    if tracker.complete_capture(ticket, path.as_deref())? {
        info!("Stored {:?} capture at {}", kind, output.display());
        print_progress(&tracker.progress());
    } else {
        println!("Capture produced no file, nothing changed");
    }
    Ok(())
}

fn record_symptoms(
    tracker: &mut SessionTracker<'_>,
    ids: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(unknown) = ids.iter().find(|id| find_symptom(id).is_none()) {
        return Err(format!("Unknown symptom id '{}' (see `catalog`)", unknown).into());
    }
    print_progress(&tracker.record_symptoms(ids)?);
    Ok(())
}

fn finalize(tracker: &mut SessionTracker<'_>) -> Result<(), Box<dyn std::error::Error>> {
    match tracker.finalize() {
        Ok(history_id) => {
            println!("Session saved to history (id {})", history_id);
            Ok(())
        }
        Err(SessionError::Incomplete(progress)) => {
            print_progress(&progress);
            Err("Session is incomplete, capture the remaining steps first".into())
        }
        Err(e) => Err(e.into()),
    }
}

fn delete_all(tracker: &mut SessionTracker<'_>, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        return Err("Refusing to delete everything without --yes".into());
    }
    tracker.delete_all()?;
    println!("All sessions deleted");
    Ok(())
}

fn print_status(tracker: &SessionTracker<'_>) -> Result<(), Box<dyn std::error::Error>> {
    match tracker.current_draft()? {
        Some(draft) => {
            println!("Session {} in progress", draft.id);
            if let Some(started) = draft.started_at_utc() {
                println!("  started:     {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            println!("  video:       {}", draft.video_path.as_deref().unwrap_or("-"));
            println!("  audio:       {}", draft.audio_path.as_deref().unwrap_or("-"));
            println!("  symptoms:    {}", symptom_labels(&draft.symptoms));
        }
        None => println!("No session in progress"),
    }
    print_progress(&tracker.progress());
    Ok(())
}

fn print_progress(progress: &RecordingProgress) {
    let mark = |done: bool| if done { "x" } else { " " };
    println!("[{}] Heart rate", mark(progress.heart_rate_completed));
    println!("[{}] Respiratory", mark(progress.respiratory_completed));
    println!("[{}] Symptoms", mark(progress.symptoms_completed));
    if progress.is_complete() {
        println!("Ready to finalize");
    }
}

fn print_history(tracker: &SessionTracker<'_>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let history = tracker.history()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }
    if history.is_empty() {
        println!("No saved sessions");
    }
    for session in &history {
        println!("#{} {}", session.id, session.formatted_date());
        println!("  video:    {}", session.video_path.as_deref().unwrap_or("-"));
        println!("  audio:    {}", session.audio_path.as_deref().unwrap_or("-"));
        println!("  symptoms: {}", session.symptom_labels);
    }
    Ok(())
}

fn print_catalog() {
    for option in SYMPTOM_OPTIONS {
        println!("{:<18} {}", option.id, option.label);
    }
}
