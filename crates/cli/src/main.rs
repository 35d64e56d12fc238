//! Notebook CLI - run paragraph files through configured interpreters.

mod builtin;
mod config;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use notebook_core::NoteId;
use notebook_interpreter::{Interpreter, InterpreterRegistry};
use notebook_note::{
    InMemoryCredentials, Note, NoopSearchIndex, NoteServices, TracingListenerFactory,
};
use notebook_scheduler::{Budget, FifoScheduler, ParallelScheduler, Scheduler};
use notebook_storage::{JsonNotebookRepo, NotebookRepo};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use builtin::{EchoInterpreter, ShellInterpreter};
use config::{CliConfig, InterpreterKind, SchedulerKind};

#[derive(Parser)]
#[command(name = "notebook")]
#[command(about = "Run notebook paragraphs through interpreters", long_about = None)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "notebook.json")]
    config: PathBuf,
    /// Storage root, overrides the config file
    #[arg(long)]
    storage: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a file of paragraphs separated by `---` lines
    Run {
        /// Paragraph file
        file: PathBuf,
        /// Note name
        #[arg(long)]
        name: Option<String>,
        /// Do not save the note
        #[arg(long)]
        no_save: bool,
    },
    /// Run every paragraph of a stored note again
    Rerun {
        /// Note ID
        id: String,
    },
    /// List stored notes
    List,
    /// Show a stored note
    Show {
        /// Note ID
        id: String,
    },
    /// Delete a stored note
    Remove {
        /// Note ID
        id: String,
    },
    /// List configured interpreters
    Interpreters,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(&cli.config).await?;
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    match cli.command {
        Commands::Run { file, name, no_save } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = name.unwrap_or_else(|| {
                file.file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
            });

            let bench = Workbench::open(config).await?;
            let mut note = bench.note().with_name(name);
            note.put_default_repl_name();
            for body in split_paragraphs(&text) {
                note.add_paragraph().set_text(body);
            }

            let outcome = bench.run(&mut note).await;
            print_note(&note);
            if !no_save {
                note.persist().await?;
                info!(note = %note.id(), "Note saved");
            }
            outcome?;
        }
        Commands::Rerun { id } => {
            let bench = Workbench::open(config).await?;
            let Some(snapshot) = bench.repo.get(&NoteId::from(id.as_str())).await? else {
                bail!("Note {} not found", id);
            };
            let mut note = Note::from_snapshot(snapshot, bench.services())
                .with_config(bench.config.note_config());

            let outcome = bench.run(&mut note).await;
            print_note(&note);
            note.persist().await?;
            outcome?;
        }
        Commands::List => {
            let repo = JsonNotebookRepo::new(&config.storage).await?;
            let notes = repo.list().await?;

            println!("Notes ({})", notes.len());
            for note in notes {
                println!("  {} | {}", note.id, note.name);
            }
        }
        Commands::Show { id } => {
            let bench = Workbench::open(config).await?;
            let Some(snapshot) = bench.repo.get(&NoteId::from(id.as_str())).await? else {
                println!("Note not found");
                return Ok(());
            };
            print_note(&Note::from_snapshot(snapshot, bench.services()));
        }
        Commands::Remove { id } => {
            let repo = JsonNotebookRepo::new(&config.storage).await?;
            repo.remove(&NoteId::from(id.as_str())).await?;
            println!("Removed note {}", id);
        }
        Commands::Interpreters => {
            println!("Interpreters ({})", config.interpreters.len());
            for entry in &config.interpreters {
                let marker = if config.default.as_deref() == Some(entry.name.as_str()) {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "  %{} | {:?} | {:?}{}",
                    entry.group(),
                    entry.kind,
                    entry.scheduler,
                    marker
                );
            }
            if let Some(fallback) = &config.multiplex_fallback {
                println!("Unbound directives fall back to %{}", fallback);
            }
        }
    }

    Ok(())
}

/// Scheduler owned by the CLI, kept so it can be drained before exit.
enum SchedulerHandle {
    Fifo(Arc<FifoScheduler>),
    Parallel(Arc<ParallelScheduler>),
}

impl SchedulerHandle {
    fn start(name: &str, kind: SchedulerKind, max_concurrent: Option<usize>) -> Self {
        match kind {
            SchedulerKind::Fifo => Self::Fifo(FifoScheduler::start(name)),
            SchedulerKind::Parallel => {
                let max = max_concurrent
                    .and_then(NonZeroUsize::new)
                    .or_else(|| std::thread::available_parallelism().ok())
                    .unwrap_or(NonZeroUsize::MIN);
                Self::Parallel(ParallelScheduler::start(name, Budget::new().with_max_concurrent(max)))
            }
        }
    }

    fn scheduler(&self) -> Arc<dyn Scheduler> {
        match self {
            Self::Fifo(s) => s.clone(),
            Self::Parallel(s) => s.clone(),
        }
    }

    async fn shutdown(&self) {
        match self {
            Self::Fifo(s) => s.shutdown().await,
            Self::Parallel(s) => s.shutdown().await,
        }
    }
}

/// Interpreters, schedulers and storage for one CLI invocation.
struct Workbench {
    config: CliConfig,
    registry: Arc<InterpreterRegistry>,
    schedulers: Vec<SchedulerHandle>,
    repo: Arc<JsonNotebookRepo>,
}

impl Workbench {
    async fn open(config: CliConfig) -> Result<Self> {
        let repo = JsonNotebookRepo::new(&config.storage)
            .await
            .with_context(|| format!("Failed to open storage {}", config.storage.display()))?;

        let registry = Arc::new(InterpreterRegistry::new());
        let mut schedulers = Vec::new();
        for entry in &config.interpreters {
            let handle = SchedulerHandle::start(&entry.name, entry.scheduler, entry.max_concurrent);
            let interpreter: Arc<dyn Interpreter> = match entry.kind {
                InterpreterKind::Echo => Arc::new(EchoInterpreter::new(&entry.name, handle.scheduler())),
                InterpreterKind::Shell => Arc::new(
                    ShellInterpreter::new(&entry.name, handle.scheduler())
                        .with_env(entry.properties.clone()),
                ),
            };
            registry.register(entry.setting(), interpreter);
            schedulers.push(handle);
        }
        if let Some(default) = &config.default {
            registry.set_default(default);
        }

        Ok(Self {
            config,
            registry,
            schedulers,
            repo: Arc::new(repo),
        })
    }

    fn services(&self) -> NoteServices {
        NoteServices {
            repo: self.repo.clone(),
            loader: self.registry.clone(),
            listeners: Arc::new(TracingListenerFactory),
            index: Arc::new(NoopSearchIndex),
            credentials: Arc::new(InMemoryCredentials::new()),
        }
    }

    fn note(&self) -> Note {
        Note::new(self.services()).with_config(self.config.note_config())
    }

    /// Submit every paragraph, then wait for all schedulers to drain.
    async fn run(&self, note: &mut Note) -> Result<()> {
        let submitted = note.run_all();
        if let Err(e) = &submitted {
            warn!(note = %note.id(), "Run stopped: {}", e);
        }

        for handle in &self.schedulers {
            handle.shutdown().await;
        }

        let jobs = submitted?;
        info!(note = %note.id(), jobs = jobs.len(), "All paragraphs ran");
        Ok(())
    }
}

/// Split a paragraph file on lines consisting of `---`.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim() == "---" {
            paragraphs.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    paragraphs.push(current.join("\n"));

    paragraphs
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn print_note(note: &Note) {
    println!("Note: {} {}", note.id(), note.name());
    for (i, paragraph) in note.paragraphs().iter().enumerate() {
        println!("[{}] {} | {}", i + 1, paragraph.status(), paragraph.effective_text());
        if let Some(result) = paragraph.result() {
            for line in result.message.lines() {
                println!("    {}", line);
            }
        }
    }
}
