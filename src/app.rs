use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use aegis::batch::{BatchReport, Orchestrator, Progress};
use aegis::cancel::{CancelFlag, Cancellation};
use aegis::file::{FileSet, expand, is_eligible};
use aegis::secret::Password;
use aegis::transform::{MemoryBudget, Transformer};
use aegis::types::Direction;

use crate::ui::display;
use crate::ui::progress::Bar;
use crate::ui::prompt::Prompt;

#[derive(Args)]
pub struct RunArgs {
    /// Files or folders; folders are searched recursively.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[arg(short, long)]
    password: Option<String>,

    /// Memory available for a single file, e.g. "2 GiB".
    #[arg(long, default_value = "2 GiB")]
    memory_budget: ByteSize,

    /// Part of the budget kept back for the rest of the process.
    #[arg(long, default_value = "100 MiB")]
    headroom: ByteSize,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt files in place.
    Encrypt(RunArgs),

    /// Decrypt files in place.
    Decrypt(RunArgs),

    /// Show the working set the given paths would produce.
    List {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    Interactive,
}

#[derive(Parser)]
#[command(name = "aegis", version, about = "Encrypt and decrypt batches of files in place, erasing the originals.")]
pub struct App {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();
        let level = if app.verbose { Level::DEBUG } else { Level::WARN };
        let subscriber = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Some(Commands::Encrypt(args)) => Self::run_mode(args, Direction::Encrypt).await,
            Some(Commands::Decrypt(args)) => Self::run_mode(args, Direction::Decrypt).await,
            Some(Commands::List { paths }) => Self::list(paths).await,
            Some(Commands::Interactive) | None => Self::run_interactive().await,
        }
    }

    async fn run_mode(args: RunArgs, direction: Direction) -> Result<()> {
        let set = Self::build_set(args.paths).await?;

        if !args.yes && !Prompt::confirm(&format!("{direction} {} file(s) in place?", set.len()))? {
            bail!("operation canceled");
        }

        let password = match args.password {
            Some(password) => Password::from_string(password),
            None => Prompt::password(direction)?,
        };

        let transformer = Transformer::new(MemoryBudget::new(args.memory_budget.as_u64(), args.headroom.as_u64()));
        let (_, report) = Self::process(set, password, direction, transformer).await?;

        display::show_report(direction, &report);
        Self::conclude(&report)
    }

    async fn list(paths: Vec<PathBuf>) -> Result<()> {
        Self::build_set(paths).await.map(drop)
    }

    async fn run_interactive() -> Result<()> {
        display::clear_screen()?;
        display::print_banner()?;

        let direction = Prompt::select_direction()?;
        let set = Self::build_set(Prompt::enter_paths()?).await?;

        if !Prompt::confirm(&format!("{direction} {} file(s) in place?", set.len()))? {
            bail!("operation canceled");
        }

        let password = Prompt::password(direction)?;
        let (set, report) = Self::process(set, password, direction, Transformer::default()).await?;

        display::show_working_set(set.files());
        display::show_report(direction, &report);
        Self::conclude(&report)
    }

    /// Imports `paths` under the default policy and shows the result.
    async fn build_set(paths: Vec<PathBuf>) -> Result<FileSet> {
        let mut set = FileSet::new();
        let result = set.add_with(expand(paths), is_eligible).await;

        display::show_add_result(&result);
        ensure!(!set.is_empty(), "no eligible files found");
        display::show_working_set(set.files());

        Ok(set)
    }

    /// Runs the batch on a worker task while this task drives the progress
    /// bar and listens for Ctrl-C.
    async fn process(mut set: FileSet, password: Password, direction: Direction, transformer: Transformer) -> Result<(FileSet, BatchReport)> {
        let bar = Bar::new(set.len() as u64, direction.progress_verb())?;
        let cancel = CancelFlag::new();
        let (sender, receiver) = flume::unbounded::<Progress>();

        let worker = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let sink = move |progress: Progress| {
                    let _ = sender.send(progress);
                };
                let report = Orchestrator::new(transformer).run(set.files_mut(), &password, direction, &cancel, &sink).await;
                (set, report)
            })
        };

        loop {
            tokio::select! {
                event = receiver.recv_async() => match event {
                    Ok(progress) => bar.update(&progress),
                    Err(_) => break,
                },
                signal = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                    signal.context("failed to listen for Ctrl-C")?;
                    cancel.cancel();
                    bar.set_message("Cancelling after the current file...");
                }
            }
        }

        let (set, report) = worker.await.context("batch worker failed")?;
        bar.finish(if report.was_cancelled() { "Cancelled" } else { "Done" });

        Ok((set, report))
    }

    fn conclude(report: &BatchReport) -> Result<()> {
        ensure!(report.failures().is_empty(), "{} file(s) failed", report.failures().len());
        ensure!(!report.was_cancelled(), "operation canceled");
        Ok(())
    }
}
