mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pocket-cli", about = "Pocket Classroom capsules from the command line", version)]
struct Cli {
    /// Store capsules in this directory instead of the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List capsules (oldest first)
    List {
        /// Most recently updated first
        #[arg(long)]
        recent: bool,
    },

    /// Show a capsule with its progress
    Show {
        /// Capsule id, id prefix, or title prefix
        capsule: String,
    },

    /// Create a new capsule
    New {
        title: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        level: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Notes text (use "-" to read from stdin)
        #[arg(long)]
        notes: Option<String>,
        /// Flashcard as "front::back", may be repeated
        #[arg(long = "card")]
        cards: Vec<String>,
    },

    /// Append a flashcard to a capsule
    AddCard {
        capsule: String,
        front: String,
        back: String,
    },

    /// Delete a flashcard from a capsule
    RemoveCard { capsule: String, card: String },

    /// Append a multiple-choice question to a capsule
    AddQuestion {
        capsule: String,
        question: String,
        /// Exactly four options
        #[arg(num_args = 4, required = true)]
        options: Vec<String>,
        /// Index of the correct option (0-3)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..4))]
        answer: u8,
    },

    /// Delete a quiz question from a capsule
    RemoveQuestion { capsule: String, question: String },

    /// Export a capsule as an interchange document
    Export {
        capsule: String,
        /// Write to this file or directory instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a capsule from an interchange document ("-" for stdin)
    Import { file: PathBuf },

    /// Add the bundled sample capsule
    Sample,

    /// Delete a capsule and its progress
    Delete { capsule: String },

    /// Show study progress for a capsule
    Progress { capsule: String },

    /// Mark a flashcard as known (or unknown)
    Known {
        capsule: String,
        card: String,
        #[arg(long)]
        unknown: bool,
    },

    /// Score answers to a capsule's quiz and keep the best result
    Quiz {
        capsule: String,
        /// One letter (a-d) per question in order, "-" to skip
        answers: Vec<String>,
    },

    /// Forget which flashcards are known
    Reset { capsule: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let mut app = app::App::new(cli.config, cli.data_dir)?;

    match cli.command {
        Command::List { recent } => {
            commands::list::run(&app, recent, &cli.format, use_color)?;
        }
        Command::Show { capsule } => {
            commands::show::run(&app, &capsule, &cli.format, use_color)?;
        }
        Command::New { title, subject, level, description, notes, cards } => {
            let notes = commands::new::resolve_notes(notes)?;
            commands::new::run(
                &mut app,
                commands::new::NewCapsule { title, subject, level, description, notes, cards },
                &cli.format,
            )?;
        }
        Command::AddCard { capsule, front, back } => {
            commands::edit::run_add_card(&mut app, &capsule, front, back, &cli.format)?;
        }
        Command::RemoveCard { capsule, card } => {
            commands::edit::run_remove_card(&mut app, &capsule, &card)?;
        }
        Command::AddQuestion { capsule, question, options, answer } => {
            commands::edit::run_add_question(&mut app, &capsule, question, options, answer as usize, &cli.format)?;
        }
        Command::RemoveQuestion { capsule, question } => {
            commands::edit::run_remove_question(&mut app, &capsule, &question)?;
        }
        Command::Export { capsule, out } => {
            commands::transfer::run_export(&app, &capsule, out.as_deref())?;
        }
        Command::Import { file } => {
            commands::transfer::run_import(&mut app, &file, &cli.format)?;
        }
        Command::Sample => {
            commands::transfer::run_sample(&mut app, &cli.format)?;
        }
        Command::Delete { capsule } => {
            commands::delete::run(&mut app, &capsule)?;
        }
        Command::Progress { capsule } => {
            commands::study::run_progress(&app, &capsule, &cli.format, use_color)?;
        }
        Command::Known { capsule, card, unknown } => {
            commands::study::run_known(&mut app, &capsule, &card, !unknown)?;
        }
        Command::Quiz { capsule, answers } => {
            commands::study::run_quiz(&mut app, &capsule, &answers, &cli.format, use_color)?;
        }
        Command::Reset { capsule } => {
            commands::study::run_reset(&mut app, &capsule)?;
        }
    }

    Ok(())
}
