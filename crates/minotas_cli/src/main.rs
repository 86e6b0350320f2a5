//! Developer CLI for the MiNotas core.
//!
//! # Responsibility
//! - Drive note storage and AI assistance without the mobile UI.
//! - Keep output line-oriented so it can be piped and grepped.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use minotas_core::{
    default_log_level, filter_notes_by_reply, init_stderr_logging, AiGateway, AiOperation,
    Category, Note, NoteService, NotesAdapter, StorageConfig,
};

#[derive(Parser)]
#[command(name = "minotas")]
#[command(about = "MiNotas: notes with AI assistance (dev CLI)")]
struct Cli {
    /// Directory holding the note store (defaults to MINOTAS_DB_PATH / temp dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Log level written to stderr.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Add a note.
    Add {
        /// Personal, Trabajo, Ideas or Recordatorios.
        #[arg(short, long, default_value = "Personal")]
        category: String,
        content: String,
    },
    /// List all notes.
    List {
        /// Only notes whose category contains this text.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Replace category and content of a note.
    Update {
        id: i64,
        #[arg(short, long)]
        category: String,
        content: String,
    },
    /// Delete a note.
    Delete { id: i64 },
    /// Summarize text with the AI endpoint.
    Summarize { content: String },
    /// Ask the AI endpoint for a category.
    Suggest { content: String },
    /// Natural-language search over stored notes.
    Search { query: String },
    /// Send a raw prompt to the AI endpoint.
    Generate { prompt: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_stderr_logging(level) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let storage = match &cli.data_dir {
        Some(dir) => StorageConfig::in_dir(dir),
        None => StorageConfig::from_env(),
    };
    let service = NoteService::new(NotesAdapter::new(storage));

    match run(cli.command, &service).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, service: &NoteService) -> Result<(), String> {
    match command {
        Commands::Add { category, content } => {
            let category = parse_category(&category)?;
            let id = service
                .create_note(category, content)
                .await
                .map_err(|err| err.to_string())?;
            println!("{id}");
        }
        Commands::List { filter } => {
            let notes = match filter {
                Some(text) => service.filter_by_category(&text).await,
                None => service.list_notes().await,
            }
            .map_err(|err| err.to_string())?;
            print_notes(&notes);
        }
        Commands::Update {
            id,
            category,
            content,
        } => {
            let category = parse_category(&category)?;
            service
                .update_note(id, category, content)
                .await
                .map_err(|err| err.to_string())?;
        }
        Commands::Delete { id } => {
            service.delete_note(id).await.map_err(|err| err.to_string())?;
        }
        Commands::Summarize { content } => {
            let outcome = gateway()?.summarize_note(&content).await;
            println!("{}", outcome.display_text(AiOperation::SummarizeNote));
        }
        Commands::Suggest { content } => {
            println!("{}", gateway()?.suggest_category_checked(&content).await);
        }
        Commands::Search { query } => {
            let gateway = gateway()?;
            let notes = service.list_notes().await.map_err(|err| err.to_string())?;
            let outcome = gateway.search_notes_natural(&query, &notes).await;
            println!("{}", outcome.display_text(AiOperation::SearchNotes));
            if let Some(reply) = outcome.text() {
                let matched = filter_notes_by_reply(reply, &notes);
                if !matched.is_empty() {
                    println!();
                    print_notes(&matched);
                }
            }
        }
        Commands::Generate { prompt } => {
            let outcome = gateway()?.generate_text(&prompt).await;
            println!("{}", outcome.display_text(AiOperation::GenerateText));
        }
    }
    Ok(())
}

fn gateway() -> Result<AiGateway, String> {
    AiGateway::from_env().map_err(|err| err.to_string())
}

fn parse_category(label: &str) -> Result<Category, String> {
    Category::parse(label).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category `{label}`; expected one of {}", known.join(", "))
    })
}

fn print_notes(notes: &[Note]) {
    for note in notes {
        println!("{}\t{}\t{}", note.id, note.category, note.content);
    }
}
