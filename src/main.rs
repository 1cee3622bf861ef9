use std::path::PathBuf;
use std::sync::Arc;

use ai_tutor::api::types::{FolderDraft, GenerationHints, PracticeDraft, PracticeGeneration, PracticeSubmission};
use ai_tutor::api::{ApiClient, ApiError};
use ai_tutor::config::{AppConfig, ConfigError};
use ai_tutor::export::{ExportError, JsonlExporter, write_summary};
use ai_tutor::flows::{FlowError, FolderShelf, NewLecture, PracticeField, PracticeSheet};
use ai_tutor::notify::{ConsoleNotifier, Notice, Notifier};
use ai_tutor::routes;
use ai_tutor::services::google::GoogleConfig;
use ai_tutor::session::TokenPair;
use ai_tutor::session::store::{CredentialStore, StoreError};
use ai_tutor::state::AppState;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `ai-tutor auth save` or pass --access-token")]
    MissingSession,
    #[error("no refresh token saved")]
    MissingRefreshToken,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("api error [{code}]: {0}", code = .0.code())]
    Api(#[from] ApiError),
    #[error("{0}")]
    Flow(#[from] FlowError),
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("server failed: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "ai-tutor", about = "AI Tutor auth server and backend CLI")]
struct Cli {
    #[arg(long, env = "AI_TUTOR_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "AI_TUTOR_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[arg(long, env = "AI_TUTOR_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,

    #[arg(long, help = "Credential file, defaults to the user config dir")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the sign-in and session server.
    Serve,
    Auth(AuthCommand),
    Folder(FolderCommand),
    Note(NoteCommand),
    /// Create a note, upload its audio, and request a summary.
    Lecture(LectureArgs),
    /// Upload audio for an existing note.
    Stt {
        folder_id: i64,
        note_id: i64,
        audio: PathBuf,
    },
    Summary(SummaryCommand),
    Practice(PracticeCommand),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    /// Save a token pair to the credential file.
    Save {
        access_token: String,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    Show,
    /// Exchange the saved refresh token for a new pair.
    Refresh,
    Clear,
}

#[derive(Args, Debug)]
struct FolderCommand {
    #[command(subcommand)]
    command: FolderSubcommand,
}

#[derive(Subcommand, Debug)]
enum FolderSubcommand {
    List,
    Create {
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        professor: String,
    },
    Update {
        folder_id: i64,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        professor: String,
    },
    Delete {
        folder_id: i64,
    },
    /// Folders with their note titles.
    Tree,
}

#[derive(Args, Debug)]
struct NoteCommand {
    #[command(subcommand)]
    command: NoteSubcommand,
}

#[derive(Subcommand, Debug)]
enum NoteSubcommand {
    List { folder_id: i64 },
    Create { folder_id: i64, title: String },
    Delete { folder_id: i64, note_id: i64 },
    Info { folder_id: i64 },
}

#[derive(Args, Debug)]
struct HintArgs {
    #[arg(long)]
    keywords: Option<String>,
    #[arg(long)]
    requirement: Option<String>,
}

impl HintArgs {
    fn into_hints(self) -> GenerationHints {
        GenerationHints { keywords: self.keywords, requirement: self.requirement }
    }
}

#[derive(Args, Debug)]
struct LectureArgs {
    folder_id: i64,
    #[arg(long)]
    title: String,
    #[arg(long)]
    audio: PathBuf,
    #[command(flatten)]
    hints: HintArgs,
}

#[derive(Args, Debug)]
struct SummaryCommand {
    #[command(subcommand)]
    command: SummarySubcommand,
}

#[derive(Subcommand, Debug)]
enum SummarySubcommand {
    Generate {
        folder_id: i64,
        note_id: i64,
        #[command(flatten)]
        hints: HintArgs,
    },
    Show {
        folder_id: i64,
        note_id: i64,
        #[arg(long, help = "Also write summary_<note>.md into this directory")]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct PracticeCommand {
    #[command(subcommand)]
    command: PracticeSubcommand,
}

#[derive(Subcommand, Debug)]
enum PracticeSubcommand {
    Show {
        note_id: i64,
    },
    Generate {
        note_id: i64,
        #[arg(long, default_value_t = 5)]
        size: u32,
        #[arg(long, default_value = "OX", help = "OX or SHORT")]
        kind: String,
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long, default_value = "")]
        requirement: String,
    },
    /// Edit one question of the note's generated set. Blank values keep the original.
    Edit {
        note_id: i64,
        practice_number: u32,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        result: String,
    },
    /// Export selected questions as JSON Lines.
    Export {
        note_id: i64,
        #[arg(long, value_delimiter = ',', help = "Practice numbers, comma separated")]
        questions: Vec<u32>,
        #[arg(long, default_value_t = false)]
        all: bool,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Save the note's questions with a time limit and deadline.
    Save {
        note_id: i64,
        #[arg(long, default_value_t = 0)]
        minute: u32,
        #[arg(long, default_value_t = 0)]
        second: u32,
        #[arg(long)]
        end_date: String,
    },
}

/// Resolved client plus where its tokens came from.
struct CliContext {
    api: ApiClient,
    store: CredentialStore,
    from_store: Option<TokenPair>,
    notifier: Arc<dyn Notifier>,
}

impl CliContext {
    async fn require_session(&self) -> Result<(), CliError> {
        if self.api.tokens().await.is_none() {
            return Err(CliError::MissingSession);
        }
        Ok(())
    }

    /// Write back a pair rotated by the 401 recovery path.
    async fn persist_rotation(&self) -> Result<(), CliError> {
        let Some(saved) = &self.from_store else {
            return Ok(());
        };
        match self.api.tokens().await {
            Some(current) if &current == saved => {}
            Some(current) => {
                self.store.save(&current)?;
                tracing::info!(path = %self.store.path().display(), "saved refreshed credentials");
            }
            None => self.store.clear()?,
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }

    if matches!(cli.command, Command::Serve) {
        return run_serve(config).await;
    }

    let store = match cli.credentials {
        Some(path) => CredentialStore::at(path),
        None => CredentialStore::default_location()?,
    };
    let api = ApiClient::from_config(&config)?;
    let from_store = match cli.access_token {
        Some(access) => {
            api.set_tokens(Some(TokenPair::new(access, cli.refresh_token)))
                .await;
            None
        }
        None => {
            let saved = store.load()?;
            api.set_tokens(saved.clone()).await;
            saved
        }
    };
    let ctx = CliContext { api, store, from_store, notifier: Arc::new(ConsoleNotifier) };

    let result = match cli.command {
        Command::Serve => Ok(()),
        Command::Auth(auth) => run_auth(&ctx, auth).await,
        Command::Folder(folder) => run_folder(&ctx, folder).await,
        Command::Note(note) => run_note(&ctx, note).await,
        Command::Lecture(args) => run_lecture(&ctx, args).await,
        Command::Stt { folder_id, note_id, audio } => run_stt(&ctx, folder_id, note_id, audio).await,
        Command::Summary(summary) => run_summary(&ctx, summary).await,
        Command::Practice(practice) => run_practice(&ctx, practice).await,
    };
    ctx.persist_rotation().await?;
    result
}

async fn run_serve(config: AppConfig) -> Result<(), CliError> {
    let google = GoogleConfig::from_env();
    if google.is_none() {
        tracing::warn!("Google OAuth not configured; sign-in disabled");
    }
    let port = config.port;
    let state = AppState::new(config, google)?;

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(%port, "ai-tutor listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_auth(ctx: &CliContext, auth: AuthCommand) -> Result<(), CliError> {
    match auth.command {
        AuthSubcommand::Save { access_token, refresh_token } => {
            let tokens = TokenPair::new(access_token, refresh_token);
            ctx.store.save(&tokens)?;
            println!("saved to {}", ctx.store.path().display());
        }
        AuthSubcommand::Show => match ctx.store.load()? {
            Some(tokens) => print_json(&serde_json::json!({
                "path": ctx.store.path().display().to_string(),
                "hasAccessToken": !tokens.access_token.is_empty(),
                "hasRefreshToken": tokens.refresh_token.is_some(),
            }))?,
            None => println!("not signed in"),
        },
        AuthSubcommand::Refresh => {
            let saved = ctx.store.load()?.ok_or(CliError::MissingSession)?;
            let refresh_token = saved
                .refresh_token
                .clone()
                .ok_or(CliError::MissingRefreshToken)?;
            let mut fresh = ctx.api.refresh_session(&refresh_token).await?;
            if fresh.refresh_token.is_none() {
                fresh.refresh_token = Some(refresh_token);
            }
            ctx.store.save(&fresh)?;
            ctx.api.set_tokens(Some(fresh)).await;
            println!("refreshed");
        }
        AuthSubcommand::Clear => {
            ctx.store.clear()?;
            ctx.api.set_tokens(None).await;
            println!("signed out");
        }
    }
    Ok(())
}

async fn run_folder(ctx: &CliContext, folder: FolderCommand) -> Result<(), CliError> {
    ctx.require_session().await?;
    let mut shelf = FolderShelf::new(ctx.api.clone(), ctx.notifier.clone());
    match folder.command {
        FolderSubcommand::List => {
            shelf.refresh().await?;
        }
        FolderSubcommand::Create { subject, professor } => {
            shelf
                .create(&FolderDraft::new(subject, professor))
                .await?;
        }
        FolderSubcommand::Update { folder_id, subject, professor } => {
            shelf
                .rename(folder_id, &FolderDraft::new(subject, professor))
                .await?;
        }
        FolderSubcommand::Delete { folder_id } => {
            shelf.delete(folder_id).await?;
        }
        FolderSubcommand::Tree => {
            let tree = ctx.api.folder_tree().await?;
            return print_json(&tree);
        }
    }
    print_json(&shelf.folders())
}

async fn run_note(ctx: &CliContext, note: NoteCommand) -> Result<(), CliError> {
    ctx.require_session().await?;
    match note.command {
        NoteSubcommand::List { folder_id } => print_json(&ctx.api.list_notes(folder_id).await?),
        NoteSubcommand::Create { folder_id, title } => print_json(&ctx.api.create_note(folder_id, &title).await?),
        NoteSubcommand::Delete { folder_id, note_id } => {
            let ack = ctx.api.delete_note(folder_id, note_id).await?;
            ctx.notifier.notify(Notice::success("Note deleted."));
            print_json(&ack)
        }
        NoteSubcommand::Info { folder_id } => print_json(&ctx.api.folder_info(folder_id).await?),
    }
}

async fn run_lecture(ctx: &CliContext, args: LectureArgs) -> Result<(), CliError> {
    ctx.require_session().await?;
    let lecture = NewLecture {
        folder_id: args.folder_id,
        title: args.title,
        audio: args.audio,
        hints: args.hints.into_hints(),
    };
    let outcome = lecture.submit(&ctx.api, ctx.notifier.as_ref()).await?;
    print_json(&serde_json::json!({ "noteId": outcome.note_id }))
}

async fn run_stt(ctx: &CliContext, folder_id: i64, note_id: i64, audio: PathBuf) -> Result<(), CliError> {
    ctx.require_session().await?;
    let response = ctx.api.upload_audio(folder_id, note_id, &audio).await?;
    ctx.notifier.notify(Notice::success("Lecture file uploaded."));
    print_json(&response)
}

async fn run_summary(ctx: &CliContext, summary: SummaryCommand) -> Result<(), CliError> {
    ctx.require_session().await?;
    match summary.command {
        SummarySubcommand::Generate { folder_id, note_id, hints } => {
            let response = ctx
                .api
                .generate_summary(folder_id, note_id, &hints.into_hints())
                .await?;
            print_json(&response)
        }
        SummarySubcommand::Show { folder_id, note_id, out } => {
            let summary = ctx.api.fetch_summary(folder_id, note_id).await?;
            println!("{}", summary.text);
            if let Some(dir) = out {
                let path = write_summary(&dir, note_id, &summary)?;
                ctx.notifier
                    .notify(Notice::success(format!("Saved to {}.", path.display())));
            }
            Ok(())
        }
    }
}

async fn run_practice(ctx: &CliContext, practice: PracticeCommand) -> Result<(), CliError> {
    ctx.require_session().await?;
    match practice.command {
        PracticeSubcommand::Show { note_id } => print_json(&ctx.api.fetch_practice(note_id).await?),
        PracticeSubcommand::Generate { note_id, size, kind, keywords, requirement } => {
            let request = PracticeGeneration { practice_size: size, kind, keywords, requirement };
            let response = ctx.api.generate_practice(note_id, &request).await?;
            ctx.notifier
                .notify(Notice::success("Practice questions requested."));
            print_json(&response)
        }
        PracticeSubcommand::Edit { note_id, practice_number, content, result } => {
            // The CLI edits the note's current generated set.
            let set = ctx.api.fetch_practice(note_id).await?;
            let mut sheet = PracticeSheet::from_generated(note_id, set.items);
            sheet.begin_edit(practice_number)?;
            sheet.set_field(practice_number, PracticeField::Content, content)?;
            sheet.set_field(practice_number, PracticeField::Result, result)?;
            if let Err(e) = sheet.commit_edit(&ctx.api, practice_number).await {
                ctx.notifier
                    .notify(Notice::error("Failed to update the question."));
                return Err(e.into());
            }
            ctx.notifier.notify(Notice::success("Question updated."));
            print_json(&sheet.items())
        }
        PracticeSubcommand::Export { note_id, questions, all, out } => {
            let mut sheet = PracticeSheet::load(&ctx.api, note_id, ctx.notifier.as_ref()).await?;
            if all {
                sheet.select_all();
            } else {
                for number in questions {
                    sheet.select(number)?;
                }
            }
            let path = sheet.export(&JsonlExporter::new(out), ctx.notifier.as_ref())?;
            println!("{}", path.display());
            Ok(())
        }
        PracticeSubcommand::Save { note_id, minute, second, end_date } => {
            let set = ctx.api.fetch_practice(note_id).await?;
            let submission = PracticeSubmission {
                minute,
                second,
                end_date,
                req_list: set.items.iter().map(PracticeDraft::from).collect(),
            };
            let response = ctx.api.save_practice(note_id, &submission).await?;
            ctx.notifier.notify(Notice::success("Practice saved."));
            print_json(&response)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
