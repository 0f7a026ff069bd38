// Interview Assist - command line host
//
// Drives the session workflow and the behavioral assistant from a terminal.
// Results go to stdout as JSON; progress, events and logs go to stderr.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use interview_assist_desktop::services::{
    BehavioralAssistant, ChannelEventSink, FileScreenshotStore, ProcessOutcome, ScreenshotStore,
    SessionEvent, SessionWorkflow,
};
use interview_assist_desktop::storage::{ConfigService, SettingsSource, StoryLibrary};
use interview_assist_desktop::utils::paths::{extra_screenshots_dir, screenshots_dir};
use interview_assist_desktop::{AiService, SettingsUpdate, SolutionMode};
use interview_assist_llm::ProviderType;

#[derive(Parser, Debug)]
#[command(author, version, about = "Screenshot-driven coding and behavioral interview assistant", long_about = None)]
struct Cli {
    /// Config file (default: ~/.interview-assist/config.json)
    #[arg(long, env = "INTERVIEW_ASSIST_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a coding problem from screenshots
    Solve {
        /// Problem screenshots, in order (default: ~/.interview-assist/screenshots)
        screenshots: Vec<PathBuf>,

        /// Screenshots of the current attempt, debugged after the solution
        /// (added to ~/.interview-assist/extra_screenshots when scanning)
        #[arg(long = "debug")]
        debug_screenshots: Vec<PathBuf>,

        /// Follow-up questions asked after the solution, in order
        #[arg(long = "follow-up")]
        follow_ups: Vec<String>,
    },

    /// Answer a behavioral question from the story library
    Behavioral {
        question: String,

        /// Expand the selected story into a first-person narrative
        #[arg(long)]
        detail: bool,

        /// Anticipate interviewer follow-ups for the selected story
        #[arg(long)]
        anticipate: bool,

        /// Generate a story when none in the library fits
        #[arg(long)]
        generate: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings (API key masked)
    Show,

    /// Verify that the configured provider accepts the API key
    Check,

    /// Update one or more settings
    Set {
        #[arg(long)]
        provider: Option<ProviderType>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        solution_model: Option<String>,
        #[arg(long)]
        extraction_model: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        mode: Option<SolutionMode>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = match &cli.config {
        Some(path) => ConfigService::open(path.clone()),
        None => ConfigService::new(),
    }
    .context("Failed to load configuration")?;
    info!(path = %service.path().display(), "configuration loaded");
    let settings = Arc::new(RwLock::new(service));

    match cli.command {
        Command::Solve {
            screenshots,
            debug_screenshots,
            follow_ups,
        } => solve(settings, screenshots, debug_screenshots, follow_ups).await,
        Command::Behavioral {
            question,
            detail,
            anticipate,
            generate,
        } => behavioral(settings, &question, detail, anticipate, generate).await,
        Command::Config {
            action: ConfigAction::Check,
        } => check(settings).await,
        Command::Config { action } => configure(&settings, action),
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Progress { message, progress } => eprintln!("[{:>3}%] {}", progress, message),
        SessionEvent::NoScreenshots => eprintln!("No screenshots to process"),
        SessionEvent::ProblemExtracted { problem } => {
            eprintln!("Problem: {}", problem.statement_or("(not found)"))
        }
        SessionEvent::UnderstandingReady { .. } => eprintln!("Understanding ready"),
        SessionEvent::SolutionReady { solution } => {
            eprintln!("Solution ready ({})", solution.kind())
        }
        SessionEvent::FollowUpReady { index, .. } => eprintln!("Follow-up revision #{}", index),
        SessionEvent::DebugStarted => eprintln!("Debugging current code..."),
        SessionEvent::DebugReady { .. } => eprintln!("Debug analysis ready"),
        SessionEvent::Error { pipeline, message } => eprintln!("Error ({:?}): {}", pipeline, message),
        SessionEvent::Reset => eprintln!("Session reset"),
    }
}

async fn solve(
    settings: Arc<RwLock<ConfigService>>,
    screenshots: Vec<PathBuf>,
    debug_screenshots: Vec<PathBuf>,
    follow_ups: Vec<String>,
) -> Result<()> {
    let client = Arc::new(AiService::new(settings.clone()));
    let store = if screenshots.is_empty() {
        let (main_dir, extra_dir) = (screenshots_dir()?, extra_screenshots_dir()?);
        info!(dir = %main_dir.display(), "scanning screenshot directory");
        FileScreenshotStore::from_dirs(&main_dir, &extra_dir).await?
    } else {
        FileScreenshotStore::with_queue(screenshots)
    };
    let store = Arc::new(store);
    let (sink, mut events) = ChannelEventSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let workflow = Arc::new(SessionWorkflow::new(
        client,
        store.clone(),
        settings,
        Arc::new(sink),
    ));
    let interrupt = {
        let workflow = Arc::clone(&workflow);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling...");
                workflow.cancel().await;
            }
        })
    };

    let mut outcome = workflow.process_queue().await?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match outcome {
            ProcessOutcome::NoScreenshots => return Err(anyhow!("No screenshots to process")),
            ProcessOutcome::AwaitingConfirmation(understanding) => {
                eprintln!("\n{}", understanding.understanding_statement);
                for example in &understanding.generated_examples {
                    eprintln!("  input: {}  ->  output: {}", example.input, example.output);
                }
                for question in &understanding.clarifying_questions {
                    eprintln!("  ? {}", question);
                }
                eprintln!("Press Enter to confirm, or type a clarification:");

                let line = stdin.next_line().await?.unwrap_or_default();
                outcome = if line.trim().is_empty() {
                    ProcessOutcome::Solved(workflow.confirm_understanding().await?)
                } else {
                    ProcessOutcome::AwaitingConfirmation(
                        workflow.submit_clarification(&line).await?,
                    )
                };
            }
            ProcessOutcome::Solved(_) | ProcessOutcome::Debugged(_) => break,
        }
    }

    for question in &follow_ups {
        workflow.submit_follow_up(question).await?;
    }
    for path in debug_screenshots {
        store.enqueue_extra(path);
    }
    if !store.extra_queue().is_empty() {
        workflow.process_screenshots().await?;
    }

    let snapshot = workflow.snapshot().await;
    interrupt.abort();
    let _ = interrupt.await;
    drop(workflow);
    // The printer ends once the sink inside the workflow is dropped
    let _ = printer.await;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn behavioral(
    settings: Arc<RwLock<ConfigService>>,
    question: &str,
    detail: bool,
    anticipate: bool,
    generate: bool,
) -> Result<()> {
    let config = settings.current_settings()?;
    let library = Arc::new(StoryLibrary::for_config(&config)?);
    let assistant = BehavioralAssistant::new(Arc::new(AiService::new(settings)), library);
    let token = CancellationToken::new();
    let progress = |message: &str, pct: u8| eprintln!("[{:>3}%] {}", pct, message);

    let answer = assistant.answer_question(question, &progress, &token).await?;
    let mut output = json!({ "answer": answer });

    if let Some(story) = &answer.selected_story {
        if detail {
            output["detail"] = json!(assistant.story_detail(&story.id, &progress, &token).await?);
        }
        if anticipate {
            output["anticipatedFollowUps"] =
                json!(assistant.anticipate_follow_ups(question, story, &token).await?);
        }
    } else if generate {
        output["generatedStory"] =
            json!(assistant.generate_story(question, &answer.principles, &token).await?);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn check(settings: Arc<RwLock<ConfigService>>) -> Result<()> {
    let service = AiService::new(settings);
    let target = service
        .check_connection()
        .await
        .context("Connection check failed")?;
    println!("{}", json!({ "ok": true, "provider": target }));
    Ok(())
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        "(not set)".to_string()
    } else if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        let head: String = key.chars().take(4).collect();
        let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("{}****{}", head, tail)
    }
}

fn configure(settings: &RwLock<ConfigService>, action: ConfigAction) -> Result<()> {
    let mut service = settings
        .write()
        .map_err(|_| anyhow!("config lock poisoned"))?;

    let config = match action {
        ConfigAction::Show | ConfigAction::Check => service.get_config_clone(),
        ConfigAction::Set {
            provider,
            api_key,
            base_url,
            solution_model,
            extraction_model,
            language,
            mode,
            max_tokens,
            temperature,
            data_dir,
        } => {
            let config = service.update_config(SettingsUpdate {
                api_provider: provider,
                api_key,
                base_url,
                solution_model,
                extraction_model,
                language,
                solution_mode: mode,
                max_tokens,
                temperature,
                proxy: None,
                data_dir,
            })?;
            eprintln!("Saved {}", service.path().display());
            config
        }
    };

    let mut value = serde_json::to_value(&config)?;
    value["api_key"] = json!(mask(&config.api_key));
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
