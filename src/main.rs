use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use one01_engine::agent_runtime::{AgentRuntime, LocalRuntime};
use one01_engine::catalog::{Protocol, Provider};
use one01_engine::config::EngineConfig;
use one01_engine::domain::{
    Hat, Lens, OnboardingAnswers, Persona, Process, ProcessStatus, Sender, User,
};
use one01_engine::engine_paths;
use one01_engine::kv::{FileKvStore, KeyValueStore};
use one01_engine::settings::{AppSettings, ThemePreference};
use one01_engine::store::{MutationOutcome, ProcessStore, StoreOptions};
use one01_engine::structured_logger::StructuredLogger;
use std::path::PathBuf;
use std::sync::Arc;

/// Messages shown under a process card.
const CARD_MESSAGE_LIMIT: usize = 5;

#[derive(Parser)]
#[command(name = "one01")]
#[command(about = "Offline goal tracker: capture notes and compile them into process cards")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Directory of the key-value files (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <home>/config.yaml, then the built-in config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the user, the agent and a first process
    Onboard {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_persona)]
        persona: Persona,
        /// Up to three lenses; the first one tags the first process
        #[arg(long = "lens", value_parser = parse_lens, required = true)]
        lenses: Vec<Lens>,
        /// What you want to achieve first
        #[arg(long, default_value = "")]
        desire: String,
    },
    /// Create an empty process
    New {
        #[arg(long, value_parser = parse_lens)]
        lens: Lens,
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Create a process from a protocol template
    Start { protocol_id: String },
    /// Add a note to a process
    Note {
        /// Apply the agent's suggested next step to the card
        #[arg(long)]
        accept: bool,
        process_id: String,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Compile notes into card fields and summary
    Compile { process_id: String },
    /// Mark a process active or done
    Status {
        process_id: String,
        #[arg(value_parser = parse_status)]
        status: ProcessStatus,
    },
    /// Record the outcome of a process
    Outcome {
        process_id: String,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Attach a provider from the directory
    Attach {
        process_id: String,
        provider_id: String,
    },
    /// Set the agent's hats (base is always kept)
    Hats {
        #[arg(value_parser = parse_hat)]
        hats: Vec<Hat>,
    },
    /// Show the user, or one process card
    Show { process_id: Option<String> },
    /// List processes
    List,
    /// Browse protocol templates
    Protocols {
        #[arg(long, value_parser = parse_lens)]
        lens: Option<Lens>,
    },
    /// Browse providers
    Providers {
        #[arg(long, value_parser = parse_lens)]
        lens: Option<Lens>,
    },
    /// Show or set the theme preference
    Theme {
        #[arg(value_parser = parse_theme)]
        preference: Option<ThemePreference>,
    },
    /// Delete the user and all processes
    Reset,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Onboard { .. } => "onboard",
            Command::New { .. } => "new",
            Command::Start { .. } => "start",
            Command::Note { .. } => "note",
            Command::Compile { .. } => "compile",
            Command::Status { .. } => "status",
            Command::Outcome { .. } => "outcome",
            Command::Attach { .. } => "attach",
            Command::Hats { .. } => "hats",
            Command::Show { .. } => "show",
            Command::List => "list",
            Command::Protocols { .. } => "protocols",
            Command::Providers { .. } => "providers",
            Command::Theme { .. } => "theme",
            Command::Reset => "reset",
        }
    }
}

fn parse_lens(s: &str) -> Result<Lens, String> {
    Lens::parse(&s.to_lowercase())
        .ok_or_else(|| format!("unknown lens '{}' (health, finance, knowledge, business)", s))
}

fn parse_persona(s: &str) -> Result<Persona, String> {
    Persona::parse(&s.to_lowercase())
        .ok_or_else(|| format!("unknown persona '{}' (friendly, professional, neutral)", s))
}

fn parse_hat(s: &str) -> Result<Hat, String> {
    Hat::parse(&s.to_lowercase()).ok_or_else(|| format!("unknown hat '{}'", s))
}

fn parse_status(s: &str) -> Result<ProcessStatus, String> {
    ProcessStatus::parse(&s.to_lowercase())
        .ok_or_else(|| format!("unknown status '{}' (active, done)", s))
}

fn parse_theme(s: &str) -> Result<ThemePreference, String> {
    ThemePreference::parse(&s.to_lowercase())
        .ok_or_else(|| format!("unknown theme '{}' (auto, light, dark)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => config.resolve_data_dir()?,
    };

    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(data_dir));
    let mut options = StoreOptions::new(kv.clone())
        .with_agent_name(config.agent_name.clone())
        .with_event_buffer(config.event_buffer);
    if config.structured_log {
        let session_id = uuid::Uuid::new_v4().to_string();
        let logger = StructuredLogger::new(&session_id, &engine_paths::logs_dir()?)?;
        logger.log_invocation(cli.command.name());
        options = options.with_logger(Arc::new(logger));
    }

    let settings = AppSettings::new(kv);
    let store = ProcessStore::initialize(options).await?;
    let result = run(cli.command, &store, &settings).await;
    store.dispose().await?;
    result
}

/// Turns a skipped outcome into a CLI error.
fn applied(command: &str, outcome: MutationOutcome) -> Result<MutationOutcome> {
    match outcome.skip_reason() {
        Some(reason) => bail!("{} skipped: {}", command, reason),
        None => Ok(outcome),
    }
}

fn require_user(store: &ProcessStore) -> Result<User> {
    match store.current_user() {
        Some(user) => Ok(user),
        None => bail!("No user yet. Run `one01 onboard` first."),
    }
}

async fn run(command: Command, store: &ProcessStore, settings: &AppSettings) -> Result<()> {
    let name = command.name();
    match command {
        Command::Onboard {
            name: user_name,
            persona,
            lenses,
            desire,
        } => {
            let answers = OnboardingAnswers {
                name: user_name,
                persona: Some(persona),
                lenses,
                desire,
            };
            applied(name, store.create_user(answers).await?)?;
            if !settings.loading_completed().await {
                println!("Welcome to One. Notes in, clarity out.");
                settings.set_loading_completed().await?;
            }
            print_user(&require_user(store)?);
        }
        Command::New { lens, title } => {
            let outcome = applied(name, store.create_process(lens, &title).await?)?;
            if let Some(process) = outcome.process() {
                print_card(process);
            }
        }
        Command::Start { protocol_id } => {
            let outcome = applied(
                name,
                store.create_process_from_template(&protocol_id).await?,
            )?;
            if let Some(process) = outcome.process() {
                print_card(process);
            }
        }
        Command::Note {
            accept,
            process_id,
            text,
        } => {
            let text = text.join(" ");
            applied(name, store.add_message(&process_id, Sender::User, &text).await?)?;
            let user = require_user(store)?;
            let Some(process) = user.process(&process_id) else {
                bail!("Process {} disappeared", process_id);
            };
            let reply = LocalRuntime.reply(&user, process, &text).await;
            applied(
                name,
                store
                    .add_message(&process_id, Sender::Agent, &reply.text)
                    .await?,
            )?;
            println!("{}", reply.text);
            if let Some(patch) = reply.suggested_fields {
                let steps = patch.next_steps.clone().unwrap_or_default().join("; ");
                if accept {
                    applied(name, store.update_fields(&process_id, patch).await?)?;
                    println!("Next steps set to: {}", steps);
                } else {
                    println!("Suggested next step: {} (use --accept to apply)", steps);
                }
            }
        }
        Command::Compile { process_id } => {
            let outcome = applied(name, store.compile(&process_id).await?)?;
            if let Some(process) = outcome.process() {
                print_card(process);
            }
        }
        Command::Status { process_id, status } => {
            applied(name, store.set_status(&process_id, status).await?)?;
            println!("{} is now {}", process_id, status);
        }
        Command::Outcome { process_id, text } => {
            applied(
                name,
                store.set_outcome(&process_id, &text.join(" ")).await?,
            )?;
            println!("Outcome recorded for {}", process_id);
        }
        Command::Attach {
            process_id,
            provider_id,
        } => {
            applied(
                name,
                store.attach_provider(&process_id, &provider_id).await?,
            )?;
            if let Some(process) = store.get_process(&process_id) {
                print_card(&process);
            }
        }
        Command::Hats { hats } => {
            applied(name, store.toggle_agent_capability(hats).await?)?;
            let user = require_user(store)?;
            println!("{} wears: {}", user.agent.name, hat_list(&user.agent.hats));
        }
        Command::Show { process_id } => {
            let user = require_user(store)?;
            match process_id {
                Some(id) => match user.process(&id) {
                    Some(process) => print_card(process),
                    None => bail!("No process with id {}", id),
                },
                None => print_user(&user),
            }
        }
        Command::List => {
            let user = require_user(store)?;
            if user.processes.is_empty() {
                println!("No processes.");
            }
            for process in &user.processes {
                print_process_line(process);
            }
        }
        Command::Protocols { lens } => {
            let catalog = store.protocols();
            let protocols: Vec<&Protocol> = match lens {
                Some(lens) => catalog.protocols_for_lens(lens),
                None => catalog.protocols().iter().collect(),
            };
            for protocol in protocols {
                print_protocol(protocol);
            }
        }
        Command::Providers { lens } => {
            let directory = store.providers();
            let providers: Vec<&Provider> = match lens {
                Some(lens) => directory.providers_for_lens(lens),
                None => directory.providers().iter().collect(),
            };
            for provider in providers {
                print_provider(provider);
            }
        }
        Command::Theme { preference } => match preference {
            Some(preference) => {
                settings.set_theme_preference(preference).await?;
                println!("Theme set to {}", preference);
            }
            None => {
                let preference = settings.theme_preference().await;
                match preference {
                    ThemePreference::Auto => println!("Theme: auto (follows the system)"),
                    other => println!("Theme: {}", other),
                }
            }
        },
        Command::Reset => {
            applied(name, store.clear().await?)?;
            println!("All data cleared.");
        }
    }
    Ok(())
}

fn hat_list(hats: &[Hat]) -> String {
    hats.iter()
        .map(|h| h.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_user(user: &User) {
    println!("{} ({})", user.name, user.id);
    println!(
        "Agent {} [{}], hats: {}",
        user.agent.name,
        user.agent.persona.label(),
        hat_list(&user.agent.hats)
    );
    let lenses: Vec<&str> = user.lenses.iter().map(|l| l.label()).collect();
    println!("Lenses: {}", lenses.join(", "));
    println!();
    for process in &user.processes {
        print_process_line(process);
    }
}

fn print_process_line(process: &Process) {
    println!(
        "{}  {:<6}  {:<9}  {}  ({})",
        process.id,
        process.status.as_str(),
        process.lens.label(),
        process.title,
        process.summary
    );
}

fn print_list(label: &str, items: Option<&Vec<String>>) {
    if let Some(items) = items.filter(|i| !i.is_empty()) {
        println!("{}:", label);
        for item in items {
            println!("  - {}", item);
        }
    }
}

fn print_card(process: &Process) {
    println!("{} [{}] {}", process.title, process.lens.label(), process.status);
    println!("id: {}", process.id);
    println!("{}", process.summary);

    let fields = &process.fields;
    if let Some(goal) = &fields.goal {
        println!("Goal: {}", goal);
    }
    if let Some(context) = &fields.context {
        println!("Context: {}", context);
    }
    print_list("Constraints", fields.constraints.as_ref());
    print_list("Next steps", fields.next_steps.as_ref());
    print_list("Risks", fields.risks.as_ref());
    print_list("Resources", fields.resources.as_ref());
    if let Some(outcome) = &fields.outcome {
        println!("Outcome: {}", outcome);
    }
    if let Some(steps) = process.steps.as_ref().filter(|s| !s.is_empty()) {
        println!("Checklist:");
        for step in steps {
            let mark = if step.completed { "x" } else { " " };
            println!("  [{}] {}. {}", mark, step.order, step.title);
        }
    }
    if let Some(minutes) = process.reality.as_ref().and_then(|r| r.estimated_time_minutes) {
        println!("Estimate: ~{} min", minutes);
    }

    let skip = process.messages.len().saturating_sub(CARD_MESSAGE_LIMIT);
    if !process.messages.is_empty() {
        println!("Messages ({}):", process.messages.len());
        for message in process.messages.iter().skip(skip) {
            let who = match message.sender {
                Sender::User => "you",
                Sender::Agent => "agent",
            };
            println!("  {}: {}", who, message.text);
        }
    }
    println!("Timeline: {} events", process.timeline.len());
}

fn print_protocol(protocol: &Protocol) {
    println!(
        "{}  {} [{}] ~{} min",
        protocol.id,
        protocol.title,
        protocol.lens.label(),
        protocol.estimate_minutes
    );
    println!("  {}", protocol.description);
    for step in &protocol.steps_preview {
        println!("  - {}", step);
    }
}

fn print_provider(provider: &Provider) {
    println!(
        "{}  {} [{}] {:.1}  {}  {}",
        provider.id,
        provider.display_name,
        provider.lens.label(),
        provider.rating,
        provider.price_range,
        provider.response_time
    );
    println!("  {}", provider.specialties.join(", "));
    println!("  {}", provider.bio);
}
