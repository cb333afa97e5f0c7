use clap::{Args, Parser, Subcommand};
use pywhiz::Config;
use pywhiz::auth::{AuthenticatedUser, Session};
use pywhiz::config::Fetch;
use pywhiz::error::{AppResult, run_with_error_handler};
use pywhiz::model::DocumentStore;
use pywhiz::model::entity::{Catalog, CategoryFilter, ProfilePatch, UserProfile};
use pywhiz::progress::filter_by_category;
use pywhiz::service::CourseService;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling and inspecting the course store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the course catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Manage user progress
    Progress {
        #[command(subcommand)]
        action: ProgressCommands,
    },

    /// Manage user profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show {
        #[command(flatten)]
        identity: Identity,
    },
    /// Overwrite the given fields, creating the profile if needed
    Set {
        #[command(flatten)]
        identity: Identity,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

/// Catalog management
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Upsert modules, videos and quizzes from a JSON catalog
    Import {
        #[arg(long, default_value = "data/catalog.json")]
        file: String,
    },
    List {
        /// Beginner, Intermediate, Expert or All
        #[arg(long, default_value = "All")]
        category: CategoryFilter,
    },
}

/// Progress management
#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Create empty progress records for every module
    Init {
        #[arg(long)]
        user: String,
    },
    Show {
        #[command(flatten)]
        identity: Identity,
        #[arg(long, default_value = "All")]
        category: CategoryFilter,
    },
    Watch {
        #[command(flatten)]
        identity: Identity,
        #[arg(long)]
        module: String,
        #[arg(long)]
        video: u32,
    },
    Quiz {
        #[command(flatten)]
        identity: Identity,
        #[arg(long)]
        module: String,
        /// Zero-based option index
        #[arg(long)]
        answer: usize,
    },
}

/// Who the command acts as
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Identity {
    /// User id, taken as is
    #[arg(long)]
    user: Option<String>,
    /// ID token, verified with `[auth] jwt` from config.toml
    #[arg(long)]
    token: Option<String>,
}

impl Identity {
    fn into_session(self) -> AppResult<Session> {
        match (self.user, self.token) {
            (_, Some(token)) => {
                let config = Config::load(cfg!(debug_assertions))?;
                Ok(Session::from_token(&token, config.auth().jwt())?)
            }
            (user, None) => Ok(Session::new(user.map(AuthenticatedUser::new))),
        }
    }
}

async fn run() -> AppResult<()> {
    pywhiz::setup_trace();
    let args = Cli::parse();

    // DATABASE_URL wins over config.toml
    let service = match std::env::var("DATABASE_URL") {
        Ok(uri) => CourseService::new(pywhiz::connect_store(&uri).await?, Fetch::default()),
        Err(_) => pywhiz::build_service().await?,
    };

    match args.command {
        Commands::Catalog { action } => match action {
            CatalogCommands::Import { file } => {
                let bytes = std::fs::read(&file)?;
                let catalog = Catalog::from_json(&bytes)?;
                let written = service.import_catalog(catalog).await?;
                println!("Imported {} modules from {}", written, file);
            }
            CatalogCommands::List { category } => {
                let modules = service.store().list_modules().await?;
                for module in filter_by_category(&modules, &category) {
                    println!(
                        "{:>3}  {:<40} {:<13} {} videos, {} users",
                        module.id(),
                        module.title(),
                        module.category(),
                        module.total_videos(),
                        module.users()
                    );
                }
            }
        },

        Commands::Progress { action } => match action {
            ProgressCommands::Init { user } => {
                let created = service.initialize_progress(&user).await?;
                println!("Created {} progress records for {}", created, user);
            }
            ProgressCommands::Show { identity, category } => {
                let session = identity.into_session()?;
                let overview = service
                    .course_overview(&session, &category, &CancellationToken::new())
                    .await?;

                if let Some(last) = overview.last_opened() {
                    println!("Latest learned: {} ({}%)", last.title(), last.progress());
                }
                for course in overview.courses() {
                    let duration = course
                        .duration_minutes()
                        .map_or_else(|| "?".to_string(), |m| m.to_string());
                    println!(
                        "{:>3}  {:<40} {:>3}%  {}/{} videos  {} min{}",
                        course.id(),
                        course.title(),
                        course.progress(),
                        course.watched_videos(),
                        course.total_videos(),
                        duration,
                        if course.quiz_completed() { "  quiz passed" } else { "" }
                    );
                }
            }
            ProgressCommands::Watch { identity, module, video } => {
                let session = identity.into_session()?;
                let progress = service.mark_video_watched(&session, &module, video).await?;
                println!("Module {} progress: {}%", module, progress);
            }
            ProgressCommands::Quiz { identity, module, answer } => {
                let session = identity.into_session()?;
                let outcome = service.submit_quiz_answer(&session, &module, answer).await?;
                if outcome.correct() {
                    println!("Correct! Module {} progress: {}%", module, outcome.progress());
                } else {
                    println!("Incorrect, try again! Module {} progress: {}%", module, outcome.progress());
                }
            }
        },

        Commands::Profile { action } => match action {
            ProfileCommands::Show { identity } => {
                let profile = service.profile(&identity.into_session()?).await?;
                print_profile(&profile);
            }
            ProfileCommands::Set { identity, name, email } => {
                let mut patch = ProfilePatch::new();
                if let Some(name) = name {
                    patch = patch.display_name(name);
                }
                if let Some(email) = email {
                    patch = patch.email(email);
                }
                let profile = service
                    .update_profile(&identity.into_session()?, patch)
                    .await?;
                print_profile(&profile);
            }
        },
    }

    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("Hello, {}!", profile.greeting_name("Learner"));
    println!("  uid:     {}", profile.uid());
    println!("  email:   {}", profile.email().unwrap_or("-"));
    if let Some(created_at) = profile.created_at() {
        println!("  joined:  {}", created_at.format("%Y-%m-%d"));
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    run_with_error_handler(run).await;
}
