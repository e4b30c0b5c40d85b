use clap::{Parser, Subcommand};
use codecamp::Config;
use codecamp::auth::{hash_password, is_valid_email, is_valid_password};
use codecamp::model::entity::{Difficulty, Lesson, LessonCreate, UserEntity, UserEntityCreateUpdate};
use codecamp::model::{CrudRepository, DbConnection, ModelManager};
use codecamp::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for managing the codecamp database", long_about = None)]
pub struct Cli {
    /// SQLite file to use instead of the configured DATABASE_FILE
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// Create the user with the admin role
        #[arg(long, default_value_t = false)]
        admin: bool,
    },
    /// Grant the admin role to an existing user
    Promote {
        #[arg(long)]
        email: String,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// beginner, intermediate or advanced
        #[arg(long, default_value = "beginner", value_parser = parse_difficulty)]
        difficulty: Difficulty,
        /// Path to a file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::parse(value).ok_or_else(|| format!("unknown difficulty `{value}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let config = Config::get_or_init(false).await;

    let database = args
        .database
        .unwrap_or_else(|| config.app().database_file().to_string());
    let db_con = DbConnection::connect(&database)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::system();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                email,
                name,
                password,
                admin,
            } => {
                if !is_valid_email(&email) {
                    return Err(format!("invalid email `{email}`").into());
                }
                if !is_valid_password(&password) {
                    return Err("password is too short".into());
                }

                let mut user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email,
                        name,
                        password_hash: hash_password(&password)?,
                    },
                )
                .await?;
                if admin {
                    user = user.set_role(&mm, &actor, UserRole::Admin).await?;
                }
                println!("User created: {} ({}, {})", user.email(), user.id(), user.role());
            }

            UserCommands::Promote { email } => {
                let user = UserEntity::find_by_email(&mm, &actor, &email)
                    .await?
                    .ok_or_else(|| format!("no user with email `{email}`"))?;
                let user = user.set_role(&mm, &actor, UserRole::Admin).await?;
                println!("User promoted: {} ({})", user.email(), user.id());
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                title,
                description,
                difficulty,
                file,
                order_index,
            } => {
                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        title,
                        description,
                        difficulty,
                        content,
                        order_index,
                    },
                )
                .await?;
                println!("Lesson created: {} ({})", lesson.title(), lesson.id());
            }
        },
    }

    Ok(())
}
