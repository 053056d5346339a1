//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Args, Parser, Subcommand};

use domain::User;

/// User store - user records in Redis with unique names and emails
#[derive(Parser, Debug)]
#[command(name = "user-store")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Redis connection URL, overrides USER_STORE_REDIS_URL and REDIS_URL
    #[arg(long, global = true)]
    pub redis_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Print a user as JSON
    Get { id: i64 },

    /// Create a user and print it with its assigned id
    Create(UserArgs),

    /// Overwrite an existing user
    Update {
        id: i64,
        #[command(flatten)]
        user: UserArgs,
    },

    /// Delete a user and its name/email index entries
    Delete { id: i64 },

    /// Print 1 if the user exists, 0 otherwise
    Count { id: i64 },

    /// Check store connectivity
    Ping,
}

/// User fields accepted by create and update
#[derive(Args, Debug, Clone, PartialEq)]
pub struct UserArgs {
    /// Unique username
    #[arg(long)]
    pub name: String,

    /// Unique email address
    #[arg(long)]
    pub email: String,

    /// Extra attribute as key=value (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,
}

impl UserArgs {
    /// Build the domain user these arguments describe.
    pub fn into_user(self) -> User {
        self.attributes
            .into_iter()
            .fold(User::new(self.name, self.email), |user, (k, v)| {
                user.with_attribute(k, v)
            })
    }
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
