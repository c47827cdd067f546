use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "users")]
#[command(about = "Manage user records (name, email, phone, region/commune)", version)]
#[command(after_help = "EXAMPLES:
    users list                                List all users
    users show 42                             Show a user card
    users create                              Create a user interactively
    users update 42 --phone 912345678         Change a user's phone
    users communes Metropolitana              List a region's communes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and debug logs
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List users
    #[command(
        alias = "ls",
        after_help = "EXAMPLES:
    users list
    users list --format json"
    )]
    List,
    /// Show a single user
    #[command(
        alias = "v",
        after_help = "EXAMPLES:
    users show 42"
    )]
    Show {
        /// User ID
        id: String,
    },
    /// Create a new user
    #[command(
        alias = "c",
        after_help = "EXAMPLES:
    users create
    users create --name \"Ana Pérez\" --email ana@example.com --phone 912345678 \\
        --region Metropolitana --commune Santiago"
    )]
    Create(UserFieldArgs),
    /// Update an existing user
    #[command(
        alias = "u",
        after_help = "EXAMPLES:
    users update 42 --email ana@example.cl
    users update 42 --region Valparaíso --commune \"Viña del Mar\""
    )]
    Update(UserUpdateArgs),
    /// List regions
    #[command(after_help = "EXAMPLES:
    users regions")]
    Regions,
    /// List the communes of a region
    #[command(after_help = "EXAMPLES:
    users communes Valparaíso")]
    Communes {
        /// Region name (exact match)
        region: String,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    users completions bash > ~/.bash_completion.d/users
    users completions zsh > ~/.zfunc/_users
    users completions fish > ~/.config/fish/completions/users.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    users init")]
    Init,
}

#[derive(Args, Clone, Default)]
pub struct UserFieldArgs {
    /// Full name
    #[arg(long, short)]
    pub name: Option<String>,

    /// Email address
    #[arg(long, short)]
    pub email: Option<String>,

    /// Phone number, 9 digits starting with 2 or 9 (e.g., 912345678)
    #[arg(long, short)]
    pub phone: Option<String>,

    /// Region name
    #[arg(long, short)]
    pub region: Option<String>,

    /// Commune name (must belong to the region)
    #[arg(long, short)]
    pub commune: Option<String>,

    /// Never prompt; fail validation instead of asking for missing fields
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Args)]
pub struct UserUpdateArgs {
    /// User ID
    pub id: String,

    #[command(flatten)]
    pub fields: UserFieldArgs,
}

impl UserFieldArgs {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.region.is_none()
            && self.commune.is_none()
    }
}
