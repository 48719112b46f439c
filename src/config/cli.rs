use crate::domain::{Language, SortKey};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Catalog service endpoint
    #[arg(
        long,
        env = "FLUXDECK_CATALOG_URL",
        default_value = "https://fluxyrepacks.xyz/api/games"
    )]
    pub catalog_url: String,

    /// Agent service base URL
    #[arg(
        long,
        env = "FLUXDECK_AGENT_URL",
        default_value = "https://fluxyrepacks.xyz/api/agent"
    )]
    pub agent_url: String,

    /// HTTP timeout in seconds; a stuck request fails instead of hanging
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the catalog and print the filtered, sorted view (the default)
    Browse {
        /// Case-insensitive search over name, description, cracker and genres
        #[arg(long, default_value = "")]
        search: String,

        /// Keep only games tagged with exactly this genre
        #[arg(long)]
        genre: Option<String>,

        /// Sort order for the view
        #[arg(long, value_enum, default_value_t = SortKey::Recent)]
        sort: SortKey,

        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<usize>,

        /// List the available genres instead of games
        #[arg(long)]
        list_genres: bool,

        /// Emit the view as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Interactive guided dialogue against the agent service
    Agent {
        /// Dialogue language; asked interactively when omitted
        #[arg(long, value_enum)]
        lang: Option<Language>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Browse {
            search: String::new(),
            genre: None,
            sort: SortKey::Recent,
            limit: None,
            list_genres: false,
            json: false,
        }
    }
}
