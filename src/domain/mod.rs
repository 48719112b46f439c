mod agent;
mod game;
mod query;

pub use agent::{AgentOption, Language, OptionKind, ReportForm, SuggestForm};
pub use game::{Author, Game};
pub use query::{QuerySpec, SortKey};
