mod session;

pub use session::{AgentSession, SessionState};
