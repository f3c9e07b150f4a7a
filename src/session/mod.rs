pub mod config;
pub mod orchestrator;

pub use config::{result_key, SessionError, TeamSession, DEFAULT_SESSION_PATH};
pub use orchestrator::{
    display_synergies, BuiltTeam, Orchestrator, OrchestratorError, OrchestratorOptions,
    PendingBuild, Presentation, TeamCounts, TeamResult,
};
