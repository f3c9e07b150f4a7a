//! Messages exchanged with a search worker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::champion::{ChampionId, Mode};
use crate::optimizer::{Candidate, SearchConfig};

/// Snapshot handed to the worker. It is moved across, so later changes to the
/// session never reach a running search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub mode: Mode,
    pub candidates: Vec<Candidate>,
    pub config: SearchConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Zero or one team of champion ids, in candidate order.
    pub teams: Vec<Vec<ChampionId>>,
    pub extras: Vec<ChampionId>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("no async runtime available to start a search worker")]
    NoRuntime,
    #[error("search worker crashed: {0}")]
    WorkerPanicked(String),
    #[error("search worker disconnected without a result")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    Progress { current: u64, max: u64 },
    Result(BuildOutcome),
    Failed(HostError),
}

/// A message tagged with the build it belongs to.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub generation: u64,
    pub message: HostMessage,
}
