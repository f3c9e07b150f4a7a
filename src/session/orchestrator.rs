//! Team building for a session: roster filtering, search dispatch, result
//! hydration and persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::data::champion::{ChampionId, Mode, RosterChampion};
use crate::data::game_data::{GameData, SynergyRecord};
use crate::data::roster::{Roster, RosterError};
use crate::host::{BuildHandle, BuildOutcome, BuildRequest, HostError, SearchHost};
use crate::optimizer::build_candidates;
use crate::optimizer::candidate::champion_power;
use crate::session::config::{result_key, SessionError, TeamSession};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("team build failed: {0}")]
    Host(#[from] HostError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Receives build feedback. Calls are fire-and-forget.
pub trait Presentation {
    /// Build progress as a fraction in `[0, 1]`.
    fn progress(&mut self, fraction: f64);

    fn team_built(&mut self, mode: Mode, result: &TeamResult);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltTeam {
    pub champions: Vec<RosterChampion>,
    pub synergies: Vec<SynergyRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamCounts {
    pub teams: usize,
    pub synergies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub teams: Vec<BuiltTeam>,
    pub counts: TeamCounts,
    pub extras: Vec<RosterChampion>,
    pub value: f64,
}

impl TeamResult {
    fn from_teams(teams: Vec<BuiltTeam>, extras: Vec<RosterChampion>, value: f64) -> Self {
        let counts = TeamCounts {
            teams: teams.len(),
            synergies: teams.iter().map(|team| team.synergies.len()).sum(),
        };
        Self {
            teams,
            counts,
            extras,
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// How long progress stays at 1 after a result before resetting to 0.
    pub progress_hold: Duration,
    /// Where session changes are persisted. `None` keeps them in memory.
    pub session_path: Option<PathBuf>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            progress_hold: Duration::from_millis(250),
            session_path: None,
        }
    }
}

/// A build that has been handed to the host but not yet collected.
pub struct PendingBuild {
    handle: BuildHandle,
    mode: Mode,
    key: String,
}

impl PendingBuild {
    pub fn generation(&self) -> u64 {
        self.handle.generation()
    }
}

pub struct Orchestrator<R, G, P> {
    roster: R,
    game_data: G,
    presentation: P,
    session: TeamSession,
    options: OrchestratorOptions,
    host: SearchHost,
    results: HashMap<String, Option<TeamResult>>,
    building: bool,
    progress: f64,
    last_built: Option<DateTime<Utc>>,
}

impl<R, G, P> Orchestrator<R, G, P>
where
    R: Roster,
    G: GameData,
    P: Presentation,
{
    pub fn new(
        roster: R,
        game_data: G,
        presentation: P,
        session: TeamSession,
        options: OrchestratorOptions,
    ) -> Self {
        let mut orchestrator = Self {
            roster,
            game_data,
            presentation,
            session,
            options,
            host: SearchHost::new(),
            results: HashMap::new(),
            building: false,
            progress: 0.0,
            last_built: None,
        };
        orchestrator.load_saved_teams();
        orchestrator
    }

    /// Run builds on `host` instead of a default one.
    pub fn with_host(mut self, host: SearchHost) -> Self {
        self.host = host;
        self
    }

    pub fn session(&self) -> &TeamSession {
        &self.session
    }

    /// Replace the session, persisting it when a session path is configured.
    pub fn set_session(&mut self, session: TeamSession) -> Result<(), OrchestratorError> {
        if let Some(path) = &self.options.session_path {
            session.save(path)?;
        }
        self.session = session;
        Ok(())
    }

    pub fn roster(&self) -> &R {
        &self.roster
    }

    pub fn is_building(&self) -> bool {
        self.building
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn last_built(&self) -> Option<DateTime<Utc>> {
        self.last_built
    }

    /// Cached result for `mode` at `size`, if a team is known.
    pub fn result(&self, mode: Mode, size: usize) -> Option<&TeamResult> {
        self.results
            .get(&result_key(mode, size))
            .and_then(Option::as_ref)
    }

    /// Saved alliance teams: the champions holding a mode's role form that mode's
    /// result when they fill a whole team.
    pub fn load_saved_teams(&mut self) {
        for mode in Mode::ALLIANCE {
            let size = mode.default_size();
            let mut champions: Vec<RosterChampion> = self
                .roster
                .filter(&|champion: &RosterChampion| champion.role == Some(mode))
                .into_iter()
                .cloned()
                .collect();
            let entry = if champions.len() == size {
                champions.sort_by_key(RosterChampion::id);
                let members: Vec<&RosterChampion> = champions.iter().collect();
                let synergies = display_synergies(&self.game_data, &members);
                Some(TeamResult::from_teams(
                    vec![BuiltTeam {
                        champions,
                        synergies,
                    }],
                    Vec::new(),
                    0.0,
                ))
            } else {
                None
            };
            self.results.insert(result_key(mode, size), entry);
        }
    }

    /// Roster champions that pass the session's filters, in roster order.
    pub fn eligible_champions(&self) -> Vec<&RosterChampion> {
        let session = &self.session;
        let game_data = &self.game_data;
        self.roster
            .filter(&|champion: &RosterChampion| {
                session.admits(champion, champion_power(champion, game_data))
            })
    }

    /// Snapshot of everything the search needs for the current session.
    pub fn prepare_request(&self) -> BuildRequest {
        let champions = self.eligible_champions();
        BuildRequest {
            mode: self.session.mode(),
            candidates: build_candidates(&champions, &self.game_data, self.session.weights()),
            config: self.session.search_config(),
        }
    }

    /// Hand a build for the current session to the host, superseding any build
    /// still running.
    pub fn start_build(&mut self) -> Result<PendingBuild, OrchestratorError> {
        let request = self.prepare_request();
        let mode = request.mode;
        let handle = self.host.build(request)?;
        self.building = true;
        self.set_progress(0.0);
        Ok(PendingBuild {
            handle,
            mode,
            key: self.session.result_key(),
        })
    }

    /// Wait for `pending` and apply its result. Returns `Ok(None)` when the build
    /// was superseded by a newer one.
    pub async fn finish_build(
        &mut self,
        pending: PendingBuild,
    ) -> Result<Option<&TeamResult>, OrchestratorError> {
        let PendingBuild { handle, mode, key } = pending;
        if handle.generation() != self.host.current_generation() {
            return Ok(None);
        }

        let progress = &mut self.progress;
        let presentation = &mut self.presentation;
        let waited = handle
            .wait(|current, max| {
                if max > 0 {
                    *progress = current as f64 / max as f64;
                    presentation.progress(*progress);
                }
            })
            .await;

        let outcome = match waited {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::error!(%mode, error = %err, "team build failed");
                self.building = false;
                self.set_progress(0.0);
                return Err(err.into());
            }
        };

        let result = self.hydrate(&outcome);
        tracing::info!(
            %mode,
            teams = result.counts.teams,
            synergies = result.counts.synergies,
            value = result.value,
            "team build applied"
        );
        self.results.insert(key.clone(), Some(result));
        self.last_built = Some(Utc::now());
        self.save_team(mode, &key)?;
        self.building = false;

        self.set_progress(1.0);
        if !self.options.progress_hold.is_zero() {
            tokio::time::sleep(self.options.progress_hold).await;
        }
        self.set_progress(0.0);

        let result = self.results.get(&key).and_then(Option::as_ref);
        if let Some(result) = result {
            self.presentation.team_built(mode, result);
        }
        Ok(result)
    }

    /// Build a team for the current session and wait for it.
    pub async fn build_team(&mut self) -> Result<Option<&TeamResult>, OrchestratorError> {
        let pending = self.start_build()?;
        self.finish_build(pending).await
    }

    /// Turn the ids returned by the search back into roster records.
    pub fn hydrate(&self, outcome: &BuildOutcome) -> TeamResult {
        let teams = outcome
            .teams
            .iter()
            .map(|ids| {
                let mut ids = ids.clone();
                ids.sort();
                let members: Vec<&RosterChampion> =
                    ids.iter().filter_map(|id| self.roster.get(id)).collect();
                BuiltTeam {
                    synergies: display_synergies(&self.game_data, &members),
                    champions: members.into_iter().cloned().collect(),
                }
            })
            .collect();
        let extras = outcome
            .extras
            .iter()
            .filter_map(|id| self.roster.get(id).cloned())
            .collect();
        TeamResult::from_teams(teams, extras, outcome.value)
    }

    fn save_team(&mut self, mode: Mode, key: &str) -> Result<(), OrchestratorError> {
        if mode.is_read_only() {
            return Ok(());
        }
        let team: Vec<ChampionId> = self
            .results
            .get(key)
            .and_then(Option::as_ref)
            .and_then(|result| result.teams.first())
            .map(|team| team.champions.iter().map(RosterChampion::id).collect())
            .unwrap_or_default();
        self.roster.set_team(mode, &team)?;
        Ok(())
    }

    fn set_progress(&mut self, fraction: f64) {
        self.progress = fraction;
        self.presentation.progress(fraction);
    }
}

/// Synergies active in `team`, in catalog order: the source champion (at its star
/// level) and a partner with the target uid are both present. Special effects are
/// listed once per key, first occurrence kept.
pub fn display_synergies(game_data: &dyn GameData, team: &[&RosterChampion]) -> Vec<SynergyRecord> {
    let mut specials: Vec<String> = Vec::new();
    game_data
        .synergies()
        .iter()
        .filter(|synergy| {
            team.iter().any(|champion| synergy.is_from(&champion.id()))
                && team.iter().any(|champion| champion.uid == synergy.to_uid)
        })
        .filter(|synergy| {
            if !game_data.is_special(synergy.effect) {
                return true;
            }
            let key = synergy.special_key();
            if specials.contains(&key) {
                return false;
            }
            specials.push(key);
            true
        })
        .cloned()
        .collect()
}
