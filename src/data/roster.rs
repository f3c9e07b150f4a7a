//! The user's champion roster. The optimizer only reads it, except for writing
//! back the winning team of an alliance mode as role assignments.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::champion::{ChampionId, Mode, RosterChampion};
use crate::data::game_data::GameData;

pub const DEFAULT_ROSTER_PATH: &str = "data/roster.json";

const CSV_HEADER: [&str; 6] = ["Id", "Stars", "Rank", "Level", "Awakened", "Pi"];

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse roster {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write roster {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize roster: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid roster CSV at line {line}: {reason}")]
    InvalidCsv { line: u64, reason: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Read/write access to the roster, as needed by team building.
pub trait Roster {
    fn all(&self) -> &[RosterChampion];

    fn filter(&self, predicate: &dyn Fn(&RosterChampion) -> bool) -> Vec<&RosterChampion> {
        self.all().iter().filter(|champion| predicate(champion)).collect()
    }

    fn get(&self, id: &ChampionId) -> Option<&RosterChampion> {
        self.all().iter().find(|champion| champion.is(id))
    }

    /// Make `team` the saved team for `mode`: members get `mode` as their role and
    /// every other champion previously holding that role is released.
    fn set_team(&mut self, mode: Mode, team: &[ChampionId]) -> Result<(), RosterError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvImportReport {
    pub imported: usize,
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterFile {
    #[serde(default)]
    champions: Vec<RosterChampion>,
}

/// JSON-file backed roster. Without a path it lives in memory only.
#[derive(Debug, Clone, Default)]
pub struct FileRoster {
    path: Option<PathBuf>,
    champions: Vec<RosterChampion>,
}

impl FileRoster {
    pub fn in_memory(champions: Vec<RosterChampion>) -> Self {
        let mut roster = Self {
            path: None,
            champions,
        };
        roster.normalize();
        roster
    }

    /// Load from `path`. A missing file is an empty roster.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let champions = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| RosterError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let file: RosterFile =
                serde_json::from_str(&raw).map_err(|source| RosterError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            file.champions
        } else {
            Vec::new()
        };
        let mut roster = Self {
            path: Some(path.to_path_buf()),
            champions,
        };
        roster.normalize();
        Ok(roster)
    }

    pub fn save(&self) -> Result<(), RosterError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let payload = serde_json::to_string_pretty(&serde_json::json!({
            "champions": self.champions,
        }))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RosterError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, payload).map_err(|source| RosterError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }

    /// Append champions from a CSV export (`Id,Stars,Rank,Level,Awakened,Pi`, all but
    /// the first two columns optional). Rows naming champions missing from the
    /// catalog, or with unparseable numbers, are skipped and reported.
    pub fn import_csv<R: Read>(
        &mut self,
        reader: R,
        game_data: &dyn GameData,
    ) -> Result<CsvImportReport, RosterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut report = CsvImportReport::default();

        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = record.position().map_or(index as u64 + 1, |pos| pos.line());
            if index == 0 && record.get(0) == Some(CSV_HEADER[0]) && record.get(1) == Some(CSV_HEADER[1]) {
                continue;
            }
            if record.len() < 2 || record.len() > CSV_HEADER.len() {
                return Err(RosterError::InvalidCsv {
                    line,
                    reason: format!("expected 2 to 6 columns, found {}", record.len()),
                });
            }

            let uid = record[0].to_ascii_lowercase();
            let parsed = (|| -> Option<(u8, u8, u8, u16, u32)> {
                Some((
                    int_column(&record, 1, 1)?,
                    int_column(&record, 2, 1)?,
                    int_column(&record, 3, 1)?,
                    int_column(&record, 4, 0)?,
                    int_column(&record, 5, 0)?,
                ))
            })();
            let Some((stars, rank, level, awakened, pi)) = parsed else {
                tracing::warn!(line, "invalid roster CSV row, skipping");
                report.skipped.push(format!("line {line}: invalid number"));
                continue;
            };

            let id = ChampionId::new(uid, stars);
            let Some(catalog) = game_data.catalog_champion(&id) else {
                tracing::warn!(line, champion = %id, "champion not found in catalog, skipping");
                report.skipped.push(format!("line {line}: unknown champion {id}"));
                continue;
            };

            self.champions.push(RosterChampion {
                uid: id.uid,
                stars,
                category: catalog.category,
                role: None,
                rank,
                level,
                awakened,
                pi,
            });
            report.imported += 1;
        }

        self.normalize();
        self.save()?;
        Ok(report)
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), RosterError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;
        for champion in &self.champions {
            csv_writer.write_record([
                champion.uid.clone(),
                champion.stars.to_string(),
                champion.rank.to_string(),
                champion.level.to_string(),
                champion.awakened.to_string(),
                champion.pi.to_string(),
            ])?;
        }
        csv_writer.flush().map_err(|source| RosterError::Write {
            path: PathBuf::from("<csv>"),
            source,
        })
    }

    /// One entry per champion id (the latest wins), ordered by stars descending,
    /// then category, then uid.
    fn normalize(&mut self) {
        let mut by_id: BTreeMap<ChampionId, RosterChampion> = BTreeMap::new();
        for champion in self.champions.drain(..) {
            by_id.insert(champion.id(), champion);
        }
        self.champions = by_id.into_values().collect();
        self.champions.sort_by(|a, b| {
            b.stars
                .cmp(&a.stars)
                .then_with(|| a.category.index().cmp(&b.category.index()))
                .then_with(|| a.uid.cmp(&b.uid))
        });
    }
}

impl Roster for FileRoster {
    fn all(&self) -> &[RosterChampion] {
        &self.champions
    }

    fn set_team(&mut self, mode: Mode, team: &[ChampionId]) -> Result<(), RosterError> {
        for champion in &mut self.champions {
            if team.iter().any(|id| champion.is(id)) {
                champion.role = Some(mode);
            } else if champion.role == Some(mode) {
                champion.role = None;
            }
        }
        self.save()
    }
}

fn int_column<T: std::str::FromStr>(record: &csv::StringRecord, index: usize, default: T) -> Option<T> {
    match record.get(index) {
        None => Some(default),
        Some(raw) => raw.trim_matches('"').parse::<T>().ok(),
    }
}
