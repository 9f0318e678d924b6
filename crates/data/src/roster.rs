use prizedraw_core::{is_triple, DrawOutcome};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub used: bool,
    /// Display slots joined with commas, e.g. `"50,50,50"`.
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            used: false,
            prize: None,
            time: None,
        }
    }

    /// The prize recorded for this participant, if the stored slots show a win.
    pub fn awarded_prize(&self) -> Option<u32> {
        let slots: Vec<u32> = self
            .prize
            .as_deref()?
            .split(',')
            .map(|slot| slot.trim().parse().ok())
            .collect::<Option<_>>()?;
        let slots: [u32; 3] = slots.try_into().ok()?;
        is_triple(&slots).then_some(slots[0])
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("id and name are required")]
    MissingFields,
    #[error("id and name do not match")]
    IdNameMismatch,
    #[error("participant has already drawn")]
    AlreadyUsed,
}

impl EligibilityError {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingFields => "missing_id_or_name",
            Self::IdNameMismatch => "id_name_mismatch",
            Self::AlreadyUsed => "already_used",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Participant> {
        let id = id.trim();
        self.participants.iter().find(|item| item.id.trim() == id)
    }

    pub fn check(&self, id: &str, name: &str) -> Result<&Participant, EligibilityError> {
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return Err(EligibilityError::MissingFields);
        }
        let participant = self.find(id).ok_or(EligibilityError::IdNameMismatch)?;
        if participant.name.trim() != name {
            return Err(EligibilityError::IdNameMismatch);
        }
        if participant.used {
            return Err(EligibilityError::AlreadyUsed);
        }
        Ok(participant)
    }

    pub fn remaining_eligible(&self) -> usize {
        self.participants.iter().filter(|item| !item.used).count()
    }

    pub fn drawn(&self) -> usize {
        self.participants.len() - self.remaining_eligible()
    }

    pub fn awarded(&self) -> Vec<u32> {
        self.participants
            .iter()
            .filter(|item| item.used)
            .filter_map(Participant::awarded_prize)
            .collect()
    }

    /// Marks the participant as drawn. Returns false when the id is unknown.
    pub fn commit(&mut self, id: &str, outcome: &DrawOutcome, time: String) -> bool {
        let id = id.trim();
        let Some(participant) = self
            .participants
            .iter_mut()
            .find(|item| item.id.trim() == id)
        else {
            return false;
        };
        participant.used = true;
        participant.prize = Some(outcome.slots_string());
        participant.time = Some(time);
        true
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

/// Where participant records live between draws.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Result<Roster, RosterError>;
    fn save(&self, roster: &Roster) -> Result<(), RosterError>;
}

/// Roster kept as a JSON array of participant records.
#[derive(Debug, Clone)]
pub struct JsonRosterStore {
    path: PathBuf,
}

impl JsonRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: std::io::Error) -> RosterError {
        RosterError::Io(format!("{}: {err}", self.path.display()))
    }
}

impl RecordStore for JsonRosterStore {
    fn load(&self) -> Result<Roster, RosterError> {
        let body = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let participants: Vec<Participant> = serde_json::from_str(&body)
            .map_err(|err| RosterError::Serialize(format!("{}: {err}", self.path.display())))?;
        Ok(Roster::new(participants))
    }

    fn save(&self, roster: &Roster) -> Result<(), RosterError> {
        let body = serde_json::to_string_pretty(roster.participants())
            .map_err(|err| RosterError::Serialize(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))
    }
}

// Spreadsheet exports hand us ids as numbers and flags as "TRUE"/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(value) => value.to_string(),
        Loose::Int(value) => value.to_string(),
        Loose::Text(value) => value.trim().to_string(),
    })
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(value) => value,
        Loose::Int(value) => value == 1,
        Loose::Text(value) => value.trim().eq_ignore_ascii_case("true") || value.trim() == "1",
    })
}
