use std::fmt;

use crate::components::{BuildingId, BuildingTypeId};

/// Coarse classification of command failures. None of them are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InsufficientResource,
    NotFound,
    Persistence,
}

/// Why a command was rejected. Every variant leaves the city untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownType(BuildingTypeId),
    UnknownBuilding(BuildingId),
    CellsOccupied,
    InsufficientGold { required: i64, available: i64 },
    MaxLevelReached { level: u32 },
    NoSaveFound,
    Persistence(String),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::UnknownType(_)
            | CommandError::UnknownBuilding(_)
            | CommandError::CellsOccupied
            | CommandError::MaxLevelReached { .. } => ErrorKind::Validation,
            CommandError::InsufficientGold { .. } => ErrorKind::InsufficientResource,
            CommandError::NoSaveFound => ErrorKind::NotFound,
            CommandError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownType(id) => write!(f, "Unknown building type '{id}'."),
            CommandError::UnknownBuilding(id) => write!(f, "Building {id} not found."),
            CommandError::CellsOccupied => write!(f, "Cannot place here: cells are occupied."),
            CommandError::InsufficientGold {
                required,
                available,
            } => write!(f, "Not enough gold: need {required}, have {available}."),
            CommandError::MaxLevelReached { level } => {
                write!(f, "Building is already at its maximum level ({level}).")
            }
            CommandError::NoSaveFound => write!(f, "No saved game found."),
            CommandError::Persistence(msg) => write!(f, "Save data error: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<SaveError> for CommandError {
    fn from(e: SaveError) -> Self {
        CommandError::Persistence(e.to_string())
    }
}

/// Errors reading or writing the save slot.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Parse(e) => write!(f, "corrupt save data: {e}"),
            SaveError::Encode(e) => write!(f, "could not encode save data: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Parse(e) | SaveError::Encode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// Errors loading the building catalog configuration.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "I/O error: {e}"),
            CatalogError::Parse(e) => write!(f, "parse error: {e}"),
            CatalogError::Invalid(msg) => write!(f, "invalid catalog: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Parse(e) => Some(e),
            CatalogError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}
