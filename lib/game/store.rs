use crate::game::InvalidSnapshot;
use derive_more::{Constructor, Display, Error, From};
use std::io::{self, ErrorKind};
use std::{fs, path::PathBuf};

/// Trait for types that persist a saved game.
#[cfg_attr(test, mockall::automock)]
pub trait Store {
    /// Reads the saved game, if there is one.
    fn load(&self) -> io::Result<Option<String>>;

    /// Overwrites the saved game.
    fn save(&mut self, data: &str) -> io::Result<()>;
}

/// A [`Store`] backed by a file.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Constructor)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// The path to the file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Store for FileStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, data: &str) -> io::Result<()> {
        fs::write(&self.path, data)
    }
}

/// The reason why loading a saved game failed.
#[derive(Debug, Display, Error, From)]
pub enum LoadError {
    #[display(fmt = "failed to read the saved game")]
    Io(io::Error),

    #[display(fmt = "failed to parse the saved game")]
    Syntax(serde_json::Error),

    #[display(fmt = "the saved game is invalid")]
    Invalid(InvalidSnapshot),
}

/// The reason why saving the game failed.
#[derive(Debug, Display, Error, From)]
pub enum SaveError {
    #[display(fmt = "failed to write the saved game")]
    Io(io::Error),

    #[display(fmt = "failed to serialize the game")]
    Syntax(serde_json::Error),
}
