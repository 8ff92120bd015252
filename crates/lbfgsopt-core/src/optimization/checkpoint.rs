//! Checkpoint persistence for long optimization runs.
//!
//! A checkpoint is a plain-text snapshot of the current point:
//!
//! ```text
//! # Iteration 40
//! -1.19999999999999996e0 1.00000000000000000e0 ...
//! ```
//!
//! The first line is a comment carrying the iteration number, the second the
//! space-separated coordinates with 17 significant digits, enough for an
//! exact `f64` round-trip. A missing checkpoint is not an error; it means the
//! run starts fresh.

use crate::{
    error::CheckpointError,
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::ffi::OsString;
use std::fmt::Debug;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A restored snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Checkpoint<T: Scalar> {
    /// Iteration at which the snapshot was written
    pub iteration: usize,
    /// The saved point
    pub point: DVector<T>,
}

/// Storage for optimizer snapshots.
pub trait CheckpointStore<T: Scalar>: Debug + Send {
    /// Persists `point` as the state after `iteration` iterations.
    fn save(&mut self, point: &DVector<T>, iteration: usize) -> Result<(), CheckpointError>;

    /// Restores the most recent snapshot, or `None` if there is none.
    fn load(&mut self) -> Result<Option<Checkpoint<T>>, CheckpointError>;
}

/// Checkpoint store backed by a single text file.
///
/// Writes go to a sibling `.tmp` file that is renamed over the target, so an
/// interrupted write leaves the previous checkpoint intact.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    /// File name used when no explicit path is given.
    pub const DEFAULT_FILE_NAME: &'static str = "checkpoint.txt";

    /// Create a store writing to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_snapshot<T: Scalar>(
        &self,
        target: &Path,
        point: &DVector<T>,
        iteration: usize,
    ) -> std::io::Result<()> {
        let file = fs::File::create(target)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "# Iteration {iteration}")?;
        let line = point
            .iter()
            .map(|v| format!("{:.17e}", <T as Scalar>::to_f64(*v)))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}")?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Default for FileCheckpoint {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE_NAME)
    }
}

impl<T: Scalar> CheckpointStore<T> for FileCheckpoint {
    fn save(&mut self, point: &DVector<T>, iteration: usize) -> Result<(), CheckpointError> {
        let tmp = self.temporary_path();
        if let Err(source) = self.write_snapshot(&tmp, point, iteration) {
            let _ = fs::remove_file(&tmp);
            return Err(CheckpointError::io(tmp, source));
        }
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            CheckpointError::io(self.path.clone(), source)
        })
    }

    fn load(&mut self) -> Result<Option<Checkpoint<T>>, CheckpointError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CheckpointError::io(self.path.clone(), source)),
        };
        parse_checkpoint(&text).map(Some)
    }
}

/// Parses the text form written by [`FileCheckpoint`].
pub fn parse_checkpoint<T: Scalar>(text: &str) -> Result<Checkpoint<T>, CheckpointError> {
    let mut lines = text.lines();

    let header = lines
        .next()
        .ok_or_else(|| CheckpointError::parse(1, "empty checkpoint"))?;
    let comment = header
        .strip_prefix('#')
        .ok_or_else(|| CheckpointError::parse(1, "missing '#' header"))?;
    let iteration = comment
        .split_whitespace()
        .last()
        .and_then(|token| token.parse::<usize>().ok())
        .ok_or_else(|| CheckpointError::parse(1, "header does not end with an iteration number"))?;

    let values = lines
        .next()
        .ok_or_else(|| CheckpointError::parse(2, "missing coordinate line"))?;
    let coordinates = values
        .split_whitespace()
        .map(|token| {
            let value = token
                .parse::<f64>()
                .ok()
                .and_then(<T as Scalar>::try_from_f64)
                .ok_or_else(|| CheckpointError::parse(2, format!("invalid value '{token}'")))?;
            if !<T as Float>::is_finite(value) {
                return Err(CheckpointError::parse(2, format!("non-finite value '{token}'")));
            }
            Ok(value)
        })
        .collect::<Result<Vec<T>, _>>()?;

    if coordinates.is_empty() {
        return Err(CheckpointError::parse(2, "no coordinates"));
    }

    Ok(Checkpoint {
        iteration,
        point: DVector::from_vec(coordinates),
    })
}
