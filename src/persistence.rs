// File: src/persistence.rs
use crate::core::types::Word;
use crate::error::{Result, WordleError};
use crate::model::Mlp;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads a newline-delimited word list. Lines are trimmed and lowercased, blank
/// lines skipped; anything else that is not a five letter word is an error
/// carrying its 1-based line number.
pub fn load_vocabulary(path: &Path) -> Result<Vec<Word>> {
    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let word = Word::parse_folded(&line).map_err(|e| WordleError::Vocabulary {
            line: i + 1,
            source: Box::new(e),
        })?;
        words.push(word);
    }
    log::debug!("loaded {} words from {}", words.len(), path.display());
    Ok(words)
}

/// Writes through a temporary file in the destination directory, then renames,
/// so readers never observe a half-written file.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

pub fn save_model(model: &Mlp, path: &Path) -> Result<()> {
    write_atomic(path, |writer| Ok(bincode::serialize_into(writer, model)?))?;
    log::info!("saved model checkpoint to {}", path.display());
    Ok(())
}

pub fn load_model(path: &Path) -> Result<Mlp> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Pretty JSON, the format of interaction histories, loss curves and configs.
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    write_atomic(path, |writer| Ok(serde_json::to_writer_pretty(writer, value)?))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
