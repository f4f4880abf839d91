use log::{debug, info};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::{EntityId, EntityRecord};
use crate::storage::{RepositoryError, SeriesRepository};

const RECORD_PREFIX: &str = "record-";
const RECORD_EXTENSION: &str = "bin";

/// Directory of bincode-encoded records, one file per entity.
pub struct FileRepository {
    base_path: PathBuf,
    next_id: u64,
}

impl FileRepository {
    /// Opens (creating if needed) the directory and resumes id assignment after
    /// the highest existing record.
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            RepositoryError::Storage(format!("cannot create {}: {}", base_path.display(), e))
        })?;

        let mut repo = Self { base_path, next_id: 0 };
        let existing = repo.scan()?;
        repo.next_id = existing.iter().max().map_or(0, |n| n + 1);
        info!("opened record store at {} with {} records", repo.base_path.display(), existing.len());
        Ok(repo)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, id: &EntityId) -> PathBuf {
        self.base_path.join(format!("{}.{}", id.0, RECORD_EXTENSION))
    }

    fn scan(&self) -> Result<Vec<u64>, RepositoryError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            RepositoryError::Storage(format!("cannot list {}: {}", self.base_path.display(), e))
        })?;
        let mut numbers = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(n) = path.file_stem().and_then(|s| s.to_str()).and_then(record_number) {
                numbers.push(n);
            }
        }
        Ok(numbers)
    }
}

fn record_id(n: u64) -> EntityId {
    EntityId(format!("{}{:06}", RECORD_PREFIX, n))
}

/// Number of a file stem written by `store`. Stems that would not map back to
/// the same file name, such as `record-7`, are not records.
fn record_number(stem: &str) -> Option<u64> {
    let digits = stem.strip_prefix(RECORD_PREFIX)?;
    let n = digits.parse::<u64>().ok()?;
    (format!("{:06}", n) == digits).then_some(n)
}

impl SeriesRepository for FileRepository {
    fn store(&mut self, record: EntityRecord) -> Result<EntityId, RepositoryError> {
        let id = record_id(self.next_id);
        let encoded = bincode::serialize(&record)
            .map_err(|e| RepositoryError::Codec { id: id.clone(), message: e.to_string() })?;

        let path = self.record_path(&id);
        let tmp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            writer.write_all(&encoded)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)?;

        self.next_id += 1;
        debug!("stored {} as {} ({} bytes)", record.name, id, encoded.len());
        Ok(id)
    }

    fn list_ids(&self) -> Result<BTreeSet<EntityId>, RepositoryError> {
        Ok(self
            .scan()?
            .into_iter()
            .map(record_id)
            .collect())
    }

    fn load(&self, id: &EntityId) -> Result<EntityRecord, RepositoryError> {
        let path = self.record_path(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| RepositoryError::Codec { id: id.clone(), message: e.to_string() })
    }
}
