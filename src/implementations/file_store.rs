use std::fs::{ self, File, OpenOptions };
use std::io::{ ErrorKind, Read, Seek, SeekFrom, Write };
use std::path::{ Path, PathBuf };

use log::{ debug, warn };

use crate::errors::{ SweepError, SweepResult };
use crate::models::record::ResultRecord;
use crate::traits::checkpoint_store::CheckpointStore;

/// Checkpoint store keeping one `<name>.out` text file per property
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.out", name))
    }

    fn read_contents(&self, path: &Path) -> SweepResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SweepError::io(path, e)),
        }
    }

    fn parse_contents(path: &Path, contents: &str) -> SweepResult<Vec<ResultRecord>> {
        let complete = match contents.rfind('\n') {
            Some(end) => &contents[..=end],
            None => "",
        };
        if complete.len() < contents.len() {
            warn!(
                "Ignoring torn trailing write in {} ({} bytes)",
                path.display(),
                contents.len() - complete.len()
            );
        }

        let mut records = Vec::new();
        for (i, line) in complete.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = ResultRecord::parse_line(line).map_err(|e| SweepError::CorruptCheckpoint {
                path: path.to_path_buf(),
                line: i + 1,
                message: e.to_string(),
            })?;
            let expected = records.len() as u64;
            if record.n != expected {
                return Err(SweepError::CorruptCheckpoint {
                    path: path.to_path_buf(),
                    line: i + 1,
                    message: format!("expected n={}, found n={}", expected, record.n),
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Truncate an unterminated last line left behind by an interrupted write
    fn repair_torn_tail(path: &Path, file: &mut File) -> SweepResult<()> {
        let len = file.metadata().map_err(|e| SweepError::io(path, e))?.len();
        if len == 0 {
            return Ok(());
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1)).map_err(|e| SweepError::io(path, e))?;
        file.read_exact(&mut last).map_err(|e| SweepError::io(path, e))?;
        if last[0] == b'\n' {
            return Ok(());
        }

        let mut contents = Vec::new();
        file.seek(SeekFrom::Start(0)).map_err(|e| SweepError::io(path, e))?;
        file.read_to_end(&mut contents).map_err(|e| SweepError::io(path, e))?;
        let keep = contents
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        warn!("Truncating torn tail of {} from {} to {} bytes", path.display(), len, keep);
        file.set_len(keep as u64).map_err(|e| SweepError::io(path, e))?;
        Ok(())
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn read_all(&self, name: &str) -> SweepResult<Vec<ResultRecord>> {
        let path = self.path_for(name);
        match self.read_contents(&path)? {
            Some(contents) => Self::parse_contents(&path, &contents),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, name: &str, record: &ResultRecord) -> SweepResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SweepError::io(&self.dir, e))?;

        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| SweepError::io(&path, e))?;
        Self::repair_torn_tail(&path, &mut file)?;

        let expected = self.next_index(name)?;
        if record.n != expected {
            return Err(SweepError::OutOfOrderAppend {
                property: name.to_string(),
                expected,
                got: record.n,
            });
        }

        let line = format!("{}\n", record.to_line());
        file.write_all(line.as_bytes()).map_err(|e| SweepError::io(&path, e))?;
        file.sync_data().map_err(|e| SweepError::io(&path, e))?;
        debug!("Appended n={} to {}", record.n, path.display());
        Ok(())
    }
}
