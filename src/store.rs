use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;

use crate::domain::OutputFormat;
use crate::error::Dhis2Error;

const FILE_PREFIX: &str = "family_planning_data_";

/// Writes raw response bodies into the output directory, one timestamped
/// file per save.
#[derive(Debug, Clone)]
pub struct OutputStore {
    output_dir: Utf8PathBuf,
    format: OutputFormat,
}

impl OutputStore {
    pub fn new(output_dir: Utf8PathBuf, format: OutputFormat) -> Self {
        Self { output_dir, format }
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn ensure_output_dir(&self) -> Result<(), Dhis2Error> {
        fs::create_dir_all(self.output_dir.as_std_path())
            .map_err(|err| Dhis2Error::Filesystem(err.to_string()))
    }

    /// Saves one response body under a wall-clock-stamped name and returns
    /// the path. Names collide only if two saves land on the same microsecond
    /// tick; not guarded against.
    pub fn save(&self, content: &[u8]) -> Result<Utf8PathBuf, Dhis2Error> {
        let timestamp = Local::now().format("%Y-%m-%d %H-%M-%S%.6f");
        let file_name = format!("{FILE_PREFIX}{timestamp}.{}", self.format.extension());
        let path = self.output_dir.join(file_name);

        fs::write(path.as_std_path(), content).map_err(|err| Dhis2Error::Persistence {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(path)
    }
}
