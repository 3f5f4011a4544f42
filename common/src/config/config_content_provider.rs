use std::io::ErrorKind;
use std::path::PathBuf;

pub trait ConfigContentProvider {
    /// Returns `Ok(None)` when there is no stored configuration yet.
    fn get_config_content(&self) -> Result<Option<String>, String>;

    fn source_name(&self) -> String;
}

pub struct FileContentConfigProvider {
    file_path: PathBuf,
}

impl FileContentConfigProvider {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self { file_path: file_path.into() }
    }
}

impl ConfigContentProvider for FileContentConfigProvider {
    fn get_config_content(&self) -> Result<Option<String>, String> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!(
                "Failed to read config file {}: {}",
                self.file_path.display(),
                err
            )),
        }
    }

    fn source_name(&self) -> String {
        self.file_path.display().to_string()
    }
}
