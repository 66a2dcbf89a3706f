use crate::api::StnoApi;
use crate::config::StnoConfig;
use crate::error::{Result, StnoError};
use crate::notebook::Notebook;
use crate::store::fs::FileStore;
use directories::BaseDirs;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the stno root directory.
pub const HOME_ENV: &str = "STNO_HOME";
const ROOT_DIR_NAME: &str = ".stno";

/// Where stno keeps its configuration and notebooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StnoPaths {
    pub root: PathBuf,
}

impl StnoPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$STNO_HOME` if set, otherwise `~/.stno`.
    pub fn resolve() -> Result<Self> {
        if let Some(root) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        let base = BaseDirs::new()
            .ok_or_else(|| StnoError::Api("Could not determine home directory".to_string()))?;
        Ok(Self::new(base.home_dir().join(ROOT_DIR_NAME)))
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    /// Directory of the notebook `name`. Names are single path components.
    pub fn notebook_dir(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StnoError::Api(format!("Invalid notebook name: '{}'", name)));
        }
        Ok(self.root.join(name))
    }
}

pub struct StnoContext {
    pub api: StnoApi<FileStore>,
    pub config: StnoConfig,
    pub notebook_name: String,
}

/// Loads the configuration and opens the notebook `notebook`, or the
/// configured default. The notebook directory is created when missing.
pub fn initialize(paths: &StnoPaths, notebook: Option<&str>) -> Result<StnoContext> {
    let config = StnoConfig::load(paths.config_dir())?;
    let notebook_name = notebook
        .unwrap_or(config.default_notebook.as_str())
        .to_string();
    let dir = paths.notebook_dir(&notebook_name)?;
    debug!(notebook = %notebook_name, dir = %dir.display(), "opening notebook");

    let mut notebook = Notebook::new(FileStore::create(dir)?);
    if let Some(source) = &config.entry_template {
        notebook.set_entry_template(source)?;
    }
    if let Some(source) = &config.entry_id_template {
        notebook.set_entry_id_template(source)?;
    }

    let api = StnoApi::new(notebook, paths.config_dir()).with_query_workers(config.query_workers);
    Ok(StnoContext {
        api,
        config,
        notebook_name,
    })
}
