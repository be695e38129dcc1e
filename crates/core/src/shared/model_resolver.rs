use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{APP_DIR_NAME, WHISPER_MODEL_BASE_URL};
use crate::transcription::domain::model::ModelName;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Locates ggml weight files, downloading them on first use.
///
/// Resolution order:
/// 1. Cache directory
/// 2. Bundled directory (pre-provisioned installs)
/// 3. Download from the model repository into the cache
pub struct ModelResolver {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
    base_url: String,
    progress: Option<ProgressFn>,
}

impl ModelResolver {
    /// Resolver rooted at the platform cache directory.
    pub fn new() -> Result<Self, ModelResolveError> {
        Ok(Self::with_cache_dir(model_cache_dir()?))
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            bundled_dir: None,
            base_url: WHISPER_MODEL_BASE_URL.to_string(),
            progress: None,
        }
    }

    pub fn bundled_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.bundled_dir = dir;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn model_url(&self, model: ModelName) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            model.ggml_file_name()
        )
    }

    /// Return a local path to the weights for `model`.
    pub fn resolve(&self, model: ModelName) -> Result<PathBuf, ModelResolveError> {
        let file_name = model.ggml_file_name();

        let cached_path = self.cache_dir.join(file_name);
        if cached_path.exists() {
            log::debug!("Model {model} found in cache: {}", cached_path.display());
            return Ok(cached_path);
        }

        if let Some(dir) = &self.bundled_dir {
            let bundled_path = dir.join(file_name);
            if bundled_path.exists() {
                log::debug!("Model {model} found in bundle: {}", bundled_path.display());
                return Ok(bundled_path);
            }
        }

        fs::create_dir_all(&self.cache_dir).map_err(ModelResolveError::CacheDir)?;
        let url = self.model_url(model);
        log::info!("Downloading model {model} from {url}");
        download(&url, &cached_path, self.progress.as_ref())?;
        Ok(cached_path)
    }
}

/// Platform-specific model cache directory.
///
/// - Linux: `$XDG_CACHE_HOME/transcribe-task/models/` or `~/.cache/transcribe-task/models/`
/// - macOS: `~/Library/Caches/transcribe-task/models/`
/// - Windows: `%LOCALAPPDATA%/transcribe-task/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<&ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |source: reqwest::Error| ModelResolveError::Download {
        url: url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let bytes = response.bytes().map_err(download_err)?;

    let mut file = fs::File::create(&temp_path).map_err(|e| write_error(&temp_path, e))?;
    let chunk_size = 1024 * 1024;
    for chunk in bytes.chunks(chunk_size) {
        if let Err(e) = file.write_all(chunk) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(&temp_path, e));
        }
        downloaded += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(|e| write_error(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| write_error(dest, e))?;
    Ok(())
}

fn write_error(path: &Path, source: std::io::Error) -> ModelResolveError {
    ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    }
}
