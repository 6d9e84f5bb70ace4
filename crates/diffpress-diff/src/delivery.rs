//! Inline or file-based prompt delivery
//!
//! Prompts over the configured size are written to a uniquely named file
//! under the working tree and replaced by a short prompt that points to it.
//! The file is owned by a [`PromptFileGuard`], which removes it on
//! [`PromptFileGuard::cleanup`] or when dropped.

use crate::config::DeliveryConfig;
use crate::error::DeliveryError;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PROMPT_FILE_PREFIX: &str = "prompt_";
const PROMPT_FILE_SUFFIX: &str = ".md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Inline,
    FileBased,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDecision {
    pub mode: DeliveryMode,
    pub temp_path: Option<PathBuf>,
}

impl DeliveryDecision {
    fn inline() -> Self {
        Self {
            mode: DeliveryMode::Inline,
            temp_path: None,
        }
    }
}

/// Prompt to hand to the generation command, plus the file backing it
#[derive(Debug)]
pub struct ResolvedPrompt {
    pub prompt: String,
    pub decision: DeliveryDecision,
    guard: Option<PromptFileGuard>,
}

impl ResolvedPrompt {
    /// Remove the backing file, if any. Safe to call more than once.
    pub fn cleanup(&mut self) -> Result<(), DeliveryError> {
        match self.guard.as_mut() {
            Some(guard) => guard.cleanup(),
            None => Ok(()),
        }
    }

    pub fn guard(&self) -> Option<&PromptFileGuard> {
        self.guard.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFileState {
    Created,
    Written,
    Cleaned,
}

/// Owns a prompt file for the duration of one invocation
#[derive(Debug)]
pub struct PromptFileGuard {
    path: PathBuf,
    state: PromptFileState,
}

impl PromptFileGuard {
    /// Create `dir/prompt_<uuid>.md`, failing if the name is already taken
    fn create(dir: &Path) -> Result<(Self, fs::File), DeliveryError> {
        let name = format!(
            "{PROMPT_FILE_PREFIX}{}{PROMPT_FILE_SUFFIX}",
            Uuid::new_v4().simple()
        );
        let path = dir.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| DeliveryError::Write {
                path: path.clone(),
                source,
            })?;
        Ok((
            Self {
                path,
                state: PromptFileState::Created,
            },
            file,
        ))
    }

    fn write(&mut self, mut file: fs::File, content: &str) -> Result<(), DeliveryError> {
        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| DeliveryError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.state = PromptFileState::Written;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> PromptFileState {
        self.state
    }

    /// Delete the file. A file that is already gone counts as cleaned.
    pub fn cleanup(&mut self) -> Result<(), DeliveryError> {
        if self.state == PromptFileState::Cleaned {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(DeliveryError::Cleanup {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        tracing::debug!(path = %self.path.display(), "removed prompt file");
        self.state = PromptFileState::Cleaned;
        Ok(())
    }
}

impl Drop for PromptFileGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!("{}", e);
        }
    }
}

/// Short prompt that points the consumer at the file holding the real one
pub fn substitute_prompt(path: &Path) -> String {
    format!(
        "Please read and follow the instructions in the file below.\n\n\
         **File path**: `{}`\n\n\
         Read the file contents carefully and execute the task described within.\n",
        path.display()
    )
}

/// Decide how `prompt` reaches the generation command.
///
/// Prompts up to `threshold_bytes`, or any prompt when file delivery is
/// disabled, are passed through unchanged. Larger prompts are written to a
/// file under `work_dir`; failure to do so is an error, never a silent
/// fallback to inline delivery.
pub fn resolve_delivery(
    prompt: String,
    config: &DeliveryConfig,
    work_dir: &Path,
) -> Result<ResolvedPrompt, DeliveryError> {
    if !config.enabled || prompt.len() <= config.threshold_bytes {
        return Ok(ResolvedPrompt {
            prompt,
            decision: DeliveryDecision::inline(),
            guard: None,
        });
    }

    let dir = work_dir.join(&config.temp_dir);
    fs::create_dir_all(&dir).map_err(|source| DeliveryError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    let dir = fs::canonicalize(&dir).map_err(|source| DeliveryError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let (mut guard, file) = PromptFileGuard::create(&dir)?;
    guard.write(file, &prompt)?;

    tracing::info!(
        path = %guard.path().display(),
        size = prompt.len(),
        threshold = config.threshold_bytes,
        "prompt delivered through file"
    );

    Ok(ResolvedPrompt {
        prompt: substitute_prompt(guard.path()),
        decision: DeliveryDecision {
            mode: DeliveryMode::FileBased,
            temp_path: Some(guard.path().to_path_buf()),
        },
        guard: Some(guard),
    })
}
