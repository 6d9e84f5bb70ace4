use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

pub struct GitHelper;

impl GitHelper {
    pub fn get_repo_root() -> Result<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .context("Failed to execute git")?;

        if output.status.success() {
            Ok(PathBuf::from(
                String::from_utf8_lossy(&output.stdout).trim(),
            ))
        } else {
            bail!("Not in a git repository")
        }
    }

    pub fn get_current_branch() -> Result<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .output()
            .context("Failed to execute git")?;

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || branch.is_empty() {
            bail!("Failed to get current branch");
        }
        // Detached HEAD
        if branch == "HEAD" {
            bail!("Not on a branch");
        }
        Ok(branch)
    }
}
