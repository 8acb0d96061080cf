use tokio::process::Command;

use crate::error::{Error, Result};

/// Run git with the given arguments and return its stdout. A non-zero exit
/// surfaces the tool's stderr unchanged.
async fn run_git(args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .output()
        .await
        .map_err(|e| Error::Git {
            command: args.join(" "),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub async fn is_git_repo() -> bool {
    run_git(&["rev-parse", "--git-dir"]).await.is_ok()
}

pub async fn current_branch() -> Result<String> {
    Ok(run_git(&["rev-parse", "--abbrev-ref", "HEAD"])
        .await?
        .trim()
        .to_string())
}

/// Lowercase, collapse non-alphanumeric runs to single hyphens, trim and
/// truncate to 50 characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let truncated: String = slug.chars().take(50).collect();
    truncated.trim_matches('-').to_string()
}

pub fn branch_name(card_id: i64, title: &str) -> String {
    format!("feature/{card_id}-{}", slugify(title))
}

pub async fn create_branch(card_id: i64, title: &str) -> Result<String> {
    let branch = branch_name(card_id, title);
    run_git(&["checkout", "-b", &branch]).await?;
    Ok(branch)
}

pub async fn checkout_branch(card_id: i64, title: &str) -> Result<String> {
    let branch = branch_name(card_id, title);
    run_git(&["checkout", &branch]).await?;
    Ok(branch)
}

pub async fn commit_changes(card_id: i64, message: &str) -> Result<()> {
    let commit_message = format!("[{card_id}] {message}");
    run_git(&["commit", "-m", &commit_message]).await?;
    Ok(())
}

pub async fn status_short() -> Result<String> {
    Ok(run_git(&["status", "--short"]).await?.trim().to_string())
}

pub async fn changed_files() -> Result<Vec<String>> {
    let stdout = run_git(&["diff", "--name-only"]).await?;
    Ok(stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub async fn untracked_files() -> Result<Vec<String>> {
    let stdout = run_git(&["ls-files", "--others", "--exclude-standard"]).await?;
    Ok(stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub async fn add_all() -> Result<()> {
    run_git(&["add", "."]).await?;
    Ok(())
}

/// Push with upstream tracking.
pub async fn push_branch(branch: &str) -> Result<()> {
    run_git(&["push", "-u", "origin", branch]).await?;
    Ok(())
}

pub async fn remote_url() -> Option<String> {
    run_git(&["config", "--get", "remote.origin.url"])
        .await
        .ok()
        .map(|out| out.trim().to_string())
}
