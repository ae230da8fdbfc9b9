use std::io::{BufRead, Write};

use tracing::info;

use crate::error::SelectionError;
use crate::maven::GroupVersions;

/// How many of the newest versions are offered for a chosen group.
pub const MAX_VERSION_CHOICES: usize = 10;

/// Presents numbered choices and returns the zero-based index picked.
pub trait Prompt {
    fn choose(&mut self, heading: &str, choices: &[String]) -> Result<usize, SelectionError>;
}

/// Reads a 1-based number per question from a line-oriented input.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn choose(&mut self, heading: &str, choices: &[String]) -> Result<usize, SelectionError> {
        if choices.is_empty() {
            return Err(SelectionError::NoChoices);
        }

        writeln!(self.output, "{heading}")?;
        for (idx, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}. {}", idx + 1, choice)?;
        }
        write!(self.output, "Enter number: ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.trim();

        let choice: usize = answer
            .parse()
            .map_err(|_| SelectionError::InvalidInput(answer.to_string()))?;
        if choice == 0 || choice > choices.len() {
            return Err(SelectionError::OutOfRange {
                choice,
                max: choices.len(),
            });
        }
        Ok(choice - 1)
    }
}

/// Non-interactive mode: always takes the first choice.
pub struct FirstChoice;

impl Prompt for FirstChoice {
    fn choose(&mut self, heading: &str, choices: &[String]) -> Result<usize, SelectionError> {
        let first = choices.first().ok_or(SelectionError::NoChoices)?;
        info!("{} -> {}", heading.trim_end_matches(':'), first);
        Ok(0)
    }
}

/// Walk the user through picking a group, then a version unless one was
/// already given. Returns `(group, version)`.
pub fn select_release(
    prompt: &mut dyn Prompt,
    artifact: &str,
    groups: &[GroupVersions],
    pinned_version: Option<&str>,
) -> Result<(String, String), SelectionError> {
    if groups.is_empty() {
        return Err(SelectionError::NoResults(artifact.to_string()));
    }

    let names: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
    let picked = &groups[prompt.choose("Select a groupId:", &names)?];

    if let Some(version) = pinned_version {
        return Ok((picked.group.clone(), version.to_string()));
    }

    let versions = newest_versions(picked);
    let heading = format!(
        "Available versions for {}:{} (latest {}):",
        picked.group, artifact, MAX_VERSION_CHOICES
    );
    let version = versions[prompt.choose(&heading, &versions)?].clone();
    Ok((picked.group.clone(), version))
}

fn newest_versions(group: &GroupVersions) -> Vec<String> {
    group
        .versions
        .iter()
        .rev()
        .take(MAX_VERSION_CHOICES)
        .cloned()
        .collect()
}

// ── Tests ──
