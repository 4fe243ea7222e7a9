use std::path::PathBuf;
use std::process::Command;

use crate::collaborators::DevTools;
use crate::error::{AssistantError, Result};

const MAX_OUTPUT: usize = 2000;

/// Developer tooling backed by the project's own CLIs: git for version
/// control, cargo or npm for tests/lint/build depending on what the
/// working directory contains.
pub struct ShellDevTools {
    workdir: PathBuf,
}

impl ShellDevTools {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn in_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| AssistantError::collaborator("dev tools", e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&stderr);
        }
        if text.len() > MAX_OUTPUT {
            text.truncate(MAX_OUTPUT);
            text.push_str("\n... (output truncated)");
        }

        if output.status.success() {
            Ok(text)
        } else {
            Err(AssistantError::collaborator(
                "dev tools",
                format!("{} {} failed: {}", program, args.join(" "), text),
            ))
        }
    }

    fn project_kind(&self) -> Option<&'static str> {
        if self.workdir.join("Cargo.toml").exists() {
            Some("cargo")
        } else if self.workdir.join("package.json").exists() {
            Some("npm")
        } else {
            None
        }
    }
}

fn no_project_message(what: &str) -> String {
    format!(
        "No recognized project found to {} (expected Cargo.toml or package.json)",
        what
    )
}

impl DevTools for ShellDevTools {
    fn git_status(&self) -> Result<String> {
        let status = self.run("git", &["status", "--short", "--branch"])?;
        if status.is_empty() {
            Ok("Working tree clean".to_string())
        } else {
            Ok(status)
        }
    }

    fn git_pull(&self) -> Result<String> {
        let output = self.run("git", &["pull"])?;
        Ok(if output.is_empty() {
            "Pulled latest changes".to_string()
        } else {
            output
        })
    }

    fn git_push(&self) -> Result<String> {
        let output = self.run("git", &["push"])?;
        Ok(if output.is_empty() {
            "Pushed local commits".to_string()
        } else {
            output
        })
    }

    fn git_commit(&self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(AssistantError::collaborator(
                "dev tools",
                "commit message is empty",
            ));
        }
        self.run("git", &["add", "-A"])?;
        self.run("git", &["commit", "-m", message])?;
        Ok(format!("Committed changes: {}", message))
    }

    fn run_tests(&self) -> Result<String> {
        match self.project_kind() {
            Some("cargo") => self.run("cargo", &["test"]),
            Some(_) => self.run("npm", &["test"]),
            None => Ok(no_project_message("run tests in")),
        }
    }

    fn run_lint(&self) -> Result<String> {
        match self.project_kind() {
            Some("cargo") => self.run("cargo", &["clippy", "--", "-D", "warnings"]),
            Some(_) => self.run("npm", &["run", "lint"]),
            None => Ok(no_project_message("lint")),
        }
    }

    fn run_build(&self) -> Result<String> {
        match self.project_kind() {
            Some("cargo") => self.run("cargo", &["build"]),
            Some(_) => self.run("npm", &["run", "build"]),
            None => Ok(no_project_message("build")),
        }
    }
}
