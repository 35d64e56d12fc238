//! Built-in interpreters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use notebook_core::InterpreterResult;
use notebook_interpreter::{Interpreter, InterpreterContext};
use notebook_scheduler::Scheduler;
use tokio::process::Command;
use tracing::debug;

/// Returns the script body, tagged with the multiplex target if there is one.
pub struct EchoInterpreter {
    name: String,
    scheduler: Arc<dyn Scheduler>,
}

impl EchoInterpreter {
    pub fn new(name: impl Into<String>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            name: name.into(),
            scheduler,
        }
    }
}

#[async_trait]
impl Interpreter for EchoInterpreter {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheduler(&self) -> Option<Arc<dyn Scheduler>> {
        Some(self.scheduler.clone())
    }

    async fn interpret(&self, script: &str, context: &InterpreterContext) -> InterpreterResult {
        match &context.target {
            Some(target) => InterpreterResult::success(format!("[{}] {}", target, script.trim())),
            None => InterpreterResult::success(script.trim()),
        }
    }
}

/// Runs the script body with `sh -c`.
pub struct ShellInterpreter {
    name: String,
    scheduler: Arc<dyn Scheduler>,
    env: HashMap<String, String>,
}

impl ShellInterpreter {
    pub fn new(name: impl Into<String>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            name: name.into(),
            scheduler,
            env: HashMap::new(),
        }
    }

    /// Environment variables set for every script.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

#[async_trait]
impl Interpreter for ShellInterpreter {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheduler(&self) -> Option<Arc<dyn Scheduler>> {
        Some(self.scheduler.clone())
    }

    async fn interpret(&self, script: &str, context: &InterpreterContext) -> InterpreterResult {
        let start = std::time::Instant::now();

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script).envs(&self.env);
        if let Some(user) = &context.user {
            cmd.env("NOTEBOOK_USER", user);
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => return InterpreterResult::error(format!("Failed to start sh: {}", e)),
        };
        debug!(interpreter = %self.name, elapsed = ?start.elapsed(), "Shell script done");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if output.status.success() {
            InterpreterResult::success(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            InterpreterResult::error(format!(
                "exit code {}\n{}{}",
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            ))
        }
    }
}
