//! Script hook engine: runs a configured script per event
//! binding in a bounded worker pool, with a restricted environment and
//! captured output. Modeled on the whisper adapter's CLI-wrapper-with-
//! timeout pattern (process spawn, output capture, timeout race).

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{error, info};

const MAX_CAPTURED_CHARS: usize = 4096;
const MAX_PAYLOAD_VALUE_CHARS: usize = 4096;

#[derive(Debug, Clone)]
pub struct HookConfig {
    pub name: String,
    pub event_binding: String,
    pub script_path: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HookExecution {
    pub hook_name: String,
    pub event_name: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

pub struct ScriptHookEngine {
    hooks: Vec<HookConfig>,
    semaphore: Arc<Semaphore>,
}

impl ScriptHookEngine {
    pub fn new(hooks: Vec<HookConfig>, max_concurrent: usize) -> Self {
        Self { hooks, semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))) }
    }

    pub fn hooks_for(&self, event_name: &str) -> Vec<&HookConfig> {
        self.hooks.iter().filter(|h| h.event_binding == event_name).collect()
    }

    /// Runs every hook bound to `event_name` concurrently (bounded by
    /// the worker pool), returning each execution's captured result.
    /// A hook's own failure never propagates to the caller.
    pub async fn dispatch(&self, event_name: &str, payload: &HashMap<String, Value>) -> Vec<HookExecution> {
        let hooks = self.hooks_for(event_name);
        let mut handles = Vec::with_capacity(hooks.len());

        for hook in hooks {
            let hook = hook.clone();
            let event_name = event_name.to_string();
            let payload = payload.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                run_hook(&hook, &event_name, &payload).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(execution) => results.push(execution),
                Err(e) => error!(error = %e, "hook task panicked"),
            }
        }
        results
    }
}

async fn run_hook(hook: &HookConfig, event_name: &str, payload: &HashMap<String, Value>) -> HookExecution {
    let started = std::time::Instant::now();
    let event_data = serde_json::to_string(payload).unwrap_or_default();

    let temp_home = std::env::temp_dir();
    let mut command = Command::new(&hook.script_path);
    command
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("HOME", &temp_home)
        .env("SUBLARR_EVENT", event_name)
        .env("SUBLARR_EVENT_DATA", truncate(&event_data, MAX_PAYLOAD_VALUE_CHARS))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    for (key, value) in payload {
        let env_key = format!("SUBLARR_{}", key.to_ascii_uppercase());
        let env_value = value_to_env_string(value);
        command.env(env_key, truncate(&env_value, MAX_PAYLOAD_VALUE_CHARS));
    }

    let outcome = timeout(hook.timeout, command.output()).await;

    match outcome {
        Ok(Ok(output)) => HookExecution {
            hook_name: hook.name.clone(),
            event_name: event_name.to_string(),
            exit_code: output.status.code(),
            stdout: truncate(&String::from_utf8_lossy(&output.stdout), MAX_CAPTURED_CHARS),
            stderr: truncate(&String::from_utf8_lossy(&output.stderr), MAX_CAPTURED_CHARS),
            duration: started.elapsed(),
        },
        Ok(Err(e)) => {
            error!(hook = %hook.name, error = %e, "hook failed to spawn");
            HookExecution {
                hook_name: hook.name.clone(),
                event_name: event_name.to_string(),
                exit_code: None,
                stdout: String::new(),
                stderr: truncate(&e.to_string(), MAX_CAPTURED_CHARS),
                duration: started.elapsed(),
            }
        }
        Err(_) => {
            info!(hook = %hook.name, "hook timed out");
            HookExecution {
                hook_name: hook.name.clone(),
                event_name: event_name.to_string(),
                exit_code: None,
                stdout: String::new(),
                stderr: "hook timed out".to_string(),
                duration: started.elapsed(),
            }
        }
    }
}

fn value_to_env_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_payload_values() {
        let long = "x".repeat(5000);
        let truncated = truncate(&long, MAX_CAPTURED_CHARS);
        assert_eq!(truncated.chars().count(), MAX_CAPTURED_CHARS);
    }

    #[test]
    fn hooks_for_filters_by_event_binding() {
        let engine = ScriptHookEngine::new(
            vec![
                HookConfig { name: "a".into(), event_binding: "job_completed".into(), script_path: "/bin/true".into(), timeout: Duration::from_secs(1) },
                HookConfig { name: "b".into(), event_binding: "job_failed".into(), script_path: "/bin/true".into(), timeout: Duration::from_secs(1) },
            ],
            2,
        );
        assert_eq!(engine.hooks_for("job_completed").len(), 1);
        assert_eq!(engine.hooks_for("job_completed")[0].name, "a");
    }
}
