//! Scripted kubectl runner for tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::KubectlError;
use crate::runner_trait::KubectlRunner;
use crate::{ClusterTarget, KubectlOutput};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubectlCall {
    pub target: ClusterTarget,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// Replays queued outputs in FIFO order and records every call.
///
/// When the queue is empty a call returns exit status 1 with
/// "no scripted response" on stderr.
#[derive(Clone, Default)]
pub struct MockKubectlRunner {
    responses: Arc<Mutex<VecDeque<Result<KubectlOutput, KubectlError>>>>,
    calls: Arc<Mutex<Vec<KubectlCall>>>,
}

impl MockKubectlRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_output(&self, exit_code: i32, stdout: &str, stderr: &str) {
        self.push(Ok(KubectlOutput {
            exit_code,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }));
    }

    /// Queue a successful call printing `value` as JSON
    pub fn push_json(&self, value: &serde_json::Value) {
        self.push_output(0, &value.to_string(), "");
    }

    pub fn push_success(&self, stdout: &str) {
        self.push_output(0, stdout, "");
    }

    pub fn push_failure(&self, stderr: &str) {
        self.push_output(1, "", stderr);
    }

    pub fn push_error(&self, error: KubectlError) {
        self.push(Err(error));
    }

    fn push(&self, response: Result<KubectlOutput, KubectlError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<KubectlCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every call, joined with spaces
    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| call.args.join(" "))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl KubectlRunner for MockKubectlRunner {
    async fn run(
        &self,
        target: &ClusterTarget,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<KubectlOutput, KubectlError> {
        self.calls.lock().unwrap().push(KubectlCall {
            target: target.clone(),
            args: args.to_vec(),
            stdin: stdin.map(str::to_string),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(KubectlOutput {
                    exit_code: 1,
                    stdout: Vec::new(),
                    stderr: b"no scripted response".to_vec(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubectl_args;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let mock = MockKubectlRunner::new();
        mock.push_success("first");
        mock.push_failure("boom");

        let target = ClusterTarget::new("p", "c");
        let first = mock.run(&target, &kubectl_args(["get", "netpeerings"]), None).await.unwrap();
        let second = mock.run(&target, &kubectl_args(["apply", "-f", "-"]), Some("{}")).await.unwrap();
        let third = mock.run(&target, &[], None).await.unwrap();

        assert_eq!(first.stdout_str(), "first");
        assert_eq!(second.stderr_str(), "boom");
        assert_eq!(third.exit_code, 1);
        assert_eq!(mock.commands(), vec!["get netpeerings", "apply -f -", ""]);
        assert_eq!(mock.calls()[1].stdin.as_deref(), Some("{}"));
    }
}
