//! Interactive confirmation

use std::fmt;

use clap::ValueEnum;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::Result;

/// When `create` asks for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfirmStage {
    /// Before anything is created; declining leaves no trace
    #[default]
    BeforeRequest,
    /// After the request reached `pending-acceptance`; declining deletes the request
    BeforeAcceptance,
}

impl fmt::Display for ConfirmStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmStage::BeforeRequest => f.write_str("before-request"),
            ConfirmStage::BeforeAcceptance => f.write_str("before-acceptance"),
        }
    }
}

/// Yes/no question to the operator
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<bool>;
}

/// Asks on stderr, reads the answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

#[async_trait::async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, question: &str) -> Result<bool> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{} [y/N] ", question).as_bytes())
            .await?;
        stderr.flush().await?;

        let mut input = String::new();
        let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
        reader.read_line(&mut input).await?;
        let answer = input.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

#[cfg(test)]
pub use scripted::ScriptedConfirm;

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::Confirm;
    use crate::Result;

    /// Answers from a script and records the questions asked.
    ///
    /// An exhausted script answers "no".
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedConfirm {
        answers: Arc<Mutex<VecDeque<bool>>>,
        questions: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedConfirm {
        pub fn answering(answers: &[bool]) -> Self {
            Self {
                answers: Arc::new(Mutex::new(answers.iter().copied().collect())),
                questions: Arc::default(),
            }
        }

        pub fn questions(&self) -> Vec<String> {
            self.questions.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Confirm for ScriptedConfirm {
        async fn confirm(&self, question: &str) -> Result<bool> {
            self.questions.lock().unwrap().push(question.to_string());
            Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
        }
    }
}
