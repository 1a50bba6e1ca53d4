//! A [`CommandRunner`] that records scripts and replays canned output.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::command::{CommandRunner, Transcript, script};
use crate::error::Result;

#[derive(Debug, Default)]
struct State {
    scripts: Vec<Vec<String>>,
    replies: VecDeque<(String, Option<i32>)>,
}

/// Records every script it is asked to run.
///
/// Each run answers with the next queued reply, or with an empty successful
/// transcript once the queue is exhausted.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    state: Mutex<State>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the output of a successful run.
    pub fn reply(&self, output: impl Into<String>) -> &Self {
        self.state().replies.push_back((output.into(), Some(0)));
        self
    }

    /// Queue a run that exits with `status`.
    pub fn reply_status(&self, output: impl Into<String>, status: i32) -> &Self {
        self.state().replies.push_back((output.into(), Some(status)));
        self
    }

    /// Command lists run so far, one entry per invocation.
    pub fn scripts(&self) -> Vec<Vec<String>> {
        self.state().scripts.clone()
    }

    /// Number of invocations.
    pub fn runs(&self) -> usize {
        self.state().scripts.len()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, commands: &[String]) -> Result<Transcript> {
        let mut state = self.state();
        state.scripts.push(commands.to_vec());
        let (body, status) = state
            .replies
            .pop_front()
            .unwrap_or_else(|| (String::new(), Some(0)));
        Ok(Transcript {
            input: script(commands),
            output: format!("netsh>{body}netsh>"),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_replays() {
        let runner = RecordingRunner::new();
        runner.reply("The interface is unknown.\r\n").reply_status("", 1);

        let first = runner.run(&["a".to_string()]).unwrap();
        assert_eq!(first.output, "netsh>The interface is unknown.\r\nnetsh>");
        assert!(first.into_checked().is_err());

        let second = runner.run(&["b".to_string()]).unwrap();
        assert_eq!(second.status, Some(1));

        let third = runner.run(&[]).unwrap();
        assert!(third.into_checked().is_ok());

        assert_eq!(runner.runs(), 3);
        assert_eq!(runner.scripts()[1], ["b"]);
    }
}
