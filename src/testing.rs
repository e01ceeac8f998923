//! Fakes shared by the unit tests and the integration tests under `tests/`.

use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::sync::{Mutex, MutexGuard};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Records every command and answers from a list of scripted responses.
///
/// A response is picked by the first rule whose needle is contained in
/// the rendered command line; everything else succeeds with empty output.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Mutex<Vec<(String, CommandOutput)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, needle: &str, output: CommandOutput) {
        locked(&self.rules).push((needle.to_string(), output));
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        locked(&self.calls).clone()
    }

    pub fn lines(&self) -> Vec<String> {
        locked(&self.calls).iter().map(CommandSpec::display).collect()
    }

    /// Index of the first recorded command line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|line| line.contains(needle))
    }

    /// Manifests piped to commands whose line contains `needle`.
    pub fn stdin_of(&self, needle: &str) -> Vec<String> {
        locked(&self.calls)
            .iter()
            .filter(|spec| spec.display().contains(needle))
            .filter_map(|spec| spec.stdin.clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        locked(&self.calls).push(spec.clone());
        let line = spec.display();
        Ok(locked(&self.rules)
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::success("")))
    }
}

/// Builds a gzip tarball containing the given `(name, contents)` entries.
pub fn build_tar_gz(entries: &[(&str, &[u8])]) -> std::io::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data)?;
    }
    builder.into_inner()?.finish()
}
