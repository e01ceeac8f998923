use crate::domain::model::{CommandOutput, CommandSpec};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{MoittError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Spawns real child processes and streams their output into the log.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

async fn collect_lines<R>(reader: R, quiet: bool, is_stderr: bool) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut collected = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if is_stderr {
            tracing::warn!("    {}", line);
        } else if quiet {
            tracing::debug!("    {}", line);
        } else {
            tracing::info!("    {}", line);
        }
        collected.push(line);
    }
    Ok(collected.join("\n"))
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", spec.display());

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MoittError::ToolNotFound {
                    tool: spec.program.clone(),
                    hint: format!("Make sure '{}' is installed and on PATH", spec.program),
                }
            } else {
                MoittError::IoError(e)
            }
        })?;

        if let (Some(input), Some(mut stdin)) = (&spec.stdin, child.stdin.take()) {
            stdin.write_all(input.as_bytes()).await?;
            // 關閉 stdin，讓 `oc apply -f -` 結束讀取
            drop(stdin);
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // stdout 與 stderr 同時讀取，避免管線塞滿
        let (stdout, stderr) = tokio::try_join!(
            async {
                match stdout {
                    Some(out) => collect_lines(out, spec.quiet, false).await,
                    None => Ok(String::new()),
                }
            },
            async {
                match stderr {
                    Some(err) => collect_lines(err, spec.quiet, true).await,
                    None => Ok(String::new()),
                }
            }
        )?;

        let status = child.wait().await?;
        tracing::debug!("{} exited with {:?}", spec.program, status.code());

        Ok(CommandOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}
