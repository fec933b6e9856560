//! Analysis engine subprocess speaking GTP (async I/O)

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::commands::{AnalyzeRequest, CommitRequest};
use crate::engine::{AnalysisEngine, CandidateSet};
use crate::error::ReviewError;
use crate::extract::extract;
use crate::framing::{read_until, reply_id, FrameError, Terminator};
use crate::transcript::Transcript;

/// How long `quit` may take before the process is killed.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Everything needed to launch and initialise the engine.
#[derive(Debug, Clone)]
pub struct EngineLaunch {
    pub program: String,
    pub args: Vec<String>,
    /// Startup banner that means the engine accepts commands.
    pub ready: Terminator,
    pub start_timeout: Duration,
    pub exchange_timeout: Duration,
    /// Board setup, each gated on its acknowledgement.
    pub init: Vec<String>,
    pub transcript: Option<PathBuf>,
}

/// Which terminator ends an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    /// Short GTP acknowledgement of this command.
    Ack,
    /// Full candidate report.
    Report,
}

/// Engine process instance
pub struct EngineSession {
    process: Child,
    stdin: ChildStdin,
    lines: UnboundedReceiver<String>,
    next_id: u32,
    timeout: Duration,
    transcript: Option<Transcript>,
    closed: bool,
}

/// Forward every line of `reader` into `tx` until EOF.
fn forward_lines<R>(reader: R, tx: UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
                    if tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn not_captured(program: &str, stream: &str) -> ReviewError {
    ReviewError::EngineSpawn {
        program: program.to_string(),
        source: std::io::Error::other(format!("{stream} not captured")),
    }
}

impl EngineSession {
    /// Spawn the engine, wait for its banner and set up the board.
    pub async fn start(launch: &EngineLaunch) -> Result<Self, ReviewError> {
        let mut process = Command::new(&launch.program)
            .args(&launch.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ReviewError::EngineSpawn {
                program: launch.program.clone(),
                source,
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| not_captured(&launch.program, "stdin"))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| not_captured(&launch.program, "stdout"))?;
        let stderr = process
            .stderr
            .take()
            .ok_or_else(|| not_captured(&launch.program, "stderr"))?;

        // Both streams feed one channel; it closes once the process is gone.
        let (tx, lines) = mpsc::unbounded_channel();
        forward_lines(stdout, tx.clone());
        forward_lines(stderr, tx);

        let transcript = match &launch.transcript {
            Some(path) => Some(Transcript::create(path).await?),
            None => None,
        };

        let mut session = Self {
            process,
            stdin,
            lines,
            next_id: 1,
            timeout: launch.exchange_timeout,
            transcript,
            closed: false,
        };

        read_until(&mut session.lines, &launch.ready, launch.start_timeout)
            .await
            .map_err(|e| match e {
                FrameError::TimedOut(_) => ReviewError::EngineStartTimeout(launch.start_timeout),
                FrameError::Closed(_) => ReviewError::EngineCrashed {
                    command: "<startup>".to_string(),
                },
            })?;
        info!(program = %launch.program, "Engine ready");

        for command in &launch.init {
            session.exchange(command, Until::Ack, session.timeout).await?;
        }

        Ok(session)
    }

    /// Write one line to the engine
    async fn send(&mut self, line: &str) -> Result<(), ReviewError> {
        debug!(line, "GTP <");
        if let Some(transcript) = &mut self.transcript {
            if let Err(e) = transcript.record(line).await {
                warn!(error = %e, "Failed to write transcript");
            }
        }
        let crashed = |_| ReviewError::EngineCrashed {
            command: line.to_string(),
        };
        self.stdin
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(crashed)?;
        self.stdin.flush().await.map_err(crashed)
    }

    /// Send `command` and collect output until its terminator or `timeout`.
    pub async fn exchange(
        &mut self,
        command: &str,
        until: Until,
        timeout: Duration,
    ) -> Result<String, ReviewError> {
        if self.closed {
            return Err(ReviewError::EngineCrashed {
                command: command.to_string(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.send(&format!("{id} {command}")).await?;

        let terminator = match until {
            Until::Ack => Terminator::Ack(id),
            Until::Report => Terminator::Report(id),
        };
        let raw = read_until(&mut self.lines, &terminator, timeout)
            .await
            .map_err(|e| match e {
                FrameError::TimedOut(_) => ReviewError::EngineTimeout {
                    command: command.to_string(),
                    timeout,
                },
                FrameError::Closed(_) => ReviewError::EngineCrashed {
                    command: command.to_string(),
                },
            })?;

        let last = raw.lines().last().unwrap_or_default();
        if reply_id(last) == Some((id, false)) {
            return Err(ReviewError::EngineRejected {
                command: command.to_string(),
                message: last[1..].trim_start_matches(|c: char| c.is_ascii_digit()).trim().to_string(),
            });
        }
        Ok(raw)
    }

    /// Send `quit` if the engine is still running, then make sure it is gone.
    /// Safe to call more than once.
    pub async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if matches!(self.process.try_wait(), Ok(None)) {
            let id = self.next_id;
            self.next_id += 1;
            let _ = self.send(&format!("{id} quit")).await;
            if tokio::time::timeout(QUIT_GRACE, self.process.wait())
                .await
                .is_err()
            {
                warn!("Engine ignored quit, killing it");
                let _ = self.process.kill().await;
            }
        }

        if let Some(transcript) = &mut self.transcript {
            let _ = transcript.flush().await;
        }
    }
}

impl AnalysisEngine for EngineSession {
    async fn analyze(&mut self, request: &AnalyzeRequest) -> Result<CandidateSet, ReviewError> {
        let raw = self
            .exchange(&request.to_gtp(), Until::Report, self.timeout)
            .await?;
        let candidates = extract(&raw)?;
        // genmove played the engine's choice; take it back
        self.exchange("undo", Until::Ack, self.timeout).await?;
        Ok(candidates)
    }

    async fn commit(&mut self, commit: &CommitRequest) -> Result<(), ReviewError> {
        self.exchange(&commit.to_gtp(), Until::Ack, self.timeout)
            .await
            .map(|_| ())
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        // The engine never outlives its session
        let _ = self.process.start_kill();
    }
}
