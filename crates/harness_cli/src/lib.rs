use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use harness_proto::{
    is_ready_payload, is_sync_ok_payload, parse_state_payload, parse_wire_line, HarnessSnapshot,
    LineChannel, ParsedLine, STATE_PREFIX,
};

mod playtest;
mod smoke;

pub use harness_proto::DEFAULT_PORT;
pub use playtest::{random_action, IterationOutcome, PlaytestOptions, PlaytestSummary};
pub use smoke::{fire_outcome, position_changed, CheckOutcome};

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RETRY_MS: u64 = 100;
pub const DEFAULT_QUIET_MS: u64 = 250;
const MAX_RETRY_BACKOFF_MS: u64 = 1_000;
const READ_POLL_MS: u64 = 100;
const ERROR_PREFIX: &str = "error:";

#[derive(Debug, Clone, Copy)]
pub struct CommonOptions {
    pub port: u16,
    pub timeout_ms: u64,
    pub retry_ms: u64,
    pub include_telemetry: bool,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_ms: DEFAULT_RETRY_MS,
            include_telemetry: false,
        }
    }
}

pub enum CommandKind {
    WaitReady,
    Send { command: String },
    Script { path: String, barrier: bool },
    Barrier,
    State,
    Smoke,
    Playtest(PlaytestOptions),
}

impl CommandKind {
    /// Report-style commands keep the handshake out of their output.
    fn echoes_handshake(&self) -> bool {
        !matches!(self, Self::State | Self::Smoke | Self::Playtest(_))
    }
}

pub fn should_print_line(line: &ParsedLine, include_telemetry: bool) -> bool {
    match line.channel {
        LineChannel::Control => true,
        LineChannel::Telemetry => include_telemetry,
        LineChannel::Unknown => false,
    }
}

pub fn parse_script_commands(content: &str) -> Vec<String> {
    let mut commands = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(trimmed.to_string());
    }
    commands
}

/// Delay before reconnect attempt `attempt`: doubles from `base`, capped at one second.
pub fn retry_backoff(base: Duration, attempt: u32) -> Duration {
    let shift = attempt.min(8);
    let backoff_ms = u64::try_from(base.as_millis())
        .unwrap_or(u64::MAX)
        .saturating_mul(1u64 << shift)
        .min(MAX_RETRY_BACKOFF_MS);
    Duration::from_millis(backoff_ms.max(1))
}

pub fn run<W: Write>(kind: CommandKind, opts: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let timeout = Duration::from_millis(opts.timeout_ms);
    let retry_base = Duration::from_millis(opts.retry_ms.max(1));
    let echo_handshake = kind.echoes_handshake();
    let mut session = Session::connect(opts.port, timeout, retry_base, |line| {
        if echo_handshake {
            emit_line(stdout, line, opts.include_telemetry);
        }
    })?;
    let quiet = Duration::from_millis(DEFAULT_QUIET_MS);

    match kind {
        CommandKind::WaitReady => Ok(()),
        CommandKind::Send { command } => {
            session.send(&command)?;
            session.read_until_quiet(timeout, quiet, |line| {
                emit_line(stdout, line, opts.include_telemetry)
            })
        }
        CommandKind::Script { path, barrier } => {
            let content = fs::read_to_string(&path)
                .map_err(|error| format!("failed to read script file '{path}': {error}"))?;
            for command in parse_script_commands(&content) {
                session.send(&command)?;
                session.read_until_quiet(timeout, quiet, |line| {
                    emit_line(stdout, line, opts.include_telemetry)
                })?;
            }
            if barrier {
                session.barrier(timeout, |line| emit_line(stdout, line, opts.include_telemetry))?;
            }
            Ok(())
        }
        CommandKind::Barrier => {
            session.barrier(timeout, |line| emit_line(stdout, line, opts.include_telemetry))
        }
        CommandKind::State => {
            let payload = session.request("get_state", timeout, |payload| {
                payload.starts_with(STATE_PREFIX)
            })?;
            let json = payload.strip_prefix(STATE_PREFIX).unwrap_or(&payload);
            write_report(stdout, json)
        }
        CommandKind::Smoke => smoke::run_smoke(&mut session, timeout, stdout),
        CommandKind::Playtest(options) => {
            playtest::run_playtest(&mut session, &options, timeout, stdout)
        }
    }
}

pub(crate) fn write_report<W: Write>(out: &mut W, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

/// One connected harness client: a write half plus a buffered read half of the same socket.
pub(crate) struct Session {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Session {
    fn connect<F>(
        port: u16,
        timeout: Duration,
        retry_base: Duration,
        mut on_line: F,
    ) -> Result<Self, String>
    where
        F: FnMut(&ParsedLine),
    {
        let deadline = Instant::now() + timeout;
        let mut attempt = 0u32;

        while Instant::now() < deadline {
            if let Ok(writer) = TcpStream::connect(("127.0.0.1", port)) {
                writer
                    .set_read_timeout(Some(Duration::from_millis(READ_POLL_MS)))
                    .map_err(|error| format!("failed to set socket read timeout: {error}"))?;
                let reader_stream = writer
                    .try_clone()
                    .map_err(|error| format!("failed to clone socket stream: {error}"))?;
                let mut session = Session {
                    writer,
                    reader: BufReader::new(reader_stream),
                };

                match session.wait_for_ready(deadline, &mut on_line) {
                    WaitReadyOutcome::Ready => return Ok(session),
                    WaitReadyOutcome::Timeout => break,
                    WaitReadyOutcome::Disconnected => {}
                    WaitReadyOutcome::IoError(error) => {
                        return Err(format!("socket read error while waiting for ready: {error}"));
                    }
                }
            }

            let sleep_for = retry_backoff(retry_base, attempt);
            if Instant::now() + sleep_for >= deadline {
                break;
            }
            thread::sleep(sleep_for);
            attempt = attempt.saturating_add(1);
        }

        Err(format!("timed out waiting for harness ready on 127.0.0.1:{port}"))
    }

    fn wait_for_ready<F>(&mut self, deadline: Instant, on_line: &mut F) -> WaitReadyOutcome
    where
        F: FnMut(&ParsedLine),
    {
        loop {
            match read_one_line(&mut self.reader, deadline) {
                ReadOutcome::Line(raw) => {
                    let parsed = parse_wire_line(&raw);
                    on_line(&parsed);
                    if parsed.channel == LineChannel::Control && is_ready_payload(&parsed.payload) {
                        return WaitReadyOutcome::Ready;
                    }
                }
                ReadOutcome::NoData => {}
                ReadOutcome::Disconnected => return WaitReadyOutcome::Disconnected,
                ReadOutcome::DeadlineExceeded => return WaitReadyOutcome::Timeout,
                ReadOutcome::IoError(error) => return WaitReadyOutcome::IoError(error),
            }
        }
    }

    pub(crate) fn send(&mut self, line: &str) -> Result<(), String> {
        self.writer
            .write_all(line.as_bytes())
            .map_err(|error| format!("failed to send command: {error}"))?;
        self.writer
            .write_all(b"\n")
            .map_err(|error| format!("failed to terminate command line: {error}"))?;
        self.writer
            .flush()
            .map_err(|error| format!("failed to flush command line: {error}"))
    }

    fn barrier<F>(&mut self, timeout: Duration, mut on_line: F) -> Result<(), String>
    where
        F: FnMut(&ParsedLine),
    {
        self.send("sync")?;
        let deadline = Instant::now() + timeout;
        loop {
            match read_one_line(&mut self.reader, deadline) {
                ReadOutcome::Line(raw) => {
                    let parsed = parse_wire_line(&raw);
                    on_line(&parsed);
                    if parsed.channel == LineChannel::Control
                        && is_sync_ok_payload(&parsed.payload)
                    {
                        return Ok(());
                    }
                }
                ReadOutcome::NoData => {}
                ReadOutcome::Disconnected => {
                    return Err("socket disconnected while waiting for barrier ack".to_string())
                }
                ReadOutcome::DeadlineExceeded => {
                    return Err("timed out waiting for barrier ack (ok: sync)".to_string())
                }
                ReadOutcome::IoError(error) => {
                    return Err(format!(
                        "socket read error while waiting for barrier ack: {error}"
                    ))
                }
            }
        }
    }

    fn read_until_quiet<F>(
        &mut self,
        timeout: Duration,
        quiet_window: Duration,
        mut on_line: F,
    ) -> Result<(), String>
    where
        F: FnMut(&ParsedLine),
    {
        let deadline = Instant::now() + timeout;
        let mut last_line_at = Instant::now();
        let mut saw_any_line = false;

        loop {
            match read_one_line(&mut self.reader, deadline) {
                ReadOutcome::Line(raw) => {
                    let parsed = parse_wire_line(&raw);
                    on_line(&parsed);
                    saw_any_line = true;
                    last_line_at = Instant::now();
                }
                ReadOutcome::NoData => {
                    let now = Instant::now();
                    if (saw_any_line && now.saturating_duration_since(last_line_at) >= quiet_window)
                        || (!saw_any_line && now + quiet_window >= deadline)
                    {
                        return Ok(());
                    }
                }
                ReadOutcome::Disconnected => {
                    return Err("socket disconnected while waiting for command output".to_string())
                }
                ReadOutcome::DeadlineExceeded => return Ok(()),
                ReadOutcome::IoError(error) => {
                    return Err(format!(
                        "socket read error while waiting for command output: {error}"
                    ))
                }
            }
        }
    }

    /// Sends `command` and returns the first control reply `accept` matches.
    /// An `error:` reply ends the wait as a failure; telemetry is skipped.
    pub(crate) fn request<A>(
        &mut self,
        command: &str,
        timeout: Duration,
        accept: A,
    ) -> Result<String, String>
    where
        A: Fn(&str) -> bool,
    {
        self.send(command)?;
        let deadline = Instant::now() + timeout;
        loop {
            match read_one_line(&mut self.reader, deadline) {
                ReadOutcome::Line(raw) => {
                    let parsed = parse_wire_line(&raw);
                    if parsed.channel != LineChannel::Control {
                        continue;
                    }
                    if accept(&parsed.payload) {
                        return Ok(parsed.payload);
                    }
                    if parsed.payload.starts_with(ERROR_PREFIX) {
                        return Err(format!("'{command}' failed: {}", parsed.payload));
                    }
                }
                ReadOutcome::NoData => {}
                ReadOutcome::Disconnected => {
                    return Err(format!(
                        "socket disconnected while waiting for reply to '{command}'"
                    ))
                }
                ReadOutcome::DeadlineExceeded => {
                    return Err(format!("timed out waiting for reply to '{command}'"))
                }
                ReadOutcome::IoError(error) => {
                    return Err(format!(
                        "socket read error while waiting for reply to '{command}': {error}"
                    ))
                }
            }
        }
    }

    pub(crate) fn snapshot(&mut self, timeout: Duration) -> Result<HarnessSnapshot, String> {
        let payload =
            self.request("get_state", timeout, |payload| payload.starts_with(STATE_PREFIX))?;
        parse_state_payload(&payload).map_err(|error| format!("unreadable state reply: {error}"))
    }

    /// Runs `execute` and blocks until the game reports the injection finished.
    pub(crate) fn execute(
        &mut self,
        action: &str,
        duration_ms: u64,
        timeout: Duration,
    ) -> Result<String, String> {
        let wait = timeout + Duration::from_millis(duration_ms);
        self.request(&format!("execute {action} {duration_ms}"), wait, |payload| {
            payload.starts_with("ok: execute done")
        })
    }
}

enum WaitReadyOutcome {
    Ready,
    Timeout,
    Disconnected,
    IoError(io::Error),
}

fn emit_line<W: Write>(stdout: &mut W, line: &ParsedLine, include_telemetry: bool) {
    if should_print_line(line, include_telemetry) {
        let _ = writeln!(stdout, "{}", line.payload);
    }
}

enum ReadOutcome {
    Line(String),
    NoData,
    Disconnected,
    DeadlineExceeded,
    IoError(io::Error),
}

fn read_one_line(reader: &mut BufReader<TcpStream>, deadline: Instant) -> ReadOutcome {
    if Instant::now() >= deadline {
        return ReadOutcome::DeadlineExceeded;
    }

    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => ReadOutcome::Disconnected,
        Ok(_) => ReadOutcome::Line(line),
        Err(error)
            if error.kind() == io::ErrorKind::WouldBlock
                || error.kind() == io::ErrorKind::TimedOut =>
        {
            ReadOutcome::NoData
        }
        Err(error) => ReadOutcome::IoError(error),
    }
}
