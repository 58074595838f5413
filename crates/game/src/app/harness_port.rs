//! Localhost TCP transport for the automation harness.
//!
//! Every accepted client receives the ready line first, then the control
//! replies (`C ` prefix) and, while telemetry is on, per-tick frame lines
//! (`T ` prefix). Inbound bytes are split on `\n`; a trailing `\r` is ignored.
//! Each client gets its own bounded outbound queue so a stalled reader cannot
//! grow memory without limit: telemetry is evicted first and control lines
//! always jump ahead of queued telemetry.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use arcade_engine::HarnessLinePump;
use harness_proto::{encode_tagged_line, ready_line_text, LineChannel, DEFAULT_PORT};
use tracing::{info, warn};

const HARNESS_ENV_VAR: &str = "ARCADE_HARNESS";
const HARNESS_PORT_ENV_VAR: &str = "ARCADE_HARNESS_PORT";
const HARNESS_DIAG_ENV_VAR: &str = "ARCADE_HARNESS_DIAG";
const MAX_PENDING_CONTROL_BYTES_PER_CLIENT: usize = 256 * 1024;
const MAX_PENDING_TELEMETRY_BYTES_PER_CLIENT: usize = 256 * 1024;
const READ_CHUNK_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HarnessPortConfig {
    pub(crate) enabled: bool,
    pub(crate) port: u16,
    pub(crate) diag: bool,
}

impl HarnessPortConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_values(
            std::env::var(HARNESS_ENV_VAR).ok().as_deref(),
            std::env::var(HARNESS_PORT_ENV_VAR).ok().as_deref(),
            std::env::var(HARNESS_DIAG_ENV_VAR).ok().as_deref(),
        )
    }

    fn from_values(enabled: Option<&str>, port: Option<&str>, diag: Option<&str>) -> Self {
        let port = match port {
            Some(value) => match value.trim().parse::<u16>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!(
                        value,
                        fallback_port = DEFAULT_PORT,
                        "harness_invalid_port_using_default"
                    );
                    DEFAULT_PORT
                }
            },
            None => DEFAULT_PORT,
        };
        Self {
            enabled: parse_flag(enabled),
            port,
            diag: parse_flag(diag),
        }
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutboundClass {
    Control,
    Telemetry,
}

impl OutboundClass {
    fn channel(self) -> LineChannel {
        match self {
            Self::Control => LineChannel::Control,
            Self::Telemetry => LineChannel::Telemetry,
        }
    }

    fn cap(self) -> usize {
        match self {
            Self::Control => MAX_PENDING_CONTROL_BYTES_PER_CLIENT,
            Self::Telemetry => MAX_PENDING_TELEMETRY_BYTES_PER_CLIENT,
        }
    }
}

#[derive(Debug)]
struct OutboundChunk {
    class: OutboundClass,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct ActiveChunk {
    chunk: OutboundChunk,
    written: usize,
}

/// Per-client outbound queue with separate byte budgets per class.
#[derive(Debug, Default)]
struct OutboundQueue {
    active: Option<ActiveChunk>,
    queued: VecDeque<OutboundChunk>,
    control_bytes: usize,
    telemetry_bytes: usize,
}

impl OutboundQueue {
    fn queued_bytes(&self, class: OutboundClass) -> usize {
        match class {
            OutboundClass::Control => self.control_bytes,
            OutboundClass::Telemetry => self.telemetry_bytes,
        }
    }

    fn adjust_bytes(&mut self, class: OutboundClass, added: usize, removed: usize) {
        let slot = match class {
            OutboundClass::Control => &mut self.control_bytes,
            OutboundClass::Telemetry => &mut self.telemetry_bytes,
        };
        *slot = slot.saturating_add(added).saturating_sub(removed);
    }

    /// Queues one line, evicting the oldest queued lines of the same class
    /// when its budget would overflow. Returns false if the line was dropped.
    fn enqueue(&mut self, class: OutboundClass, line: &str, cap: usize, diag: bool) -> bool {
        let bytes = encode_tagged_line(class.channel(), line);
        let chunk_bytes = bytes.len();
        if chunk_bytes > cap {
            if diag {
                info!(class = ?class, chunk_bytes, cap, "harness_diag_drop_chunk_over_cap");
            }
            return false;
        }

        while self.queued_bytes(class).saturating_add(chunk_bytes) > cap {
            if !self.evict_oldest(class, diag) {
                return false;
            }
        }

        self.adjust_bytes(class, chunk_bytes, 0);
        let chunk = OutboundChunk { class, bytes };
        match class {
            OutboundClass::Control => {
                let insert_at = self
                    .queued
                    .iter()
                    .position(|queued| queued.class == OutboundClass::Telemetry)
                    .unwrap_or(self.queued.len());
                self.queued.insert(insert_at, chunk);
            }
            OutboundClass::Telemetry => self.queued.push_back(chunk),
        }
        if diag {
            info!(
                class = ?class,
                queue_len = self.queued.len(),
                control_bytes = self.control_bytes,
                telemetry_bytes = self.telemetry_bytes,
                "harness_diag_enqueued_line"
            );
        }
        true
    }

    fn evict_oldest(&mut self, class: OutboundClass, diag: bool) -> bool {
        let Some(index) = self.queued.iter().position(|chunk| chunk.class == class) else {
            return false;
        };
        let Some(removed) = self.queued.remove(index) else {
            return false;
        };
        self.adjust_bytes(class, 0, removed.bytes.len());
        if diag {
            info!(
                class = ?class,
                removed_bytes = removed.bytes.len(),
                queue_len = self.queued.len(),
                "harness_diag_evicted_oldest"
            );
        }
        true
    }

    /// Writes until the queue is empty or the writer would block. A partially
    /// written chunk stays active so line framing is never broken.
    fn flush<F>(&mut self, mut write_payload: F) -> io::Result<()>
    where
        F: FnMut(&[u8]) -> io::Result<usize>,
    {
        loop {
            if self.active.is_none() {
                let Some(chunk) = self.queued.pop_front() else {
                    return Ok(());
                };
                self.adjust_bytes(chunk.class, 0, chunk.bytes.len());
                self.active = Some(ActiveChunk { chunk, written: 0 });
            }
            let Some(state) = self.active.as_mut() else {
                return Ok(());
            };
            match write_payload(&state.chunk.bytes[state.written..]) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::WriteZero, "harness_write_zero"));
                }
                Ok(written) => {
                    state.written = state.written.saturating_add(written);
                    if state.written >= state.chunk.bytes.len() {
                        self.active = None;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Debug)]
struct ClientConn {
    stream: TcpStream,
    read_buf: Vec<u8>,
    outbound: OutboundQueue,
}

#[derive(Debug)]
struct TcpHarnessTransport {
    listener: TcpListener,
    bound_port: u16,
    clients: Vec<ClientConn>,
    diag: bool,
}

impl TcpHarnessTransport {
    fn bind_localhost(port: u16, diag: bool) -> io::Result<Self> {
        let listener = TcpListener::bind(localhost_bind_addr(port))?;
        listener.set_nonblocking(true)?;
        let bound_port = listener.local_addr()?.port();
        Ok(Self {
            listener,
            bound_port,
            clients: Vec::new(),
            diag,
        })
    }

    /// Returns true when at least one client was dropped during the poll.
    fn poll_lines(&mut self, out: &mut Vec<String>) -> bool {
        self.accept_pending_clients();
        let removed_during_read = self.read_client_lines(out);
        let removed_during_flush = self.flush_all();
        removed_during_read || removed_during_flush
    }

    fn accept_pending_clients(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(err) = stream.set_nonblocking(true) {
                        warn!(error = %err, "harness_client_nonblocking_failed");
                        continue;
                    }
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(error = %err, "harness_client_nodelay_failed");
                    }
                    let mut client = ClientConn {
                        stream,
                        read_buf: Vec::new(),
                        outbound: OutboundQueue::default(),
                    };
                    client.outbound.enqueue(
                        OutboundClass::Control,
                        &ready_line_text(self.bound_port),
                        MAX_PENDING_CONTROL_BYTES_PER_CLIENT,
                        self.diag,
                    );
                    self.clients.push(client);
                    info!(peer = %addr, clients = self.clients.len(), "harness_client_connected");
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!(error = %err, "harness_accept_failed");
                    break;
                }
            }
        }
    }

    fn read_client_lines(&mut self, out: &mut Vec<String>) -> bool {
        let diag = self.diag;
        let before = self.clients.len();
        self.clients.retain_mut(|client| {
            let mut chunk = [0u8; READ_CHUNK_BYTES];
            loop {
                match client.stream.read(&mut chunk) {
                    Ok(0) => return false,
                    Ok(read) => {
                        client.read_buf.extend_from_slice(&chunk[..read]);
                        drain_complete_lines(&mut client.read_buf, out, diag);
                    }
                    Err(err) if err.kind() == io::ErrorKind::WouldBlock => return true,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        warn!(error = %err, "harness_client_read_failed");
                        return false;
                    }
                }
            }
        });
        self.log_removed(before)
    }

    fn broadcast(&mut self, class: OutboundClass, lines: &[&str]) -> bool {
        for client in &mut self.clients {
            for line in lines {
                client.outbound.enqueue(class, line, class.cap(), self.diag);
            }
        }
        self.flush_all()
    }

    fn flush_all(&mut self) -> bool {
        let before = self.clients.len();
        self.clients.retain_mut(|client| {
            let ClientConn {
                stream, outbound, ..
            } = client;
            match outbound.flush(|payload| stream.write(payload)) {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "harness_client_write_failed");
                    false
                }
            }
        });
        self.log_removed(before)
    }

    fn log_removed(&self, before: usize) -> bool {
        let removed = before.saturating_sub(self.clients.len());
        if removed > 0 {
            info!(removed, clients = self.clients.len(), "harness_client_disconnected");
        }
        removed > 0
    }
}

#[derive(Debug)]
enum HarnessPortMode {
    Disabled,
    Enabled(TcpHarnessTransport),
}

/// `HarnessLinePump` backed by the localhost listener, or inert when disabled.
#[derive(Debug)]
pub(crate) struct HarnessPort {
    mode: HarnessPortMode,
    disconnect_reset_requested: bool,
}

impl HarnessPort {
    pub(crate) fn initialize(config: HarnessPortConfig) -> Self {
        let mode = if config.enabled {
            match TcpHarnessTransport::bind_localhost(config.port, config.diag) {
                Ok(transport) => {
                    info!(
                        line = %ready_line_text(transport.bound_port),
                        "harness_ready_bound"
                    );
                    HarnessPortMode::Enabled(transport)
                }
                Err(err) => {
                    warn!(error = %err, port = config.port, "harness_bind_failed_disabled");
                    HarnessPortMode::Disabled
                }
            }
        } else {
            HarnessPortMode::Disabled
        };
        Self {
            mode,
            disconnect_reset_requested: false,
        }
    }

    #[cfg(test)]
    fn bound_port(&self) -> Option<u16> {
        match &self.mode {
            HarnessPortMode::Enabled(transport) => Some(transport.bound_port),
            HarnessPortMode::Disabled => None,
        }
    }

    fn connected_clients(&self) -> usize {
        match &self.mode {
            HarnessPortMode::Enabled(transport) => transport.clients.len(),
            HarnessPortMode::Disabled => 0,
        }
    }

    /// Only the loss of the last client resets harness state; another
    /// connected driver keeps its injection and telemetry.
    fn note_removal(&mut self, removed_any: bool) {
        if removed_any && self.connected_clients() == 0 {
            self.disconnect_reset_requested = true;
        }
    }
}

impl HarnessLinePump for HarnessPort {
    fn poll_lines(&mut self, out: &mut Vec<String>) {
        let removed_any = match &mut self.mode {
            HarnessPortMode::Enabled(transport) => transport.poll_lines(out),
            HarnessPortMode::Disabled => false,
        };
        self.note_removal(removed_any);
    }

    fn send_output_lines(&mut self, lines: &[String]) {
        let removed_any = match &mut self.mode {
            HarnessPortMode::Enabled(transport) => {
                let borrowed = lines.iter().map(String::as_str).collect::<Vec<_>>();
                transport.broadcast(OutboundClass::Control, &borrowed)
            }
            HarnessPortMode::Disabled => false,
        };
        self.note_removal(removed_any);
    }

    fn send_frame_line(&mut self, line: &str) {
        let removed_any = match &mut self.mode {
            HarnessPortMode::Enabled(transport) => {
                transport.broadcast(OutboundClass::Telemetry, &[line])
            }
            HarnessPortMode::Disabled => false,
        };
        self.note_removal(removed_any);
    }

    fn status_line(&mut self, telemetry_enabled: bool) -> String {
        let enabled = matches!(self.mode, HarnessPortMode::Enabled(_));
        format!(
            "harness.status v1 enabled:{} telemetry:{} clients:{}",
            u8::from(enabled),
            u8::from(telemetry_enabled),
            self.connected_clients()
        )
    }

    fn take_disconnect_reset_requested(&mut self) -> bool {
        std::mem::take(&mut self.disconnect_reset_requested)
    }
}

fn localhost_bind_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn drain_complete_lines(buffer: &mut Vec<u8>, out: &mut Vec<String>, diag: bool) {
    while let Some(newline_index) = buffer.iter().position(|byte| *byte == b'\n') {
        let mut line_bytes = buffer.drain(..=newline_index).collect::<Vec<u8>>();
        line_bytes.pop();
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }
        match String::from_utf8(line_bytes) {
            Ok(line) => {
                if diag {
                    info!(line = %line, "harness_diag_line_read");
                }
                out.push(line);
            }
            Err(err) => warn!(error = %err, "harness_invalid_utf8_line_dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Write};
    use std::net::TcpStream;
    use std::thread;
    use std::time::Duration;

    use arcade_engine::HarnessLinePump;
    use harness_proto::{ready_line_text, DEFAULT_PORT};

    use super::{
        drain_complete_lines, localhost_bind_addr, HarnessPort, HarnessPortConfig,
        HarnessPortMode, OutboundClass, OutboundQueue,
    };

    fn enabled_port() -> HarnessPort {
        HarnessPort::initialize(HarnessPortConfig {
            enabled: true,
            port: 0,
            diag: false,
        })
    }

    fn wait_for_clients(port: &mut HarnessPort, expected: usize) {
        let mut ignored = Vec::new();
        for _ in 0..100 {
            port.poll_lines(&mut ignored);
            if port.connected_clients() == expected {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("expected {expected} clients, have {}", port.connected_clients());
    }

    fn read_until(client: &mut TcpStream, port: &mut HarnessPort, needles: &[&str]) -> String {
        client.set_nonblocking(true).expect("nonblocking client");
        let mut received = Vec::new();
        for _ in 0..100 {
            let mut ignored = Vec::new();
            port.poll_lines(&mut ignored);
            let mut chunk = [0u8; 256];
            match client.read(&mut chunk) {
                Ok(read) if read > 0 => received.extend_from_slice(&chunk[..read]),
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => panic!("unexpected read error: {err}"),
            }
            let text = String::from_utf8_lossy(&received).to_string();
            if needles.iter().all(|needle| text.contains(needle)) {
                return text;
            }
            thread::sleep(Duration::from_millis(5));
        }
        String::from_utf8_lossy(&received).to_string()
    }

    #[test]
    fn config_parses_flags_and_falls_back_on_bad_port() {
        let config = HarnessPortConfig::from_values(Some("1"), Some("46002"), None);
        assert!(config.enabled);
        assert_eq!(config.port, 46002);
        assert!(!config.diag);

        let config = HarnessPortConfig::from_values(Some("0"), Some("not-a-port"), Some("1"));
        assert!(!config.enabled);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.diag);

        assert_eq!(HarnessPortConfig::from_values(None, None, None).port, DEFAULT_PORT);
    }

    #[test]
    fn bind_address_is_localhost_only() {
        let addr = localhost_bind_addr(DEFAULT_PORT);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn disabled_port_is_inert() {
        let mut port = HarnessPort::initialize(HarnessPortConfig {
            enabled: false,
            port: 0,
            diag: false,
        });
        let mut out = Vec::new();
        port.poll_lines(&mut out);
        port.send_output_lines(&["ok: sync".to_string()]);
        assert!(out.is_empty());
        assert!(matches!(port.mode, HarnessPortMode::Disabled));
        assert_eq!(
            port.status_line(true),
            "harness.status v1 enabled:0 telemetry:1 clients:0"
        );
        assert!(!port.take_disconnect_reset_requested());
    }

    #[test]
    fn drain_splits_lines_and_strips_carriage_returns() {
        let mut buffer = b"help\r\nget_state\npartial".to_vec();
        let mut out = Vec::new();
        drain_complete_lines(&mut buffer, &mut out, false);
        assert_eq!(out, vec!["help".to_string(), "get_state".to_string()]);
        assert_eq!(buffer, b"partial".to_vec());
    }

    #[test]
    fn transport_receives_newline_delimited_lines() {
        let mut port = enabled_port();
        let bound = port.bound_port().expect("bound port");
        let mut client = TcpStream::connect(localhost_bind_addr(bound)).expect("connect");
        client.write_all(b"status\nsync\n").expect("write");

        let mut out = Vec::new();
        for _ in 0..100 {
            port.poll_lines(&mut out);
            if out.len() >= 2 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(out, vec!["status".to_string(), "sync".to_string()]);
    }

    #[test]
    fn ready_line_then_control_and_telemetry_reach_client() {
        let mut port = enabled_port();
        let bound = port.bound_port().expect("bound port");
        let mut client = TcpStream::connect(localhost_bind_addr(bound)).expect("connect");
        wait_for_clients(&mut port, 1);

        port.send_output_lines(&["ok: sync".to_string(), "error: nope".to_string()]);
        port.send_frame_line("harness.frame v1 tick:1 phase:title");

        let ready = format!("C {}\n", ready_line_text(bound));
        let text = read_until(
            &mut client,
            &mut port,
            &[
                ready.as_str(),
                "C ok: sync\n",
                "C error: nope\n",
                "T harness.frame v1 tick:1 phase:title\n",
            ],
        );
        assert!(text.starts_with(&ready), "ready line must come first: {text:?}");
        assert!(text.contains("C ok: sync\nC error: nope\n"));
        assert!(text.contains("T harness.frame v1 tick:1 phase:title\n"));
    }

    #[test]
    fn status_line_reports_client_count() {
        let mut port = enabled_port();
        let bound = port.bound_port().expect("bound port");
        let _client = TcpStream::connect(localhost_bind_addr(bound)).expect("connect");
        wait_for_clients(&mut port, 1);
        assert_eq!(
            port.status_line(false),
            "harness.status v1 enabled:1 telemetry:0 clients:1"
        );
    }

    #[test]
    fn disconnect_reset_requested_only_when_last_client_leaves() {
        let mut port = enabled_port();
        let bound = port.bound_port().expect("bound port");
        let client_a = TcpStream::connect(localhost_bind_addr(bound)).expect("connect a");
        let client_b = TcpStream::connect(localhost_bind_addr(bound)).expect("connect b");
        wait_for_clients(&mut port, 2);

        drop(client_a);
        wait_for_clients(&mut port, 1);
        assert!(!port.take_disconnect_reset_requested());

        drop(client_b);
        wait_for_clients(&mut port, 0);
        assert!(port.take_disconnect_reset_requested());
        assert!(!port.take_disconnect_reset_requested());
    }

    #[test]
    fn control_lines_jump_ahead_of_queued_telemetry() {
        let mut queue = OutboundQueue::default();
        queue.enqueue(OutboundClass::Telemetry, "harness.frame v1 tick:1 phase:title", 1024, false);
        queue.enqueue(OutboundClass::Control, "ok: sync", 1024, false);
        assert_eq!(queue.queued[0].class, OutboundClass::Control);
        assert_eq!(queue.queued[1].class, OutboundClass::Telemetry);
        assert_eq!(queue.control_bytes, "C ok: sync\n".len());
    }

    #[test]
    fn telemetry_pressure_never_evicts_control() {
        let mut queue = OutboundQueue::default();
        queue.enqueue(OutboundClass::Control, "ok: sync", 1024, false);
        let cap = 96;
        for tick in 0..50 {
            queue.enqueue(
                OutboundClass::Telemetry,
                &format!("harness.frame v1 tick:{tick} phase:playing"),
                cap,
                false,
            );
        }
        assert!(queue.telemetry_bytes <= cap);
        assert_eq!(queue.queued[0].class, OutboundClass::Control);
        let last = queue.queued.back().expect("newest telemetry kept");
        assert!(String::from_utf8_lossy(&last.bytes).contains("tick:49"));
    }

    #[test]
    fn control_eviction_is_fifo_and_oversized_lines_are_dropped() {
        let mut queue = OutboundQueue::default();
        let cap = "C ok: a\n".len() * 2;
        assert!(queue.enqueue(OutboundClass::Control, "ok: a", cap, false));
        assert!(queue.enqueue(OutboundClass::Control, "ok: b", cap, false));
        assert!(queue.enqueue(OutboundClass::Control, "ok: c", cap, false));
        let texts = queue
            .queued
            .iter()
            .map(|chunk| String::from_utf8_lossy(&chunk.bytes).to_string())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["C ok: b\n".to_string(), "C ok: c\n".to_string()]);

        assert!(!queue.enqueue(OutboundClass::Control, &"x".repeat(cap), cap, false));
    }

    #[test]
    fn would_block_keeps_partial_chunk_active() {
        let mut queue = OutboundQueue::default();
        queue.enqueue(OutboundClass::Control, "ok: sync", 1024, false);
        queue.enqueue(OutboundClass::Telemetry, "harness.frame v1 tick:2 phase:title", 1024, false);

        let mut first = true;
        queue
            .flush(|payload| {
                if first {
                    first = false;
                    Ok(payload.len().min(3))
                } else {
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "blocked"))
                }
            })
            .expect("would block is not an error");

        let active = queue.active.as_ref().expect("partial chunk retained");
        assert_eq!(active.chunk.class, OutboundClass::Control);
        assert_eq!(active.written, 3);
        assert_eq!(queue.queued.len(), 1);

        let mut sink = Vec::new();
        queue
            .flush(|payload| {
                sink.extend_from_slice(payload);
                Ok(payload.len())
            })
            .expect("flush");
        assert_eq!(
            String::from_utf8_lossy(&sink),
            "k: sync\nT harness.frame v1 tick:2 phase:title\n"
        );
        assert!(queue.active.is_none());
        assert_eq!(queue.telemetry_bytes, 0);
    }

    #[test]
    fn zero_length_write_is_an_error() {
        let mut queue = OutboundQueue::default();
        queue.enqueue(OutboundClass::Control, "ok: sync", 1024, false);
        let err = queue.flush(|_| Ok(0)).expect_err("write zero");
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }
}
