/// Transport seam between the harness driver and whatever carries its lines.
pub trait HarnessLinePump {
    /// Appends every complete command line received since the last poll.
    fn poll_lines(&mut self, out: &mut Vec<String>);
    fn send_output_lines(&mut self, lines: &[String]);
    fn send_frame_line(&mut self, line: &str);
    fn status_line(&mut self, telemetry_enabled: bool) -> String;
    /// True once after the last connected client went away.
    fn take_disconnect_reset_requested(&mut self) -> bool;
}

/// Pump used when the harness listener is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLinePump;

impl HarnessLinePump for NoopLinePump {
    fn poll_lines(&mut self, _out: &mut Vec<String>) {}

    fn send_output_lines(&mut self, _lines: &[String]) {}

    fn send_frame_line(&mut self, _line: &str) {}

    fn status_line(&mut self, telemetry_enabled: bool) -> String {
        format!(
            "harness.status v1 enabled:0 telemetry:{} clients:0",
            u8::from(telemetry_enabled)
        )
    }

    fn take_disconnect_reset_requested(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::HarnessLinePump;

    /// In-memory pump: tests push inbound lines and inspect what was sent.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedPump {
        pub(crate) inbound: Vec<String>,
        pub(crate) sent: Vec<String>,
        pub(crate) frames: Vec<String>,
        pub(crate) disconnect_pending: bool,
    }

    impl ScriptedPump {
        pub(crate) fn push(&mut self, line: &str) {
            self.inbound.push(line.to_string());
        }

        pub(crate) fn take_sent(&mut self) -> Vec<String> {
            std::mem::take(&mut self.sent)
        }
    }

    impl HarnessLinePump for ScriptedPump {
        fn poll_lines(&mut self, out: &mut Vec<String>) {
            out.append(&mut self.inbound);
        }

        fn send_output_lines(&mut self, lines: &[String]) {
            self.sent.extend(lines.iter().cloned());
        }

        fn send_frame_line(&mut self, line: &str) {
            self.frames.push(line.to_string());
        }

        fn status_line(&mut self, telemetry_enabled: bool) -> String {
            format!(
                "harness.status v1 enabled:1 telemetry:{} clients:1",
                u8::from(telemetry_enabled)
            )
        }

        fn take_disconnect_reset_requested(&mut self) -> bool {
            std::mem::take(&mut self.disconnect_pending)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_pump_reports_disabled_status() {
        let mut pump = NoopLinePump;
        let mut lines = Vec::new();
        pump.poll_lines(&mut lines);
        assert!(lines.is_empty());
        assert_eq!(
            pump.status_line(true),
            "harness.status v1 enabled:0 telemetry:1 clients:0"
        );
        assert!(!pump.take_disconnect_reset_requested());
    }
}
