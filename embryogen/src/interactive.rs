//! The post-snapshot keyboard prompt (§6): one character read from stdin
//! after every snapshot when interactive mode is on, switching to a
//! timed non-interactive delay once stdin hits EOF.

use std::io::Read;
use std::time::Duration;

/// What the prompt decided should happen to the run after this snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionMode {
    Off,
    Console,
    Visual,
    Both,
}

/// Mutable state the prompt toggles across snapshots, owned by the
/// scenario driver loop (the teacher's per-run `SimulationSettings`
/// equivalent for this one concern).
#[derive(Debug, Clone)]
pub struct InteractiveState {
    pub interactive: bool,
    pub debug_rendering: bool,
    pub inspection: InspectionMode,
    pub non_interactive_delay_millis: u64,
}

impl InteractiveState {
    pub fn new(interactive: bool, non_interactive_delay_millis: u64) -> Self {
        InteractiveState {
            interactive,
            debug_rendering: false,
            inspection: InspectionMode::Off,
            non_interactive_delay_millis,
        }
    }
}

const HELP_TEXT: &str = "\
Q  quit
H  print this help
E  no-op
D  toggle debug rendering
I  toggle per-agent console inspection
V  toggle per-agent visual inspection
W  toggle both console and visual inspection
P  set the non-interactive pause delay (ms)";

/// Runs one round of the prompt against `input`/`output`, reading exactly
/// one character of real input per call (plus, for `P`, a line of
/// digits). EOF permanently drops `state.interactive` to `false` and
/// leaves the delay at whatever it already was, matching §6's "EOF on
/// stdin switches the program to non-interactive mode".
pub fn prompt_after_snapshot(
    state: &mut InteractiveState,
    input: &mut impl Read,
    output: &mut impl std::io::Write,
) -> std::io::Result<PromptOutcome> {
    if !state.interactive {
        std::thread::sleep(Duration::from_millis(state.non_interactive_delay_millis));
        return Ok(PromptOutcome::Continue);
    }

    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => {
                state.interactive = false;
                return Ok(PromptOutcome::Continue);
            }
            Ok(_) => {}
            Err(e) => return Err(e),
        }

        match byte[0].to_ascii_uppercase() {
            b'Q' => return Ok(PromptOutcome::Quit),
            b'H' => {
                writeln!(output, "{HELP_TEXT}")?;
            }
            b'E' => {}
            b'D' => state.debug_rendering = !state.debug_rendering,
            b'I' => {
                state.inspection = match state.inspection {
                    InspectionMode::Console | InspectionMode::Both => InspectionMode::Off,
                    _ => InspectionMode::Console,
                };
            }
            b'V' => {
                state.inspection = match state.inspection {
                    InspectionMode::Visual | InspectionMode::Both => InspectionMode::Off,
                    _ => InspectionMode::Visual,
                };
            }
            b'W' => {
                state.inspection = match state.inspection {
                    InspectionMode::Both => InspectionMode::Off,
                    _ => InspectionMode::Both,
                };
            }
            b'P' => {
                let mut line = String::new();
                let mut c = [0u8; 1];
                loop {
                    match input.read(&mut c) {
                        Ok(0) => break,
                        Ok(_) if c[0] == b'\n' => break,
                        Ok(_) => line.push(c[0] as char),
                        Err(e) => return Err(e),
                    }
                }
                if let Ok(ms) = line.trim().parse::<u64>() {
                    state.non_interactive_delay_millis = ms;
                }
            }
            b'\n' | b'\r' => continue,
            _ => {}
        }
        return Ok(PromptOutcome::Continue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_key_reports_quit() {
        let mut state = InteractiveState::new(true, 50);
        let mut input: &[u8] = b"Q";
        let mut out = Vec::new();
        let outcome = prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert_eq!(outcome, PromptOutcome::Quit);
    }

    #[test]
    fn eof_switches_to_non_interactive() {
        let mut state = InteractiveState::new(true, 50);
        let mut input: &[u8] = b"";
        let mut out = Vec::new();
        prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert!(!state.interactive);
    }

    #[test]
    fn p_key_reads_a_new_delay() {
        let mut state = InteractiveState::new(true, 50);
        let mut input: &[u8] = b"P250\n";
        let mut out = Vec::new();
        prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert_eq!(state.non_interactive_delay_millis, 250);
    }

    #[test]
    fn w_then_w_toggles_inspection_back_off() {
        let mut state = InteractiveState::new(true, 50);
        let mut out = Vec::new();
        let mut input: &[u8] = b"W";
        prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert_eq!(state.inspection, InspectionMode::Both);
        let mut input: &[u8] = b"W";
        prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert_eq!(state.inspection, InspectionMode::Off);
    }

    #[test]
    fn help_key_writes_help_text() {
        let mut state = InteractiveState::new(true, 50);
        let mut input: &[u8] = b"H";
        let mut out = Vec::new();
        prompt_after_snapshot(&mut state, &mut input, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("quit"));
    }
}
