use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use tracing::info;

/// User-facing console: where lists are shown and answers come from.
pub trait Prompt {
    fn show(&mut self, line: &str) -> Result<()>;
    /// One keystroke, without waiting for Enter.
    fn read_key(&mut self) -> Result<char>;
    /// One line, without the trailing newline. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Single digit keystroke, one retry. Only addresses the first ten entries.
    Digit,
    /// A number typed on its own line, asked again until it is in range.
    Line,
}

/// Lists `candidates` with 0-based indices and returns the chosen index.
/// A single candidate is taken without asking.
pub fn choose<T: Display>(
    prompt: &mut dyn Prompt,
    candidates: &[T],
    policy: SelectionPolicy,
) -> Result<usize> {
    match candidates.len() {
        0 => bail!("nothing to choose from"),
        1 => {
            info!("Only one candidate, selecting {}", candidates[0]);
            return Ok(0);
        }
        _ => {}
    }
    prompt.show(&format!(
        "Fetched {} entries, please input a number matching the correct name",
        candidates.len()
    ))?;
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.show(&format!("{i} {candidate}"))?;
    }
    match policy {
        SelectionPolicy::Digit => read_digit(prompt, candidates.len()),
        SelectionPolicy::Line => read_number(prompt, candidates.len()),
    }
}

fn digit_in_range(c: char, len: usize) -> Option<usize> {
    c.to_digit(10).map(|d| d as usize).filter(|&d| d < len)
}

fn read_digit(prompt: &mut dyn Prompt, len: usize) -> Result<usize> {
    let highest = len.min(10) - 1;
    let first = prompt.read_key()?;
    if let Some(i) = digit_in_range(first, len) {
        return Ok(i);
    }
    prompt.show(&format!(
        "Invalid input {first:?}, please enter a number between 0 and {highest}"
    ))?;
    let second = prompt.read_key()?;
    digit_in_range(second, len).ok_or_else(|| anyhow!("invalid selection {second:?}"))
}

fn read_number(prompt: &mut dyn Prompt, len: usize) -> Result<usize> {
    loop {
        let line = prompt
            .read_line()?
            .ok_or_else(|| anyhow!("input closed before a selection was made"))?;
        match line.trim().parse::<usize>() {
            Ok(i) if i < len => return Ok(i),
            _ => prompt.show(&format!(
                "Invalid input, please type a number between 0 and {}",
                len - 1
            ))?,
        }
    }
}

/// Real terminal: stdout for output, raw mode for single keys, stdin lines.
#[derive(Debug, Default)]
pub struct Terminal;

/// Leaves raw mode however the read ends.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to switch terminal to raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Prompt for Terminal {
    fn show(&mut self, line: &str) -> Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<char> {
        let key = {
            let _raw = RawModeGuard::enable()?;
            loop {
                if let Event::Key(key) = event::read().context("Failed to read key")? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        bail!("selection cancelled");
                    }
                    match key.code {
                        KeyCode::Char(c) => break c,
                        KeyCode::Enter => break '\n',
                        _ => continue,
                    }
                }
            }
        };
        self.show("")?;
        Ok(key)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned keys and lines, records everything shown.
    #[derive(Default)]
    pub(crate) struct Scripted {
        pub keys: VecDeque<char>,
        pub lines: VecDeque<String>,
        pub shown: Vec<String>,
    }

    impl Scripted {
        pub fn keys(keys: &str) -> Self {
            Self {
                keys: keys.chars().collect(),
                ..Default::default()
            }
        }

        pub fn lines(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl Prompt for Scripted {
        fn show(&mut self, line: &str) -> Result<()> {
            self.shown.push(line.to_string());
            Ok(())
        }

        fn read_key(&mut self) -> Result<char> {
            self.keys.pop_front().ok_or_else(|| anyhow!("no more keys"))
        }

        fn read_line(&mut self) -> Result<Option<String>> {
            Ok(self.lines.pop_front())
        }
    }

    const THREE: [&str; 3] = ["alpha", "beta", "gamma"];

    #[test]
    fn lists_candidates_with_zero_based_indices() {
        let mut prompt = Scripted::keys("2");
        assert_eq!(choose(&mut prompt, &THREE, SelectionPolicy::Digit).unwrap(), 2);
        assert_eq!(&prompt.shown[1..], ["0 alpha", "1 beta", "2 gamma"]);
    }

    #[test]
    fn single_candidate_is_auto_selected() {
        let mut prompt = Scripted::default();
        assert_eq!(choose(&mut prompt, &["only"], SelectionPolicy::Digit).unwrap(), 0);
        assert!(prompt.shown.is_empty());
    }

    #[test]
    fn empty_list_is_an_error() {
        let mut prompt = Scripted::default();
        let empty: [&str; 0] = [];
        assert!(choose(&mut prompt, &empty, SelectionPolicy::Line).is_err());
    }

    #[test]
    fn digit_policy_reprompts_once() {
        let mut prompt = Scripted::keys("x1");
        assert_eq!(choose(&mut prompt, &THREE, SelectionPolicy::Digit).unwrap(), 1);
        assert!(prompt.shown.last().unwrap().starts_with("Invalid input"));

        let mut prompt = Scripted::keys("9q0");
        assert!(choose(&mut prompt, &THREE, SelectionPolicy::Digit).is_err());
        assert_eq!(prompt.keys, VecDeque::from(['0']));
    }

    #[test]
    fn digit_policy_rejects_out_of_range_digit() {
        let mut prompt = Scripted::keys("50");
        assert_eq!(choose(&mut prompt, &THREE, SelectionPolicy::Digit).unwrap(), 0);
    }

    #[test]
    fn line_policy_keeps_asking_until_in_range() {
        let mut prompt = Scripted::lines(&["7", "abc", "-1", " 1 "]);
        assert_eq!(choose(&mut prompt, &THREE, SelectionPolicy::Line).unwrap(), 1);
        let notices = prompt
            .shown
            .iter()
            .filter(|l| l.starts_with("Invalid input"))
            .count();
        assert_eq!(notices, 3);
    }

    #[test]
    fn line_policy_reaches_past_ten() {
        let many: Vec<String> = (0..15).map(|i| format!("sub {i}")).collect();
        let mut prompt = Scripted::lines(&["12"]);
        assert_eq!(choose(&mut prompt, &many, SelectionPolicy::Line).unwrap(), 12);
    }

    #[test]
    fn line_policy_fails_when_input_ends() {
        let mut prompt = Scripted::lines(&["99"]);
        assert!(choose(&mut prompt, &THREE, SelectionPolicy::Line).is_err());
    }
}
