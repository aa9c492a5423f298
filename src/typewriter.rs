//! Terminal typewriter: retypes the lines of `.terminal-body` one character at
//! a time.
//!
//! [`Typewriter`] is a plain state machine; each [`Typewriter::advance`] is one
//! timer step and tells the caller what to print and how long to wait before
//! the next step. [`TerminalTyping`] drives it from `setTimeout` in the page.
//!
//! ```text
//! Idle -> Typing(line, i) -> ... -> LineDone(line) -> NextLine(line + 1) -> Typing(..) ... -> Finished
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::config::TypingSettings;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Idle,
    Typing { line: usize, char_index: usize },
    LineDone { line: usize },
    NextLine { line: usize },
    Finished,
}

/// Outcome of one timer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Character to append to the given line.
    pub emit: Option<(usize, char)>,
    /// Delay before the next step; `None` once the chain should stop.
    pub next_delay_ms: Option<u32>,
}

impl Tick {
    const STOP: Tick = Tick {
        emit: None,
        next_delay_ms: None,
    };
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    lines: Vec<Vec<char>>,
    state: TypingState,
    paused: bool,
    timing: TypingSettings,
}

impl Typewriter {
    pub fn new<I, S>(lines: I, timing: TypingSettings) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| l.as_ref().chars().collect())
                .collect(),
            state: TypingState::Idle,
            paused: false,
            timing,
        }
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.state == TypingState::Finished
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Full text of line `index`.
    pub fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|l| l.iter().collect())
    }

    /// Delay before the first step, or `None` if there is nothing to type.
    pub fn first_delay(&self) -> Option<u32> {
        match self.state {
            TypingState::Finished => None,
            _ if self.lines.is_empty() => None,
            TypingState::Idle => Some(self.timing.start_delay_ms),
            _ => Some(self.timing.char_delay_ms),
        }
    }

    /// Perform one timer step.
    pub fn advance(&mut self) -> Tick {
        if self.paused {
            return Tick::STOP;
        }
        loop {
            match self.state {
                TypingState::Idle => {
                    if self.lines.is_empty() {
                        self.state = TypingState::Finished;
                        continue;
                    }
                    self.state = TypingState::Typing {
                        line: 0,
                        char_index: 0,
                    };
                }
                TypingState::Typing { line, char_index } => match self.lines[line].get(char_index) {
                    Some(&ch) => {
                        self.state = TypingState::Typing {
                            line,
                            char_index: char_index + 1,
                        };
                        return Tick {
                            emit: Some((line, ch)),
                            next_delay_ms: Some(self.timing.char_delay_ms),
                        };
                    }
                    None => self.state = TypingState::LineDone { line },
                },
                TypingState::LineDone { line } => {
                    self.state = TypingState::NextLine { line: line + 1 };
                    return Tick {
                        emit: None,
                        next_delay_ms: Some(self.timing.line_delay_ms),
                    };
                }
                TypingState::NextLine { line } => {
                    self.state = if line < self.lines.len() {
                        TypingState::Typing {
                            line,
                            char_index: 0,
                        }
                    } else {
                        TypingState::Finished
                    };
                }
                TypingState::Finished => return Tick::STOP,
            }
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clear the pause flag and return the delay to the next step, if any.
    pub fn resume(&mut self) -> Option<u32> {
        self.paused = false;
        self.first_delay()
    }

    pub fn cancel(&mut self) {
        self.state = TypingState::Finished;
    }
}

// --- Browser driver -----------------------------------------------------------

struct TypingRun {
    machine: Typewriter,
    targets: Vec<Element>,
    window: Window,
    timer: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl TypingRun {
    fn schedule(&mut self, delay_ms: u32) {
        let Some(cb) = self.callback.as_ref() else {
            return;
        };
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms.min(i32::MAX as u32) as i32,
            ) {
            Ok(id) => self.timer = Some(id),
            Err(e) => log::warn!("typewriter setTimeout failed: {:?}", e),
        }
    }

    fn clear_timer(&mut self) {
        if let Some(id) = self.timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn step(&mut self) {
        self.timer = None;
        let tick = self.machine.advance();
        if let Some((line, ch)) = tick.emit {
            if let Some(el) = self.targets.get(line) {
                let mut text = el.text_content().unwrap_or_default();
                text.push(ch);
                el.set_text_content(Some(&text));
            }
        }
        if let Some(delay) = tick.next_delay_ms {
            self.schedule(delay);
        }
    }
}

/// Handle to a running typewriter on the page.
#[derive(Clone)]
pub struct TerminalTyping {
    run: Rc<RefCell<TypingRun>>,
}

impl TerminalTyping {
    /// Capture and clear every line matched by `selector`, then start typing
    /// them back. Returns `None` when the selector matches nothing.
    pub fn attach(
        win: &Window,
        doc: &Document,
        selector: &str,
        timing: TypingSettings,
    ) -> Result<Option<Self>> {
        let nodes = doc.query_selector_all(selector)?;
        let mut targets = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                targets.push(el);
            }
        }
        if targets.is_empty() {
            return Ok(None);
        }

        let lines: Vec<String> = targets
            .iter()
            .map(|el| el.text_content().unwrap_or_default())
            .collect();
        for el in &targets {
            el.set_text_content(Some(""));
        }

        let run = Rc::new(RefCell::new(TypingRun {
            machine: Typewriter::new(lines, timing),
            targets,
            window: win.clone(),
            timer: None,
            callback: None,
        }));
        let weak: Weak<RefCell<TypingRun>> = Rc::downgrade(&run);
        run.borrow_mut().callback = Some(Closure::wrap(Box::new(move || {
            if let Some(run) = weak.upgrade() {
                run.borrow_mut().step();
            }
        }) as Box<dyn FnMut()>));

        {
            let mut r = run.borrow_mut();
            if let Some(delay) = r.machine.first_delay() {
                r.schedule(delay);
            }
        }
        Ok(Some(Self { run }))
    }

    pub fn pause(&self) {
        let mut run = self.run.borrow_mut();
        run.machine.pause();
        run.clear_timer();
    }

    pub fn resume(&self) {
        let mut run = self.run.borrow_mut();
        if !run.machine.is_paused() || run.timer.is_some() {
            return;
        }
        if let Some(delay) = run.machine.resume() {
            run.schedule(delay);
        }
    }

    /// Stop typing and show every line in full.
    pub fn cancel(&self) {
        let mut run = self.run.borrow_mut();
        run.clear_timer();
        run.machine.cancel();
        for (i, el) in run.targets.iter().enumerate() {
            if let Some(text) = run.machine.line(i) {
                el.set_text_content(Some(&text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TypingSettings {
        TypingSettings::default()
    }

    /// Run to completion, collecting emitted text per line and the delays.
    fn drain(tw: &mut Typewriter) -> (Vec<String>, Vec<u32>) {
        let mut out = vec![String::new(); tw.line_count()];
        let mut delays = Vec::new();
        loop {
            let tick = tw.advance();
            if let Some((line, ch)) = tick.emit {
                out[line].push(ch);
            }
            match tick.next_delay_ms {
                Some(d) => delays.push(d),
                None => break,
            }
        }
        (out, delays)
    }

    #[test]
    fn test_types_every_line_in_order() {
        let mut tw = Typewriter::new(["$ whoami", "dev"], timing());
        assert_eq!(tw.first_delay(), Some(1000));
        let (out, delays) = drain(&mut tw);
        assert_eq!(out, vec!["$ whoami".to_string(), "dev".to_string()]);
        assert!(tw.is_finished());
        // 8 chars, line pause, 3 chars, line pause
        let mut expected = vec![30; 8];
        expected.push(500);
        expected.extend([30; 3]);
        expected.push(500);
        assert_eq!(delays, expected);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let mut tw = Typewriter::new(["héllo→"], timing());
        let (out, delays) = drain(&mut tw);
        assert_eq!(out[0], "héllo→");
        assert_eq!(delays.iter().filter(|&&d| d == 30).count(), 6);
    }

    #[test]
    fn test_empty_line_only_waits() {
        let mut tw = Typewriter::new(["", "x"], timing());
        let first = tw.advance();
        assert_eq!(first.emit, None);
        assert_eq!(first.next_delay_ms, Some(500));
        assert_eq!(tw.state(), TypingState::NextLine { line: 1 });
        let second = tw.advance();
        assert_eq!(second.emit, Some((1, 'x')));
    }

    #[test]
    fn test_no_lines_finishes_immediately() {
        let mut tw = Typewriter::new(Vec::<String>::new(), timing());
        assert_eq!(tw.first_delay(), None);
        assert_eq!(tw.advance(), Tick::STOP);
        assert!(tw.is_finished());
    }

    #[test]
    fn test_pause_holds_state_until_resume() {
        let mut tw = Typewriter::new(["abc"], timing());
        tw.advance();
        tw.pause();
        assert_eq!(tw.advance(), Tick::STOP);
        assert_eq!(
            tw.state(),
            TypingState::Typing {
                line: 0,
                char_index: 1
            }
        );
        assert_eq!(tw.resume(), Some(30));
        assert_eq!(tw.advance().emit, Some((0, 'b')));
    }

    #[test]
    fn test_cancel_finishes_and_keeps_text() {
        let mut tw = Typewriter::new(["abc", "def"], timing());
        tw.advance();
        tw.cancel();
        assert!(tw.is_finished());
        assert_eq!(tw.advance(), Tick::STOP);
        assert_eq!(tw.resume(), None);
        assert_eq!(tw.line(1).as_deref(), Some("def"));
    }
}
