//! # Progress Renderer
//!
//! A live, per-repository progress view: one line per repository with a
//! spinner while its task runs and a check mark or cross once it is done.
//!
//! ## Ownership
//!
//! The state array lives on a single renderer thread, which is also the
//! only writer to the terminal. Each task is handed exactly one [`Slot`],
//! a non-cloneable handle bound to one index; updates flow from slots to
//! the renderer over a channel. No two tasks can address the same index,
//! and no task ever touches the terminal, so there is no lock and no
//! interleaved output.
//!
//! A slot dropped without being resolved (its task returned early or
//! panicked) marks its index as failed, so no line stays loading once the
//! batch is over.
//!
//! ## Lifecycle
//!
//! [`ProgressBoard::start`] reserves the lines and starts ticking. The
//! renderer stops on its own once every slot has left
//! [`ProgressStatus::Loading`], or as soon as [`ProgressBoard::finish`] is
//! called, which also returns the final states.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use console::{Style, Term};
use log::debug;

use crate::error::Result;
use crate::output::OutputConfig;

/// Frames of the in-progress glyph.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Loading,
    Success,
    Error,
}

/// What one line of the view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub status: ProgressStatus,
    pub message: String,
}

impl ProgressState {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Loading,
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == ProgressStatus::Loading
    }
}

/// Where the view is drawn.
#[derive(Debug, Clone)]
pub enum DrawTarget {
    /// Redraw in place on every tick.
    Live(Term),
    /// Print the final frame once, for terminals that cannot redraw.
    Final(Term),
    /// Draw nothing.
    Hidden,
}

impl DrawTarget {
    /// Live when stdout is a terminal, final-frame-only otherwise.
    pub fn stdout() -> Self {
        let term = Term::stdout();
        if term.is_term() {
            DrawTarget::Live(term)
        } else {
            DrawTarget::Final(term)
        }
    }
}

enum Event {
    Update { index: usize, message: String },
    Resolve { index: usize, state: ProgressState },
    Finish,
}

/// Exclusive write access to one line of a [`ProgressBoard`].
#[derive(Debug)]
pub struct Slot {
    index: usize,
    tx: Sender<Event>,
    resolved: bool,
}

impl Slot {
    #[cfg(test)]
    fn index(&self) -> usize {
        self.index
    }

    /// Change the message while still loading.
    pub fn update(&self, message: impl Into<String>) {
        self.send(Event::Update {
            index: self.index,
            message: message.into(),
        });
    }

    pub fn succeed(self, message: impl Into<String>) {
        self.resolve(ProgressStatus::Success, message.into());
    }

    pub fn fail(self, message: impl Into<String>) {
        self.resolve(ProgressStatus::Error, message.into());
    }

    fn resolve(mut self, status: ProgressStatus, message: String) {
        self.resolved = true;
        self.send(Event::Resolve {
            index: self.index,
            state: ProgressState { status, message },
        });
    }

    fn send(&self, event: Event) {
        // The renderer may have stopped already.
        let _ = self.tx.send(event);
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if !self.resolved {
            self.send(Event::Resolve {
                index: self.index,
                state: interrupted(),
            });
        }
    }
}

/// The renderer side of a live progress view.
pub struct ProgressBoard {
    tx: Sender<Event>,
    handle: Option<JoinHandle<Vec<ProgressState>>>,
    initial: Vec<ProgressState>,
}

impl ProgressBoard {
    /// Reserve one line per name and start the renderer thread.
    ///
    /// Returns the board and one [`Slot`] per name, index-aligned with
    /// `names`.
    pub fn start(
        target: DrawTarget,
        names: Vec<String>,
        initial_message: &str,
        config: OutputConfig,
        tick: Duration,
    ) -> Result<(Self, Vec<Slot>)> {
        let (tx, rx) = mpsc::channel();
        let states: Vec<ProgressState> = names
            .iter()
            .map(|_| ProgressState::loading(initial_message))
            .collect();
        let initial = states.clone();

        let slots = (0..names.len())
            .map(|index| Slot {
                index,
                tx: tx.clone(),
                resolved: false,
            })
            .collect();

        let renderer = Renderer {
            target,
            names,
            states,
            config,
            tick,
            frame: 0,
            drawn: 0,
        };
        let handle = thread::Builder::new()
            .name("gee-progress".to_string())
            .spawn(move || renderer.run(rx))?;

        Ok((
            Self {
                tx,
                handle: Some(handle),
                initial,
            },
            slots,
        ))
    }

    /// Stop rendering and return the final states.
    ///
    /// Lines still loading at this point are reported as errors.
    pub fn finish(mut self) -> Vec<ProgressState> {
        let _ = self.tx.send(Event::Finish);
        let initial = std::mem::take(&mut self.initial);
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(states)) => states,
            _ => {
                debug!("progress renderer exited abnormally");
                initial.into_iter().map(|_| interrupted()).collect()
            }
        }
    }
}

impl Drop for ProgressBoard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(Event::Finish);
            let _ = handle.join();
        }
    }
}

fn interrupted() -> ProgressState {
    ProgressState {
        status: ProgressStatus::Error,
        message: "interrupted".to_string(),
    }
}

struct Renderer {
    target: DrawTarget,
    names: Vec<String>,
    states: Vec<ProgressState>,
    config: OutputConfig,
    tick: Duration,
    frame: usize,
    drawn: usize,
}

impl Renderer {
    fn run(mut self, rx: Receiver<Event>) -> Vec<ProgressState> {
        self.draw();
        let mut next_tick = Instant::now() + self.tick;

        while self.states.iter().any(ProgressState::is_loading) {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(Event::Finish) | Err(RecvTimeoutError::Disconnected) => {
                    // Take whatever was sent before the finish signal.
                    while let Ok(event) = rx.try_recv() {
                        self.apply(event);
                    }
                    break;
                }
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => {}
            }

            if Instant::now() >= next_tick {
                self.frame += 1;
                self.draw();
                next_tick = Instant::now() + self.tick;
            }
        }

        for state in self.states.iter_mut().filter(|s| s.is_loading()) {
            *state = interrupted();
        }
        self.draw_final();
        self.states
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::Update { index, message } => {
                if let Some(state) = self.states.get_mut(index) {
                    if state.is_loading() {
                        state.message = message;
                    }
                }
            }
            Event::Resolve { index, state } => {
                if let Some(slot) = self.states.get_mut(index) {
                    *slot = state;
                }
            }
            Event::Finish => {}
        }
    }

    fn draw(&mut self) {
        if let DrawTarget::Live(term) = &self.target {
            let lines = frame_lines(&self.names, &self.states, self.frame, &self.config);
            let width = usize::from(term.size().1);
            let cleared = if self.drawn > 0 {
                term.clear_last_lines(self.drawn)
            } else {
                Ok(())
            };
            let result = cleared.and_then(|_| {
                lines
                    .iter()
                    .try_for_each(|line| term.write_line(&console::truncate_str(line, width, "…")))
            });
            match result {
                Ok(()) => self.drawn = lines.len(),
                Err(e) => debug!("unable to draw progress: {}", e),
            }
        }
    }

    fn draw_final(&mut self) {
        match &self.target {
            DrawTarget::Live(_) => self.draw(),
            DrawTarget::Final(term) => {
                let lines = frame_lines(&self.names, &self.states, self.frame, &self.config);
                if let Err(e) = lines.iter().try_for_each(|line| term.write_line(line)) {
                    debug!("unable to draw progress: {}", e);
                }
            }
            DrawTarget::Hidden => {}
        }
    }
}

/// Render one frame of the view.
pub fn frame_lines(
    names: &[String],
    states: &[ProgressState],
    frame: usize,
    config: &OutputConfig,
) -> Vec<String> {
    let width = names
        .iter()
        .map(|n| console::measure_text_width(n))
        .max()
        .unwrap_or(0);

    names
        .iter()
        .zip(states)
        .map(|(name, state)| {
            let glyph = match state.status {
                ProgressStatus::Loading => config
                    .paint(
                        &Style::new().cyan(),
                        SPINNER_FRAMES[frame % SPINNER_FRAMES.len()],
                    )
                    .to_string(),
                ProgressStatus::Success => config.symbol_success(),
                ProgressStatus::Error => config.symbol_error(),
            };
            let padded = format!("{:<width$}", name, width = width);
            let message = match state.status {
                ProgressStatus::Error => config.error(&state.message).to_string(),
                _ => config.dim(&state.message).to_string(),
            };
            format!("{} {}  {}", glyph, config.repo_name(padded), message)
                .trim_end()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("repo-{}", i)).collect()
    }

    fn start(n: usize) -> (ProgressBoard, Vec<Slot>) {
        ProgressBoard::start(
            DrawTarget::Hidden,
            names(n),
            "Pulling...",
            OutputConfig::without_color(),
            TICK,
        )
        .unwrap()
    }

    #[test]
    fn test_slots_are_index_aligned() {
        let (board, slots) = start(3);
        let indexes: Vec<usize> = slots.iter().map(Slot::index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        drop(slots);
        board.finish();
    }

    #[test]
    fn test_final_states_follow_resolution() {
        let (board, mut slots) = start(3);
        let third = slots.pop().unwrap();
        let second = slots.pop().unwrap();
        let first = slots.pop().unwrap();

        first.update("Cloning instead...");
        first.succeed("Pulled");
        second.fail("failed to pull repo-1");
        drop(third);

        let states = board.finish();

        assert_eq!(states[0].status, ProgressStatus::Success);
        assert_eq!(states[0].message, "Pulled");
        assert_eq!(states[1].status, ProgressStatus::Error);
        assert_eq!(states[1].message, "failed to pull repo-1");
        assert_eq!(states[2].status, ProgressStatus::Error);
        assert_eq!(states[2].message, "interrupted");
    }

    #[test]
    fn test_nothing_is_loading_after_finish() {
        let (board, slots) = start(4);
        let states = board.finish();
        assert!(states.iter().all(|s| !s.is_loading()));
        drop(slots);
    }

    #[test]
    fn test_renderer_stops_when_all_resolved() {
        let (mut board, slots) = start(2);
        for slot in slots {
            slot.succeed("done");
        }
        let handle = board.handle.take().unwrap();
        let states = handle.join().unwrap();
        assert!(states.iter().all(|s| s.status == ProgressStatus::Success));
    }

    #[test]
    fn test_updates_from_many_threads() {
        let (board, slots) = start(16);
        let handles: Vec<_> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                thread::spawn(move || {
                    slot.update("working");
                    if i % 2 == 0 {
                        slot.succeed("ok");
                    } else {
                        slot.fail("nope");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let states = board.finish();

        for (i, state) in states.iter().enumerate() {
            let expected = if i % 2 == 0 {
                ProgressStatus::Success
            } else {
                ProgressStatus::Error
            };
            assert_eq!(state.status, expected);
        }
    }

    #[test]
    fn test_empty_board() {
        let (board, slots) = start(0);
        assert!(slots.is_empty());
        assert!(board.finish().is_empty());
    }

    #[test]
    fn test_frame_lines_rotate_spinner() {
        let config = OutputConfig::without_color();
        let names = vec!["api".to_string(), "web-frontend".to_string()];
        let states = vec![
            ProgressState::loading("Pulling..."),
            ProgressState {
                status: ProgressStatus::Success,
                message: "Pulled".to_string(),
            },
        ];

        let first = frame_lines(&names, &states, 0, &config);
        let second = frame_lines(&names, &states, 1, &config);

        assert_eq!(first[0], "⠋ api           Pulling...");
        assert_eq!(second[0], "⠙ api           Pulling...");
        assert_eq!(first[1], "✓ web-frontend  Pulled");
        assert_eq!(first[1], second[1]);
    }

    #[test]
    fn test_frame_lines_error_glyph() {
        let config = OutputConfig::without_color();
        let names = vec!["api".to_string()];
        let states = vec![ProgressState {
            status: ProgressStatus::Error,
            message: "no remote configured".to_string(),
        }];
        assert_eq!(
            frame_lines(&names, &states, 7, &config),
            vec!["✗ api  no remote configured"]
        );
    }
}
