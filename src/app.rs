use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton};

use crate::action::Action;
use crate::attempt::AttemptReport;
use crate::bind::{Bind, Bindings};
use crate::config::ConfigStore;
use crate::estimator::Estimator;
use crate::runtime::SlamEvent;
use crate::session::Session;
use crate::timeline::TimelineView;

/// How long a finished attempt's timeline stays on screen
pub const DEFAULT_DISPLAY: Duration = Duration::from_millis(1200);

const TRANSCRIPT_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// waiting for the bind of this action
    Binding(Action),
    Attempting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Timeline of the last attempt, dismissed after the display duration
#[derive(Debug, Clone)]
pub struct ShownTimeline {
    pub report: AttemptReport,
    pub view: TimelineView,
    pub shown_at: Instant,
}

pub struct App {
    pub session: Session,
    pub bindings: Bindings,
    pub state: AppState,
    pub transcript: VecDeque<String>,
    pub timeline: Option<ShownTimeline>,
    store: Box<dyn ConfigStore>,
    display: Duration,
}

impl App {
    /// Load binds from `store`; any problem with them starts the capture flow.
    pub fn new(
        store: Box<dyn ConfigStore>,
        estimator: Estimator,
        display: Duration,
        force_rebind: bool,
        now: Instant,
    ) -> Self {
        let mut app = Self {
            session: Session::new(estimator),
            bindings: Bindings::default(),
            state: AppState::Attempting,
            transcript: VecDeque::new(),
            timeline: None,
            store,
            display,
        };

        app.say("Stun Slam Tester starting...");
        app.say("Press Esc at any time to quit the program.");

        match app.store.load() {
            Ok(binds) if !force_rebind => {
                app.bindings = binds;
                app.say("Loaded keybinds:");
                for line in app.bindings.describe() {
                    app.say(line);
                }
                app.say("Press BACKSPACE at startup to rebind.");
                app.say("");
                app.start_attempts(now);
            }
            Ok(_) => app.begin_capture("=== REBINDING HOTKEYS ==="),
            Err(e) => {
                log::warn!("keybinds unavailable: {e}");
                app.say(format!("Failed to load keybinds: {e}"));
                app.begin_capture("No keybinds found. Entering config mode.");
            }
        }
        app
    }

    fn say(&mut self, line: impl Into<String>) {
        if self.transcript.len() == TRANSCRIPT_LINES {
            self.transcript.pop_front();
        }
        self.transcript.push_back(line.into());
    }

    fn capture_prompt(action: Action) -> String {
        format!("Press your {action} key or mouse button:")
    }

    fn begin_capture(&mut self, banner: &str) {
        self.session.suspend();
        self.bindings = Bindings::default();
        self.say(banner);
        self.say(Self::capture_prompt(Action::CAPTURE_ORDER[0]));
        self.state = AppState::Binding(Action::CAPTURE_ORDER[0]);
    }

    fn start_attempts(&mut self, now: Instant) {
        self.state = AppState::Attempting;
        self.session.start(now);
        self.say("Reset. Try a stun slam...");
    }

    fn captured(&mut self, action: Action, bind: Bind, now: Instant) {
        self.say(format!("Bind set to {bind}"));
        self.bindings.set(action, bind);

        if let Some(next) = action.next_to_capture() {
            self.say(Self::capture_prompt(next));
            self.state = AppState::Binding(next);
            return;
        }

        match self.store.save(&self.bindings) {
            Ok(()) => self.say("=== CONFIG SAVED ==="),
            Err(e) => {
                log::warn!("could not save keybinds: {e}");
                self.say(format!("Could not save keybinds: {e}"));
            }
        }
        for line in self.bindings.describe() {
            self.say(line);
        }
        self.say("Rebinding complete. Starting...");
        self.start_attempts(now);
    }

    pub fn handle(&mut self, event: SlamEvent) -> Flow {
        match event {
            SlamEvent::Key(key, at) => self.on_key(key, at),
            SlamEvent::Mouse(button, at) => {
                self.on_mouse(button, at);
                Flow::Continue
            }
            SlamEvent::Tick => {
                self.on_tick(Instant::now());
                Flow::Continue
            }
            SlamEvent::Resize => Flow::Continue,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, at: Instant) -> Flow {
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            return Flow::Quit;
        }

        match self.state {
            AppState::Binding(action) => match Bind::from_key_code(key.code) {
                Some(bind) => self.captured(action, bind, at),
                None => self.say("That key cannot be bound. Try again."),
            },
            AppState::Attempting => {
                if key.code == KeyCode::Backspace && self.session.can_rebind() {
                    self.begin_capture("=== REBINDING HOTKEYS ===");
                    return Flow::Continue;
                }
                for action in self.bindings.actions_for_key(key.code) {
                    self.session.record(action, at);
                }
            }
        }
        Flow::Continue
    }

    pub fn on_mouse(&mut self, button: MouseButton, at: Instant) {
        match self.state {
            AppState::Binding(action) => self.captured(action, Bind::Mouse(button.into()), at),
            AppState::Attempting => {
                for action in self.bindings.actions_for_mouse(button) {
                    self.session.record(action, at);
                }
            }
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self
            .timeline
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= self.display)
        {
            self.timeline = None;
        }

        if self.state != AppState::Attempting {
            return;
        }

        if let Some(report) = self.session.poll(now) {
            for line in report.lines() {
                self.say(line);
            }
            let tick_ms = self.session.estimator().tick_ms();
            self.timeline = TimelineView::from_events(&report.events, tick_ms).map(|view| {
                ShownTimeline {
                    report,
                    view,
                    shown_at: now,
                }
            });
            self.say("Reset. Try a stun slam...");
        }
    }
}
