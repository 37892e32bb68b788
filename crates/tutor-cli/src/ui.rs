//! TUI front end

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tutor_ai::GenerationEvent;
use tutor_core::{
    PendingResponse, QUICK_SYMBOLS, RequestId, RequestLifecycle, ResponseMode, Tutor, TutorEvent,
};
use tutor_tui::{
    Action, Theme,
    widgets::{InputBox, Notice, SolutionView, Spinner, SymbolBar, SymbolPalette, solution_height},
};

const SOLVING: &str = "Solving your equation...";
const KEY_HELP: &str = "Enter: solve │ Tab: symbol │ Ctrl+S: insert │ Ctrl+L: clear │ Esc: quit";

/// What the event loop should do after an action
pub enum Flow {
    Continue,
    /// A request was started; poll its response
    Started(PendingResponse),
    /// Stop polling the current response
    Dropped,
    Quit,
}

/// TUI state
pub struct TuiState {
    pub tutor: Tutor,
    pub input: InputBox,
    pub palette: SymbolPalette,
    pub theme: Theme,
    pub status: String,
    /// Rejection message for the last submitted input
    pub notice: Option<String>,
    pub scroll: usize,
    /// Keep the newest lines in view while the transcript grows
    pub follow: bool,
    pub started: Instant,
    events: broadcast::Receiver<TutorEvent>,
    view_height: usize,
}

impl TuiState {
    pub fn new(tutor: Tutor) -> Self {
        let events = tutor.subscribe();
        let mut input = InputBox::new()
            .with_title("Equation")
            .with_placeholder("e.g. 2x + 5 = 15");
        input.set_focused(true);

        Self {
            tutor,
            input,
            palette: SymbolPalette::new(QUICK_SYMBOLS),
            theme: Theme::default(),
            status: "Ready".to_string(),
            notice: None,
            scroll: 0,
            follow: true,
            started: Instant::now(),
            events,
            view_height: 0,
        }
    }

    pub fn is_solving(&self) -> bool {
        self.tutor.aggregator().current_state() == RequestLifecycle::InProgress
    }

    /// Apply queued tutor events to the status line
    pub fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_tutor_event(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn handle_tutor_event(&mut self, event: TutorEvent) {
        if let Some(request) = event.request() {
            if request != self.tutor.aggregator().current_request() {
                tracing::debug!(%request, "ignoring event from a superseded request");
                return;
            }
        }

        match event {
            TutorEvent::Started { request } => {
                self.status = format!("Solving {}", request);
                self.notice = None;
            }
            TutorEvent::Fragment { .. } => {}
            TutorEvent::Completed { .. } => {
                self.status = "Solved".to_string();
            }
            TutorEvent::Failed { .. } => {
                self.status = "Failed".to_string();
            }
            TutorEvent::Rejected { message } => {
                self.status = "Ready".to_string();
                self.notice = Some(message);
            }
            TutorEvent::Cleared => {
                self.status = "Ready".to_string();
                self.notice = None;
            }
        }
    }

    /// Feed a client event for `request`. Returns true once the request is over.
    pub fn handle_generation(&mut self, request: RequestId, event: GenerationEvent) -> bool {
        let done = self.tutor.apply(request, event).is_some();
        self.drain_events();
        done
    }

    pub fn handle_action(&mut self, action: Action, width: u16) -> Flow {
        let flow = match action {
            Action::Submit => self.submit(),
            Action::Escape | Action::Interrupt => {
                if self.is_solving() {
                    self.tutor.abort();
                    Flow::Dropped
                } else {
                    Flow::Quit
                }
            }
            Action::Quit => Flow::Quit,
            Action::Clear => {
                let was_solving = self.is_solving();
                self.tutor.clear();
                self.input.clear();
                self.scroll = 0;
                self.follow = true;
                if was_solving {
                    Flow::Dropped
                } else {
                    Flow::Continue
                }
            }
            Action::NextSymbol => {
                self.palette.next();
                Flow::Continue
            }
            Action::PrevSymbol => {
                self.palette.prev();
                Flow::Continue
            }
            Action::InsertSymbol => {
                if let Some(symbol) = self.palette.selected() {
                    self.input.insert_str(symbol);
                }
                Flow::Continue
            }
            Action::ToggleMode => {
                let mode = match self.tutor.config().mode {
                    ResponseMode::Stream => ResponseMode::Single,
                    ResponseMode::Single => ResponseMode::Stream,
                };
                self.tutor.set_mode(mode);
                self.status = format!("Mode: {}", mode_label(mode));
                Flow::Continue
            }
            Action::PageUp => {
                self.scroll_by(-(self.view_height.max(1) as isize));
                Flow::Continue
            }
            Action::PageDown => {
                self.scroll_by(self.view_height.max(1) as isize);
                Flow::Continue
            }
            Action::Up => {
                self.scroll_by(-1);
                Flow::Continue
            }
            Action::Down => {
                self.scroll_by(1);
                Flow::Continue
            }
            other => {
                self.input.handle_action(&other, width);
                Flow::Continue
            }
        };

        self.drain_events();
        flow
    }

    fn submit(&mut self) -> Flow {
        if self.is_solving() || self.input.is_blank() {
            return Flow::Continue;
        }

        match self.tutor.begin(self.input.content()) {
            Ok(pending) => {
                self.scroll = 0;
                self.follow = true;
                self.started = Instant::now();
                Flow::Started(pending)
            }
            // Reported through the Rejected event
            Err(_) => Flow::Continue,
        }
    }

    /// Wheel scrolling over the solution
    pub fn handle_mouse(&mut self, kind: MouseEventKind) {
        match kind {
            MouseEventKind::ScrollUp => self.scroll_by(-3),
            MouseEventKind::ScrollDown => self.scroll_by(3),
            _ => {}
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_add_signed(delta);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Solution
                Constraint::Length(1), // Symbols
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(frame.area());

        self.render_solution(frame, chunks[0]);
        frame.render_widget(SymbolBar::new(&self.palette, &self.theme), chunks[1]);
        self.render_status(frame, chunks[2]);
        self.input
            .render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_solution(&mut self, frame: &mut Frame, area: Rect) {
        self.view_height = area.height as usize;
        let aggregator = self.tutor.aggregator();

        if let Some(message) = &self.notice {
            frame.render_widget(Notice::error(message, &self.theme), area);
            return;
        }

        match aggregator.current_state() {
            RequestLifecycle::Failed => {
                let message = aggregator
                    .failure()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                frame.render_widget(Notice::error(&message, &self.theme), area);
            }
            RequestLifecycle::InProgress if aggregator.current_transcript().is_empty() => {
                let spinner = Spinner::new(SOLVING, &self.theme).started_at(self.started);
                frame.render_widget(spinner, area);
            }
            RequestLifecycle::Idle => {
                frame.render_widget(Notice::tips(&self.theme), area);
            }
            RequestLifecycle::InProgress | RequestLifecycle::Completed => {
                let blocks = aggregator.blocks();
                let total = solution_height(&blocks, area.width as usize);
                let max_scroll = total.saturating_sub(self.view_height);
                self.scroll = if self.follow {
                    max_scroll
                } else {
                    self.scroll.min(max_scroll)
                };
                frame.render_widget(
                    SolutionView::new(&blocks, &self.theme).scroll(self.scroll),
                    area,
                );
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let left = format!(
            "{} │ {} │ {}",
            self.tutor.config().model.id,
            mode_label(self.tutor.config().mode),
            self.status
        );

        let left_width = left.chars().count();
        let right_width = KEY_HELP.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left, self.theme.dim_style()),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(KEY_HELP, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn mode_label(mode: ResponseMode) -> &'static str {
    match mode {
        ResponseMode::Stream => "streaming",
        ResponseMode::Single => "single",
    }
}

/// Next event of the response being polled; pending forever when there is none.
async fn next_generation(
    pending: &mut Option<PendingResponse>,
) -> (RequestId, GenerationEvent) {
    match pending {
        Some(response) => (response.request(), response.next_or_done().await),
        None => std::future::pending().await,
    }
}

enum Step {
    Generation(RequestId, GenerationEvent),
    Terminal(Option<std::io::Result<Event>>),
    Tick,
}

/// Run the TUI application
pub async fn run_tui(tutor: Tutor) -> anyhow::Result<()> {
    use crossterm::{
        event::{
            DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        },
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState::new(tutor);
    let mut pending: Option<PendingResponse> = None;
    let mut event_stream = EventStream::new();

    // 80ms matches the spinner frame rate
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let result = loop {
        terminal.draw(|frame| state.render(frame))?;
        let area_width = terminal.size()?.width;

        let step = tokio::select! {
            biased;

            (request, event) = next_generation(&mut pending) => Step::Generation(request, event),
            event = event_stream.next() => Step::Terminal(event),
            _ = tick_interval.tick() => Step::Tick,
        };

        match step {
            Step::Generation(request, event) => {
                if state.handle_generation(request, event) {
                    pending = None;
                }
            }
            Step::Terminal(Some(Ok(Event::Mouse(mouse)))) => state.handle_mouse(mouse.kind),
            Step::Terminal(Some(Ok(event))) => {
                let Some(action) = tutor_tui::event_to_action(event) else {
                    continue;
                };
                match state.handle_action(action, area_width) {
                    Flow::Continue => {}
                    Flow::Started(response) => pending = Some(response),
                    Flow::Dropped => pending = None,
                    Flow::Quit => break Ok(()),
                }
            }
            Step::Terminal(Some(Err(e))) => {
                break Err(anyhow::anyhow!("Event error: {}", e));
            }
            Step::Terminal(None) => break Ok(()),
            Step::Tick => {}
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
