use std::{
    io::{stdout, Stdout},
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Terminal,
};
use tracing::{debug, info};

use crate::{
    service::{
        api::rotation_repository::RotationSource,
        rotation_store::{LoadState, RotationStore},
    },
    ui::{search::SearchField, views::RotationView, AsyncRotation, RenderContext, ReplError, ACCENT},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct App {
    rotation: AsyncRotation,
    search: SearchField,
    view: RotationView,
    scroll_offset: u16,
    should_quit: bool,
}

impl App {
    fn new(rotation: AsyncRotation, initial_query: &str) -> Self {
        Self {
            rotation,
            search: SearchField::with_query(initial_query),
            view: RotationView::new(),
            scroll_offset: 0,
            should_quit: false,
        }
    }

    fn handle_key<S: RotationSource + 'static>(&mut self, code: KeyCode, store: &RotationStore<S>, page: u16) {
        if self.search.is_expanded() {
            match code {
                KeyCode::Esc | KeyCode::Enter => self.search.toggle(),
                KeyCode::Backspace => self.search.pop(),
                KeyCode::Char(c) => {
                    self.search.push(c);
                    self.scroll_offset = 0;
                }
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.search.toggle(),
            KeyCode::Char('r') => {
                if store.load().is_some() {
                    info!("manual refresh requested");
                }
            }
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(page),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_add(page),
            _ => {}
        }
    }

    fn poll_state(&mut self) {
        if self.rotation.try_update() {
            debug!(state = self.rotation.state().label(), "ui received new load state");
            if let LoadState::Data(_) = self.rotation.state() {
                self.view.mark_loaded();
                self.scroll_offset = 0;
            }
        }
    }

    fn search_line(&self) -> Line<'static> {
        if self.search.is_expanded() {
            return Line::from(vec![
                Span::styled("Champion name: ", Style::default().fg(ACCENT)),
                Span::raw(format!("{}_", self.search.query())),
            ]);
        }

        if self.search.show_badge() {
            return Line::from(Span::styled(
                format!("[filter: {}]", self.search.query()),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        Line::from(Span::styled("Press / to search", Style::default().fg(Color::DarkGray)))
    }

    fn hints(&self) -> &'static str {
        if self.search.is_expanded() {
            return "Type to filter, Backspace to delete, Enter/Esc to close search.";
        }

        match self.rotation.state() {
            LoadState::Error(_) => "Press r to refresh, q to quit.",
            LoadState::Data(_) => "Use ↑/↓ or PgUp/PgDown to scroll, / to search, r to refresh, q to quit.",
            LoadState::Initial | LoadState::Loading => "Loading the current rotation, q to quit.",
        }
    }

    fn run<S: RotationSource + 'static>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        store: &RotationStore<S>,
    ) -> Result<(), ReplError> {
        loop {
            self.poll_state();
            self.view.tick();

            let mut view_height = 0;
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
                    .split(f.area());
                view_height = chunks[1].height;

                let title = Paragraph::new(self.search_line()).alignment(Alignment::Right).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(ACCENT))
                        .title("LoL Champion Rotation")
                        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                );
                f.render_widget(title, chunks[0]);

                let info = Paragraph::new(self.hints())
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Right);
                f.render_widget(info, chunks[2]);

                let body = Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(Style::default().fg(ACCENT));
                let rc = RenderContext {
                    frame: f,
                    area: chunks[1],
                    scroll_offset: self.scroll_offset,
                    block: body,
                };
                self.view.render(rc, self.rotation.state(), self.search.query());
            })?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, store, view_height / 2);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }
}

/// Runs the interactive rotation screen until the user quits. Issues the
/// initial load itself.
pub fn run<S: RotationSource + 'static>(store: &RotationStore<S>, initial_query: &str) -> Result<(), ReplError> {
    let mut app = App::new(AsyncRotation::attach(store), initial_query);
    store.load();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::runtime::Handle;

    use super::*;
    use crate::{model::champion::ChampionRotation, service::api::rotation_repository::CurrentRotationError};

    struct Offline;

    #[async_trait]
    impl RotationSource for Offline {
        async fn current_rotation(&self) -> Result<ChampionRotation, CurrentRotationError> {
            Err(CurrentRotationError::Unavailable)
        }
    }

    fn app(store: &RotationStore<Offline>) -> App {
        App::new(AsyncRotation::attach(store), "")
    }

    #[tokio::test]
    async fn typing_while_searching_edits_query() {
        let store = RotationStore::new(Offline, Handle::current());
        let mut app = app(&store);

        app.handle_key(KeyCode::Char('/'), &store, 10);
        app.handle_key(KeyCode::Char('q'), &store, 10);
        app.handle_key(KeyCode::Char('x'), &store, 10);
        app.handle_key(KeyCode::Backspace, &store, 10);

        assert!(!app.should_quit);
        assert_eq!(app.search.query(), "q");

        app.handle_key(KeyCode::Esc, &store, 10);
        assert!(app.search.show_badge());
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Char('q'), &store, 10);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn refresh_key_starts_a_load() {
        let store = RotationStore::new(Offline, Handle::current());
        let mut app = app(&store);

        app.handle_key(KeyCode::Char('r'), &store, 10);
        assert!(store.state().is_loading());

        app.poll_state();
        assert!(app.rotation.state().is_loading());
        assert_eq!(app.hints(), "Loading the current rotation, q to quit.");
    }

    #[tokio::test]
    async fn scrolling_saturates_at_top() {
        let store = RotationStore::new(Offline, Handle::current());
        let mut app = app(&store);

        app.handle_key(KeyCode::PageDown, &store, 5);
        app.handle_key(KeyCode::Up, &store, 5);
        assert_eq!(app.scroll_offset, 4);

        app.handle_key(KeyCode::PageUp, &store, 5);
        assert_eq!(app.scroll_offset, 0);
    }
}
