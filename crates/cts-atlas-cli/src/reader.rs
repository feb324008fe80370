use std::io::{Stdout, stdout};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use cts_atlas_engine::{ArenaStore, ResolvedPassage, Resolver};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

/// Pages through one version a passage-sized window at a time.
pub struct App {
    store: ArenaStore,
    passage: ResolvedPassage,
    leaf_state: ListState,
    status: Option<String>,
}

impl App {
    pub fn new(store: ArenaStore, urn: &str) -> Result<Self> {
        let passage = Resolver::new(&store).resolve_urn(urn)?;
        let mut app = Self {
            store,
            passage,
            leaf_state: ListState::default(),
            status: None,
        };
        app.select_first_leaf();
        Ok(app)
    }

    fn select_first_leaf(&mut self) {
        let selection = (!self.passage.is_empty()).then_some(0);
        self.leaf_state.select(selection);
    }

    pub fn next_leaf(&mut self) {
        if self.passage.is_empty() {
            return;
        }
        let i = match self.leaf_state.selected() {
            Some(i) => (i + 1).min(self.passage.len() - 1),
            None => 0,
        };
        self.leaf_state.select(Some(i));
    }

    pub fn previous_leaf(&mut self) {
        let i = self.leaf_state.selected().map_or(0, |i| i.saturating_sub(1));
        if !self.passage.is_empty() {
            self.leaf_state.select(Some(i));
        }
    }

    pub fn next_passage(&mut self) {
        let target = self.passage.next.urn.clone();
        self.jump(target, "Already at the end of the version");
    }

    pub fn previous_passage(&mut self) {
        let target = self.passage.previous.urn.clone();
        self.jump(target, "Already at the start of the version");
    }

    fn jump(&mut self, target: Option<String>, at_edge: &str) {
        let Some(urn) = target else {
            self.status = Some(at_edge.to_string());
            return;
        };
        match Resolver::new(&self.store).resolve_urn(&urn) {
            Ok(passage) => {
                self.passage = passage;
                self.status = None;
                self.select_first_leaf();
            }
            Err(e) => {
                log::warn!("{urn}: {e}");
                self.status = Some(format!("Error resolving {urn}: {e}"));
            }
        }
    }

    fn selected_text(&self) -> Vec<String> {
        let Some(leaf) = self
            .leaf_state
            .selected()
            .and_then(|i| self.passage.leaves.get(i))
        else {
            return vec!["No text in this passage".to_string()];
        };

        let mut lines: Vec<String> = self
            .passage
            .ancestors
            .iter()
            .map(|a| format!("{} {}", a.kind, a.reference))
            .collect();
        lines.push(String::new());
        lines.push(leaf.text.clone());
        lines
    }
}

pub fn run(store: ArenaStore, urn: &str) -> Result<()> {
    let mut app = App::new(store, urn)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_leaf(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_leaf(),
                KeyCode::Right | KeyCode::Char('n') => app.next_passage(),
                KeyCode::Left | KeyCode::Char('p') => app.previous_passage(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(rows[0]);

    let leaf_items: Vec<ListItem> = app
        .passage
        .leaves
        .iter()
        .map(|leaf| ListItem::new(Line::from(Span::raw(leaf.reference.clone()))))
        .collect();

    let leaves = List::new(leaf_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.passage.human_readable.clone()),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(leaves, chunks[0], &mut app.leaf_state);

    let text: Vec<Line> = app
        .selected_text()
        .into_iter()
        .map(|line| Line::from(Span::raw(line)))
        .collect();
    let content = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.passage.urn.clone()),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(content, chunks[1]);

    let help = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("↑/k ↓/j: Line | "),
            Span::raw("←/p: Previous passage | "),
            Span::raw("→/n: Next passage"),
        ]),
    };

    f.render_widget(Paragraph::new(vec![help]).block(Block::default()), rows[1]);
}
