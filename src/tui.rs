use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;
use std::path::Path;
use tracing::warn;

use crate::models::{ApplicationStatus, JobApplication, WorkType};
use crate::store::{ApplicationPatch, ApplicationStore};
use crate::view::{compute_visible_applications, paginate, FilterCriteria, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

/// What the browse screen shows. Everything visible is derived from the
/// store and the criteria through `refresh`.
pub struct BrowseState {
    store: ApplicationStore,
    criteria: FilterCriteria,
    mode: Mode,
    page: usize,
    per_page: usize,
    visible: Page<JobApplication>,
    selected: usize,
    // index into WorkType::ALL / ApplicationStatus::ALL that `w` / `s` toggle
    work_type_cursor: usize,
    status_cursor: usize,
    dirty: bool,
}

impl BrowseState {
    pub fn new(store: ApplicationStore, per_page: usize) -> Self {
        let mut state = Self {
            store,
            criteria: FilterCriteria::default(),
            mode: Mode::Browse,
            page: 1,
            per_page,
            visible: paginate(&[], 1, per_page),
            selected: 0,
            work_type_cursor: 0,
            status_cursor: 0,
            dirty: false,
        };
        state.refresh();
        state
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn visible(&self) -> &Page<JobApplication> {
        &self.visible
    }

    pub fn into_store(self) -> ApplicationStore {
        self.store
    }

    fn refresh(&mut self) {
        let ordered = compute_visible_applications(self.store.all(), &self.criteria);
        self.visible = paginate(&ordered, self.page, self.per_page);
        self.page = self.visible.page;
        if self.selected >= self.visible.items.len() {
            self.selected = self.visible.items.len().saturating_sub(1);
        }
    }

    fn current(&self) -> Option<&JobApplication> {
        self.visible.items.get(self.selected)
    }

    fn next(&mut self) {
        if self.selected + 1 < self.visible.items.len() {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn next_page(&mut self) {
        if self.page < self.visible.total_pages {
            self.page += 1;
            self.selected = 0;
            self.refresh();
        }
    }

    fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.selected = 0;
            self.refresh();
        }
    }

    // Search edits start over at the first page.
    fn push_search(&mut self, c: char) {
        self.criteria.search_text.push(c);
        self.page = 1;
        self.refresh();
    }

    fn pop_search(&mut self) {
        self.criteria.search_text.pop();
        self.page = 1;
        self.refresh();
    }

    fn work_type_under_cursor(&self) -> WorkType {
        WorkType::ALL[self.work_type_cursor % WorkType::ALL.len()].clone()
    }

    fn status_under_cursor(&self) -> ApplicationStatus {
        ApplicationStatus::ALL[self.status_cursor % ApplicationStatus::ALL.len()].clone()
    }

    fn next_work_type_cursor(&mut self) {
        self.work_type_cursor = (self.work_type_cursor + 1) % WorkType::ALL.len();
    }

    fn next_status_cursor(&mut self) {
        self.status_cursor = (self.status_cursor + 1) % ApplicationStatus::ALL.len();
    }

    /// Turns the work type under the cursor on or off.
    fn toggle_work_type(&mut self) {
        let work_type = self.work_type_under_cursor();
        if !self.criteria.work_types.remove(&work_type) {
            self.criteria.work_types.insert(work_type);
        }
        self.page = 1;
        self.refresh();
    }

    fn toggle_status(&mut self) {
        let status = self.status_under_cursor();
        if !self.criteria.statuses.remove(&status) {
            self.criteria.statuses.insert(status);
        }
        self.page = 1;
        self.refresh();
    }

    fn clear_filters(&mut self) {
        self.criteria.search_text.clear();
        self.criteria.work_types.clear();
        self.criteria.statuses.clear();
        self.page = 1;
        self.refresh();
    }

    fn cycle_sort(&mut self) {
        self.criteria.sort_key = self.criteria.sort_key.next();
        self.refresh();
    }

    fn reverse_sort(&mut self) {
        self.criteria.sort_direction = self.criteria.sort_direction.reversed();
        self.refresh();
    }

    fn set_status(&mut self, status: ApplicationStatus) {
        let Some(id) = self.current().map(|app| app.id.clone()) else { return };
        let patch = ApplicationPatch {
            status: Some(status),
            ..ApplicationPatch::default()
        };
        match self.store.update(&id, patch) {
            Ok(_) => self.dirty = true,
            Err(e) => warn!(%id, error = %e, "status change failed"),
        }
        self.refresh();
    }

    fn delete_current(&mut self) {
        let Some(id) = self.current().map(|app| app.id.clone()) else { return };
        match self.store.remove(&id) {
            Ok(_) => self.dirty = true,
            Err(e) => warn!(%id, error = %e, "delete failed"),
        }
        self.refresh();
    }

    /// Applies one key press. Returns `true` when the screen should close.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.mode == Mode::Search {
            match code {
                KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Backspace => self.pop_search(),
                KeyCode::Char(c) => self.push_search(c),
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.prev(),
            KeyCode::Char('n') | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('p') | KeyCode::PageUp => self.prev_page(),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('w') => self.toggle_work_type(),
            KeyCode::Char('W') => self.next_work_type_cursor(),
            KeyCode::Char('s') => self.toggle_status(),
            KeyCode::Char('S') => self.next_status_cursor(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('o') => self.cycle_sort(),
            KeyCode::Char('r') => self.reverse_sort(),
            KeyCode::Char('1') => self.set_status(ApplicationStatus::Applied),
            KeyCode::Char('2') => self.set_status(ApplicationStatus::Interview),
            KeyCode::Char('3') => self.set_status(ApplicationStatus::Rejected),
            KeyCode::Char('4') => self.set_status(ApplicationStatus::Offer),
            KeyCode::Char('D') => self.delete_current(),
            _ => {}
        }
        false
    }
}

pub fn run_browse(store: ApplicationStore, data_file: &Path, per_page: usize) -> Result<()> {
    let mut state = BrowseState::new(store, per_page);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result?;

    if state.dirty {
        state
            .into_store()
            .save(data_file)
            .with_context(|| format!("Failed to save changes to {}", data_file.display()))?;
    }
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut BrowseState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(if state.visible.items.is_empty() {
            None
        } else {
            Some(state.selected)
        });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if state.handle_key(key.code) {
                break;
            }
        }
    }
    Ok(())
}

fn status_style(status: &ApplicationStatus) -> Style {
    match status {
        ApplicationStatus::Applied => Style::default().fg(Color::Cyan),
        ApplicationStatus::Interview => Style::default().fg(Color::Yellow),
        ApplicationStatus::Rejected => Style::default().fg(Color::Red),
        ApplicationStatus::Offer => Style::default().fg(Color::Green),
        ApplicationStatus::Unrecognized(_) => Style::default().fg(Color::DarkGray),
    }
}

fn work_type_style(work_type: &WorkType) -> Style {
    match work_type {
        WorkType::Remote => Style::default().fg(Color::Magenta),
        WorkType::Hybrid => Style::default().fg(Color::Blue),
        WorkType::OnSite => Style::default().fg(Color::White),
        WorkType::Unrecognized(_) => Style::default().fg(Color::DarkGray),
    }
}

fn filter_summary(state: &BrowseState) -> String {
    let criteria = &state.criteria;
    fn join(labels: Vec<&str>) -> String {
        if labels.is_empty() {
            "all".to_string()
        } else {
            labels.join(",")
        }
    }
    format!(
        " search: '{}'  work: {} [w:{}]  status: {} [s:{}]  sort: {} {} ",
        criteria.search_text,
        join(criteria.work_types.iter().map(|w| w.label()).collect()),
        state.work_type_under_cursor(),
        join(criteria.statuses.iter().map(|s| s.label()).collect()),
        state.status_under_cursor(),
        criteria.sort_key,
        criteria.sort_direction,
    )
}

fn draw(frame: &mut Frame, state: &BrowseState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Filter bar
    let bar_style = if state.mode == Mode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let bar = Paragraph::new(filter_summary(state))
        .style(bar_style)
        .block(Block::default().borders(Borders::ALL).title(" Filters "));
    frame.render_widget(bar, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // Left panel: visible applications
    let items: Vec<ListItem> = state
        .visible
        .items
        .iter()
        .map(|app| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<10} ", truncate(&app.date_applied, 10))),
                Span::raw(format!("{:<20} ", truncate(&app.company, 20))),
                Span::styled(format!("{:<9}", app.status.label()), status_style(&app.status)),
            ]))
        })
        .collect();

    let page = &state.visible;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Applications ({}) page {}/{} ",
            page.total_items, page.page, page.total_pages
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, chunks[1]);

    let help = if state.mode == Mode::Search {
        " type to search  backspace:delete  enter/esc:done"
    } else {
        " j/k:move n/p:page /:search w/s:toggle W/S:next value c:clear o:sort r:reverse 1-4:set status D:delete q:quit"
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn build_detail(state: &BrowseState) -> Text<'_> {
    let Some(app) = state.current() else {
        return Text::raw("No applications match");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        app.position.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company)));
    lines.push(Line::from(""));

    let applied = match app.applied_on() {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => format!("{} (unreadable)", app.date_applied),
    };
    lines.push(Line::from(format!("Applied:   {}", applied)));
    lines.push(Line::from(vec![
        Span::raw("Work type: "),
        Span::styled(app.work_type.label(), work_type_style(&app.work_type)),
    ]));
    lines.push(Line::from(vec![
        Span::raw("Status:    "),
        Span::styled(app.status.label(), status_style(&app.status)),
    ]));
    lines.push(Line::from(Span::styled(
        format!("ID:        {}", app.id),
        Style::default().fg(Color::DarkGray),
    )));

    if let Some(notes) = &app.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(notes, 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{SortDirection, SortKey};

    fn state() -> BrowseState {
        BrowseState::new(ApplicationStore::seed_demo(), 2)
    }

    fn visible_ids(state: &BrowseState) -> Vec<String> {
        state.visible().items.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn search_keys_filter_and_reset_page() {
        let mut state = state();
        state.handle_key(KeyCode::Char('n'));
        assert_eq!(state.visible().page, 2);

        state.handle_key(KeyCode::Char('/'));
        for c in "DEV".chars() {
            state.handle_key(KeyCode::Char(c));
        }
        state.handle_key(KeyCode::Enter);

        assert_eq!(state.criteria().search_text, "DEV");
        assert_eq!(state.visible().page, 1);
        // "Frontend Developer" (05-15) then "Backend Developer" (05-01)
        assert_eq!(visible_ids(&state), ["1", "4"]);
        // 'q' typed while not searching quits
        assert!(state.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn filter_and_sort_keys_rebuild_criteria() {
        let mut state = state();
        state.handle_key(KeyCode::Char('w'));
        assert!(state.criteria().work_types.contains(&WorkType::Remote));
        assert_eq!(state.visible().total_items, 2);

        state.handle_key(KeyCode::Char('o'));
        state.handle_key(KeyCode::Char('r'));
        assert_eq!(state.criteria().sort_key, SortKey::Company);
        assert_eq!(state.criteria().sort_direction, SortDirection::Ascending);
        assert_eq!(visible_ids(&state), ["4", "1"]);

        state.handle_key(KeyCode::Char('c'));
        assert_eq!(state.visible().total_items, 5);
    }

    #[test]
    fn any_single_filter_value_is_reachable() {
        let mut state = state();
        // move the status cursor to Offer and switch it on alone
        for _ in 0..3 {
            state.handle_key(KeyCode::Char('S'));
        }
        state.handle_key(KeyCode::Char('s'));
        assert_eq!(
            state.criteria().statuses.iter().cloned().collect::<Vec<_>>(),
            [ApplicationStatus::Offer]
        );
        assert_eq!(visible_ids(&state), ["4"]);

        // pressing again switches it back off
        state.handle_key(KeyCode::Char('s'));
        assert!(state.criteria().statuses.is_empty());

        for _ in 0..2 {
            state.handle_key(KeyCode::Char('W'));
        }
        state.handle_key(KeyCode::Char('w'));
        assert_eq!(
            state.criteria().work_types.iter().cloned().collect::<Vec<_>>(),
            [WorkType::OnSite]
        );
        assert_eq!(visible_ids(&state), ["3"]);
    }

    #[test]
    fn status_and_delete_keys_edit_the_store() {
        let mut state = state();
        // newest first: id 1 is selected
        state.handle_key(KeyCode::Char('4'));
        assert!(state.dirty);
        state.handle_key(KeyCode::Char('D'));

        let store = state.into_store();
        assert_eq!(store.len(), 4);
        assert!(store.get("1").is_none());
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Tech Solutions Inc.", 10), "Tech So...");
        assert_eq!(truncate("Acme", 10), "Acme");
    }
}
