use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use dayplan::date::{format_localized, to_iso_date};
use dayplan::grid::{weeks, DayCell, WEEKDAY_HEADERS};
use dayplan::logging;
use dayplan::model::Task;
use dayplan::storage::{FileStore, StoreLocation};
use dayplan::view::Planner;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(planner: Planner<FileStore>, location: StoreLocation) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    planner: Planner<FileStore>,
    location: StoreLocation,
    focus: Focus,
    pending_idx: usize,
    done_idx: usize,
    agenda_idx: usize,
    /// Last write-through that reached the backend this session.
    last_save: Option<Instant>,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Creating(TaskForm),
    ConfirmDelete { task_id: String },
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Calendar,
    Pending,
    Done,
    Agenda,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Calendar => Focus::Agenda,
            Focus::Agenda => Focus::Pending,
            Focus::Pending => Focus::Done,
            Focus::Done => Focus::Calendar,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Calendar => Focus::Done,
            Focus::Agenda => Focus::Calendar,
            Focus::Pending => Focus::Agenda,
            Focus::Done => Focus::Pending,
        }
    }
}

struct TaskForm {
    title: FieldValue,
    date: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Date,
}

impl TaskForm {
    fn new(date: &str) -> Self {
        TaskForm {
            title: FieldValue::new(""),
            date: FieldValue::new(date),
            field: FormField::Title,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Date,
            FormField::Date => FormField::Title,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Date => &mut self.date,
        }
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(planner: Planner<FileStore>, location: StoreLocation) -> Self {
        let status = format!(
            "Loaded {} task(s) from {}",
            planner.store().len(),
            location.dir.display()
        );
        App {
            planner,
            location,
            focus: Focus::Calendar,
            pending_idx: 0,
            done_idx: 0,
            agenda_idx: 0,
            last_save: None,
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) => {
                self.handle_form_key(key);
                false
            }
            Mode::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('[') => self.planner.go_to_prev_month(),
            KeyCode::Char(']') => self.planner.go_to_next_month(),
            KeyCode::Char('t') => {
                self.planner.reset_to_today();
                self.status = "Back to today".into();
            }
            KeyCode::Char('n') => {
                let date = to_iso_date(self.planner.state().selected_date);
                self.mode = Mode::Creating(TaskForm::new(&date));
                self.status = "New task (Tab switch field, Enter save, Esc cancel)".into();
            }
            KeyCode::Char('d') => match self.focused_task() {
                Some(task) => {
                    self.status = format!("Delete {}? (y to confirm, n/Esc to cancel)", task.id);
                    self.mode = Mode::ConfirmDelete { task_id: task.id };
                }
                None => self.status = "No task selected to delete".into(),
            },
            KeyCode::Char(' ') | KeyCode::Char('x') => match self.focused_task() {
                Some(task) => {
                    self.planner.toggle_done(&task.id);
                    self.saved(format!(
                        "{} marked {}",
                        task.title,
                        if task.done { "pending" } else { "done" }
                    ));
                }
                None => self.status = "No task selected".into(),
            },
            _ => match self.focus {
                Focus::Calendar => self.handle_calendar_key(key),
                _ => self.handle_list_key(key),
            },
        }
        self.clamp_indices();
        false
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(7),
            KeyCode::Enter => {
                self.agenda_idx = 0;
                self.focus = Focus::Agenda;
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let idx = match self.focus {
            Focus::Pending => &mut self.pending_idx,
            Focus::Done => &mut self.done_idx,
            Focus::Agenda => &mut self.agenda_idx,
            Focus::Calendar => return,
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => *idx = idx.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *idx += 1,
            _ => {}
        }
    }

    /// Moves the selection to another visible cell of the grid, like a click.
    fn move_selection(&mut self, delta: isize) {
        let cells = &self.planner.snapshot().calendar.cells;
        if cells.is_empty() {
            return;
        }
        let current = cells
            .iter()
            .position(|c| c.is_selected)
            .or_else(|| cells.iter().position(|c| c.is_today))
            .or_else(|| cells.iter().position(|c| !c.is_overflow))
            .unwrap_or(0);
        let target = (current as isize + delta).clamp(0, cells.len() as isize - 1) as usize;
        let date = cells[target].date;
        self.planner.select_date(date);
        self.agenda_idx = 0;
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut close_form = false;
        if let Mode::Creating(form) = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
                KeyCode::Left => form.active_field_mut().move_left(),
                KeyCode::Right => form.active_field_mut().move_right(),
                KeyCode::Backspace => form.active_field_mut().backspace(),
                KeyCode::Enter => close_form = self.submit(form),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        form.active_field_mut().insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close_form { Mode::Normal } else { mode };
    }

    fn submit(&mut self, form: &TaskForm) -> bool {
        match self.planner.submit(&form.title.value, &form.date.value) {
            Some(task) => {
                self.focus = Focus::Agenda;
                self.agenda_idx = 0;
                self.saved(format!(
                    "Created {} on {}",
                    task.id,
                    format_localized(&task.iso_date())
                ));
                true
            }
            None => {
                self.status = "A title and a YYYY-MM-DD date are required".into();
                false
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let task_id = match &self.mode {
            Mode::ConfirmDelete { task_id } => task_id.clone(),
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.planner.delete(&task_id);
                self.saved(format!("Deleted {}", task_id));
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        self.clamp_indices();
    }

    fn saved(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.planner.store().has_unsaved_changes() {
            self.status = format!("{} (not saved, see {})", message, logging::LOG_FILE);
        } else {
            self.last_save = Some(Instant::now());
            self.status = message;
        }
    }

    fn focused_task(&self) -> Option<Task> {
        let view = self.planner.snapshot();
        let (tasks, idx) = match self.focus {
            Focus::Pending => (&view.lists.pending, self.pending_idx),
            Focus::Done => (&view.lists.done, self.done_idx),
            Focus::Agenda => (&view.agenda.tasks, self.agenda_idx),
            Focus::Calendar => return None,
        };
        tasks.get(idx).cloned()
    }

    fn clamp_indices(&mut self) {
        let view = self.planner.snapshot();
        self.pending_idx = self
            .pending_idx
            .min(view.lists.pending.len().saturating_sub(1));
        self.done_idx = self.done_idx.min(view.lists.done.len().saturating_sub(1));
        self.agenda_idx = self
            .agenda_idx
            .min(view.agenda.tasks.len().saturating_sub(1));
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(layout[1]);
        let lists = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(3)])
            .split(columns[1]);

        let view = self.planner.snapshot();
        self.draw_task_list(
            f,
            lists[0],
            "Pending",
            &view.lists.pending,
            Focus::Pending,
            self.pending_idx,
        );
        self.draw_task_list(
            f,
            lists[1],
            "Done",
            &view.lists.done,
            Focus::Done,
            self.done_idx,
        );
        self.draw_calendar(f, right[0]);
        self.draw_agenda(f, right[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Creating(form) => self.draw_form(f, form),
            Mode::ConfirmDelete { task_id } => self.draw_confirm(f, task_id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "dayplan ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.planner.snapshot().calendar.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            save_span(
                self.last_save.map(|at| at.elapsed()),
                self.planner.store().has_unsaved_changes(),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_task_list(
        &self,
        f: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        tasks: &[Task],
        focus: Focus,
        selected_idx: usize,
    ) {
        let focused = self.focus == focus;
        let mut state = ListState::default();
        if focused && !tasks.is_empty() {
            state.select(Some(selected_idx.min(tasks.len() - 1)));
        }
        let items = if tasks.is_empty() {
            vec![ListItem::new("No tasks")]
        } else {
            tasks.iter().map(task_list_item).collect()
        };
        let list = List::new(items)
            .block(pane_block(format!("{} ({})", title, tasks.len()), focused))
            .highlight_style(highlight_style());
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Calendar;
        let calendar = &self.planner.snapshot().calendar;
        let mut lines = Vec::new();
        lines.push(Line::from(
            WEEKDAY_HEADERS
                .iter()
                .map(|h| Span::styled(format!("{:^5}", h), Style::default().fg(Color::Gray)))
                .collect::<Vec<_>>(),
        ));
        for week in weeks(&calendar.cells) {
            lines.push(Line::from(
                week.iter().map(|c| day_span(c, focused)).collect::<Vec<_>>(),
            ));
        }
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(pane_block(calendar.label.clone(), focused));
        f.render_widget(paragraph, area);
    }

    fn draw_agenda(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Agenda;
        let agenda = &self.planner.snapshot().agenda;
        let mut state = ListState::default();
        let items = if agenda.tasks.is_empty() {
            vec![ListItem::new("No plans for this day ✨")]
        } else {
            if focused {
                state.select(Some(self.agenda_idx.min(agenda.tasks.len() - 1)));
            }
            agenda
                .tasks
                .iter()
                .map(|t| {
                    let (icon, style) = if t.done {
                        (
                            "✅",
                            Style::default()
                                .fg(Color::DarkGray)
                                .add_modifier(Modifier::CROSSED_OUT),
                        )
                    } else {
                        ("🕒", Style::default().fg(Color::White))
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{} ", icon)),
                        Span::styled(t.title.clone(), style),
                    ]))
                })
                .collect()
        };
        let list = List::new(items)
            .block(pane_block(format!("Plans for {}", agenda.label), focused))
            .highlight_style(highlight_style());
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" focus  "),
            Span::styled("←↑↓→ / h j k l", Style::default().fg(Color::LightCyan)),
            Span::raw(" move  "),
            Span::styled("[ ]", Style::default().fg(Color::LightCyan)),
            Span::raw(" month  "),
            Span::styled("t", Style::default().fg(Color::LightYellow)),
            Span::raw(" today  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" new  "),
            Span::styled("space", Style::default().fg(Color::LightGreen)),
            Span::raw(" done/undo  "),
            Span::styled("d", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm) {
        let area = centered_rect(60, 30, f.size());
        let fields = vec![
            field_line("Title", &form.title, form.field == FormField::Title),
            field_line("Date (YYYY-MM-DD)", &form.date, form.field == FormField::Date),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel • Tab to switch field",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        "New Task",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, task_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .planner
            .store()
            .get(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(if focused { Color::Cyan } else { Color::Gray })
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
}

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::LightCyan)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn day_span(cell: &DayCell, focused: bool) -> Span<'static> {
    let dot = if cell.has_tasks { '•' } else { ' ' };
    let text = format!(" {:>2}{} ", cell.day_number, dot);
    let mut style = Style::default().fg(if cell.is_overflow {
        Color::DarkGray
    } else if cell.has_tasks {
        Color::LightYellow
    } else {
        Color::Gray
    });
    if cell.is_today {
        style = style
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if cell.is_selected {
        style = style
            .bg(if focused { Color::Cyan } else { Color::Blue })
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);
    }
    Span::styled(text, style)
}

fn task_list_item(task: &Task) -> ListItem<'static> {
    let title_style = if task.done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };
    ListItem::new(Line::from(vec![
        Span::styled(truncate_text(&task.title, 40), title_style),
        Span::raw("  "),
        Span::styled(
            format!("📌 {}", format_localized(&task.iso_date())),
            Style::default().fg(Color::LightYellow),
        ),
    ]))
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn prev_char(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn save_span(since_save: Option<Duration>, unsaved: bool) -> Span<'static> {
    match (unsaved, since_save) {
        (true, _) => Span::styled(
            "unsaved changes",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        (false, Some(elapsed)) => Span::styled(
            format!("saved {}", format_elapsed(elapsed)),
            Style::default().fg(Color::Gray),
        ),
        (false, None) => Span::styled("no changes yet", Style::default().fg(Color::Gray)),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_edits_respect_multibyte_chars() {
        let mut field = FieldValue::new("añ");
        field.move_left();
        assert_eq!(field.cursor, 1);
        field.insert_char('x');
        assert_eq!(field.value, "axñ");
        field.move_right();
        field.backspace();
        assert_eq!(field.value, "ax");
        assert_eq!(field.with_caret(), "ax▌");
    }

    #[test]
    fn truncation_keeps_short_titles() {
        assert_eq!(truncate_text("Dentist", 40), "Dentist");
        assert_eq!(truncate_text("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn focus_cycle_visits_every_pane() {
        let mut focus = Focus::Calendar;
        let mut seen = Vec::new();
        for _ in 0..4 {
            focus = focus.next();
            seen.push(focus);
        }
        assert!(seen.contains(&Focus::Pending));
        assert!(seen.contains(&Focus::Done));
        assert!(seen.contains(&Focus::Agenda));
        assert!(focus == Focus::Calendar);
        assert!(focus.next().prev() == Focus::Calendar);
    }

    #[test]
    fn save_indicator_follows_the_write_result() {
        assert_eq!(save_span(None, false).content, "no changes yet");
        assert_eq!(
            save_span(Some(Duration::from_secs(90)), false).content,
            "saved 1m ago"
        );
        assert_eq!(
            save_span(Some(Duration::from_secs(5)), true).content,
            "unsaved changes"
        );
        assert_eq!(save_span(None, true).content, "unsaved changes");
    }
}
