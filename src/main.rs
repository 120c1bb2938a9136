use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use rider_terminal::state::{
    apply_delta, AppState, BoardView, Delta, MissionSession, ProviderCommand,
};
use rider_terminal::{refresh, sample_feed};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if self.cmd_tx.send(ProviderCommand::Refresh).is_err() {
                    self.state.push_log("[WARN] Refresh request failed");
                } else {
                    self.state.push_log("[INFO] Refresh requested");
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => self.state.toggle_view(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = std::env::var("BOARD_SOURCE").unwrap_or_default().to_lowercase();
    if source == "sample" {
        sample_feed::spawn_sample_provider(tx, cmd_rx);
    } else {
        refresh::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(5),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_goals(frame, chunks[1], &app.state);
    render_mission(frame, chunks[2], &app.state);
    render_leaderboard(frame, chunks[3], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[5]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let updated = state
        .board
        .as_ref()
        .map(|b| b.updated_at.as_str())
        .unwrap_or("-");
    let view = match state.view {
        BoardView::Top => "TOP 10",
        BoardView::Full => "ALL",
    };
    format!("RIDER BOARD | {view} | 마지막 업데이트: {updated}")
}

fn footer_text(state: &AppState) -> String {
    let view = match state.view {
        BoardView::Top => "a All",
        BoardView::Full => "a Top 10",
    };
    format!("r Refresh | {view} | j/k/↑/↓ Scroll | ? Help | q Quit")
}

fn render_goals(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("오늘의 목표").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(board) = &state.board else {
        frame.render_widget(waiting_paragraph(), inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(20); 5])
        .split(inner);

    let goals = &board.goals;
    let stats = &board.stats;
    render_goal_gauge(frame, cols[0], "총 완료", stats.total_done, goals.total);
    render_goal_gauge(frame, cols[1], "아점", stats.segments.morning, goals.segments.morning);
    render_goal_gauge(frame, cols[2], "오후", stats.segments.afternoon, goals.segments.afternoon);
    render_goal_gauge(frame, cols[3], "저녁", stats.segments.evening, goals.segments.evening);
    render_goal_gauge(frame, cols[4], "심야", stats.segments.night, goals.segments.night);
}

fn render_goal_gauge(frame: &mut Frame, area: Rect, label: &str, current: u32, goal: u32) {
    let ratio = if goal == 0 {
        0.0
    } else {
        (f64::from(current) / f64::from(goal)).clamp(0.0, 1.0)
    };
    let color = if ratio >= 1.0 {
        Color::Green
    } else if ratio >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .block(Block::default().title(label.to_string()))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(format!("{current}/{goal}"));
    frame.render_widget(gauge, area);
}

fn render_mission(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("오늘의 미션").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(board) = &state.board else {
        frame.render_widget(waiting_paragraph(), inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    render_session(frame, cols[0], &board.mission.morning);
    render_session(frame, cols[1], &board.mission.afternoon);
}

fn render_session(frame: &mut Frame, area: Rect, session: &MissionSession) {
    let mut lines = vec![
        format!("■ {}", session.title),
        session.window.clone(),
    ];
    for stage in &session.stages {
        lines.push(format!(
            "{}  그룹 {}  개인 {}  보상 {}",
            stage.label,
            stage.team_target,
            stage.personal_target,
            format_won(stage.reward_won)
        ));
    }
    frame.render_widget(Paragraph::new(lines.join("\n")), area);
}

fn render_leaderboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.view {
        BoardView::Top => "배달 완료 순위 (상위 10명)",
        BoardView::Full => "배달 완료 순위 (전체)",
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.board.is_none() {
        frame.render_widget(waiting_paragraph(), inner);
        return;
    }

    let riders = state.visible_riders();
    if riders.is_empty() {
        let empty = Paragraph::new("No riders in this snapshot")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = board_columns();
    render_board_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if list_area.height == 0 {
        return;
    }
    let visible = list_area.height as usize;
    let max_start = riders.len().saturating_sub(visible);
    let start = (state.scroll as usize).min(max_start);
    let end = (start + visible).min(riders.len());

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let rider = &riders[idx];
        let status_style = if rider.is_active() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        render_cell_text(frame, cols[0], &rank_label(idx), Style::default());
        render_cell_text(frame, cols[1], &rider.name, Style::default());
        render_cell_text(frame, cols[2], &rider.status, status_style);
        render_cell_text(frame, cols[3], &rider.completed.to_string(), Style::default());
        render_cell_text(frame, cols[4], &rider.rejected.to_string(), Style::default());
        render_cell_text(frame, cols[5], &rider.dispatch_cancelled.to_string(), Style::default());
        render_cell_text(frame, cols[6], &rider.rider_fault.to_string(), Style::default());
        render_cell_text(frame, cols[7], &rider.segments.morning.to_string(), Style::default());
        render_cell_text(frame, cols[8], &rider.segments.afternoon.to_string(), Style::default());
        render_cell_text(frame, cols[9], &rider.segments.evening.to_string(), Style::default());
        render_cell_text(frame, cols[10], &rider.segments.night.to_string(), Style::default());
    }
}

fn board_columns() -> [Constraint; 11] {
    [
        Constraint::Length(5),
        Constraint::Min(10),
        Constraint::Length(9),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ]
}

fn render_board_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "순위", style);
    render_cell_text(frame, cols[1], "라이더", style);
    render_cell_text(frame, cols[2], "운행상태", style);
    render_cell_text(frame, cols[3], "완료", style);
    render_cell_text(frame, cols[4], "거절", style);
    render_cell_text(frame, cols[5], "배차취소", style);
    render_cell_text(frame, cols[6], "라이더귀책", style);
    render_cell_text(frame, cols[7], "아점", style);
    render_cell_text(frame, cols[8], "오후", style);
    render_cell_text(frame, cols[9], "저녁", style);
    render_cell_text(frame, cols[10], "심야", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn rank_label(idx: usize) -> String {
    match idx {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        _ => (idx + 1).to_string(),
    }
}

fn format_won(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('원');
    out
}

fn waiting_paragraph() -> Paragraph<'static> {
    Paragraph::new("Waiting for first snapshot...").style(Style::default().fg(Color::DarkGray))
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Rider Board - Help",
        "",
        "  r            Refresh now",
        "  a            Toggle top 10 / all riders",
        "  j/k or ↑/↓   Scroll",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
