mod help;
mod state;

use crate::backend::BackendClient;
use crate::cli::Cli;
use crate::model::{AnalysisResult, Phase, WorkflowEvent};
use crate::orchestrator::{self, UiCommand};
use crate::text_summary::format_amount;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub async fn run(args: Cli, client: BackendClient) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_args = args.clone();
    let config = client.config().clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_args, config, event_rx, cmd_tx));

    let res = orchestrator::run_controller(client, event_tx, cmd_rx).await;

    let joined = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    ui_thread_outcome(joined)?;

    res
}

type UiJoin = std::result::Result<std::thread::Result<Result<()>>, tokio::task::JoinError>;

/// Flatten the nested join of the UI thread into one error.
fn ui_thread_outcome(joined: UiJoin) -> Result<()> {
    match joined.context("join TUI thread")? {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("TUI thread panicked")),
    }
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    args: Cli,
    config: crate::model::AnalysisConfig,
    mut event_rx: UnboundedReceiver<WorkflowEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let export_dir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let mut state = UiState::new(config, args.export_json.clone(), export_dir);
    // UiState is owned by the UI thread only; no cross-thread mutation.
    state.workflow.set_sector(args.sector);
    state.workflow.set_language(args.lang);
    if let Some(path) = args.file.as_deref() {
        state.load_file(path);
    }

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(k) {
                    Some(UiCommand::Quit) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    Some(cmd) => {
                        if cmd_tx.send(cmd).is_err() {
                            break Err(anyhow::anyhow!("request controller stopped"));
                        }
                    }
                    None => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "SME Financial Navigator",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            state.config.api_url.clone(),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if state.show_help {
        help::draw_help(chunks[1], f, &state.sample_url());
    } else {
        match (state.workflow.phase(), state.workflow.outcome().result()) {
            (Phase::ViewingResult, Some(result)) => draw_results(chunks[1], f, state, result),
            _ => draw_assessment(chunks[1], f, state),
        }
    }

    let status = Paragraph::new(state.info.clone())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);

    f.render_widget(Paragraph::new(footer_line(state)), chunks[3]);
}

fn footer_line(state: &UiState) -> Line<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Magenta));
    if state.path_input.is_some() {
        return Line::from(vec![
            key("Enter"),
            Span::raw(" load  "),
            key("Esc"),
            Span::raw(" cancel"),
        ]);
    }
    match state.workflow.phase() {
        Phase::ViewingResult => Line::from(vec![
            key("n"),
            Span::raw(" new audit  "),
            key("e"),
            Span::raw(" export JSON  "),
            key("?"),
            Span::raw(" help  "),
            key("q"),
            Span::raw(" quit"),
        ]),
        _ => Line::from(vec![
            key("o"),
            Span::raw(" file  "),
            key("←/→"),
            Span::raw(" sector  "),
            key("l"),
            Span::raw(" language  "),
            key("Enter"),
            Span::raw(" analyse  "),
            key("n"),
            Span::raw(" new audit  "),
            key("?"),
            Span::raw(" help  "),
            key("q"),
            Span::raw(" quit"),
        ]),
    }
}

fn draw_assessment(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let selection = state.workflow.selection();
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Business Sector:    ", label),
            Span::raw("◀ "),
            Span::styled(selection.sector.label(), value),
            Span::raw(" ▶"),
        ]),
        Line::from(vec![
            Span::styled("Preferred Language: ", label),
            Span::styled(selection.language.label(), value),
        ]),
        Line::from(""),
    ];

    match (&selection.file, state.path_input.as_deref()) {
        (_, Some(input)) => lines.push(Line::from(vec![
            Span::styled("Path: ", label),
            Span::raw(input.to_string()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])),
        (Some(file), None) => lines.push(Line::from(vec![
            Span::styled("Statement: ", label),
            Span::styled(file.name.clone(), Style::default().fg(Color::Green)),
            Span::styled(format!("  ({} bytes)", file.size_bytes()), label),
        ])),
        (None, None) => lines.push(Line::from(vec![
            Span::styled("Statement: ", label),
            Span::raw("none selected, press "),
            Span::styled("o", Style::default().fg(Color::Magenta)),
            Span::raw(" to choose a .csv or .xlsx file"),
        ])),
    }
    lines.push(Line::from(""));

    if state.workflow.is_submitting() {
        let spin = SPINNER[state.tick % SPINNER.len()];
        let waited = state
            .submitted_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("{spin} Performing AI Audit... ({waited}s)"),
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::raw("Press "),
            Span::styled("Enter", Style::default().fg(Color::Magenta)),
            Span::raw(" to Start Assessment"),
        ]));
    }

    if let Some(err) = state.workflow.outcome().error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("⚠ {}", err.message()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Need a template? Download Industry Sample CSV: ", label),
        Span::styled(state.sample_url(), Style::default().fg(Color::Cyan)),
    ]));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Financial Health Assessment"),
        );
    f.render_widget(p, area);
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState, result: &AnalysisResult) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(area);

    let m = &result.metrics;
    let b = &m.benchmarking;
    let label = Style::default().fg(Color::Gray);
    let profit_color = if m.net_profit < 0.0 {
        Color::Red
    } else {
        Color::Green
    };

    let metrics = vec![
        Line::from(vec![
            Span::styled("Annual Revenue      ", label),
            Span::styled(
                format!("${}", format_amount(m.total_revenue)),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Operating Expenses  ", label),
            Span::styled(
                format!("${}", format_amount(m.total_expenses)),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Net Profit          ", label),
            Span::styled(
                format!("${}", format_amount(m.net_profit)),
                Style::default().fg(profit_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Efficiency Rating   ", label),
            Span::styled(
                b.status.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(
            "Your margin of {} is compared against the {} benchmark ({}).",
            b.current, b.industry, b.industry_avg
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("File: ", label),
            Span::raw(
                result
                    .filename
                    .clone()
                    .or_else(|| state.workflow.selection().file_name().map(str::to_string))
                    .unwrap_or_else(|| "-".into()),
            ),
        ]),
    ];
    let p = Paragraph::new(metrics)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Performance Metrics"),
        );
    f.render_widget(p, cols[0]);

    let mut advisory = vec![
        Line::from(Span::styled(
            result.multilingual_summary.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Recommendation", label)),
        Line::from(result.recommendation.clone()),
    ];
    if !m.alerts.is_empty() {
        advisory.push(Line::from(""));
        advisory.push(Line::from(Span::styled(
            "Alerts",
            Style::default().fg(Color::Red),
        )));
        advisory.extend(m.alerts.iter().map(|a| Line::from(format!("• {a}"))));
    }
    let p = Paragraph::new(advisory)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("AI Advisory"));
    f.render_widget(p, cols[1]);
}
