use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, sample_url: &str) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("?", 11, "Show or hide this help"),
        Line::from(""),
        Line::from("Assessment:"),
        key_line("o", 11, "Choose a statement file (.csv or .xlsx)"),
        key_line("x", 11, "Change file (clear the selection)"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("←/→", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("s/S", Style::default().fg(Color::Magenta)),
            Span::raw("  Business sector"),
        ]),
        key_line("l", 11, "Toggle summary language"),
        key_line("Enter", 7, "Start assessment"),
        key_line("n", 11, "New audit (reset file, sector, language)"),
        Line::from(""),
        Line::from("Results:"),
        key_line("e", 11, "Export audit record as JSON"),
        Line::from(""),
        Line::from(vec![
            Span::raw("Sample statement: "),
            Span::styled(sample_url.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
