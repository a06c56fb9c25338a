use {
    crate::{
        dashboard::Dashboard,
        profile::REQUIRED_ATTRIBUTES,
        simulation::{Phase, SimulationState},
        ui::renderer::{
            format_bar, format_bucket_label, format_factor_name, format_probability, format_timestamp,
            format_weight,
        },
    },
    ratatui::{
        layout::{Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Table},
        Frame,
    },
};

/// What one frame shows
pub struct View<'a> {
    pub simulation: &'a SimulationState,
    pub dashboard: &'a Dashboard,
    /// Index into `REQUIRED_ATTRIBUTES` of the field being edited
    pub selected: usize,
}

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, view: &View) {
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer/KPIs
        ])
        .split(area);

    render_header(f, chunks[0]);

    let body = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_profile_form(f, body[0], view);

    let right = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(body[1]);

    render_risk_panel(f, right[0], view.simulation);
    render_bucket_table(f, right[1], view.dashboard);

    render_footer(f, chunks[2], view.dashboard);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Block::default().borders(Borders::ALL).title("churnscope - Churn Risk Dashboard");

    let text = vec![Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" field  "),
        Span::styled("←/→", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" adjust  "),
        Span::styled("g", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" group  "),
        Span::styled("s", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" sort  "),
        Span::styled("r", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" reset  "),
        Span::styled("q", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ])];

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_profile_form(f: &mut Frame, area: Rect, view: &View) {
    // borders take two rows; keep the selected field on screen
    let visible = area.height.saturating_sub(3).max(1) as usize;
    let offset = view.selected.saturating_sub(visible - 1);

    let header = Row::new(vec!["Attribute", "Value"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = REQUIRED_ATTRIBUTES
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, attr)| {
            let value = view
                .simulation
                .input
                .get(attr)
                .map(|v| v.label())
                .unwrap_or_else(|| "(missing)".to_string());

            let style = if i == view.selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if view.simulation.input.contains(attr) {
                Style::default()
            } else {
                Style::default().fg(Color::Red)
            };

            Row::new(vec![attr.to_string(), value]).style(style)
        })
        .collect();

    let widths = [Constraint::Length(18), Constraint::Min(10)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Customer Profile"));

    f.render_widget(table, area);
}

fn render_risk_panel(f: &mut Frame, area: Rect, state: &SimulationState) {
    let mut lines = Vec::new();

    match &state.accepted_result {
        Some(result) => {
            let color = if result.outcome.is_high_risk() { Color::Red } else { Color::Green };
            lines.push(Line::from(vec![
                Span::styled(
                    format_probability(result.outcome.probability),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" churn probability  "),
                Span::styled(result.outcome.risk_label(), Style::default().fg(color)),
                Span::raw(format!("  (gen {} @ {})", result.generation, format_timestamp(&result.received_at))),
            ]));
            for factor in &result.factors {
                let color = if factor.weight >= 0.0 { Color::Red } else { Color::Green };
                lines.push(Line::from(vec![
                    Span::styled(format!("{:>8} ", format_weight(factor.weight)), Style::default().fg(color)),
                    Span::raw(format_factor_name(&factor.name)),
                ]));
            }
        }
        None if state.phase == Phase::PendingFirstLoad => {
            lines.push(Line::from(Span::styled("Scoring profile...", Style::default().fg(Color::Yellow))));
        }
        None => {
            lines.push(Line::from(Span::styled("No score yet", Style::default().fg(Color::Gray))));
        }
    }

    if let Some(failure) = &state.last_error {
        lines.push(Line::from(Span::styled(
            format!("Error (gen {}): {}", failure.generation, failure.error),
            Style::default().fg(Color::Red),
        )));
    }

    let title = match state.pending_generation {
        Some(generation) => format!("Risk Profile [{} · updating gen {}]", state.phase.as_str(), generation),
        None => format!("Risk Profile [{}]", state.phase.as_str()),
    };

    let panel = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Paragraph::new(lines).block(panel), area);
}

fn render_bucket_table(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let header = Row::new(vec!["Group", "Total", "Churned", "Rate", ""])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = dashboard
        .buckets()
        .iter()
        .map(|bucket| {
            Row::new(vec![
                format_bucket_label(&bucket.key),
                bucket.total.to_string(),
                bucket.positive.to_string(),
                format_probability(bucket.rate()),
                format_bar(bucket.rate(), 20),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(26), // Group
        Constraint::Length(7),  // Total
        Constraint::Length(8),  // Churned
        Constraint::Length(7),  // Rate
        Constraint::Min(10),    // Bar
    ];

    let title = format!(
        "Churn by {} (sort: {})",
        dashboard.spec().group_key,
        dashboard.sort_policy().as_str()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let summary = dashboard.summary();

    let mut spans = vec![
        Span::styled("Customers: ", Style::default().fg(Color::Cyan)),
        Span::raw(summary.total.to_string()),
        Span::raw(" | "),
        Span::styled("Churn rate: ", Style::default().fg(Color::Cyan)),
        Span::raw(format_probability(summary.rate())),
        Span::raw(" | "),
        Span::styled("Avg tenure: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:.1} mo", summary.mean_tenure)),
        Span::raw(" | "),
        Span::styled("Avg monthly: ", Style::default().fg(Color::Cyan)),
        Span::raw(format!("${:.2}", summary.mean_monthly_charges)),
    ];

    for bucket in dashboard.tenure_by_outcome() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Tenure (churn={}): ", bucket.key),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw(format!("{:.1}", bucket.mean())));
    }

    let footer = Block::default().borders(Borders::ALL).title("Dataset");
    f.render_widget(Paragraph::new(Line::from(spans)).block(footer), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile;
    use crate::record::ObservationRecord;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_layout_draws_every_panel() {
        let dashboard = Dashboard::new(vec![
            ObservationRecord::new().with("Contract", "Two year").with("Churn", "No"),
            ObservationRecord::new().with("Contract", "Month-to-month").with("Churn", "Yes"),
        ]);
        let simulation = SimulationState::new(profile::default_profile());
        let view = View {
            simulation: &simulation,
            dashboard: &dashboard,
            selected: 0,
        };

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_layout(f, area, &view);
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Customer Profile"));
        assert!(text.contains("No score yet"));
        assert!(text.contains("Churn by Contract"));
        assert!(text.contains("Customers: 2"));
    }
}
