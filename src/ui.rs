use fusion_catalog::aggregate::{self, ViewSummary};
use fusion_catalog::catalog::{Catalog, CategoricalField, CompanyRecord};
use fusion_catalog::filters::{CatalogView, FilterSet};
use fusion_catalog::format::{self, CompanyDetail};
use fusion_catalog::normalize::NormalizationReport;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// Funding threshold step for +/- keys ($100M)
const FUNDING_STEP: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Profiles,
    Analytics,
    DataTable,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Profiles => Page::Analytics,
            Page::Analytics => Page::DataTable,
            Page::DataTable => Page::Profiles,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Profiles => Page::DataTable,
            Page::Analytics => Page::Profiles,
            Page::DataTable => Page::Analytics,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Profiles => "Company Profiles",
            Page::Analytics => "Analytics",
            Page::DataTable => "Data Table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub catalog: Catalog,
    pub report: NormalizationReport,
    pub current_page: Page,
    pub state: TableState,
    pub show_detail: bool,
    pub input_mode: InputMode,

    /// The composed predicate set currently in force
    pub filters: FilterSet,

    // Sidebar cycling state: None = no restriction, Some(i) = single value
    fuel_domain: Vec<String>,
    approach_domain: Vec<String>,
    fuel_index: Option<usize>,
    approach_index: Option<usize>,
}

impl App {
    pub fn new(catalog: Catalog, report: NormalizationReport) -> Self {
        let mut state = TableState::default();
        if !catalog.is_empty() {
            state.select(Some(0));
        }

        let fuel_domain = catalog.distinct_values(CategoricalField::FuelSource);
        let approach_domain = catalog.distinct_values(CategoricalField::GeneralApproach);

        Self {
            catalog,
            report,
            current_page: Page::Profiles,
            state,
            show_detail: false,
            input_mode: InputMode::Normal,
            filters: FilterSet::default(),
            fuel_domain,
            approach_domain,
            fuel_index: None,
            approach_index: None,
        }
    }

    /// Re-derive the view for the current filters
    pub fn view(&self) -> CatalogView<'_> {
        self.catalog.view().refine(&self.filters)
    }

    pub fn summary(&self) -> ViewSummary {
        aggregate::summarize(&self.view())
    }

    pub fn selected_company(&self) -> Option<&CompanyRecord> {
        let view = self.view();
        self.state
            .selected()
            .and_then(|i| view.records().get(i).copied())
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    fn rebuild_sidebar_filters(&mut self) {
        self.filters.fuel_sources = match self.fuel_index {
            Some(i) => [self.fuel_domain[i].clone()].into_iter().collect(),
            None => Default::default(),
        };
        self.filters.approaches = match self.approach_index {
            Some(i) => [self.approach_domain[i].clone()].into_iter().collect(),
            None => Default::default(),
        };
        self.reset_selection();
    }

    /// Cycle the fuel-source filter: all -> each value -> all
    pub fn cycle_fuel_source(&mut self) {
        self.fuel_index = match self.fuel_index {
            None if self.fuel_domain.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 < self.fuel_domain.len() => Some(i + 1),
            Some(_) => None,
        };
        self.rebuild_sidebar_filters();
    }

    /// Cycle the general-approach filter
    pub fn cycle_approach(&mut self) {
        self.approach_index = match self.approach_index {
            None if self.approach_domain.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 < self.approach_domain.len() => Some(i + 1),
            Some(_) => None,
        };
        self.rebuild_sidebar_filters();
    }

    pub fn step_min_funding(&mut self, up: bool) {
        if up {
            self.filters.min_funding_usd += FUNDING_STEP;
        } else {
            self.filters.min_funding_usd =
                (self.filters.min_funding_usd - FUNDING_STEP).max(0.0);
        }
        self.reset_selection();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.filters.search_term.push(c);
        self.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.filters.search_term.pop();
        self.reset_selection();
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterSet::default();
        self.fuel_index = None;
        self.approach_index = None;
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.view().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.view().count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.view().count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_filter_label(&self) -> String {
        let mut parts = Vec::new();
        if let Some(i) = self.fuel_index {
            parts.push(format!("fuel={}", self.fuel_domain[i]));
        }
        if let Some(i) = self.approach_index {
            parts.push(format!("approach={}", self.approach_domain[i]));
        }
        if !self.filters.search_term.trim().is_empty() {
            parts.push(format!("search=\"{}\"", self.filters.search_term.trim()));
        }
        if self.filters.min_funding_usd > 0.0 {
            parts.push(format!(
                "funding>={}",
                format::format_usd(self.filters.min_funding_usd)
            ));
        }
        parts.join(", ")
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.input_mode {
                InputMode::Search => match key.code {
                    KeyCode::Enter | KeyCode::Esc => app.input_mode = InputMode::Normal,
                    KeyCode::Backspace => app.pop_search_char(),
                    KeyCode::Char(c) => app.push_search_char(c),
                    _ => {}
                },
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Enter => app.toggle_detail(),
                    KeyCode::Tab => {
                        if key.modifiers.contains(KeyModifiers::SHIFT) {
                            app.previous_page();
                        } else {
                            app.next_page();
                        }
                    }
                    KeyCode::Char('1') => app.current_page = Page::Profiles,
                    KeyCode::Char('2') => app.current_page = Page::Analytics,
                    KeyCode::Char('3') => app.current_page = Page::DataTable,
                    KeyCode::Char('f') => app.cycle_fuel_source(),
                    KeyCode::Char('a') => app.cycle_approach(),
                    KeyCode::Char('/') => app.input_mode = InputMode::Search,
                    KeyCode::Char('+') | KeyCode::Char('=') => app.step_min_funding(true),
                    KeyCode::Char('-') => app.step_min_funding(false),
                    KeyCode::Char('c') => app.clear_filters(),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Home => app.state.select(Some(0)),
                    KeyCode::End => {
                        let len = app.view().count();
                        if len > 0 {
                            app.state.select(Some(len - 1));
                        }
                    }
                    _ => {}
                },
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(3), // Metric cards
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_metrics(f, chunks[1], app);

    if app.view().is_empty() {
        render_empty_state(f, chunks[2], app);
    } else {
        match app.current_page {
            Page::Profiles => render_profiles(f, chunks[2], app),
            Page::Analytics => render_analytics(f, chunks[2], app),
            Page::DataTable => render_data_table(f, chunks[2], app),
        }
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Profiles, Page::Analytics, Page::DataTable];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Fusion Companies: {}", app.catalog.len()),
        Style::default().fg(Color::White),
    ));
    if app.report.rejected > 0 {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            format!("({} rejected at load)", app.report.rejected),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_metrics(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let metric = |title: &'static str, value: String| {
        Paragraph::new(Line::from(vec![Span::styled(
            value,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().borders(Borders::ALL).title(title))
    };

    f.render_widget(metric(" Companies ", summary.count.to_string()), cards[0]);
    f.render_widget(
        metric(
            " Total Funding ",
            format::format_usd_billions(summary.total_funding_usd),
        ),
        cards[1],
    );
    f.render_widget(
        metric(
            " Avg Employees ",
            format!("{:.0}", summary.mean_employees),
        ),
        cards[2],
    );
    f.render_widget(
        metric(
            " Avg Output ",
            format!("{:.0} MWe", summary.mean_output_mwe),
        ),
        cards[3],
    );
}

fn render_empty_state(f: &mut Frame, area: Rect, app: &App) {
    let message = if app.filters.is_active() {
        "No companies match the current filters.  Press c to clear them."
    } else {
        "No companies loaded."
    };

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Yellow),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" No Results "),
    );

    f.render_widget(paragraph, area);
}

fn render_profiles(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_company_list(f, chunks[0], app);
    render_detail_panel(f, chunks[1], app);
}

fn render_company_list(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new([Cell::from("Company").style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = app
        .view()
        .iter()
        .map(|company| Row::new([Cell::from(company.name.clone())]).height(1))
        .collect();

    let table = Table::new(rows, [Constraint::Min(20)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Select a company "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let company = match app.selected_company() {
        Some(c) => c,
        None => {
            let no_selection = Paragraph::new("No company selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Company Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let detail = CompanyDetail::from_record(company);
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Description: ", label),
            Span::raw(detail.description.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Location: ", label),
            Span::raw(detail.location.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Founded: ", label),
            Span::raw(detail.founded.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Employees: ", label),
            Span::raw(detail.employees.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Approach: ", label),
            Span::raw(detail.approach.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Fuel Source: ", label),
            Span::raw(detail.fuel_source.clone()),
        ]),
        Line::from(vec![
            Span::styled("  Pilot Plant: ", label),
            Span::raw(detail.pilot_plant_timeline.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Total Funding: ", label),
            Span::styled(detail.funding.clone(), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("  Commercial Output: ", label),
            Span::styled(
                detail.commercial_output.clone(),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Recent Milestones",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
    ];

    if detail.milestones.is_empty() {
        content.push(Line::from(Span::styled(
            "  (none reported)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for milestone in &detail.milestones {
            content.push(Line::from(format!("  • {}", milestone)));
        }
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", detail.name)),
    );

    f.render_widget(panel, area);
}

fn render_analytics(f: &mut Frame, area: Rect, app: &App) {
    let view = app.view();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Fuel source distribution as a bar chart
    let fuel_dist = aggregate::distribution(&view, CategoricalField::FuelSource);
    let bars: Vec<(&str, u64)> = fuel_dist
        .iter()
        .map(|entry| (entry.value.as_str(), entry.count as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Fuel Source Distribution "),
        )
        .data(&bars)
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, chunks[0]);

    // Approach distribution + funding ranking as text
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let approach_dist = aggregate::distribution(&view, CategoricalField::GeneralApproach);
    let mut approach_lines = vec![Line::from("")];
    for entry in &approach_dist {
        approach_lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<32}", entry.value),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:>3}", entry.count),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    let approaches = Paragraph::new(approach_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Fusion Approaches "),
    );
    f.render_widget(approaches, bottom[0]);

    let mut funding_lines = vec![Line::from("")];
    for bar in aggregate::funding_by_company(&view) {
        funding_lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<32}", truncate(&bar.name, 30)),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:>10}", format::format_usd(bar.funding_usd)),
                Style::default().fg(Color::Green),
            ),
        ]));
    }
    let funding = Paragraph::new(funding_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Funding by Company "),
    );
    f.render_widget(funding, bottom[1]);
}

fn render_data_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = [
        "Company", "Location", "Founded", "Employees", "Funding", "Approach", "Fuel", "Output",
    ]
    .iter()
    .map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .view()
        .iter()
        .map(|company| {
            let funding = match company.funding_usd {
                Some(usd) => format::format_usd_millions(usd),
                None => format::PLACEHOLDER.to_string(),
            };
            let employees = match company.employees {
                Some(n) => format::group_thousands(n),
                None => format::PLACEHOLDER.to_string(),
            };

            Row::new(vec![
                Cell::from(truncate(&company.name, 28)),
                Cell::from(truncate(&company.location, 20)),
                Cell::from(format::founding_year(&company.year_founded)),
                Cell::from(employees),
                Cell::from(funding).style(Style::default().fg(Color::Green)),
                Cell::from(truncate(&company.general_approach, 24)),
                Cell::from(company.fuel_source.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format::format_mwe(company.commercial_output_mwe)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(22),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(26),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Company Database "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.view().count();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if app.input_mode == InputMode::Search {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Search: {}_", app.filters.search_term),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw(" (Enter/Esc to finish)"));
    } else {
        let label = app.active_filter_label();
        if !label.is_empty() {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled(
                format!("Filters: {}", label),
                Style::default().fg(Color::Green),
            ));
            status_spans.push(Span::raw(" ("));
            status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" clear)"));
        }

        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Page | "));
        status_spans.push(Span::styled("f", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Fuel | "));
        status_spans.push(Span::styled("a", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Approach | "));
        status_spans.push(Span::styled("/", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Search | "));
        status_spans.push(Span::styled("+/-", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Min funding | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_catalog::catalog::CompanyRecord;
    use fusion_catalog::normalize::NormalizationReport;

    fn record(name: &str, fuel: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            description: String::new(),
            location: "USA".to_string(),
            year_founded: "2015-01-01".to_string(),
            employees: Some(50),
            general_approach: "Magnetic Confinement".to_string(),
            specific_approach: "Tokamak".to_string(),
            fuel_source: fuel.to_string(),
            pilot_plant_timeline: String::new(),
            funding_usd: Some(1.0e8),
            commercial_output_mwe: Some(100.0),
            milestones_past_12_months: Vec::new(),
        }
    }

    fn sample_app() -> App {
        let catalog = Catalog::new(vec![
            record("Alpha", "D-T"),
            record("Beta", "D-D"),
            record("Gamma", "D-T"),
        ]);
        let report = NormalizationReport {
            received: 3,
            accepted: 3,
            rejected: 0,
            issues: Vec::new(),
        };
        App::new(catalog, report)
    }

    #[test]
    fn test_fuel_cycle_wraps_back_to_all() {
        let mut app = sample_app();
        assert!(!app.filters.is_active());

        // Domain is ["D-T", "D-D"]; cycling visits each then returns to all
        app.cycle_fuel_source();
        assert_eq!(app.view().count(), 2); // D-T

        app.cycle_fuel_source();
        assert_eq!(app.view().count(), 1); // D-D

        app.cycle_fuel_source();
        assert_eq!(app.view().count(), 3);
        assert!(!app.filters.is_active());
    }

    #[test]
    fn test_search_input_refines_view() {
        let mut app = sample_app();
        for c in "beta".chars() {
            app.push_search_char(c);
        }
        assert_eq!(app.view().names(), vec!["Beta"]);

        app.pop_search_char();
        app.pop_search_char();
        app.pop_search_char();
        app.pop_search_char();
        assert_eq!(app.view().count(), 3);
    }

    #[test]
    fn test_funding_step_never_negative() {
        let mut app = sample_app();
        app.step_min_funding(false);
        assert_eq!(app.filters.min_funding_usd, 0.0);

        app.step_min_funding(true);
        app.step_min_funding(true);
        assert_eq!(app.view().count(), 0); // threshold above every record
        assert!(app.state.selected().is_none());

        app.clear_filters();
        assert_eq!(app.view().count(), 3);
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_selected_company_follows_view() {
        let mut app = sample_app();
        app.next();
        assert_eq!(app.selected_company().unwrap().name, "Beta");

        app.cycle_fuel_source(); // restrict to D-T, selection resets
        assert_eq!(app.selected_company().unwrap().name, "Alpha");
    }
}
