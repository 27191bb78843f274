use std::collections::HashMap;
use std::{error::Error, io};

use crate::data::{CardSource, Dashboard, DriverCard, DriverOption, PointsSeries, StackedBar};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Layout, Margin, Rect},
    style::{self, Color, Modifier, Style, Stylize},
    symbols,
    Frame, Terminal,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Cell, Chart, Dataset, GraphType, HighlightSpacing, Paragraph,
        Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table, TableState,
    },
};
use style::palette::tailwind;
use unicode_width::UnicodeWidthStr;

const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];
const SERIES_COLORS: [Color; 10] = [
    tailwind::SKY.c400,
    tailwind::ORANGE.c400,
    tailwind::GREEN.c400,
    tailwind::ROSE.c400,
    tailwind::VIOLET.c400,
    tailwind::AMBER.c400,
    tailwind::TEAL.c400,
    tailwind::PINK.c400,
    tailwind::LIME.c400,
    tailwind::FUCHSIA.c400,
];
const INFO_TEXT: &str =
    "(Esc) quit | (↑) previous driver | (↓) next driver | (Tab) switch chart | (→) next color | (←) previous color";

const ITEM_HEIGHT: usize = 1;
const CARD_HEIGHT: u16 = 9;

struct TableColors {
    buffer_bg: Color,
    header_bg: Color,
    header_fg: Color,
    row_fg: Color,
    selected_style_fg: Color,
    normal_row_color: Color,
    alt_row_color: Color,
    footer_border_color: Color,
}

impl TableColors {
    const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_style_fg: color.c400,
            normal_row_color: tailwind::SLATE.c950,
            alt_row_color: tailwind::SLATE.c900,
            footer_border_color: color.c400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartView {
    Championship,
    Constructors,
}

struct App<'a> {
    state: TableState,
    dashboard: &'a Dashboard,
    source: &'a dyn CardSource,
    card: Result<DriverCard, String>,
    view: ChartView,
    series_colors: HashMap<&'a str, Color>,
    longest_item_lens: (u16, u16, u16),
    scroll_state: ScrollbarState,
    colors: TableColors,
    color_index: usize,
}

impl<'a> App<'a> {
    fn new(dashboard: &'a Dashboard, source: &'a dyn CardSource) -> Self {
        let selected = dashboard.selected.or(if dashboard.drivers.is_empty() {
            None
        } else {
            Some(0)
        });
        let series_colors = dashboard
            .championship
            .iter()
            .enumerate()
            .map(|(i, s)| (s.label.as_str(), SERIES_COLORS[i % SERIES_COLORS.len()]))
            .collect();
        let mut app = Self {
            state: TableState::default().with_selected(selected),
            dashboard,
            source,
            card: Err(String::new()),
            view: ChartView::Championship,
            series_colors,
            longest_item_lens: constraint_len_calculator(&dashboard.drivers),
            scroll_state: ScrollbarState::new(
                dashboard.drivers.len().saturating_sub(1) * ITEM_HEIGHT,
            )
            .position(selected.unwrap_or(0) * ITEM_HEIGHT),
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
        };
        app.refresh_card();
        app
    }

    fn items(&self) -> &'a [DriverOption] {
        &self.dashboard.drivers
    }

    fn selected_code(&self) -> Option<&'a str> {
        let items = self.items();
        self.state
            .selected()
            .and_then(|i| items.get(i))
            .map(DriverOption::code)
    }

    fn refresh_card(&mut self) {
        self.card = match self.selected_code() {
            Some(code) => self.source.card(code).map_err(|e| e.to_string()),
            None => Err("no drivers loaded".to_string()),
        };
    }

    fn select(&mut self, i: usize) {
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
        self.refresh_card();
    }

    pub fn next(&mut self) {
        let len = self.items().len();
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
        self.select(i);
    }

    pub fn previous(&mut self) {
        let len = self.items().len();
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
        self.select(i);
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ChartView::Championship => ChartView::Constructors,
            ChartView::Constructors => ChartView::Championship,
        };
    }

    pub fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    pub fn previous_color(&mut self) {
        let count = PALETTES.len();
        self.color_index = (self.color_index + count - 1) % count;
    }

    pub fn set_colors(&mut self) {
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }

    fn series_color(&self, label: &str, fallback: usize) -> Color {
        self.series_colors
            .get(label)
            .copied()
            .unwrap_or(SERIES_COLORS[fallback % SERIES_COLORS.len()])
    }
}

pub fn run(dashboard: &Dashboard, source: &dyn CardSource) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let app = App::new(dashboard, source);
    let res = run_app(&mut terminal, app);

    // restore terminal
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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('j') | KeyCode::Down => app.next(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous(),
                    KeyCode::Tab => app.toggle_view(),
                    KeyCode::Char('l') | KeyCode::Right => app.next_color(),
                    KeyCode::Char('h') | KeyCode::Left => app.previous_color(),
                    _ => {}
                }
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rects = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(3),
    ])
    .split(f.area());

    app.set_colors();

    render_headline(f, app, rects[0]);

    let (code_len, name_len, team_len) = app.longest_item_lens;
    // columns, spacing and highlight symbol
    let list_width = code_len + name_len + team_len + 10;
    let body = Layout::horizontal([Constraint::Length(list_width), Constraint::Min(20)])
        .split(rects[1]);
    render_table(f, app, body[0]);
    render_scrollbar(f, app, body[0]);

    let right = Layout::vertical([Constraint::Length(CARD_HEIGHT), Constraint::Min(5)])
        .split(body[1]);
    render_card(f, app, right[0]);
    match app.view {
        ChartView::Championship => render_championship(f, app, right[1]),
        ChartView::Constructors => render_constructors(f, app, right[1]),
    }

    render_footer(f, app, rects[2]);
}

fn render_headline(f: &mut Frame, app: &App, area: Rect) {
    let headline = Paragraph::new(Line::from(app.dashboard.headlines.standings.as_str()).bold())
        .style(Style::new().fg(app.colors.header_fg).bg(app.colors.header_bg))
        .centered()
        .block(Block::bordered().border_type(BorderType::Rounded));
    f.render_widget(headline, area);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let header_style = Style::default()
        .fg(app.colors.header_fg)
        .bg(app.colors.header_bg);
    let selected_style = Style::default()
        .add_modifier(Modifier::REVERSED)
        .fg(app.colors.selected_style_fg);

    let header = ["code", "driver", "team"]
        .into_iter()
        .map(Cell::from)
        .collect::<Row>()
        .style(header_style)
        .height(1);
    let rows = app.items().iter().enumerate().map(|(i, data)| {
        let color = match i % 2 {
            0 => app.colors.normal_row_color,
            _ => app.colors.alt_row_color,
        };
        let item = data.ref_array();
        item.into_iter()
            .map(|content| Cell::from(content.as_str()))
            .collect::<Row>()
            .style(Style::new().fg(app.colors.row_fg).bg(color))
            .height(ITEM_HEIGHT as u16)
    });
    let t = Table::new(
        rows,
        [
            Constraint::Length(app.longest_item_lens.0),
            Constraint::Min(app.longest_item_lens.1 + 1),
            Constraint::Min(app.longest_item_lens.2),
        ],
    )
    .header(header)
    .highlight_style(selected_style)
    .highlight_symbol(" █ ")
    .bg(app.colors.buffer_bg)
    .highlight_spacing(HighlightSpacing::Always);
    f.render_stateful_widget(t, area, &mut app.state);
}

fn constraint_len_calculator(items: &[DriverOption]) -> (u16, u16, u16) {
    let code_len = items
        .iter()
        .map(DriverOption::code)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let name_len = items
        .iter()
        .map(DriverOption::name)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    let team_len = items
        .iter()
        .map(DriverOption::team)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    #[allow(clippy::cast_possible_truncation)]
    (code_len as u16, name_len as u16, team_len as u16)
}

fn render_scrollbar(f: &mut Frame, app: &mut App, area: Rect) {
    f.render_stateful_widget(
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None),
        area.inner(Margin {
            vertical: 1,
            horizontal: 1,
        }),
        &mut app.scroll_state,
    );
}

fn render_card(f: &mut Frame, app: &App, area: Rect) {
    let (title, lines) = match &app.card {
        Ok(card) => {
            let lines: Vec<Line> = card
                .fields()
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label}: "), Style::new().bold()),
                        Span::raw(value),
                    ])
                })
                .collect();
            (card.name.clone(), lines)
        }
        Err(msg) => ("no driver".to_string(), vec![Line::from(msg.as_str())]),
    };
    let card = Paragraph::new(lines)
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .block(
            Block::bordered()
                .title(title)
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(card, area);
}

/// Upper bounds for the round and points axes.
fn chart_bounds(series: &[PointsSeries]) -> (f64, f64) {
    series
        .iter()
        .flat_map(|s| s.points.iter())
        .fold((1.0, 1.0), |(x, y), &(round, points)| {
            (f64::max(x, round), f64::max(y, points))
        })
}

fn axis_labels(max: f64) -> Vec<Span<'static>> {
    vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max / 2.0)),
        Span::raw(format!("{:.0}", max)),
    ]
}

fn render_championship(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_code();
    let datasets: Vec<Dataset> = app
        .dashboard
        .championship
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut style = Style::default().fg(app.series_color(&s.label, i));
            if selected.is_some() && s.code.as_deref() == selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            Dataset::default()
                .name(s.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(style)
                .data(&s.points)
        })
        .collect();

    let (max_round, max_points) = chart_bounds(&app.dashboard.championship);
    let axis_style = Style::default().fg(app.colors.row_fg);
    let chart = Chart::new(datasets)
        .block(
            Block::bordered()
                .title(app.dashboard.headlines.championship.as_str())
                .title_bottom(Line::from("Cumulative Points Per Round").centered()),
        )
        .style(Style::new().bg(app.colors.buffer_bg))
        .x_axis(
            Axis::default()
                .title("Race Round")
                .style(axis_style)
                .bounds([0.0, max_round])
                .labels(axis_labels(max_round)),
        )
        .y_axis(
            Axis::default()
                .title("Cumulative Points")
                .style(axis_style)
                .bounds([0.0, max_points])
                .labels(axis_labels(max_points)),
        );
    f.render_widget(chart, area);
}

/// Column widths of each segment, rounded on cumulative totals so the bar
/// length depends only on the bar's total.
fn segment_widths(bar: &StackedBar, width: u16, max_total: f64) -> Vec<u16> {
    if max_total <= 0.0 {
        return vec![0; bar.segments.len()];
    }
    let scale = width as f64 / max_total;
    let mut cumulative = 0.0;
    let mut drawn = 0u16;
    bar.segments
        .iter()
        .map(|s| {
            cumulative += s.value.max(0.0);
            let end = (cumulative * scale).round().min(width as f64) as u16;
            let w = end.saturating_sub(drawn);
            drawn = drawn.max(end);
            w
        })
        .collect()
}

fn render_constructors(f: &mut Frame, app: &App, area: Rect) {
    let bars = &app.dashboard.constructors;
    let block = Block::bordered()
        .title(app.dashboard.headlines.constructors.as_str())
        .title_bottom(Line::from("Total Constructor Points (Stacked by Driver)").centered());
    let inner = block.inner(area);

    #[allow(clippy::cast_possible_truncation)]
    let label_width = bars
        .iter()
        .map(|b| b.label.as_str())
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0) as u16;
    let max_total = bars.iter().map(|b| b.total).fold(0.0, f64::max);
    // label, gap, and room for the total
    let bar_width = inner.width.saturating_sub(label_width + 8);

    // highest total on top
    let lines: Vec<Line> = bars
        .iter()
        .rev()
        .map(|bar| {
            let mut spans = vec![Span::raw(format!(
                "{:>width$} ",
                bar.label,
                width = label_width as usize
            ))];
            for (i, (segment, w)) in bar
                .segments
                .iter()
                .zip(segment_widths(bar, bar_width, max_total))
                .enumerate()
            {
                spans.push(Span::styled(
                    "█".repeat(w as usize),
                    Style::new().fg(app.series_color(&segment.label, i)),
                ));
            }
            spans.push(Span::raw(format!(" {:.0}", bar.total)));
            Line::from(spans)
        })
        .collect();

    let chart = Paragraph::new(lines)
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .block(block);
    f.render_widget(chart, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let info_footer = Paragraph::new(Line::from(INFO_TEXT))
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(info_footer, area);
}
