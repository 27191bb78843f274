use std::error::Error;

use chrono::Local;
use handlebars::{Handlebars, TemplateError};
use plotly::{
    common::{Mode, Orientation},
    layout::{Axis, BarMode, Layout},
    Bar, Plot, Scatter,
};

use serde_json::{json, Value};

use crate::helpers::FormatDateHelper;
use ui::data::{Dashboard, DriverCard, PointsSeries, StackedBar};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// One line per driver: x is the round, y the running points total.
pub fn championship_plot(series: &[PointsSeries]) -> Plot {
    let mut plot = Plot::new();
    for s in series {
        let (rounds, points): (Vec<f64>, Vec<f64>) = s.points.iter().copied().unzip();
        plot.add_trace(
            Scatter::new(rounds, points)
                .name(s.label.as_str())
                .mode(Mode::LinesMarkers),
        );
    }
    plot.set_layout(
        Layout::new()
            .title("Cumulative Points Per Round")
            .x_axis(Axis::new().title("Race Round"))
            .y_axis(Axis::new().title("Cumulative Points")),
    );
    plot
}

/// Group the bar segments into one trace per driver, keeping the order in
/// which drivers first appear so constructors stay in ranking order.
pub fn driver_traces(bars: &[StackedBar]) -> Vec<(String, Vec<f64>, Vec<String>)> {
    let mut traces: Vec<(String, Vec<f64>, Vec<String>)> = Vec::new();
    for bar in bars {
        for segment in &bar.segments {
            let idx = match traces.iter().position(|(label, _, _)| *label == segment.label) {
                Some(idx) => idx,
                None => {
                    traces.push((segment.label.clone(), vec![], vec![]));
                    traces.len() - 1
                }
            };
            traces[idx].1.push(segment.value);
            traces[idx].2.push(bar.label.clone());
        }
    }
    traces
}

pub fn constructor_plot(bars: &[StackedBar]) -> Plot {
    let mut plot = Plot::new();
    for (driver, points, constructors) in driver_traces(bars) {
        plot.add_trace(
            Bar::new(points, constructors)
                .name(driver.as_str())
                .orientation(Orientation::Horizontal),
        );
    }
    plot.set_layout(
        Layout::new()
            .title("Total Constructor Points (Stacked by Driver)")
            .bar_mode(BarMode::Stack)
            .show_legend(false)
            .x_axis(Axis::new().title("Points"))
            .y_axis(Axis::new().title(""))
            .plot_background_color("white"),
    );
    plot
}

const REPORT_TEMPLATE: &str = "report";

fn registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut hbs = Handlebars::new();
    hbs.register_helper("formatDate", Box::new(FormatDateHelper));
    hbs.set_strict_mode(true);
    hbs.register_template_string(REPORT_TEMPLATE, include_str!("templates/report.html.hbs"))?;
    Ok(hbs)
}

fn card_context(card: &DriverCard) -> Value {
    let fields: Vec<Value> = card
        .fields()
        .into_iter()
        .map(|(label, value)| json!({ "label": label, "value": value }))
        .collect();
    json!({
        "code": card.code,
        "name": card.name,
        "image": card.image,
        "fields": fields,
    })
}

/// A self-contained page with the headlines, the selected driver's card and
/// both charts.
pub fn render_html(dashboard: &Dashboard, card: Option<&DriverCard>) -> Result<String, Box<dyn Error>> {
    let context = json!({
        "plotly_js": PLOTLY_JS,
        "headlines": dashboard.headlines,
        "card": card.map(card_context),
        "championship_plot": championship_plot(&dashboard.championship).to_inline_html(Some("championship")),
        "constructor_plot": constructor_plot(&dashboard.constructors).to_inline_html(Some("constructors")),
        "generated": Local::now().naive_local(),
    });
    Ok(registry()?.render(REPORT_TEMPLATE, &context)?)
}
