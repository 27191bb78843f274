mod board;
mod helpers;
mod report;

use board::Board;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use env_logger::Env;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::{error::Error, fs::File};

use log::{debug, error, info};
use standings::championship::cumulative_points;
use standings::constructors::ranked_points_by_driver;
use ui::data::{Dashboard, DriverCard};

enum OutputType {
    TUI,
    POLAR,
    CSV,
    JSON,
    HTML,
}

impl OutputType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "tui" => Some(OutputType::TUI),
            "polar" => Some(OutputType::POLAR),
            "csv" => Some(OutputType::CSV),
            "json" => Some(OutputType::JSON),
            "html" => Some(OutputType::HTML),
            _ => None,
        }
    }
}

trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

struct TableOutput<'a> {
    board: &'a Board,
    dashboard: Dashboard,
}

impl Output for TableOutput<'_> {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        ui::tui::run(&self.dashboard, self.board)
    }
}

struct PolarOutput<'a> {
    board: &'a Board,
    card: Option<DriverCard>,
}

impl Output for PolarOutput<'_> {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        if let Some(card) = &self.card {
            println!("{}", card.markdown());
        }
        println!("{}", cumulative_points(&self.board.results)?);
        println!("{}", ranked_points_by_driver(&self.board.results)?);
        Ok(())
    }
}

struct CsvOutput {
    filename: PathBuf,
    df: DataFrame,
}

impl CsvOutput {
    fn new(filename: PathBuf, df: DataFrame) -> Self {
        CsvOutput { filename, df }
    }
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let mut file = File::create(&self.filename)?;
        let mut m_df = self.df.clone();
        CsvWriter::new(&mut file).finish(&mut m_df)?;
        info!("CSV file written successfully: {:?}", self.filename);
        Ok(())
    }
}

struct CsvFilesOutput {
    files: Vec<CsvOutput>,
}

impl Output for CsvFilesOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        for file in &self.files {
            file.output()?;
        }
        Ok(())
    }
}

struct JsonOutput {
    dashboard: Dashboard,
    card: Option<DriverCard>,
}

impl Output for JsonOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        println!("{}", self.dashboard.to_json(self.card.as_ref())?);
        Ok(())
    }
}

struct HtmlOutput {
    filename: PathBuf,
    dashboard: Dashboard,
    card: Option<DriverCard>,
}

impl Output for HtmlOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let html = report::render_html(&self.dashboard, self.card.as_ref())?;
        std::fs::write(&self.filename, html)?;
        info!("HTML report written successfully: {:?}", self.filename);
        Ok(())
    }
}

/// F1 driver and constructor standings from a race results table
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["tui", "polar", "csv", "json", "html"]),
        default_value = "tui",
        help = "output format"
    )]
    format: String,

    #[arg(long = "config", default_value = config::DEFAULT_CONFIG_FILE, help = "config file")]
    config: PathBuf,

    #[arg(
        long = "source",
        help = "data source name from the config, or a csv path, e.g. --source sample_csv"
    )]
    source: Option<String>,

    #[arg(long = "driver", help = "driver selected at start, e.g. --driver VER")]
    driver: Option<String>,

    #[arg(long = "out", help = "output directory for csv and html formats")]
    out: Option<PathBuf>,
}

fn selected_card(board: &Board, dashboard: &Dashboard) -> Result<Option<DriverCard>, Box<dyn Error>> {
    match dashboard.selected_driver() {
        Some(driver) => Ok(Some(board.driver_card(driver.code())?)),
        None => Ok(None),
    }
}

fn get_output<'a>(
    output_type: OutputType,
    board: &'a Board,
    dashboard: Dashboard,
    out_dir: &Path,
) -> Result<Box<dyn Output + 'a>, Box<dyn Error>> {
    let output: Box<dyn Output + 'a> = match output_type {
        OutputType::TUI => Box::new(TableOutput { board, dashboard }),
        OutputType::POLAR => Box::new(PolarOutput {
            board,
            card: selected_card(board, &dashboard)?,
        }),
        OutputType::CSV => Box::new(CsvFilesOutput {
            files: vec![
                CsvOutput::new(
                    out_dir.join("championship.csv"),
                    cumulative_points(&board.results)?,
                ),
                CsvOutput::new(
                    out_dir.join("constructors.csv"),
                    ranked_points_by_driver(&board.results)?,
                ),
            ],
        }),
        OutputType::JSON => Box::new(JsonOutput {
            card: selected_card(board, &dashboard)?,
            dashboard,
        }),
        OutputType::HTML => Box::new(HtmlOutput {
            filename: out_dir.join("report.html"),
            card: selected_card(board, &dashboard)?,
            dashboard,
        }),
    };
    Ok(output)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let conf = config::Config::load_or_default(&args.config)?;
    debug!("config: {:?}", conf);

    let source = args.source.clone().unwrap_or_else(|| conf.source.clone());
    let path = conf.resolve_source(&source)?;
    info!("data source: {} ({:?})", source, path);

    let results = match standings::loader::load_results(&path) {
        Ok(df) => df,
        Err(e) => {
            error!("failed to load race results: {}", e);
            return Err(e.into());
        }
    };
    let board = Board::new(results, &conf.headshot_dir)?;

    let preferred = args
        .driver
        .clone()
        .unwrap_or_else(|| conf.default_driver.clone());
    let dashboard = board.dashboard(&conf, &preferred)?;

    let out_dir = args.out.clone().unwrap_or_else(|| conf.output_dir.clone());
    let out_type = OutputType::from_str(args.format.as_str()).ok_or("output not match")?;
    let result = get_output(out_type, &board, dashboard, &out_dir)?.output();
    result
}
