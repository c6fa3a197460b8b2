use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod clipboard;
mod controller;
mod domain;
mod inputter;
mod loader;
mod model;
mod notice;
mod paging;
mod query;
mod record;
mod state;
mod theme;
mod ui;

use clipboard::SystemClipboard;
use controller::Controller;
use domain::{PVConfig, PVError};
use model::{Model, Status};
use paging::PageSize;
use theme::Theme;
use ui::TableUI;

/// Browse, filter and sort electronic component spreadsheets in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Spreadsheet to load (xlsx, xls, xlsb, ods or csv)
    #[arg(default_value = "data.xlsx")]
    path: String,

    /// Initial page size: 15, 30, 60 or all
    #[arg(long, default_value = "15")]
    page_size: PageSize,

    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,

    /// Do not show the data source notice on start
    #[arg(long)]
    no_notice: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "pv=trace"
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

impl Args {
    fn into_config(self) -> Result<PVConfig, PVError> {
        let path = shellexpand::full(&self.path)
            .map_err(|e| PVError::LoadingFailed(e.to_string()))?
            .into_owned();
        Ok(PVConfig::default()
            .path(PathBuf::from(path))
            .page_size(self.page_size)
            .theme(self.theme)
            .show_notice(!self.no_notice)
            .event_poll_time(self.poll_ms))
    }
}

fn init_logging(log_file: Option<&PathBuf>, level: &str) -> Result<(), PVError> {
    // Stdout belongs to the terminal ui, without a file there is no logging.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::builder().parse_lossy(level))
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_file.as_ref(), &args.log_level) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&config);
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(config: &PVConfig) -> Result<(), PVError> {
    info!("Starting pv with {:?}", config);

    let (sender, receiver) = mpsc::channel();
    loader::spawn_load(config.path.clone(), sender);

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    let size = terminal.size()?;

    let mut model = Model::init(
        config,
        Box::new(SystemClipboard::default()),
        size.width as usize,
        size.height as usize,
    );
    let mut ui = TableUI::new();
    let mut controller = Controller::new(config, receiver);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
