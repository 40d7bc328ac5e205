use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;

use floodmap_service::alert::thresholds::{FloodStatus, check_flood_level, classify_level, format_water_height};
use floodmap_service::analysis::forecast::{forecast_rows, forecast_station_rows, StationForecast};
use floodmap_service::analysis::presentation::{build_chart, history_table, next_visible, prediction_table, ChartLabels};
use floodmap_service::analysis::series::ColumnMapping;
use floodmap_service::cache::{load_rows_file, Cache};
use floodmap_service::config::{load_config, ServiceConfig};
use floodmap_service::ingest::{hydro, rid};
use floodmap_service::logging::{self, DataSource};
use floodmap_service::model::{FloodMapError, Row};
use floodmap_service::stations::{find_station, Station, STATION_REGISTRY};

#[derive(Parser)]
#[command(name = "floodmap_service", about = "Ping River water levels and 24-hour forecast")]
struct Cli {
    /// Config file (default: floodmap.toml)
    #[arg(long, env = "FLOODMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Current water level and flood status for every station
    Stations {
        /// Keep refreshing at the configured interval
        #[arg(long)]
        watch: bool,
    },
    /// 24-hour forecast for one station
    Forecast {
        #[arg(long)]
        station: Option<String>,
        /// Forecast from a rows file (JSON, .xls or .xlsx) instead of the live service
        #[arg(long, conflicts_with = "from_export")]
        rows: Option<PathBuf>,
        /// Forecast from the hydro-1 export saved by `download`
        #[arg(long)]
        from_export: bool,
        /// Column layout of the rows (default: hydro for files, rid for live)
        #[arg(long, value_enum)]
        columns: Option<ColumnPreset>,
        /// Seed the jitter for a reproducible forecast
        #[arg(long)]
        seed: Option<u64>,
        /// History rows to show (default: one page)
        #[arg(long)]
        visible: Option<usize>,
        /// Print the chart model and tables as JSON
        #[arg(long)]
        json: bool,
        /// Save the fetched rows to the cache
        #[arg(long)]
        save: bool,
    },
    /// Download the hydro-1 hourly export into the cache
    Download {
        #[arg(long)]
        station: Option<String>,
        #[arg(long)]
        days: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColumnPreset {
    Hydro,
    Rid,
}

impl ColumnPreset {
    fn mapping(self) -> ColumnMapping {
        match self {
            ColumnPreset::Hydro => ColumnMapping::hydro_export(),
            ColumnPreset::Rid => ColumnMapping::rid_service(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init_logger(config.min_log_level(), config.log_file.as_deref(), false);
    logging::debug(
        DataSource::System,
        None,
        &format!("cache {}, refresh every {}s", config.cache_dir.display(), config.refresh_interval_secs),
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    match cli.command {
        Command::Stations { watch } => loop {
            show_stations(&client, &config);
            if !watch {
                break Ok(());
            }
            std::thread::sleep(Duration::from_secs(config.refresh_interval_secs));
        },
        Command::Forecast {
            station,
            rows,
            from_export,
            columns,
            seed,
            visible,
            json,
            save,
        } => {
            let station = resolve_station(station.as_deref(), &config)?;
            let cache = Cache::new(&config.cache_dir);

            let (rows, default_preset) = match rows {
                Some(path) => (load_rows_file(&path)?, ColumnPreset::Hydro),
                None if from_export => (
                    cache
                        .load_export_rows()
                        .inspect_err(|e| logging::log_hydro_failure(station.code, "export read", e))?,
                    ColumnPreset::Hydro,
                ),
                None => (fetch_rows(&client, &config, station)?, ColumnPreset::Rid),
            };
            if save {
                let path = cache.save_rows(station.code, &rows)?;
                logging::info(DataSource::Cache, Some(station.code), &format!("rows saved to {}", path.display()));
            }

            let mapping = columns.unwrap_or(default_preset).mapping();
            let forecast_config = config.forecast.to_forecast_config();
            let forecast = match seed {
                Some(seed) => forecast_rows(
                    &rows,
                    &mapping,
                    &forecast_config,
                    chrono::Local::now().date_naive(),
                    &mut StdRng::seed_from_u64(seed),
                ),
                None => forecast_station_rows(&rows, &mapping, &forecast_config),
            };
            logging::debug(
                DataSource::Forecast,
                Some(station.code),
                &format!(
                    "{} rows, {} usable, trend {:+.4} m/h",
                    forecast.readings.len(),
                    forecast.series.len(),
                    forecast.trend
                ),
            );

            let visible = visible.unwrap_or(config.page_size);
            if json {
                print_json(station, &forecast, visible)?;
            } else {
                print_forecast(station, &config, &forecast, visible);
            }
            Ok(())
        }
        Command::Download { station, days } => {
            let station = resolve_station(station.as_deref(), &config)?;
            let (start, end) = hydro::history_range(
                chrono::Local::now().date_naive(),
                days.unwrap_or(config.history_days),
            );
            let url = hydro::build_export_url(&config.hydro_export_url, station.code, start, end);
            logging::info(DataSource::Hydro, Some(station.code), &format!("Fetching data from: {}", url));

            let bytes = hydro::fetch_export(&client, &url).inspect_err(|e| {
                logging::log_hydro_failure(station.code, "export download", e);
            })?;
            let path = Cache::new(&config.cache_dir).save_export(&bytes)?;
            println!("File downloaded and saved as {}", path.display());

            match hydro::read_export(&path) {
                Ok(rows) => logging::info(
                    DataSource::Hydro,
                    Some(station.code),
                    &format!("{} rows readable; forecast with `forecast --from-export`", rows.len()),
                ),
                Err(e) => logging::log_hydro_failure(station.code, "export read", &e),
            }
            Ok(())
        }
    }
}

fn resolve_station(code: Option<&str>, config: &ServiceConfig) -> Result<&'static Station, FloodMapError> {
    let code = code.unwrap_or(&config.default_station);
    find_station(code).ok_or_else(|| FloodMapError::StationNotFound(code.to_string()))
}

fn fetch_rows(
    client: &reqwest::blocking::Client,
    config: &ServiceConfig,
    station: &Station,
) -> Result<Vec<Row>, FloodMapError> {
    rid::fetch_hourly_rows(client, &config.rid_endpoint, station.code)
        .map(rid::chronological)
        .inspect_err(|e| logging::log_rid_failure(station.code, "hourly fetch", e))
}

fn show_stations(client: &reqwest::blocking::Client, config: &ServiceConfig) {
    let mut successful = 0;

    for station in STATION_REGISTRY {
        let thresholds = config.thresholds_for(station);
        match rid::fetch_snapshot(client, &config.rid_endpoint, station.code) {
            Ok(snapshot) => {
                successful += 1;
                let status = classify_level(snapshot.water_level_m, &thresholds);
                println!(
                    "{:<5} {:>8} m  {:<7} ({:<6}) {}",
                    station.code,
                    format_water_height(snapshot.water_level_m),
                    status,
                    status.color(),
                    station.name
                );
                println!("      {}", snapshot.details());
                if let Some(alert) = check_flood_level(station.code, snapshot.water_level_m, &thresholds) {
                    logging::warn(DataSource::Rid, Some(station.code), &alert.message);
                }
            }
            Err(e) => {
                logging::log_rid_failure(station.code, "snapshot", &e);
                let status = FloodStatus::Unknown;
                println!(
                    "{:<5} {:>8} m  {:<7} ({:<6}) {}",
                    station.code,
                    "N/A",
                    status,
                    status.color(),
                    station.name
                );
            }
        }
    }

    logging::log_fetch_summary(
        DataSource::Rid,
        STATION_REGISTRY.len(),
        successful,
        STATION_REGISTRY.len() - successful,
    );
}

fn print_forecast(station: &Station, config: &ServiceConfig, forecast: &StationForecast, visible: usize) {
    println!("{}", station.name);

    let current = forecast.readings.last().and_then(|r| r.value);
    let status = classify_level(current, &config.thresholds_for(station));
    println!("Current Water Level: {} m ({})", format_water_height(current), status);
    println!("Trend: {:+.4} m/h", forecast.trend);

    println!("\nPrevious Water Level Data");
    let page = history_table(&forecast.readings, visible);
    for row in &page.rows {
        let value = row.value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
        println!("{} {:<18} {:>8}", if row.highlighted { "*" } else { " " }, row.timestamp, value);
    }
    if page.has_more {
        println!(
            "  ... {} older readings (--visible {} for more)",
            forecast.readings.len() - page.rows.len(),
            next_visible(visible, config.page_size)
        );
    }

    println!("\nPredicted Water Levels (Next {} Hours)", forecast.predictions.len());
    for row in prediction_table(&forecast.predictions) {
        println!("  {:<18} {:>8.2}", row.timestamp, row.value.unwrap_or_default());
    }
}

fn print_json(station: &Station, forecast: &StationForecast, visible: usize) -> Result<(), serde_json::Error> {
    let labels = ChartLabels::default();
    let output = serde_json::json!({
        "station": station.code,
        "trend": forecast.trend,
        "chart": build_chart(&forecast.readings, &forecast.predictions, &labels),
        "history": history_table(&forecast.readings, visible),
        "predictions": forecast.predictions,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
