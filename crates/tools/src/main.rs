use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use globe::{Color, GlobeConfig, Rotation};
use tools::{
    apply_values, country_rows, format_legend, format_table, headless_view, parse_values,
    summarize_topology,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect globe geography, metadata and value colorings")]
struct Cli {
    /// Globe config as JSON (missing fields take defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// TopoJSON geography
    #[arg(long)]
    topology: PathBuf,

    /// JSON array of country metadata records keyed by `iso_n3`
    #[arg(long)]
    metadata: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the topology layers and the country layer
    Inspect {
        /// TopoJSON geography
        #[arg(long)]
        topology: PathBuf,
    },

    /// Print the country table, optionally colored from values
    Countries {
        #[command(flatten)]
        data: DataArgs,

        /// Country values: `{"004": 1.5}` or `[{"iso_n3": 4, "value": 1.5}]`
        #[arg(long)]
        values: Option<PathBuf>,

        /// Color of the maximum value
        #[arg(long, default_value = "#08306b")]
        max_color: String,

        /// Top of the color scale (default: largest value)
        #[arg(long)]
        max_value: Option<f64>,

        /// Color of zero (default: palette min color)
        #[arg(long)]
        min_color: Option<String>,

        /// Number of legend cells to print
        #[arg(long, default_value_t = 5)]
        legend_cells: usize,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the centroid of a country and the rotation that centres it
    Centroid {
        #[command(flatten)]
        data: DataArgs,

        /// ISO numeric code, e.g. 4 or 004
        id: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GlobeConfig::from_json(&read(path)?).map_err(|e| format!("{path:?}: {e}"))?,
        None => GlobeConfig::default(),
    };

    match cli.command {
        Command::Inspect { topology } => cmd_inspect(&topology, &config),
        Command::Countries {
            data,
            values,
            max_color,
            max_value,
            min_color,
            legend_cells,
            json,
        } => {
            let max_color = parse_color(&max_color)?;
            let min_color = min_color.as_deref().map(parse_color).transpose()?;
            cmd_countries(
                &data,
                config,
                values.as_deref(),
                (max_color, max_value, min_color),
                legend_cells,
                json,
            )
        }
        Command::Centroid { data, id } => cmd_centroid(&data, config, &id),
    }
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::parse(s).map_err(|e| e.to_string())
}

fn cmd_inspect(topology: &Path, config: &GlobeConfig) -> Result<(), String> {
    let summary = summarize_topology(&read(topology)?, &config.layer)?;
    let payload = serde_json::to_string_pretty(&summary).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_countries(
    data: &DataArgs,
    config: GlobeConfig,
    values: Option<&Path>,
    (max_color, max_value, min_color): (Color, Option<f64>, Option<Color>),
    legend_cells: usize,
    json: bool,
) -> Result<(), String> {
    let mut view = headless_view(&read(&data.topology)?, &read(&data.metadata)?, config)
        .map_err(|e| e.to_string())?;

    if let Some(path) = values {
        let values = parse_values(&read(path)?)?;
        let unknown = apply_values(&mut view, &values);
        info!(
            applied = values.len() - unknown.len(),
            unknown = unknown.len(),
            "values applied"
        );
        view.recompute_colors_from_values(max_color, max_value, min_color);
    }

    let rows = country_rows(&view);
    let legend = view.legend(legend_cells);
    if json {
        let payload = serde_json::json!({ "countries": rows, "legend": legend });
        let text = serde_json::to_string_pretty(&payload).map_err(|e| format!("json: {e}"))?;
        println!("{text}");
    } else {
        print!("{}", format_table(&rows));
        if !legend.is_empty() {
            println!();
            print!("{}", format_legend(&legend));
        }
    }
    Ok(())
}

fn cmd_centroid(data: &DataArgs, config: GlobeConfig, id: &str) -> Result<(), String> {
    let view = headless_view(&read(&data.topology)?, &read(&data.metadata)?, config)
        .map_err(|e| e.to_string())?;
    let id = formats::normalize_iso_n3(&serde_json::Value::String(id.to_string()))
        .ok_or_else(|| format!("invalid country code: {id}"))?;
    let country = view
        .country(&id)
        .ok_or_else(|| format!("unknown country: {id}"))?;
    let centroid = view
        .atlas()
        .centroid(&id)
        .ok_or_else(|| format!("country {id} has no geometry"))?;
    let rotation = Rotation::centered_on(centroid);

    println!(
        "{id} {}: centroid lon {:.4} lat {:.4}, rotation [{:.4}, {:.4}]",
        country.name().unwrap_or("(unnamed)"),
        centroid.lon_deg,
        centroid.lat_deg,
        rotation.lon_deg,
        rotation.lat_deg
    );
    Ok(())
}
