use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lanka_bus_core::clients::{GoogleMapsClient, OverpassClient};
use lanka_bus_core::halt_entry::{add_from_url, add_new_halt, parse_coordinate, select_range};
use lanka_bus_core::render::{draw_halts, draw_route};
use lanka_bus_core::{HaltHarvester, MapRenderer, Pipeline, RouteBuilder, Settings, default_routes};
use lanka_bus_transit::store::read_route;
use lanka_bus_transit::{Direction, HaltCache, LatLng, RouteKey};

#[derive(Parser, Debug)]
#[command(
    name = "lanka-bus",
    author,
    version,
    about = "Build bus route and halt data from map services",
    long_about = "Fetches bus route geometry from Google Directions or OpenStreetMap, \
                  collects the halts along each route from Google Places, and draws \
                  route and halt maps.\n\n\
                  Commands that call Google read the API key from GMAPS_API_KEY."
)]
struct Cli {
    /// Directory holding halts.json, routes/ and segments/
    #[arg(long, env = "LANKA_BUS_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Directory rendered maps are written to
    #[arg(long, default_value = "images", global = true)]
    image_dir: PathBuf,

    /// Max distance in meters between a route and a halt it serves
    #[arg(long, default_value_t = 50.0, global = true)]
    threshold_m: f64,

    /// Area name the Overpass route search is limited to
    #[arg(long, default_value = "Colombo", global = true)]
    area: String,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a halt from a Google Maps place link
    AddHalt { url: String },

    /// Add a halt by name and coordinates
    AddNewHalt {
        name: String,
        #[arg(allow_hyphen_values = true)]
        lat: String,
        #[arg(allow_hyphen_values = true)]
        lng: String,
    },

    /// Open halts START through END in a browser
    ///
    /// Both ends are included, so `inspect-halts 0 4` opens five halts. This
    /// is not a half-open slice: END itself is opened too.
    InspectHalts {
        #[arg(allow_negative_numbers = true)]
        start: i64,
        #[arg(allow_negative_numbers = true)]
        end: i64,
    },

    /// Build a route from Google Directions between two places
    BuildRoute {
        route_num: String,
        direction: Direction,
        start: String,
        end: String,
    },

    /// Build a route from its OpenStreetMap relation
    OverpassRoute { route_num: String, direction: Direction },

    /// Search for halts along every stored route
    BuildHalts,

    /// Draw a stored route with the halts it passes
    DrawRoute { route_num: String, direction: Direction },

    /// Draw every known halt
    DrawHalts,

    /// Build the default routes, their halts and all maps
    Pipeline,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings {
        data_dir: cli.data_dir,
        image_dir: cli.image_dir,
        threshold_m: cli.threshold_m,
        overpass_area: cli.area,
        ..Settings::default()
    };
    let layout = settings.layout();
    let halts_path = layout.halts_path();
    let mut cache = HaltCache::new();

    match cli.command {
        Command::AddHalt { url } => {
            let halt = add_from_url(&mut cache, &halts_path, &url)
                .with_context(|| format!("Failed to add halt from {url}"))?;
            info!("{} at {}", halt.name(), halt.latlng());
        }

        Command::AddNewHalt { name, lat, lng } => {
            let latlng = LatLng::new(parse_coordinate(&lat)?, parse_coordinate(&lng)?);
            let halt = add_new_halt(&mut cache, &halts_path, &name, latlng)
                .with_context(|| format!("Failed to add halt {name:?}"))?;
            info!("{} at {}", halt.name(), halt.latlng());
        }

        Command::InspectHalts { start, end } => {
            let halts = cache.list_all(&halts_path)?;
            let selected = select_range(&halts, start, end)?;
            info!(
                "{} halts (indexes {start} to {end}) of {}",
                selected.len(),
                halts.len()
            );
            for (i, halt) in (start..).zip(selected) {
                let url = halt.maps_url();
                info!("[{i}] {}: {url}", halt.name());
                if let Err(e) = webbrowser::open(&url) {
                    warn!("Could not open a browser for {url}: {e}");
                }
            }
        }

        Command::BuildRoute {
            route_num,
            direction,
            start,
            end,
        } => {
            let directions = GoogleMapsClient::from_env(&settings)?;
            let key = RouteKey::new(route_num, direction);
            let route = RouteBuilder::new(&layout, cache.index(&halts_path)?, settings.threshold_m)
                .build(key.clone(), &start, &end, &directions)
                .with_context(|| format!("Failed to build route {key}"))?;
            info!(
                "Route {key}: {} points, {:.1} km",
                route.latlng_list.len(),
                route.length_m() / 1000.0
            );
        }

        Command::OverpassRoute {
            route_num,
            direction,
        } => {
            let relations = OverpassClient::new(&settings)?;
            let key = RouteKey::new(route_num, direction);
            let route = RouteBuilder::new(&layout, cache.index(&halts_path)?, settings.threshold_m)
                .build_from_overpass(key.clone(), &relations)
                .with_context(|| format!("Failed to build route {key} from Overpass"))?;
            info!("Route {key}: {} points", route.latlng_list.len());
        }

        Command::BuildHalts => {
            let places = GoogleMapsClient::from_env(&settings)?;
            let halts = HaltHarvester::new(&places, &settings)
                .build_all(&layout, &mut cache)
                .context("Failed to build halts")?;
            info!("{} halts in {}", halts.len(), halts_path.display());
        }

        Command::DrawRoute {
            route_num,
            direction,
        } => {
            let key = RouteKey::new(route_num, direction);
            let route = read_route(&layout.route_path(&key))
                .with_context(|| format!("Route {key} has not been built"))?;
            let renderer = MapRenderer::new(&settings)?;
            draw_route(
                &renderer,
                &route,
                &*cache.index(&halts_path)?,
                settings.threshold_m,
                &settings.route_image_path(&key),
            )?;
        }

        Command::DrawHalts => {
            let halts = cache.list_all(&halts_path)?;
            let renderer = MapRenderer::new(&settings)?;
            draw_halts(&renderer, &halts, &settings.halts_image_path())?;
        }

        Command::Pipeline => {
            let google = GoogleMapsClient::from_env(&settings)?;
            let renderer = MapRenderer::new(&settings)?;
            let pipeline = Pipeline {
                settings: &settings,
                directions: &google,
                places: &google,
                renderer: &renderer,
            };
            pipeline
                .run(&default_routes(), &mut cache)
                .context("Pipeline failed")?;
        }
    }

    Ok(())
}
