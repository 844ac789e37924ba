use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use land_compare::estimate::DEFAULT_PROJECTION_YEARS;
use land_compare::{
    read_polygon, report, svg, typst, AreaMethod, Config, HttpCalculationClient, LandUseType,
    Polygon, Session, WGS84Point,
};

/// Compare solar and reforestation impact of polygons.
#[derive(Parser)]
#[command(name = "land-compare", version)]
struct Cli {
    /// Polygon files (kml, gpx, geojson) or directories to use for solar.
    #[arg(long)]
    solar: Vec<PathBuf>,
    /// Polygon files or directories to use for reforestation.
    #[arg(long)]
    reforestation: Vec<PathBuf>,
    /// Latitude coefficients are requested for (default: first polygon centroid).
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Longitude coefficients are requested for.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Do not contact the calculation service; use the default coefficients.
    #[arg(long)]
    offline: bool,
    /// Calculation endpoint (overrides LAND_COMPARE_API_URL).
    #[arg(long)]
    api_url: Option<String>,
    /// Movement in km before coefficients are requested again.
    #[arg(long)]
    threshold_km: Option<f64>,
    /// Request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long, value_enum, default_value_t = AreaMethod::Geodesic)]
    area: AreaMethod,
    /// Horizon for the cumulative figures.
    #[arg(long, default_value_t = DEFAULT_PROJECTION_YEARS)]
    years: u32,
    /// Write an SVG preview of the polygons.
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Write a Typst report.
    #[arg(long)]
    typst: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(km) = self.threshold_km {
            config.set_recalc_threshold_km("--threshold-km", km);
        }
        if let Some(secs) = self.timeout_secs {
            config.set_request_timeout_secs("--timeout-secs", secs);
        }
        config
    }
}

fn load(paths: &[PathBuf], land_use: LandUseType) -> land_compare::Result<Vec<(Polygon, LandUseType)>> {
    let mut ret = Vec::new();
    for path in paths {
        for polygon in read_polygon::read_path(path)? {
            polygon.info();
            ret.push((polygon, land_use));
        }
    }
    Ok(ret)
}

async fn run(cli: Cli) -> land_compare::Result<()> {
    let config = cli.config();
    log::debug!("config: {:?}", config);

    let mut polygons = load(&cli.solar, LandUseType::Solar)?;
    polygons.extend(load(&cli.reforestation, LandUseType::Reforestation)?);
    if polygons.is_empty() {
        log::warn!("no polygons given, see --solar / --reforestation");
    }

    let mut session = Session::with_config(&config);
    let location = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => WGS84Point::new(lat, lon),
        _ => polygons
            .first()
            .and_then(|(p, _)| p.centroid())
            .unwrap_or_else(|| session.location()),
    };
    session.handle_center_change(location);

    if cli.offline {
        log::info!("offline: using default coefficients");
    } else {
        let api = HttpCalculationClient::new(&config)?;
        let mut land_uses: Vec<LandUseType> = polygons.iter().map(|(_, t)| *t).collect();
        land_uses.sort();
        land_uses.dedup();
        for land_use in land_uses {
            // a failed request leaves the defaults in place
            if let Err(e) = session.fetch_coefficients(&api, location, land_use).await {
                eprintln!("warning: {} coefficients unavailable ({}), using defaults", land_use, e);
            }
        }
    }

    for (polygon, land_use) in polygons {
        let area = polygon.area(cli.area)?;
        session.set_land_use_type(land_use);
        session.toggle_draw();
        session.handle_draw_end(area, polygon);
    }

    print!("{}", report::summary(&session, cli.years));

    let preview = svg::SVG::from_polygons(session.polygons().polygons())?.map(|s| s.render());
    if let Some(path) = &cli.svg {
        match &preview {
            Some(svg) => {
                std::fs::write(path, svg)?;
                log::info!("wrote {}", path.display());
            }
            None => log::warn!("nothing to draw, skipping {}", path.display()),
        }
    }
    if let Some(path) = &cli.typst {
        let doc = typst::make_typst_document(&session, cli.years, preview.as_deref());
        std::fs::write(path, doc)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
