//! Command-line front end: draw overlays onto images, export measurement
//! tables, and call the analysis backend.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::io::Read;
    use std::path::{Path, PathBuf};

    use clap::{ArgAction, Args, Parser, Subcommand};
    use thiserror::Error;

    use clinview::api::{
        ApiClient, ApiError, Endpoints, ImageUpload, UreqTransport,
    };
    use clinview::config::{AppConfig, ConfigError};
    use clinview::format::{
        AnnotationFormat, ExportOptions, FormatError, FormatRegistry, SessionData,
        SessionJsonFormat,
    };
    use clinview::patient::{PatientContext, PatientDid, PatientError};
    use clinview::render::raster::composite;
    use clinview::render::RenderError;
    use clinview::soap::{self, SoapError};
    use clinview::transform::{ElementRect, Size};
    use clinview::viewer::{Effect, ImageViewer, ViewerMessage};
    use clinview::window_level::WindowLevel;

    #[derive(Debug, Error)]
    enum CliError {
        #[error("{0}")]
        Io(#[from] std::io::Error),
        #[error("{0}")]
        Image(#[from] image::ImageError),
        #[error("{0}")]
        Render(#[from] RenderError),
        #[error("{0}")]
        Format(#[from] FormatError),
        #[error("{0}")]
        Api(#[from] ApiError),
        #[error("{0}")]
        Soap(#[from] SoapError),
        #[error("{0}")]
        Patient(#[from] PatientError),
        #[error("{0}")]
        Json(#[from] serde_json::Error),
        #[error("{0}")]
        Config(#[from] ConfigError),
    }

    type Result<T> = std::result::Result<T, CliError>;

    #[derive(Parser, Debug)]
    #[command(
        name = "clinview",
        version,
        about = "Measurement overlay and analysis client for clinical images"
    )]
    struct Cli {
        /// Backend base URL (overrides the config file)
        #[arg(long, global = true)]
        api_url: Option<String>,

        /// Bearer token for the backend
        #[arg(long, global = true)]
        token: Option<String>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Draw a saved session (and optionally detected landmarks) onto an image
        Render(RenderArgs),
        /// Convert a saved session to another export format
        Export(ExportArgs),
        /// Detect facial landmarks and print them as JSON
        Landmarks(ImageArgs),
        /// Run the diagnosis model for a patient
        Analyze(AnalyzeArgs),
        /// Print the Grad-CAM explanation for an image
        Explain(ImageArgs),
        /// Print a patient's evolution timeline and trend
        Evolution(PatientArgs),
        /// Check that the backend is up
        Health,
        /// Split a SOAP note into its sections
        Soap(SoapArgs),
        /// Show or initialize the configuration file
        Config(ConfigArgs),
    }

    #[derive(Args, Debug)]
    struct RenderArgs {
        /// Source image
        image: PathBuf,
        /// Output PNG path
        #[arg(long)]
        out: PathBuf,
        /// Session JSON with measurements, angles and notes
        #[arg(long)]
        session: Option<PathBuf>,
        /// Ask the backend for facial landmarks and draw them
        #[arg(long, action = ArgAction::SetTrue)]
        detect_landmarks: bool,
        /// Window width applied before drawing
        #[arg(long)]
        window_width: Option<f32>,
        /// Window center applied before drawing
        #[arg(long)]
        window_center: Option<f32>,
    }

    #[derive(Args, Debug)]
    struct ExportArgs {
        /// Session JSON to read
        session: PathBuf,
        /// Export format id
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output directory (defaults to the configured export folder)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    }

    #[derive(Args, Debug)]
    struct ImageArgs {
        image: PathBuf,
    }

    #[derive(Args, Debug)]
    struct AnalyzeArgs {
        image: PathBuf,
        /// Patient DID the analysis is recorded under
        #[arg(long)]
        patient: String,
        /// Use the model ensemble (overrides the config file)
        #[arg(long, action = ArgAction::SetTrue)]
        ensemble: bool,
    }

    #[derive(Args, Debug)]
    struct PatientArgs {
        patient: String,
    }

    #[derive(Args, Debug)]
    struct SoapArgs {
        /// Note file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Fail when any of S, O, A, P is missing
        #[arg(long, action = ArgAction::SetTrue)]
        strict: bool,
    }

    #[derive(Args, Debug)]
    struct ConfigArgs {
        /// Write the current settings to the default path
        #[arg(long, action = ArgAction::SetTrue)]
        init: bool,
    }

    pub fn main() {
        let cli = Cli::parse();
        let config = AppConfig::load_or_default();

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        if let Err(err) = run(cli, config) {
            log::error!("{}", err);
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }

    fn run(cli: Cli, config: AppConfig) -> Result<()> {
        let base_url = cli
            .api_url
            .as_deref()
            .unwrap_or(&config.preferences.api_base_url);
        let mut endpoints = Endpoints::new(base_url);
        if let Some(token) = &cli.token {
            endpoints = endpoints.with_token(token.as_str());
        }
        let client = ApiClient::new(endpoints, UreqTransport::new());

        match cli.command {
            Commands::Render(args) => command_render(args, &config, &client),
            Commands::Export(args) => command_export(args, &config),
            Commands::Landmarks(args) => {
                let analysis = client.detect_landmarks(&ImageUpload::from_path(&args.image)?)?;
                print_json(&serde_json::json!({
                    "total": analysis.total,
                    "key_landmarks": analysis.key_landmarks(),
                    "metrics": analysis.metrics,
                }))
            }
            Commands::Analyze(args) => {
                let patient = PatientContext::for_patient(PatientDid::parse(&args.patient)?);
                let upload = ImageUpload::from_path(&args.image)?;
                let use_ensemble = args.ensemble || config.preferences.use_ensemble;
                print_json(&client.analyze(&patient, &upload, use_ensemble)?)
            }
            Commands::Explain(args) => {
                print_json(&client.explain(&ImageUpload::from_path(&args.image)?)?)
            }
            Commands::Evolution(args) => {
                print_json(&client.evolution(&PatientDid::parse(&args.patient)?)?)
            }
            Commands::Health => print_json(&client.health()?),
            Commands::Soap(args) => command_soap(args),
            Commands::Config(args) => {
                if args.init {
                    config.save_to_default_path()?;
                }
                if let Some(path) = AppConfig::default_path() {
                    eprintln!("{}", path.display());
                }
                println!("{}", config.to_json()?);
                Ok(())
            }
        }
    }

    fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn read_session(path: &Path) -> Result<SessionData> {
        let bytes = std::fs::read(path)?;
        Ok(SessionJsonFormat.import(&bytes)?)
    }

    fn command_render(
        args: RenderArgs,
        config: &AppConfig,
        client: &ApiClient<UreqTransport>,
    ) -> Result<()> {
        let mut image = image::open(&args.image)?.to_rgba8();
        let (width, height) = image.dimensions();

        if args.window_width.is_some() || args.window_center.is_some() {
            let wl = WindowLevel::new(
                args.window_width.unwrap_or(config.viewer.window_width),
                args.window_center.unwrap_or(config.viewer.window_center),
            );
            wl.apply(&mut image);
        }

        let mut viewer = ImageViewer::new(config.viewer.clone());
        viewer.update(ViewerMessage::LoadImage(args.image.display().to_string()));
        viewer.update(ViewerMessage::ImageLoaded {
            natural: Size::new(width as f32, height as f32),
            rect: ElementRect::new(0.0, 0.0, width as f32, height as f32),
        });

        if let Some(path) = &args.session {
            let bytes = std::fs::read(path)?;
            viewer.import_session("session", &bytes)?;
        }

        if args.detect_landmarks {
            if let Some(Effect::FetchLandmarks { ticket }) =
                viewer.update(ViewerMessage::DetectLandmarks)
            {
                let result = ImageUpload::from_path(&args.image)
                    .and_then(|upload| client.detect_landmarks(&upload));
                viewer.update(ViewerMessage::LandmarksReceived { ticket, result });
            }
            if let Some(status) = viewer.status() {
                log::warn!("{}", status);
            }
        }

        composite(&mut image, &viewer.scene())?;
        image.save(&args.out)?;
        log::info!("💾 Wrote {}", args.out.display());
        Ok(())
    }

    fn command_export(args: ExportArgs, config: &AppConfig) -> Result<()> {
        let data = read_session(&args.session)?;
        let registry = FormatRegistry::new();
        let file = registry
            .require(&args.format)?
            .export(&data, &ExportOptions::new())?;

        let dir = args.out_dir.unwrap_or_else(|| {
            if config.preferences.export_folder.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(&config.preferences.export_folder)
            }
        });
        let path = file.write_to_dir(&dir)?;
        println!("{}", path.display());
        Ok(())
    }

    fn command_soap(args: SoapArgs) -> Result<()> {
        let text = match &args.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            }
        };
        let note = if args.strict {
            soap::parse_strict(&text)?
        } else {
            soap::parse(&text)
        };
        print_json(&note)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
