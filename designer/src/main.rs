//! Headless designer entry point
//!
//! Builds one form from command line flags, submits it once and writes the
//! exported markdown design.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use designer::services::{GeminiDesignGenerator, UnsplashImageSearch};
use designer::{DesignSession, DesignerConfig};
use shared::logging::{self, Component};
use shared::{session_info, Amenity, Budget, FormFieldsPatch, Priority, RoomPatch, Scenario, SessionId};

#[derive(Parser, Debug)]
#[command(name = "designer")]
#[command(about = "Generate a home design from the command line")]
struct Args {
    /// Design scenario (real-estate-development, home-renovation, architectural-firm)
    #[arg(long, default_value = "real-estate-development")]
    scenario: Scenario,

    /// Architectural style, e.g. "Modern" or "Craftsman"
    #[arg(long)]
    style: String,

    /// Budget range (economy, mid-range, luxury)
    #[arg(long, default_value = "mid-range")]
    budget: Budget,

    /// Design focus (function, aesthetics, balance)
    #[arg(long, default_value = "balance")]
    priority: Priority,

    /// Total square footage
    #[arg(long)]
    sqft: u32,

    /// Room as "name[:size[:notes]]"; repeat for each room, in order
    #[arg(long = "room", required = true)]
    rooms: Vec<String>,

    /// Amenity to include; repeatable
    #[arg(long = "amenity")]
    amenities: Vec<Amenity>,

    /// Free-text requirements
    #[arg(long, default_value = "")]
    requirements: String,

    /// Output file; defaults to the export's suggested name
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional .env file to read credentials from
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Per-call timeout for the generator and image search, at least one second
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Number of inspiration images
    #[arg(long, default_value = "3")]
    max_images: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Parse a `name[:size[:notes]]` room flag
fn parse_room(spec: &str) -> anyhow::Result<RoomPatch> {
    let mut parts = spec.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim().to_string();

    let size = match parts.next().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<f64>()
                .with_context(|| format!("Invalid size {raw:?} for room {spec:?}"))?,
        ),
    };

    let notes = parts.next().map(|n| n.trim().to_string()).unwrap_or_default();

    Ok(RoomPatch {
        name: Some(name),
        size: Some(size),
        notes: Some(notes),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(Component::Designer, Some(&args.log_level));
    logging::log_startup("headless designer");

    let config = match &args.env_file {
        Some(path) => DesignerConfig::from_env_file(path)?,
        None => DesignerConfig::from_env()?,
    }
    .with_request_timeout(Duration::from_secs(args.timeout_secs))
    .with_max_images(args.max_images);

    let generator = Arc::new(GeminiDesignGenerator::from_config(&config)?);
    let search = Arc::new(UnsplashImageSearch::from_config(&config)?);
    let session = DesignSession::new(SessionId::new(), generator, search, config.session_settings());

    session
        .update_fields(FormFieldsPatch {
            scenario: Some(args.scenario),
            style: Some(args.style.clone()),
            budget: Some(args.budget),
            priority: Some(args.priority),
            square_footage: Some(Some(args.sqft)),
            amenities: Some(args.amenities.iter().copied().collect()),
            requirements: Some(args.requirements.clone()),
        })
        .await;

    for spec in &args.rooms {
        let patch = parse_room(spec)?;
        let index = session.add_room().await;
        session.update_room(index, patch).await?;
    }

    let submission = match session.submit().await {
        Ok(submission) => submission,
        Err(e) => {
            logging::log_error(Some(session.id()), "Design generation", &e);
            if e.is_retryable() {
                bail!("{e} (temporary failure, try again)");
            }
            bail!(e);
        }
    };

    let document = session.export().await?;
    let path = args.output.unwrap_or_else(|| PathBuf::from(&document.file_name));
    std::fs::write(&path, &document.content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    session_info!(
        session.id(),
        path = %path.display(),
        images = submission.entry.image_results.len(),
        "Design written"
    );
    println!("{}", path.display());

    logging::log_shutdown("design complete");
    Ok(())
}
