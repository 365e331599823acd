//! Command implementations

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::prepare_interactor::{PrepareRequest, PrepareResponse};
use crate::cli::Cli;
use crate::config_initialization::{initialize_configuration_hierarchy, AppConfig};
use crate::domain::model::{normalize_renderer_args, InputIdentity, ParameterSet, SoundRequest};
use crate::error::{AnifetchError, AnifetchResult};
use crate::playback::template::{build_template, info_lines_or_blank, terminal_width, write_template};
use crate::playback::PlaybackAssets;
use crate::utils::logging::LoggingSystem;
use crate::utils::path::PathUtils;

/// Full command-line flow: configuration, logging, then the requested action
pub fn run(cli: Cli) -> Result<()> {
    let resolution =
        initialize_configuration_hierarchy(&cli).context("Invalid configuration")?;

    let logging = LoggingSystem::new(resolution.config.logging.clone());
    logging.initialize()?;
    logging.log_system_info();
    for note in &resolution.notes {
        info!("{}", note);
    }

    let container = DefaultAppContainer::new(&resolution.config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &resolution.config, &container, &mut out, None)?;
    Ok(())
}

/// Build the immutable parameter set of this run
pub fn build_parameters(cli: &Cli, config: &AppConfig) -> AnifetchResult<ParameterSet> {
    let input_path = PathUtils::new().absolute(&cli.file)?;
    let identity = InputIdentity::compute(&input_path);
    if !identity.is_present() {
        return Err(AnifetchError::InputFileNotFound {
            path: input_path.display().to_string(),
        });
    }

    let params = ParameterSet {
        input_path,
        identity,
        width: config.width,
        height: config.height,
        framerate: config.framerate,
        renderer_args: normalize_renderer_args(&config.chafa_arguments),
        chroma: config.chroma.as_deref().map(|c| c.trim().to_string()),
        sound: SoundRequest::from_flag(cli.sound.as_deref().map(str::trim)),
    };
    params.validate()?;
    Ok(params)
}

/// Dispatch `--inspect`, `--prepare-only` or playback. `frame_limit`
/// bounds playback, `None` loops forever.
pub fn execute<C, W>(
    cli: &Cli,
    config: &AppConfig,
    container: &C,
    out: &mut W,
    frame_limit: Option<u64>,
) -> AnifetchResult<()>
where
    C: AppContainer + ?Sized,
    W: Write,
{
    let params = build_parameters(cli, config)?;

    if cli.inspect {
        let inspector = container.inspect_interactor();
        let response = inspector.execute(&params, &config.cache_dir)?;
        writeln!(out, "{}", inspector.format_as_json(&response)?)?;
        return Ok(());
    }

    let request = PrepareRequest {
        params,
        cache_root: config.cache_dir.clone(),
        playback_rate: config.playback_rate,
        force_render: cli.force_render,
    };
    let prepared = container.prepare_interactor().execute(&request)?;
    if let Err(e) = write_static_template(container, &prepared, request.params.width as usize) {
        warn!("Could not write static template: {}", e);
    }

    if cli.prepare_only {
        info!(
            "Assets ready ({}): {} frames in {}",
            if prepared.cache_hit { "cached" } else { "rebuilt" },
            prepared.record.num_frames,
            prepared.layout.ascii_dir().display()
        );
        return Ok(());
    }

    let assets = PlaybackAssets {
        ascii_dir: prepared.layout.ascii_dir(),
        template_file: prepared.layout.template_file(),
        audio: prepared.record.sound_saved_path.clone(),
        width: request.params.width as usize,
        height: prepared.record.resolved_height as usize,
        framerate: request.params.framerate,
        playback_rate: config.playback_rate,
    };
    container.player().play(&assets, out, frame_limit)
}

fn write_static_template<C: AppContainer + ?Sized>(
    container: &C,
    prepared: &PrepareResponse,
    width: usize,
) -> AnifetchResult<()> {
    let height = prepared.record.resolved_height as usize;
    let info = info_lines_or_blank(container.system_info().as_ref(), height);
    let lines = build_template(&info, width, height, terminal_width());
    write_template(&prepared.layout.template_file(), &lines)
}
