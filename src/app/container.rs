use std::sync::Arc;

use crate::adapters::{ChafaRenderer, FastfetchInfo, FfmpegDecoder};
use crate::app::{inspect_interactor::InspectInteractor, prepare_interactor::PrepareInteractor};
use crate::config_initialization::AppConfig;
use crate::planner::SegmentPlanner;
use crate::playback::Player;
use crate::ports::{DecoderPort, RendererPort, SystemInfoPort};

pub trait AppContainer: Send + Sync {
    fn prepare_interactor(&self) -> Arc<PrepareInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn system_info(&self) -> Arc<dyn SystemInfoPort>;
    fn player(&self) -> Arc<Player>;
}

pub struct DefaultAppContainer {
    prepare_interactor: Arc<PrepareInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
    system_info: Arc<dyn SystemInfoPort>,
    player: Arc<Player>,
}

impl DefaultAppContainer {
    /// Wire the external-tool adapters named in `config`
    pub fn new(config: &AppConfig) -> Self {
        let decoder = Arc::new(FfmpegDecoder::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
        ));
        let renderer = Arc::new(ChafaRenderer::new(
            config.chafa_path.clone(),
            &config.chafa_arguments,
        ));
        let system_info = Arc::new(FastfetchInfo::new(config.fastfetch_path.clone()));

        Self::with_ports(
            decoder as Arc<dyn DecoderPort>,
            renderer as Arc<dyn RendererPort>,
            system_info as Arc<dyn SystemInfoPort>,
            SegmentPlanner::detect(),
            Player::new(config.ffplay_path.clone()),
        )
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        decoder: Arc<dyn DecoderPort>,
        renderer: Arc<dyn RendererPort>,
        system_info: Arc<dyn SystemInfoPort>,
        planner: SegmentPlanner,
        player: Player,
    ) -> Self {
        Self {
            prepare_interactor: Arc::new(PrepareInteractor::new(decoder, renderer, planner)),
            inspect_interactor: Arc::new(InspectInteractor::new()),
            system_info,
            player: Arc::new(player),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn prepare_interactor(&self) -> Arc<PrepareInteractor> {
        Arc::clone(&self.prepare_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn system_info(&self) -> Arc<dyn SystemInfoPort> {
        Arc::clone(&self.system_info)
    }

    fn player(&self) -> Arc<Player> {
        Arc::clone(&self.player)
    }
}
