pub mod logging;
#[cfg(test)]
mod scenarios;

use application::command::engagement::EngagementStore;
use application::projector::listening_history::HistoryProjector;
use application::query::catalog::CatalogQueries;
use application::query::config::ViewConfig;
use application::query::ranking::RankingEngine;
use application::query::sampling::SamplingEngine;
use application::shared::{Clock, SnapshotGate, SystemClock};
use domain::catalog::CatalogStore;
use infra::config::AppConfigImpl;
use log::info;
use std::sync::Arc;

/// 参与度核心的装配结果，供上层 API 使用
///
/// 所有组件共享同一个曲库和同一个快照闸门。
pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub catalog: Arc<dyn CatalogStore>,
    pub engagement: Arc<EngagementStore>,
    pub ranking: Arc<RankingEngine>,
    pub sampling: Arc<SamplingEngine>,
    pub history: Arc<HistoryProjector>,
    pub queries: CatalogQueries,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, app_cfg: AppConfigImpl) -> Self {
        Self::with_clock(catalog, app_cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<dyn CatalogStore>,
        app_cfg: AppConfigImpl,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = SnapshotGate::new();
        let view_cfg: Arc<dyn ViewConfig> = Arc::new(app_cfg.clone());

        let state = Self {
            engagement: Arc::new(EngagementStore::new(
                catalog.clone(),
                clock,
                gate.clone(),
            )),
            ranking: Arc::new(RankingEngine::new(
                catalog.clone(),
                gate.clone(),
                view_cfg.clone(),
            )),
            sampling: Arc::new(SamplingEngine::new(
                catalog.clone(),
                gate.clone(),
                view_cfg.clone(),
            )),
            history: Arc::new(HistoryProjector::new(catalog.clone(), gate)),
            queries: CatalogQueries::new(catalog.clone()),
            catalog,
            app_cfg,
        };
        info!(
            "Engagement core initialized, top size {}, sample size {}, seeded sampling {}",
            view_cfg.default_top_size(),
            view_cfg.default_sample_size(),
            view_cfg.sample_seed().is_some()
        );
        state
    }
}
