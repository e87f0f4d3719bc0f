//! Application state shared by all handlers

use scholarly_core::AppConfig;
use scholarly_mail::{ContactQueue, SiteLinks};
use scholarly_rag::RagPipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<RagPipeline>,
    pub contact_queue: Arc<dyn ContactQueue>,
    pub site_links: SiteLinks,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        pipeline: Arc<RagPipeline>,
        contact_queue: Arc<dyn ContactQueue>,
    ) -> Self {
        let site_links = SiteLinks::from(&config.email);
        Self {
            config,
            pipeline,
            contact_queue,
            site_links,
        }
    }

    pub fn debug(&self) -> bool {
        self.config.server.debug
    }
}
