use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn, gateway::PaymentGateway};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: AppConfig,
    /// None until gateway keys are configured; checkout reports this to the user.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
}
