use crate::actions::TaskActions;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub actions: TaskActions,
    pub config: Config,
}
