use db::DBService;

pub mod auth;
pub mod error;
pub mod file_logging;
pub mod routes;

/// Shared handler state: the database pool plus one reusable HTTP client
/// for git hosting calls.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
        }
    }
}
