pub mod api;
mod api_doc;
mod server;
mod state;
mod ui;

pub use server::{router, run_server, serve};
pub use state::{AppState, DashboardSettings};
