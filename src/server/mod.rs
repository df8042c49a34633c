mod album_routes;
pub mod config;
mod http_layers;
pub mod metrics;
mod playlist_routes;
pub mod server;
pub mod session;
mod song_routes;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use session::{Claims, TokenVerifier};
pub use state::ServerState;
