pub mod lifetime;
pub mod logging;
pub mod server;
