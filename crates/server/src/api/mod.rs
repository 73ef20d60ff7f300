pub mod collections;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod shows;
pub mod ws;

pub use routes::create_router;
pub use ws::{spawn_catalog_forwarder, spawn_heartbeat, WsBroadcaster, WsMessage};
