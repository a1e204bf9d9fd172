pub use crate::{
    config::{StoreConfig, StoreProvider, ENV_STORAGE},
    http::CounterHandler,
    server::TallyServer,
};

mod config;
pub mod counter;
pub mod error;
mod http;
pub mod metrics;
mod server;
pub mod store;
