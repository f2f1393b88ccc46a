//! CamStream - record a hotspot-connected camera's live stream.
//!
//! The library finds the camera on the phone's local network, manages the
//! single recording session that mirrors its MJPEG stream into MP4 files,
//! and keeps local state (camera address, credentials, history).

pub mod api;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod recorder;
pub mod storage;
pub mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
///
/// Honours `RUST_LOG`; safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camstream=debug,camstream_lib=debug,reqwest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
