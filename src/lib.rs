pub mod api;
pub mod core;

pub use api::coach::VideoCoach;

/// Install the `env_logger` backend; level comes from `RUST_LOG`, default `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
