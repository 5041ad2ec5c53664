use time::macros::format_description;
use tracing_subscriber::{EnvFilter, fmt::{self, time::LocalTime}, prelude::*};

use crate::configs::Config;

pub fn init(config: &Config) {
  // Determine the base log level
  let log_level = config
    .logging
    .as_ref()
    .and_then(|l| l.level.as_deref())
    .unwrap_or("info");

  let filters = config
    .logging
    .as_ref()
    .and_then(|l| l.filters.as_deref())
    .unwrap_or("");

  let filter_str = if filters.is_empty() {
    format!("{},hyper=warn,reqwest=warn", log_level)
  } else {
    format!("{},hyper=warn,reqwest=warn,{}", log_level, filters)
  };

  // RUST_LOG wins over the config file
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

  // stdout carries the extraction result, so logs go to stderr
  let stderr_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_timer(LocalTime::new(format_description!(
      "[hour]:[minute]:[second].[subsecond digits:3]"
    )))
    .with_target(true)
    .with_line_number(true)
    .with_file(false);

  let _ = tracing_subscriber::registry()
    .with(env_filter)
    .with(stderr_layer)
    .try_init();
}
