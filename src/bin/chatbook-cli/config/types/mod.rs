mod app;
mod logging;
mod runner;
mod storage;
mod translate;

const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

pub use app::AppConfig;
pub use logging::LoggingConfig;
pub use runner::RunnerConfig;
pub use storage::StorageConfig;
pub use translate::TranslateConfig;
