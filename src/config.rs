use std::env;
use std::path::PathBuf;

/// Moving-average windows for the crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverConfig {
    /// Fast SMA window; also the first row index allowed to carry a signal.
    pub fast_window: usize,
    /// Slow SMA window.
    pub slow_window: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Spreadsheet used to seed an empty database on startup.
    pub seed_path: PathBuf,
    /// CSV series read by the strategy performance endpoint.
    pub signal_csv_path: PathBuf,
    pub crossover: CrossoverConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let crossover = CrossoverConfig {
            fast_window: env::var("SMA_FAST_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|w: &usize| *w > 0)
                .unwrap_or(defaults.crossover.fast_window),
            slow_window: env::var("SMA_SLOW_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|w: &usize| *w > 0)
                .unwrap_or(defaults.crossover.slow_window),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            seed_path: env::var("SEED_SPREADSHEET_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.seed_path),
            signal_csv_path: env::var("SIGNAL_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.signal_csv_path),
            crossover,
        }
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: PathBuf::from("stockdesk.db"),
            seed_path: PathBuf::from("HINDALCO_1D.xlsx"),
            signal_csv_path: PathBuf::from("HINDALCO_1D.csv"),
            crossover: CrossoverConfig::default(),
        }
    }
}
