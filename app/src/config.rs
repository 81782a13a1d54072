use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::*;
use serde::{Deserialize, Serialize};

use crate::dishes::Dish;
use crate::orders::Order;

const ENV_PREFIX: &str = "GRUBDASH_";

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub seed: Option<SeedConfig>,
    #[serde(default)]
    pub orders: OrderRules,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SeedConfig {
    pub path: PathBuf,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct OrderRules {
    /// Whether an update may move an order to `delivered`.
    #[serde(default)]
    pub allow_delivered_status: bool,
}

/// Records to start the stores off with.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Seed {
    #[serde(default)]
    pub dishes: Vec<Dish>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Settings picked up from `GRUBDASH_*` environment variables, which win
/// over the config file.
#[derive(Deserialize, Debug, Default)]
pub struct Overrides {
    pub listen_addr: Option<SocketAddr>,
    pub seed_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EnvLogger {
    level: Option<LogLevel>,
    modules: HashMap<String, LogLevel>,
    timestamp_nanos: bool,
}

pub fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let mut config_buf = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut config_buf))
        .with_context(|| format!("read config {:?}", path))?;
    let config = toml::from_str(&config_buf).with_context(|| format!("parse config {:?}", path))?;
    Ok(config)
}

impl Config {
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(path) = overrides.seed_path.as_ref() {
            debug!("Seed path overridden from environment: {:?}", path);
            self.seed = Some(SeedConfig { path: path.clone() });
        }
    }

    pub fn load_seed(&self) -> Result<Seed> {
        match self.seed.as_ref() {
            Some(seed) => seed.load(),
            None => Ok(Seed::default()),
        }
    }
}

impl SeedConfig {
    pub fn load(&self) -> Result<Seed> {
        debug!("Load seed data from {:?}", self.path);
        let file = File::open(&self.path).with_context(|| format!("open seed {:?}", self.path))?;
        let seed: Seed = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parse seed {:?}", self.path))?;
        info!(
            "Loaded {} dishes and {} orders from {:?}",
            seed.dishes.len(),
            seed.orders.len(),
            self.path
        );
        Ok(seed)
    }
}

impl Overrides {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Overrides>(vars)
            .context("read environment overrides")?;
        Ok(overrides)
    }
}

impl LogLevel {
    fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}
