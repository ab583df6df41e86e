// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use shopdeck_app::{InventoryFilterMode, LOW_STOCK_THRESHOLD, SERVER_LOW_STOCK_QUERY};
use shopdeck_remote::MAX_PAGE_SIZE;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "shopdeck";
pub const ACCESS_TOKEN_ENV: &str = "SHOPDECK_ACCESS_TOKEN";
const CONFIG_PATH_ENV: &str = "SHOPDECK_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_VERSION: &str = "2024-01";
const DEFAULT_TRACKING_PAGE_SIZE: u32 = 10;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_MAX_PAGES: usize = 20;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub shop: Shop,
    #[serde(default)]
    pub fetch: Fetch,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            shop: Shop::default(),
            fetch: Fetch::default(),
            inventory: Inventory::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Shop {
    pub domain: Option<String>,
    pub api_version: Option<String>,
    pub access_token: Option<String>,
}

impl Default for Shop {
    fn default() -> Self {
        Self {
            domain: None,
            api_version: Some(DEFAULT_API_VERSION.to_owned()),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fetch {
    pub page_size: Option<i64>,
    pub tracking_page_size: Option<i64>,
    pub timeout: Option<String>,
    pub follow_pages: Option<bool>,
    pub max_pages: Option<i64>,
}

impl Default for Fetch {
    fn default() -> Self {
        Self {
            page_size: Some(i64::from(MAX_PAGE_SIZE)),
            tracking_page_size: Some(i64::from(DEFAULT_TRACKING_PAGE_SIZE)),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            follow_pages: Some(false),
            max_pages: Some(DEFAULT_MAX_PAGES as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryFilter {
    #[default]
    Client,
    Server,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    pub filter: Option<InventoryFilter>,
    pub threshold: Option<i64>,
    pub server_query: Option<String>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            filter: Some(InventoryFilter::Client),
            threshold: Some(LOW_STOCK_THRESHOLD),
            server_query: Some(SERVER_LOW_STOCK_QUERY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [shop], [fetch], [inventory], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(domain) = &self.shop.domain
            && domain.trim().is_empty()
        {
            bail!("shop.domain in {} must not be empty", path.display());
        }

        if let Some(api_version) = &self.shop.api_version
            && api_version.trim().is_empty()
        {
            bail!("shop.api_version in {} must not be empty", path.display());
        }

        for (key, value) in [
            ("fetch.page_size", self.fetch.page_size),
            ("fetch.tracking_page_size", self.fetch.tracking_page_size),
        ] {
            if let Some(size) = value
                && !(1..=i64::from(MAX_PAGE_SIZE)).contains(&size)
            {
                bail!(
                    "{key} in {} must be between 1 and {MAX_PAGE_SIZE}, got {size}",
                    path.display()
                );
            }
        }

        if let Some(max_pages) = self.fetch.max_pages
            && max_pages < 1
        {
            bail!(
                "fetch.max_pages in {} must be positive, got {}",
                path.display(),
                max_pages
            );
        }

        if let Some(timeout) = &self.fetch.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("fetch.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "fetch.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if self.inventory.filter == Some(InventoryFilter::Server)
            && self
                .inventory
                .server_query
                .as_deref()
                .is_some_and(|query| query.trim().is_empty())
        {
            bail!(
                "inventory.server_query in {} must not be empty when filter = \"server\"",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.trim().to_ascii_lowercase().as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                level
            );
        }

        Ok(())
    }

    pub fn shop_domain(&self) -> Result<&str> {
        self.shop
            .domain
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| anyhow!("shop.domain is not set; add it under [shop] in the config"))
    }

    pub fn api_version(&self) -> &str {
        self.shop
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION)
            .trim()
    }

    /// The configured token wins; the environment is the fallback.
    pub fn access_token(&self) -> Option<String> {
        self.shop
            .access_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| {
                env::var(ACCESS_TOKEN_ENV)
                    .ok()
                    .filter(|token| !token.trim().is_empty())
            })
    }

    pub fn page_size(&self) -> u32 {
        page_size_or(self.fetch.page_size, MAX_PAGE_SIZE)
    }

    pub fn tracking_page_size(&self) -> u32 {
        page_size_or(self.fetch.tracking_page_size, DEFAULT_TRACKING_PAGE_SIZE)
    }

    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_duration(self.fetch.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn follow_pages(&self) -> bool {
        self.fetch.follow_pages.unwrap_or(false)
    }

    pub fn max_pages(&self) -> usize {
        self.fetch
            .max_pages
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn inventory_mode(&self) -> InventoryFilterMode {
        match self.inventory.filter.unwrap_or_default() {
            InventoryFilter::Client => InventoryFilterMode::Client {
                threshold: self.inventory.threshold.unwrap_or(LOW_STOCK_THRESHOLD),
            },
            InventoryFilter::Server => InventoryFilterMode::Server {
                query: self
                    .inventory
                    .server_query
                    .clone()
                    .unwrap_or_else(|| SERVER_LOW_STOCK_QUERY.to_owned()),
            },
        }
    }

    pub fn log_level(&self) -> String {
        self.log
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .trim()
            .to_ascii_lowercase()
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => {
                let data_root = dirs::data_dir().ok_or_else(|| {
                    anyhow!("cannot resolve data directory; set log.file in the config")
                })?;
                Ok(data_root.join(APP_NAME).join("shopdeck.log"))
            }
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# shopdeck config\n# Place this file at: {}\n\nversion = 1\n\n[shop]\ndomain = \"example.myshopify.com\"\napi_version = \"{}\"\n# Or set {}\n# access_token = \"shpat_...\"\n\n[fetch]\npage_size = {}\ntracking_page_size = {}\ntimeout = \"{}\"\n# Follow pagination cursors instead of reading one page per view\nfollow_pages = false\nmax_pages = {}\n\n[inventory]\n# \"client\" keeps variants below threshold; \"server\" sends server_query\nfilter = \"client\"\nthreshold = {}\nserver_query = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Default is the platform data dir (for example ~/.local/share/shopdeck/shopdeck.log)\n# file = \"/absolute/path/to/shopdeck.log\"\n",
            path.display(),
            DEFAULT_API_VERSION,
            ACCESS_TOKEN_ENV,
            MAX_PAGE_SIZE,
            DEFAULT_TRACKING_PAGE_SIZE,
            DEFAULT_TIMEOUT,
            DEFAULT_MAX_PAGES,
            LOW_STOCK_THRESHOLD,
            SERVER_LOW_STOCK_QUERY,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn page_size_or(value: Option<i64>, default: u32) -> u32 {
    value
        .and_then(|size| u32::try_from(size).ok())
        .unwrap_or(default)
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
