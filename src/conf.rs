use std::path::{Path, PathBuf};
use std::time::Duration;

use twelf::reexports::serde::{Deserialize, Serialize};
use twelf::{config, Layer};

use crate::error::LoaderError;

pub const ENV_PREFIX: &str = "OGC_LOADER_";
pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "ogc";

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

/// The checkout's `resources/` when it is still around, otherwise a
/// `resources/` directory next to the executable.
pub fn default_resources() -> PathBuf {
    let bundled = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"));
    if bundled.is_dir() {
        return bundled;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
        .unwrap_or(bundled)
}

#[config]
#[derive(Debug, Default)]
pub struct Config {
    #[serde(default = "default_url")]
    url: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    root_certificates: Option<PathBuf>,
    #[serde(default)]
    insecure: bool,
    #[serde(default)]
    timeout_seconds: Option<u64>,
    #[serde(default = "default_index")]
    index: String,
    #[serde(default = "default_resources")]
    resources: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    url: String,
    basic_auth: Option<BasicAuth>,
    root_certificates: Option<PathBuf>,
    insecure: bool,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password: Option<String>,
}

/// Layers an optional config file (TOML, or JSON by extension) under
/// `OGC_LOADER_*` environment variables.
pub fn load(path: Option<&Path>) -> crate::error::Result<Config> {
    let mut layers = Vec::new();
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => layers.push(Layer::Json(path.to_path_buf())),
            _ => layers.push(Layer::Toml(path.to_path_buf())),
        }
    }
    layers.push(Layer::Env(Some(ENV_PREFIX.to_string())));

    Config::with_layers(&layers)
        .map_err(|e| LoaderError::Config(format!("failed to load config {:?}: {}", path, e)))
}

impl Config {
    pub fn get_url(&self) -> &String {
        &self.url
    }
    pub fn get_index(&self) -> &String {
        &self.index
    }
    pub fn get_resources(&self) -> &PathBuf {
        &self.resources
    }
    pub fn set_url(&mut self, url: String) {
        self.url = url;
    }
    pub fn set_index(&mut self, index: String) {
        self.index = index;
    }
    pub fn set_resources(&mut self, resources: PathBuf) {
        self.resources = resources;
    }
    pub fn set_insecure(&mut self, insecure: bool) {
        self.insecure = insecure;
    }

    pub fn endpoint(&self) -> Endpoint {
        let basic_auth = self.username.as_ref().map(|username| BasicAuth {
            username: username.clone(),
            password: self.password.clone(),
        });
        Endpoint {
            url: self.url.trim_end_matches('/').to_string(),
            basic_auth,
            root_certificates: self.root_certificates.clone(),
            insecure: self.insecure,
            timeout_seconds: self.timeout_seconds,
        }
    }
}

impl BasicAuth {
    pub fn get_username(&self) -> &String {
        &self.username
    }
    pub fn get_password(&self) -> &Option<String> {
        &self.password
    }
}

impl Endpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            basic_auth: None,
            root_certificates: None,
            insecure: false,
            timeout_seconds: None,
        }
    }
    pub fn get_url(&self) -> &String {
        &self.url
    }
    pub fn get_root_certificates(&self) -> &Option<PathBuf> {
        &self.root_certificates
    }
    pub fn is_insecure(&self) -> bool {
        self.insecure
    }
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
    pub fn has_basic_auth(&self) -> bool {
        self.basic_auth.is_some()
    }
    pub fn get_username(&self) -> String {
        if let Some(basic_auth) = &self.basic_auth {
            basic_auth.get_username().clone()
        } else {
            String::default()
        }
    }
    pub fn get_password(&self) -> Option<String> {
        if let Some(basic_auth) = &self.basic_auth {
            return basic_auth.get_password().clone();
        }
        None
    }
}
