use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_export_dir() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_export_dir() -> String { ".".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

/// Like [`load_from_file`], but a missing file yields the defaults.
/// A file that exists and cannot be read or parsed is still an error.
pub fn load_from_file_or_default(path: &str) -> Result<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(anyhow!("cannot read config file {path}: {e}")),
    };
    toml::from_str(&content).map_err(|e| anyhow!("invalid config file {path}: {e}"))
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, defaults otherwise. Not yet validated, so
    /// callers can apply overrides before [`AppConfig::normalize_and_validate`].
    pub fn load_or_default() -> Result<Self> {
        load_from_file_or_default(&config_path())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize_from_env();
        self.api.validate()?;
        if self.export.dir.trim().is_empty() {
            self.export.dir = default_export_dir();
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn normalize_from_env(&mut self) {
        if self.base_url.trim().is_empty() {
            if let Ok(url) = std::env::var("API_URL") {
                self.base_url = url;
            }
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow!("api.base_url is empty; set it in config.toml or the API_URL environment variable"));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.base_url must start with http:// or https://"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:3000/api/"

            [export]
            dir = "exports"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.export.dir, "exports");
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut api = ApiConfig { base_url: " https://debts.example.com/ ".into() };
        api.normalize_from_env();
        assert_eq!(api.base_url, "https://debts.example.com");
        assert!(api.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let api = ApiConfig { base_url: "ftp://debts.example.com".into() };
        assert!(api.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("configs-missing-{}.toml", std::process::id()));
        let cfg = load_from_file_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.export.dir, ".");
        assert!(cfg.api.base_url.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("configs-broken-{}.toml", std::process::id()));
        std::fs::write(&path, "[export]\ndir = \"unterminated\n").unwrap();
        let err = load_from_file_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn existing_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("configs-ok-{}.toml", std::process::id()));
        std::fs::write(&path, "[export]\ndir = \"exports\"\n").unwrap();
        let cfg = load_from_file_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.export.dir, "exports");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn defaults_when_sections_missing() {
        let cfg: AppConfig = toml::from_str("[api]\nbase_url = \"http://x\"\n").unwrap();
        assert_eq!(cfg.export.dir, ".");
        assert_eq!(cfg.logging.format, LogFormat::Compact);
    }
}
