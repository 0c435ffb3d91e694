use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

use statement_to_csv::{
    DEFAULT_OCR_LANGUAGE, DEFAULT_RENDER_DPI, ExtractOptions, HeaderPolicy, RENDER_DPI_RANGE,
};

use crate::models::{DEFAULT_BIND_ADDR, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PREVIEW_ROWS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub work_dir: PathBuf,
    pub ocr_language: String,
    pub render_dpi: u32,
    pub preview_rows: usize,
    pub max_upload_bytes: usize,
    pub drop_repeated_headers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let bind_raw = value("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = parse_value(&bind_raw, "BIND_ADDR")?;
        let work_dir = value("WORK_DIR").map_or_else(std::env::temp_dir, PathBuf::from);
        let ocr_language = value("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string());
        let render_dpi = value("OCR_DPI")
            .map(|raw| parse_value(&raw, "OCR_DPI"))
            .transpose()?
            .unwrap_or(DEFAULT_RENDER_DPI);
        let preview_rows = value("PREVIEW_ROWS")
            .map(|raw| parse_value(&raw, "PREVIEW_ROWS"))
            .transpose()?
            .unwrap_or(DEFAULT_PREVIEW_ROWS);
        let max_upload_bytes = value("MAX_UPLOAD_BYTES")
            .map(|raw| parse_value(&raw, "MAX_UPLOAD_BYTES"))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let drop_repeated_headers = value("DROP_REPEATED_HEADERS").is_some_and(|raw| {
            let lowered = raw.to_ascii_lowercase();
            lowered == "true" || lowered == "1" || lowered == "yes"
        });

        if !RENDER_DPI_RANGE.contains(&render_dpi) {
            return Err(ConfigError {
                key: "OCR_DPI",
                message: format!(
                    "{render_dpi} is outside {}..={}",
                    RENDER_DPI_RANGE.start(),
                    RENDER_DPI_RANGE.end()
                ),
            });
        }
        if preview_rows == 0 {
            return Err(ConfigError {
                key: "PREVIEW_ROWS",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            work_dir,
            ocr_language,
            render_dpi,
            preview_rows,
            max_upload_bytes,
            drop_repeated_headers,
        })
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            render_dpi: self.render_dpi,
            header_policy: if self.drop_repeated_headers {
                HeaderPolicy::DropRepeated
            } else {
                HeaderPolicy::FirstRowOnly
            },
            ..ExtractOptions::default()
        }
    }
}

fn parse_value<T>(raw: &str, key: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|error| ConfigError {
        key,
        message: format!("'{raw}': {error}"),
    })
}
