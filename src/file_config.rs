//! INI configuration loading.
//!
//! Shipper settings live in a `[shipper]` section:
//!
//! ```ini
//! [shipper]
//! host = logs.example.com
//! port = 9000
//! secret = s3cret
//! source = web-1
//! interval_ms = 10000
//! ```
//!
//! Parsing uses the `rust-ini` crate; every recognised key maps onto a
//! [`ShipperBuilder`] setter so file and code configuration share validation.

use std::{fs, io::ErrorKind, path::Path, str::FromStr};

use ini::{Ini, Properties};

use crate::{builder::ShipperBuilder, error::ShipperBuildError};

const SECTION: &str = "shipper";

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ShipperBuildError> {
    value.trim().parse().map_err(|_| {
        ShipperBuildError::InvalidConfig(format!("{key} must be a non-negative integer, got {value:?}"))
    })
}

fn apply_section(props: &Properties) -> Result<ShipperBuilder, ShipperBuildError> {
    let mut builder = ShipperBuilder::new();
    let mut host = None;
    let mut port = None;
    for (key, value) in props.iter() {
        builder = match key {
            "host" => {
                host = Some(value.to_owned());
                builder
            }
            "port" => {
                port = Some(parse_number::<u16>(key, value)?);
                builder
            }
            "secret" => builder.with_secret(value),
            "source" => builder.with_source(value),
            "interval_ms" => builder.with_interval_ms(parse_number(key, value)?),
            "overflow_capacity" => builder.with_overflow_capacity(parse_number(key, value)?),
            "connect_timeout_ms" => builder.with_connect_timeout_ms(parse_number(key, value)?),
            "write_timeout_ms" => builder.with_write_timeout_ms(parse_number(key, value)?),
            "max_frame_size" => builder.with_max_frame_size(parse_number(key, value)?),
            "warn_interval_ms" => builder.with_warn_interval_ms(parse_number(key, value)?),
            other => {
                return Err(ShipperBuildError::InvalidConfig(format!(
                    "unknown key {other:?} in [{SECTION}]"
                )));
            }
        };
    }
    match (host, port) {
        (Some(host), Some(port)) => Ok(builder.with_collector(host, port)),
        (None, _) => Err(ShipperBuildError::InvalidConfig(format!(
            "[{SECTION}] requires a host"
        ))),
        (_, None) => Err(ShipperBuildError::InvalidConfig(format!(
            "[{SECTION}] requires a port"
        ))),
    }
}

impl ShipperBuilder {
    /// Build a builder from INI text containing a `[shipper]` section.
    pub fn from_ini_str(text: &str) -> Result<Self, ShipperBuildError> {
        let ini = Ini::load_from_str(text)
            .map_err(|err| ShipperBuildError::InvalidConfig(format!("invalid INI: {err}")))?;
        let props = ini.section(Some(SECTION)).ok_or_else(|| {
            ShipperBuildError::InvalidConfig(format!("missing [{SECTION}] section"))
        })?;
        apply_section(props)
    }

    /// Read and parse the INI file at `path`.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ShipperBuildError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| ShipperBuildError::ConfigFile {
            path: path.to_path_buf(),
            reason: match err.kind() {
                ErrorKind::NotFound => "file does not exist".into(),
                _ => err.to_string(),
            },
        })?;
        if text.trim().is_empty() {
            return Err(ShipperBuildError::ConfigFile {
                path: path.to_path_buf(),
                reason: "file is empty".into(),
            });
        }
        Self::from_ini_str(&text).map_err(|err| match err {
            ShipperBuildError::InvalidConfig(reason) => ShipperBuildError::ConfigFile {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }
}
