// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader.
//!
//! Lookup order: `./vigil.toml` > `~/.config/vigil/vigil.toml` > `/etc/vigil/vigil.toml`,
//! with `VIGIL_` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VigilConfig;

/// Sections that env var names are split on.
const SECTIONS: &[&str] = &[
    "transcript",
    "delivery",
    "streaming",
    "redaction",
    "gateway",
    "logging",
];

/// Load configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<VigilConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<VigilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file path with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<VigilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The layered figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VigilConfig::default()))
        .merge(Toml::file("/etc/vigil/vigil.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vigil/vigil.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vigil.toml"))
        .merge(env_provider())
}

/// Env provider mapping `VIGIL_<SECTION>_<KEY>` to `section.key`.
///
/// Keys contain underscores (`fetch_timeout_secs`), so only the first
/// separator after a known section name becomes a dot.
fn env_provider() -> Env {
    Env::prefixed("VIGIL_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(
            map_env_key("delivery_fetch_timeout_secs"),
            "delivery.fetch_timeout_secs"
        );
        assert_eq!(
            map_env_key("streaming_subscriber_queue_size"),
            "streaming.subscriber_queue_size"
        );
        assert_eq!(map_env_key("gateway_port"), "gateway.port");
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[gateway]\nport = 9000\n")?;
            jail.set_env("VIGIL_GATEWAY_PORT", "9100");
            jail.set_env("VIGIL_DELIVERY_FETCH_TIMEOUT_SECS", "3");
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.gateway.port, 9100);
            assert_eq!(config.delivery.fetch_timeout_secs, 3);
            Ok(())
        });
    }
}
