use crate::cli::BuildArgs;
use crate::config::PolyfillConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use fob_polyfill::InjectorOptions;
use heck::ToLowerCamelCase;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Configuration file picked up from the working directory.
pub const CONFIG_FILE: &str = "fob-polyfill.json";

/// Prefix of environment overrides (`FOB_POLYFILL_OUT_DIR`, ...).
const ENV_PREFIX: &str = "FOB_POLYFILL_";

impl PolyfillConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &BuildArgs, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match &args.config {
            Some(path) => {
                let path = cwd.join(path);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // FOB_POLYFILL_OUT_DIR -> outDir
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lower_camel_case().into()),
        );

        figment = figment.merge(Serialized::defaults(Self::cli_overrides(args)));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: format!("Check {CONFIG_FILE} syntax and field types"),
        })?;

        config.library = cwd.join(&config.library);
        config.out_dir = cwd.join(&config.out_dir);
        Ok(config)
    }

    /// Fields set on the command line, and nothing else.
    fn cli_overrides(args: &BuildArgs) -> Value {
        let mut overrides = Map::new();
        if let Some(library) = &args.library {
            overrides.insert("library".into(), json!(library));
        }
        if let Some(out_dir) = &args.out_dir {
            overrides.insert("outDir".into(), json!(out_dir));
        }
        if let Some(public_path) = &args.public_path {
            overrides.insert("publicPath".into(), json!(public_path));
        }
        if let Some(filename) = &args.filename {
            overrides.insert("filename".into(), json!(filename));
        }
        if let Some(hash_length) = args.hash_length {
            overrides.insert("hashLength".into(), json!(hash_length));
        }

        let mut defaults = InjectorOptions::new();
        if !args.polyfills.is_empty() {
            defaults = defaults.with_polyfills(args.polyfills.clone());
        }
        if !args.excludes.is_empty() {
            defaults = defaults.with_excludes(args.excludes.clone());
        }
        if args.single_file {
            defaults = defaults.with_single_file(true);
        }
        if let Some(banner) = &args.banner {
            defaults = defaults.with_banner(banner.clone());
        }
        if defaults != InjectorOptions::default() {
            overrides.insert("defaults".into(), json!(defaults));
        }

        if !args.modules.is_empty() {
            let entry = InjectorOptions::new().with_modules(args.modules.clone());
            let mut entries = Map::new();
            entries.insert(args.entry_name.clone(), json!(entry));
            overrides.insert("entries".into(), Value::Object(entries));
        }

        Value::Object(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_env_keys_map_to_camel_case() {
        assert_eq!("OUT_DIR".to_lower_camel_case(), "outDir");
        assert_eq!("public_path".to_lower_camel_case(), "publicPath");
        assert_eq!("hash_length".to_lower_camel_case(), "hashLength");
        assert_eq!("LIBRARY".to_lower_camel_case(), "library");
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = PolyfillConfig::load(&BuildArgs::default(), temp.path()).unwrap();
        assert_eq!(config.out_dir, temp.path().join("dist"));
        assert_eq!(config.filename, "[name].js");
        assert!(config.entries.is_empty());
    }

    #[test]
    fn test_file_then_cli() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{
                "outDir": "public",
                "publicPath": "/static/",
                "defaults": { "polyfills": ["Promise"] },
                "entries": { "app": { "modules": ["./src/app.js"] } }
            }"#,
        )
        .unwrap();

        let args = BuildArgs {
            public_path: Some("/cdn/".to_string()),
            modules: vec!["./src/admin.js".to_string()],
            entry_name: "admin".to_string(),
            ..BuildArgs::default()
        };
        let config = PolyfillConfig::load(&args, temp.path()).unwrap();

        assert_eq!(config.out_dir, temp.path().join("public"));
        assert_eq!(config.public_path, "/cdn/");
        assert_eq!(config.entries.len(), 2);
        assert_eq!(
            config.defaults.polyfills.clone().map(|p| p.into_vec()),
            Some(vec!["Promise".to_string()])
        );
    }

    #[test]
    fn test_missing_explicit_config() {
        let temp = TempDir::new().unwrap();
        let args = BuildArgs {
            config: Some("nope.json".into()),
            ..BuildArgs::default()
        };
        assert!(PolyfillConfig::load(&args, temp.path()).is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), r#"{ "outdir": "x" }"#).unwrap();
        assert!(PolyfillConfig::load(&BuildArgs::default(), temp.path()).is_err());
    }
}
