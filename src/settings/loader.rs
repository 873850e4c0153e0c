//! Settings loader with tier-based merging.
//!
//! Loads the `[tool.django]` section of a pyproject document and merges
//! tiers in a fixed order, resolving every entry through the directive
//! engine: base settings, then per-app overrides, then the docker tier
//! (when the docker env var is set non-empty), then the production tier
//! (when the production env var equals its expected value). Later tiers
//! overwrite entries already in the accumulator; the production tier also
//! forces `DEBUG` to false.

use super::resolve::{Resolver, Scope, normalize_key};
use crate::error::{SettingsError, SettingsResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The flat mapping of setting names to resolved values.
pub type Settings = Map<String, Value>;

/// Document file name used when no explicit path is given.
pub const DEFAULT_DOCUMENT: &str = "pyproject.toml";

/// The required top-level section, as a dotted key path.
const SECTION: &str = "tool.django";

/// Section keys that hold tiers or metadata rather than base settings.
const TIER_SECTION_KEYS: [&str; 4] = ["production", "docker", "apps", "poetry"];

/// Builder-style loader for pyproject settings documents.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
    upper: bool,
    docker_env: String,
    production_env: (String, String),
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Create a loader with the default activation knobs: documents are
    /// read from `./pyproject.toml`, keys are uppercased, the docker tier
    /// activates when `DJANGO_ENV` is set, and the production tier
    /// activates when `DJANGO_ENV` equals `production`.
    pub fn new() -> Self {
        Self {
            path: None,
            upper: true,
            docker_env: "DJANGO_ENV".to_string(),
            production_env: ("DJANGO_ENV".to_string(), "production".to_string()),
        }
    }

    /// Set an explicit document path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Control case folding of output keys.
    pub fn with_upper(mut self, upper: bool) -> Self {
        self.upper = upper;
        self
    }

    /// Set the env var whose presence activates the docker tier.
    pub fn with_docker_env(mut self, var: impl Into<String>) -> Self {
        self.docker_env = var.into();
        self
    }

    /// Set the env var and expected value that activate the production tier.
    pub fn with_production_env(
        mut self,
        var: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        self.production_env = (var.into(), expected.into());
        self
    }

    /// The document path this loader will read.
    pub fn document_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT))
    }

    /// Load and resolve settings from the document.
    ///
    /// The accumulator is seeded with `DEBUG = true` and tiers are merged
    /// in base → apps → docker → production order. Fails fast on a
    /// missing document, a parse error, or an absent `[tool.django]`
    /// section; no partial settings are ever returned.
    pub fn load(&self) -> SettingsResult<Settings> {
        let path = self.document_path();
        let document = read_document(&path)?;
        let section = django_section(&document, &path)?;
        let scope = build_scope(&document, section, self.upper);
        let resolver = Resolver::new(&path, &scope, self.upper);

        let mut settings = Settings::new();
        settings.insert("DEBUG".to_string(), Value::Bool(true));

        // Base tier.
        for (key, value) in section {
            if TIER_SECTION_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (key, value) = resolver.resolve_entry(key, value);
            settings.insert(key, value);
        }

        // Apps tier: each app's entries merge over the base settings.
        if let Some(Value::Object(apps)) = section.get("apps") {
            for (app, entries) in apps {
                let Value::Object(entries) = entries else {
                    warn!(app = %app, "app entry is not a table, skipping");
                    continue;
                };
                debug!(app = %app, "merging app settings");
                for (key, value) in entries {
                    let (key, value) = resolver.resolve_entry(key, value);
                    settings.insert(key, value);
                }
            }
        }

        // Docker tier.
        if env_is_set(&self.docker_env) {
            debug!(var = %self.docker_env, "docker tier active");
            merge_tier(section, "docker", &resolver, &mut settings);
        }

        // Production tier: overrides everything and disables DEBUG.
        if env_equals(&self.production_env.0, &self.production_env.1) {
            debug!(var = %self.production_env.0, "production tier active");
            settings.insert("DEBUG".to_string(), Value::Bool(false));
            merge_tier(section, "production", &resolver, &mut settings);
        }

        Ok(settings)
    }

    /// Load the fully parsed, unresolved document.
    ///
    /// Validates that the `[tool.django]` section is present, but does
    /// not run the resolver; callers get direct access to the raw tree.
    pub fn load_document(&self) -> SettingsResult<Value> {
        let path = self.document_path();
        let document = read_document(&path)?;
        django_section(&document, &path)?;
        Ok(document)
    }
}

/// Resolve every entry of a named tier table over the accumulator.
fn merge_tier(
    section: &Map<String, Value>,
    tier: &str,
    resolver: &Resolver<'_>,
    settings: &mut Settings,
) {
    let Some(Value::Object(entries)) = section.get(tier) else {
        return;
    };
    for (key, value) in entries {
        let (key, value) = resolver.resolve_entry(key, value);
        settings.insert(key, value);
    }
}

/// Build the resolver's lookup scope: trimmed base-tier entries under
/// normalized keys, plus the `[tool.poetry]` metadata table.
fn build_scope(document: &Value, section: &Map<String, Value>, upper: bool) -> Scope {
    let mut entries = Map::new();
    for (key, value) in section {
        if TIER_SECTION_KEYS.contains(&key.as_str()) {
            continue;
        }
        entries.insert(normalize_key(key, upper), value.clone());
    }

    let metadata = match document.pointer("/tool/poetry") {
        Some(Value::Object(poetry)) => poetry.clone(),
        _ => Map::new(),
    };

    Scope::new(entries, metadata)
}

/// Read and parse the document into a raw value tree.
fn read_document(path: &Path) -> SettingsResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|err| SettingsError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Extract the required `[tool.django]` table.
fn django_section<'a>(
    document: &'a Value,
    path: &Path,
) -> SettingsResult<&'a Map<String, Value>> {
    document
        .pointer("/tool/django")
        .and_then(Value::as_object)
        .ok_or_else(|| SettingsError::MissingSection {
            path: path.to_path_buf(),
            section: SECTION.to_string(),
        })
}

/// True when the variable is set to a non-empty value.
fn env_is_set(var: &str) -> bool {
    std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false)
}

/// True when the variable equals the expected value.
fn env_equals(var: &str, expected: &str) -> bool {
    std::env::var(var).map(|v| v == expected).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_document(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("pyproject.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    #[serial_test::serial]
    fn test_load_base_settings() {
        temp_env::with_var_unset("DJANGO_ENV", || {
            let dir = TempDir::new().unwrap();
            let path = write_document(
                &dir,
                r#"
[tool.django]
secret_key = "abc"
allowed_hosts = ["localhost"]
"#,
            );

            let settings = SettingsLoader::new().with_path(&path).load().unwrap();
            assert_eq!(settings.get("SECRET_KEY"), Some(&json!("abc")));
            assert_eq!(settings.get("ALLOWED_HOSTS"), Some(&json!(["localhost"])));
            // Seeded default.
            assert_eq!(settings.get("DEBUG"), Some(&json!(true)));
        });
    }

    #[test]
    fn test_load_without_upper() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.django]
secret_key = "abc"
"#,
        );

        let settings = SettingsLoader::new()
            .with_path(&path)
            .with_upper(false)
            .load()
            .unwrap();
        assert_eq!(settings.get("secret_key"), Some(&json!("abc")));
        assert_eq!(settings.get("SECRET_KEY"), None);
    }

    #[test]
    fn test_apps_merge_over_base() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.django]
language_code = "en-us"

[tool.django.apps.blog]
language_code = "de"
blog_posts_per_page = 10
"#,
        );

        let settings = SettingsLoader::new().with_path(&path).load().unwrap();
        assert_eq!(settings.get("LANGUAGE_CODE"), Some(&json!("de")));
        assert_eq!(settings.get("BLOG_POSTS_PER_PAGE"), Some(&json!(10)));
    }

    #[test]
    fn test_path_directive_resolves_against_document() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.django]
static_root = { path = "../static" }
"#,
        );

        let settings = SettingsLoader::new().with_path(&path).load().unwrap();
        let expected = dir
            .path()
            .parent()
            .unwrap()
            .join("static")
            .to_string_lossy()
            .into_owned();
        assert_eq!(settings.get("STATIC_ROOT"), Some(&json!(expected)));
    }

    #[test]
    fn test_insert_reads_base_scope() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.django]
installed_apps = ["django.contrib.admin", "django.contrib.auth"]

[tool.django.apps.blog]
installed_apps = { insert = "blog" }
"#,
        );

        let settings = SettingsLoader::new().with_path(&path).load().unwrap();
        assert_eq!(
            settings.get("INSTALLED_APPS"),
            Some(&json!([
                "django.contrib.admin",
                "django.contrib.auth",
                "blog"
            ]))
        );
    }

    #[test]
    fn test_poetry_metadata_available_to_concat() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.poetry]
name = "my-project"
version = "0.3.1"

[tool.django]
release = { con = "v", poetry = "version" }
"#,
        );

        let settings = SettingsLoader::new().with_path(&path).load().unwrap();
        assert_eq!(settings.get("RELEASE"), Some(&json!("v0.3.1")));
    }

    #[test]
    fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        let err = SettingsLoader::new().with_path(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::NotFound { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_document(&dir, "this is not toml = = =");
        let err = SettingsLoader::new().with_path(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_missing_section() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.poetry]
name = "my-project"
"#,
        );
        let err = SettingsLoader::new().with_path(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::MissingSection { .. }));
        assert!(err.to_string().contains("tool.django"));
    }

    #[test]
    fn test_load_document_returns_raw_tree() {
        let dir = TempDir::new().unwrap();
        let path = write_document(
            &dir,
            r#"
[tool.poetry]
name = "my-project"

[tool.django]
secret_key = { env = "SECRET_KEY" }
"#,
        );

        let document = SettingsLoader::new()
            .with_path(&path)
            .load_document()
            .unwrap();
        assert_eq!(
            document.pointer("/tool/poetry/name"),
            Some(&json!("my-project"))
        );
        // Directives come back unresolved.
        assert_eq!(
            document.pointer("/tool/django/secret_key/env"),
            Some(&json!("SECRET_KEY"))
        );
    }
}
