//! Language registry: compile/run command templates per language key.
//!
//! The table lives in `files/languages.toml` and is embedded at build
//! time. The registry is built once at startup and never mutated; it is
//! passed by reference into every compiled unit.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use crate::template::CommandTemplate;

/// Command templates and metadata for one supported language.
#[derive(Debug)]
pub struct LanguageSpec {
    /// Primary registry key (also the canonical file extension).
    pub key: String,
    /// Human-readable name for reports.
    pub display_name: String,
    /// Compile command. Interpreted languages carry a no-op or
    /// syntax-check command so the compile step is uniform.
    pub compile: CommandTemplate,
    /// Run command.
    pub run: CommandTemplate,
    /// Whether build output must be scanned for a class file to resolve
    /// `__class__` (JVM-family languages).
    pub class_scan: bool,
}

/// Raw TOML form of a language entry.
#[derive(Debug, Deserialize)]
struct RawLanguage {
    display_name: String,
    compile: String,
    run: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    class_scan: bool,
}

/// Immutable mapping from language key (or alias) to [`LanguageSpec`].
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: HashMap<String, Arc<LanguageSpec>>,
}

impl LanguageRegistry {
    /// Load the built-in language table.
    pub fn builtin() -> anyhow::Result<Self> {
        let content = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));
        Self::from_toml(content)
    }

    /// Parse a registry from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, RawLanguage> = toml::from_str(content)?;

        let mut languages = HashMap::new();
        for (key, raw) in raw {
            let spec = Arc::new(LanguageSpec {
                key: key.clone(),
                display_name: raw.display_name,
                compile: CommandTemplate::parse(&raw.compile)
                    .with_context(|| format!("invalid compile template for {}", key))?,
                run: CommandTemplate::parse(&raw.run)
                    .with_context(|| format!("invalid run template for {}", key))?,
                class_scan: raw.class_scan,
            });

            languages.insert(key.to_lowercase(), spec.clone());
            for alias in raw.aliases {
                languages.insert(alias.to_lowercase(), spec.clone());
            }
        }

        Ok(Self { languages })
    }

    /// Look up a language by key or alias (case-insensitive).
    pub fn get(&self, key: &str) -> Option<Arc<LanguageSpec>> {
        self.languages.get(&key.to_lowercase()).cloned()
    }

    /// Look up the language for a source file, by its extension.
    pub fn for_source(&self, path: &Path) -> Option<Arc<LanguageSpec>> {
        let ext = path.extension()?.to_str()?;
        self.get(ext)
    }

    /// All registered keys and aliases, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.languages.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateContext;

    #[test]
    fn test_builtin_loads() {
        let registry = LanguageRegistry::builtin().unwrap();
        for key in ["cpp", "c", "go", "py", "java", "sh", "txt"] {
            assert!(registry.get(key).is_some(), "missing language {}", key);
        }
    }

    #[test]
    fn test_alias_lookup() {
        let registry = LanguageRegistry::builtin().unwrap();
        let by_alias = registry.get("python3").unwrap();
        assert_eq!(by_alias.key, "py");
        assert!(registry.get("RUST").is_some());
    }

    #[test]
    fn test_unknown_language() {
        let registry = LanguageRegistry::builtin().unwrap();
        assert!(registry.get("brainfuck").is_none());
    }

    #[test]
    fn test_class_scan_flags() {
        let registry = LanguageRegistry::builtin().unwrap();
        assert!(registry.get("java").unwrap().class_scan);
        assert!(registry.get("scala").unwrap().class_scan);
        assert!(!registry.get("cpp").unwrap().class_scan);
    }

    #[test]
    fn test_for_source_by_extension() {
        let registry = LanguageRegistry::builtin().unwrap();
        let spec = registry.for_source(Path::new("dir/main.cpp")).unwrap();
        assert_eq!(spec.key, "cpp");
        assert!(registry.for_source(Path::new("no_extension")).is_none());
    }

    #[test]
    fn test_templates_usable() {
        let registry = LanguageRegistry::builtin().unwrap();
        let ctx = TemplateContext::for_source("main.cpp").unwrap();
        let argv = registry
            .get("cpp")
            .unwrap()
            .compile
            .instantiate(&ctx)
            .unwrap();
        assert_eq!(argv[0], "g++");
        assert_eq!(argv.last().unwrap(), "main.cpp");
    }
}
