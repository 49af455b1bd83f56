// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Legacy → target type-name mapping.
//!
//! A connection is replayable only if its legacy type has a target
//! counterpart. The lookup is pure and total: absence is an answer, not an
//! error.
//!
//! The built-in table follows the standard message packages, which keep
//! their names across the two frameworks: `pkg/Type` becomes `pkg/msg/Type`.
//! A few types were renamed or dropped and are listed explicitly. Extra
//! mappings can be loaded from TOML:
//!
//! ```toml
//! include_builtin = true
//!
//! [types]
//! "my_msgs/Foo" = "my_msgs/msg/Foo"
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::core::{BridgeError, Result};

/// Packages whose types map one-to-one onto `pkg/msg/Type`.
const BUILTIN_PACKAGES: &[&str] = &[
    "std_msgs",
    "geometry_msgs",
    "sensor_msgs",
    "nav_msgs",
    "tf2_msgs",
    "diagnostic_msgs",
    "visualization_msgs",
    "trajectory_msgs",
    "shape_msgs",
    "stereo_msgs",
    "actionlib_msgs",
    "rosgraph_msgs",
];

/// Types that moved to another package.
const BUILTIN_RENAMES: &[(&str, &str)] = &[("rosgraph_msgs/Log", "rcl_interfaces/msg/Log")];

/// Types in the packages above that have no target counterpart.
const BUILTIN_UNMAPPED: &[&str] = &[
    "std_msgs/Time",
    "std_msgs/Duration",
    "rosgraph_msgs/TopicStatistics",
];

/// TOML mapping configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TypeMappingConfig {
    /// Keep the built-in table underneath the explicit entries.
    #[serde(default = "default_include_builtin")]
    pub include_builtin: bool,
    /// Explicit legacy → target entries.
    #[serde(default)]
    pub types: HashMap<String, String>,
}

fn default_include_builtin() -> bool {
    true
}

impl Default for TypeMappingConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            types: HashMap::new(),
        }
    }
}

/// Legacy type name → target type name lookup.
#[derive(Debug, Clone, Default)]
pub struct TypeNameMapper {
    explicit: HashMap<String, String>,
    include_builtin: bool,
}

impl TypeNameMapper {
    /// Mapper with only the built-in table.
    pub fn builtin() -> Self {
        Self {
            explicit: HashMap::new(),
            include_builtin: true,
        }
    }

    /// Mapper that maps nothing until entries are added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mapper from a parsed configuration.
    pub fn from_config(config: TypeMappingConfig) -> Result<Self> {
        let mut mapper = Self {
            explicit: HashMap::with_capacity(config.types.len()),
            include_builtin: config.include_builtin,
        };
        for (legacy, target) in config.types {
            mapper.insert(legacy, target)?;
        }
        Ok(mapper)
    }

    /// Parse a TOML mapping configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TypeMappingConfig = toml::from_str(text)
            .map_err(|e| BridgeError::configuration(format!("invalid type mapping: {e}")))?;
        Self::from_config(config)
    }

    /// Load a TOML mapping configuration from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::configuration(format!(
                "cannot read type mapping {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Add or replace an explicit entry.
    pub fn insert(&mut self, legacy: impl Into<String>, target: impl Into<String>) -> Result<()> {
        let legacy = legacy.into();
        let target = target.into();
        if legacy.trim().is_empty() || target.trim().is_empty() {
            return Err(BridgeError::configuration(format!(
                "type mapping entries must be non-empty (got '{legacy}' = '{target}')"
            )));
        }
        self.explicit.insert(legacy, target);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_mapping(mut self, legacy: &str, target: &str) -> Result<Self> {
        self.insert(legacy, target)?;
        Ok(self)
    }

    /// Look up the target type for a legacy type.
    pub fn map(&self, legacy: &str) -> Option<String> {
        if let Some(target) = self.explicit.get(legacy) {
            return Some(target.clone());
        }
        if self.include_builtin {
            return builtin_map(legacy);
        }
        None
    }

    /// Whether a legacy type has a target counterpart.
    pub fn is_mapped(&self, legacy: &str) -> bool {
        self.map(legacy).is_some()
    }

    /// Process-wide mapper with the built-in table.
    pub fn global() -> &'static TypeNameMapper {
        static GLOBAL: OnceLock<TypeNameMapper> = OnceLock::new();
        GLOBAL.get_or_init(TypeNameMapper::builtin)
    }
}

fn builtin_map(legacy: &str) -> Option<String> {
    if let Some((_, target)) = BUILTIN_RENAMES.iter().find(|(from, _)| *from == legacy) {
        return Some((*target).to_string());
    }
    if BUILTIN_UNMAPPED.contains(&legacy) {
        return None;
    }
    let (package, name) = legacy.split_once('/')?;
    if name.is_empty() || name.contains('/') || !BUILTIN_PACKAGES.contains(&package) {
        return None;
    }
    Some(format!("{package}/msg/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_packages() {
        let mapper = TypeNameMapper::builtin();
        assert_eq!(mapper.map("std_msgs/String").as_deref(), Some("std_msgs/msg/String"));
        assert_eq!(
            mapper.map("sensor_msgs/Imu").as_deref(),
            Some("sensor_msgs/msg/Imu")
        );
        assert_eq!(mapper.map("my_msgs/Custom"), None);
    }

    #[test]
    fn test_builtin_renames_and_gaps() {
        let mapper = TypeNameMapper::builtin();
        assert_eq!(
            mapper.map("rosgraph_msgs/Log").as_deref(),
            Some("rcl_interfaces/msg/Log")
        );
        assert_eq!(mapper.map("std_msgs/Time"), None);
        assert_eq!(mapper.map("std_msgs/msg/String"), None);
        assert_eq!(mapper.map("std_msgs/"), None);
        assert_eq!(mapper.map("String"), None);
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let mapper = TypeNameMapper::builtin();
        assert_eq!(mapper.map("nav_msgs/Odometry"), mapper.map("nav_msgs/Odometry"));
    }

    #[test]
    fn test_empty_mapper() {
        let mapper = TypeNameMapper::empty().with_mapping("pkg/TypeX", "pkg/msg/TypeX").unwrap();
        assert_eq!(mapper.map("pkg/TypeX").as_deref(), Some("pkg/msg/TypeX"));
        assert!(!mapper.is_mapped("pkg/TypeY"));
        assert!(!mapper.is_mapped("std_msgs/String"));
    }

    #[test]
    fn test_toml_config() {
        let mapper = TypeNameMapper::from_toml_str(
            r#"
[types]
"my_msgs/Foo" = "my_msgs/msg/Foo"
"std_msgs/String" = "example_interfaces/msg/String"
"#,
        )
        .unwrap();
        assert_eq!(mapper.map("my_msgs/Foo").as_deref(), Some("my_msgs/msg/Foo"));
        // Explicit entries shadow the built-in table
        assert_eq!(
            mapper.map("std_msgs/String").as_deref(),
            Some("example_interfaces/msg/String")
        );
        assert!(mapper.is_mapped("geometry_msgs/Pose"));
    }

    #[test]
    fn test_toml_without_builtin() {
        let mapper = TypeNameMapper::from_toml_str(
            "include_builtin = false\n[types]\n\"a/B\" = \"a/msg/B\"\n",
        )
        .unwrap();
        assert!(mapper.is_mapped("a/B"));
        assert!(!mapper.is_mapped("std_msgs/String"));
    }

    #[test]
    fn test_invalid_config() {
        let err = TypeNameMapper::from_toml_str("types = 3").unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Configuration);

        let err = TypeNameMapper::from_toml_str("[types]\n\"a/B\" = \"\"\n").unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Configuration);

        let err = TypeNameMapper::from_toml_str("unknown_key = true").unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_file() {
        let err = TypeNameMapper::from_file("/nonexistent/mapping.toml").unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::Configuration);
    }

    #[test]
    fn test_global_is_shared() {
        let a = TypeNameMapper::global() as *const _;
        let b = TypeNameMapper::global() as *const _;
        assert_eq!(a, b);
        assert!(TypeNameMapper::global().is_mapped("std_msgs/Header"));
    }
}
