//! SDK versions and API levels.
//!
//! Modules declare their SDK constraints as user strings (`"current"`,
//! `"system_33"`, `"Tiramisu"`, `""`...). [`SdkSpec::parse`] turns them into a
//! kind and an [`ApiLevel`]; resolution to the version actually passed to the
//! manifest tools happens later against a [`BuildConfig`] and may fail.

use crate::config::BuildConfig;
use crate::constants::{CURRENT_CODENAME, FUTURE_API_LEVEL};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// `<kind>_<level>` or a bare level.
static SDK_SPEC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(system_server|system|test|module|core|public)_)?(\d+|current|[A-Z][A-Za-z0-9]*)$")
        .expect("Invalid regex pattern")
});

/// Preview codenames are capitalized identifiers.
static CODENAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("Invalid regex pattern"));

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An API level, either finalized or a named preview.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiLevel {
    /// A released level.
    Final(u32),
    /// An unfinalized level, named by its codename.
    Preview(String),
}

/// SDK surface a module compiles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdkKind {
    Invalid,
    None,
    CorePlatform,
    Private,
    Public,
    System,
    Test,
    Module,
    SystemServer,
    Core,
}

/// A parsed SDK version declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkSpec {
    pub kind: SdkKind,
    pub api_level: ApiLevel,
    pub raw: String,
}

/// Failure to resolve an SDK version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// The version string is malformed.
    #[error("invalid sdk version {0:?}")]
    InvalidSpec(String),

    /// The version string names a codename this build does not know.
    #[error("unknown API level codename {0:?}")]
    UnknownCodename(String),
}

/// Raw SDK version declarations of a module.
///
/// Unset min and target versions fall back to `sdk_version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkVersions {
    pub sdk_version: String,
    pub min_sdk_version: Option<String>,
    pub target_sdk_version: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Capability of a module to report its SDK constraints.
pub trait SdkContext {
    /// SDK the module compiles against.
    fn sdk_version(&self, config: &BuildConfig) -> SdkSpec;

    /// Lowest level the module runs on.
    fn min_sdk_version(&self, config: &BuildConfig) -> SdkSpec;

    /// Level the module is tested against.
    fn target_sdk_version(&self, config: &BuildConfig) -> SdkSpec;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ApiLevel {
    /// The "current" preview level.
    pub fn current() -> Self {
        ApiLevel::Preview(CURRENT_CODENAME.to_string())
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, ApiLevel::Preview(_))
    }

    /// Integer level, with every preview mapped to [`FUTURE_API_LEVEL`].
    pub fn final_or_future_int(&self) -> u32 {
        match self {
            ApiLevel::Final(level) => *level,
            ApiLevel::Preview(_) => FUTURE_API_LEVEL,
        }
    }
}

impl SdkSpec {
    /// Parse a user-supplied version string.
    ///
    /// Never fails: malformed strings and unknown codenames produce an
    /// [`SdkKind::Invalid`] spec whose resolution fails instead.
    pub fn parse(raw: &str, config: &BuildConfig) -> Self {
        let spec = |kind: SdkKind, api_level: ApiLevel| SdkSpec {
            kind,
            api_level,
            raw: raw.to_string(),
        };

        match raw {
            "" => return spec(SdkKind::Private, ApiLevel::current()),
            "none" => return spec(SdkKind::None, ApiLevel::current()),
            "core_platform" => return spec(SdkKind::CorePlatform, ApiLevel::current()),
            _ => {}
        }

        let Some(caps) = SDK_SPEC_REGEX.captures(raw) else {
            return spec(SdkKind::Invalid, ApiLevel::current());
        };

        let kind = match caps.get(1).map(|m| m.as_str()) {
            None | Some("public") => SdkKind::Public,
            Some("system") => SdkKind::System,
            Some("test") => SdkKind::Test,
            Some("module") => SdkKind::Module,
            Some("system_server") => SdkKind::SystemServer,
            Some("core") => SdkKind::Core,
            Some(_) => SdkKind::Invalid,
        };

        match api_level_from_user(&caps[2], config) {
            Some(level) => spec(kind, level),
            None => spec(SdkKind::Invalid, ApiLevel::current()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind != SdkKind::Invalid
    }

    /// API level the module effectively uses.
    ///
    /// Previews resolve to the default app target SDK of the build, which is the
    /// future level while the platform is not finalized.
    pub fn effective_version(&self, config: &BuildConfig) -> Result<ApiLevel, SdkError> {
        self.check_valid()?;
        if !self.api_level.is_preview() {
            return Ok(self.api_level.clone());
        }

        match config.default_app_target_sdk() {
            ApiLevel::Preview(_) => Ok(ApiLevel::current()),
            level => Ok(level),
        }
    }

    /// Version string the module effectively uses.
    ///
    /// Previews resolve to the platform version when finalized and to the
    /// platform codename otherwise.
    pub fn effective_version_string(&self, config: &BuildConfig) -> Result<String, SdkError> {
        self.check_valid()?;
        if !self.api_level.is_preview() {
            return Ok(self.api_level.to_string());
        }

        Ok(config.default_app_target_sdk().to_string())
    }

    fn check_valid(&self) -> Result<(), SdkError> {
        if self.is_valid() {
            return Ok(());
        }

        let level = self.raw.rsplit('_').next().unwrap_or(&self.raw);
        if CODENAME_REGEX.is_match(level) {
            Err(SdkError::UnknownCodename(self.raw.clone()))
        } else {
            Err(SdkError::InvalidSpec(self.raw.clone()))
        }
    }
}

impl SdkVersions {
    pub fn new(sdk_version: impl Into<String>) -> Self {
        Self {
            sdk_version: sdk_version.into(),
            ..Default::default()
        }
    }

    pub fn with_min(mut self, min_sdk_version: impl Into<String>) -> Self {
        self.min_sdk_version = Some(min_sdk_version.into());
        self
    }

    pub fn with_target(mut self, target_sdk_version: impl Into<String>) -> Self {
        self.target_sdk_version = Some(target_sdk_version.into());
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Map a bare level (number, `current` or codename) to an [`ApiLevel`].
///
/// Finalized codenames become their integer level.
fn api_level_from_user(level: &str, config: &BuildConfig) -> Option<ApiLevel> {
    if level == CURRENT_CODENAME {
        return Some(ApiLevel::current());
    }

    if let Ok(number) = level.parse::<u32>() {
        return Some(ApiLevel::Final(number));
    }

    if let Some(number) = config.finalized_codenames.get(level) {
        return Some(ApiLevel::Final(*number));
    }

    if config.is_active_codename(level) {
        return Some(ApiLevel::Preview(level.to_string()));
    }

    None
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiLevel::Final(level) => write!(f, "{}", level),
            ApiLevel::Preview(codename) => write!(f, "{}", codename),
        }
    }
}

impl SdkContext for SdkVersions {
    fn sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        SdkSpec::parse(&self.sdk_version, config)
    }

    fn min_sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        match &self.min_sdk_version {
            Some(raw) => SdkSpec::parse(raw, config),
            None => self.sdk_version(config),
        }
    }

    fn target_sdk_version(&self, config: &BuildConfig) -> SdkSpec {
        match &self.target_sdk_version {
            Some(raw) => SdkSpec::parse(raw, config),
            None => self.sdk_version(config),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BuildConfig {
        let mut config = BuildConfig {
            platform_sdk_version: 34,
            platform_sdk_codename: "VanillaIceCream".to_string(),
            ..Default::default()
        };
        config
            .finalized_codenames
            .insert("Tiramisu".to_string(), 33);
        config
    }

    #[test]
    fn test_parse_kinds() {
        let config = config();

        let spec = SdkSpec::parse("system_31", &config);
        assert_eq!(spec.kind, SdkKind::System);
        assert_eq!(spec.api_level, ApiLevel::Final(31));

        let spec = SdkSpec::parse("system_server_current", &config);
        assert_eq!(spec.kind, SdkKind::SystemServer);
        assert_eq!(spec.api_level, ApiLevel::current());

        let spec = SdkSpec::parse("29", &config);
        assert_eq!(spec.kind, SdkKind::Public);
        assert_eq!(spec.api_level, ApiLevel::Final(29));

        let spec = SdkSpec::parse("", &config);
        assert_eq!(spec.kind, SdkKind::Private);
        assert!(spec.api_level.is_preview());

        assert_eq!(SdkSpec::parse("core_platform", &config).kind, SdkKind::CorePlatform);
        assert_eq!(SdkSpec::parse("none", &config).kind, SdkKind::None);
    }

    #[test]
    fn test_parse_codenames() {
        let config = config();

        // Finalized codenames resolve at parse time
        let spec = SdkSpec::parse("Tiramisu", &config);
        assert_eq!(spec.api_level, ApiLevel::Final(33));

        let spec = SdkSpec::parse("VanillaIceCream", &config);
        assert_eq!(
            spec.api_level,
            ApiLevel::Preview("VanillaIceCream".to_string())
        );

        let spec = SdkSpec::parse("Donut", &config);
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_parse_invalid() {
        let config = config();
        for raw in ["banana_31", "31.5", "-1", "system_", "current_system"] {
            assert!(!SdkSpec::parse(raw, &config).is_valid(), "{raw}");
        }
    }

    #[test]
    fn test_effective_version_preview_unfinalized() {
        let config = config();
        let spec = SdkSpec::parse("current", &config);

        assert_eq!(spec.effective_version(&config), Ok(ApiLevel::current()));
        assert_eq!(
            spec.effective_version(&config).unwrap().final_or_future_int(),
            FUTURE_API_LEVEL
        );
        assert_eq!(
            spec.effective_version_string(&config),
            Ok("VanillaIceCream".to_string())
        );
    }

    #[test]
    fn test_effective_version_preview_finalized() {
        let mut config = config();
        config.platform_sdk_final = true;
        let spec = SdkSpec::parse("current", &config);

        assert_eq!(spec.effective_version(&config), Ok(ApiLevel::Final(34)));
        assert_eq!(spec.effective_version_string(&config), Ok("34".to_string()));
    }

    #[test]
    fn test_effective_version_final() {
        let config = config();
        let spec = SdkSpec::parse("21", &config);
        assert_eq!(spec.effective_version(&config), Ok(ApiLevel::Final(21)));
        assert_eq!(spec.effective_version_string(&config), Ok("21".to_string()));
    }

    #[test]
    fn test_effective_version_errors() {
        let config = config();
        assert_eq!(
            SdkSpec::parse("Donut", &config).effective_version(&config),
            Err(SdkError::UnknownCodename("Donut".to_string()))
        );
        assert_eq!(
            SdkSpec::parse("system_Donut", &config).effective_version_string(&config),
            Err(SdkError::UnknownCodename("system_Donut".to_string()))
        );
        assert_eq!(
            SdkSpec::parse("31.5", &config).effective_version_string(&config),
            Err(SdkError::InvalidSpec("31.5".to_string()))
        );
    }

    #[test]
    fn test_sdk_versions_fallback() {
        let config = config();
        let versions = SdkVersions::new("30");
        assert_eq!(versions.min_sdk_version(&config).api_level, ApiLevel::Final(30));
        assert_eq!(versions.target_sdk_version(&config).api_level, ApiLevel::Final(30));

        let versions = SdkVersions::new("current").with_min("24").with_target("Tiramisu");
        assert_eq!(versions.sdk_version(&config).api_level, ApiLevel::current());
        assert_eq!(versions.min_sdk_version(&config).api_level, ApiLevel::Final(24));
        assert_eq!(versions.target_sdk_version(&config).api_level, ApiLevel::Final(33));
    }

    #[test]
    fn test_api_level_display() {
        assert_eq!(ApiLevel::Final(21).to_string(), "21");
        assert_eq!(ApiLevel::current().to_string(), "current");
    }
}
