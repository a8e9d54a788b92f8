use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// `ConfigResource.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigResourceType {
    Unknown,
    Any,
    Topic,
    Group,
    Broker,
}

/// A config-bearing cluster object addressed by `(type, name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResource {
    #[serde(rename = "type")]
    pub resource_type: ConfigResourceType,
    pub name: String,
    pub config: Vec<ConfigEntry>,
    pub err: Option<AdminError>,
}

impl ConfigResource {
    pub fn new(resource_type: ConfigResourceType, name: impl Into<String>) -> Self {
        Self {
            resource_type,
            name: name.into(),
            config: Vec::new(),
            err: None,
        }
    }

    pub fn identifier(&self) -> (ConfigResourceType, &str) {
        (self.resource_type, &self.name)
    }

    pub fn validate(&self) -> Result<(), AdminError> {
        if self.name.is_empty() {
            return Err(AdminError::invalid_arg("resource name must not be empty"));
        }
        Ok(())
    }

    /// Parses `name` as the broker id this resource targets, per the
    /// broker-addressed-variant dispatch rule.
    pub fn broker_id(&self) -> Result<i32, AdminError> {
        self.name.parse::<i32>().map_err(|_| {
            AdminError::invalid_arg(format!(
                "BROKER resource name '{}' is not a valid broker id",
                self.name
            ))
        }).and_then(|id| {
            if id < 0 {
                Err(AdminError::invalid_arg(format!(
                    "BROKER resource name '{}' must be a non-negative broker id",
                    self.name
                )))
            } else {
                Ok(id)
            }
        })
    }
}

/// Alter operation for a `ConfigEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigOperation {
    Set,
    Delete,
    Add,
}

/// Origin of a configuration value, decoded from DescribeConfigs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Unknown,
    DynamicTopicConfig,
    DynamicBrokerConfig,
    DynamicDefaultBrokerConfig,
    StaticBrokerConfig,
    DefaultConfig,
}

/// One configuration key/value, with its DescribeConfigs metadata when the
/// entry came back from a describe response rather than being supplied by
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: Option<String>,
    pub operation: ConfigOperation,
    pub source: ConfigSource,
    pub is_read_only: bool,
    pub is_default: bool,
    pub is_sensitive: bool,
    pub is_synonym: bool,
    pub synonyms: Vec<ConfigEntry>,
}

impl ConfigEntry {
    /// A plain alter/create-time entry: just a name/value/operation.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            operation: ConfigOperation::Set,
            source: ConfigSource::Unknown,
            is_read_only: false,
            is_default: false,
            is_sensitive: false,
            is_synonym: false,
            synonyms: Vec::new(),
        }
    }

    pub fn delete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            operation: ConfigOperation::Delete,
            source: ConfigSource::Unknown,
            is_read_only: false,
            is_default: false,
            is_sensitive: false,
            is_synonym: false,
            synonyms: Vec::new(),
        }
    }
}

/// Per-element outcome for AlterConfigs / DescribeConfigs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResourceResult {
    pub resource_type: ConfigResourceType,
    pub name: String,
    pub config: Vec<ConfigEntry>,
    pub error: Option<AdminError>,
}

impl ConfigResourceResult {
    pub fn ok(resource_type: ConfigResourceType, name: impl Into<String>, config: Vec<ConfigEntry>) -> Self {
        Self {
            resource_type,
            name: name.into(),
            config,
            error: None,
        }
    }

    pub fn failed(resource_type: ConfigResourceType, name: impl Into<String>, error: AdminError) -> Self {
        Self {
            resource_type,
            name: name.into(),
            config: Vec::new(),
            error: Some(error),
        }
    }
}
