use serde::{Deserialize, Serialize};

use streamctl_core::{
    AdminError, ConfigEntry, ConfigOperation, ConfigResource, ConfigResourceResult, ConfigResourceType,
    ConfigSource,
};

use super::{element_error, reorder};

/// Synonym count cap per entry — a heuristic DoS guard, tunable.
pub(crate) const MAX_SYNONYMS_PER_ENTRY: usize = 100_000;

fn resource_type_code(t: ConfigResourceType) -> i32 {
    match t {
        ConfigResourceType::Unknown => 0,
        ConfigResourceType::Any => 1,
        ConfigResourceType::Topic => 2,
        ConfigResourceType::Group => 3,
        ConfigResourceType::Broker => 4,
    }
}

fn resource_type_from_code(code: i32) -> Option<ConfigResourceType> {
    match code {
        0 => Some(ConfigResourceType::Unknown),
        1 => Some(ConfigResourceType::Any),
        2 => Some(ConfigResourceType::Topic),
        3 => Some(ConfigResourceType::Group),
        4 => Some(ConfigResourceType::Broker),
        _ => None,
    }
}

fn config_source_code(s: ConfigSource) -> i32 {
    match s {
        ConfigSource::Unknown => 0,
        ConfigSource::DynamicTopicConfig => 1,
        ConfigSource::DynamicBrokerConfig => 2,
        ConfigSource::DynamicDefaultBrokerConfig => 3,
        ConfigSource::StaticBrokerConfig => 4,
        ConfigSource::DefaultConfig => 5,
    }
}

fn config_source_from_code(code: i32) -> ConfigSource {
    match code {
        1 => ConfigSource::DynamicTopicConfig,
        2 => ConfigSource::DynamicBrokerConfig,
        3 => ConfigSource::DynamicDefaultBrokerConfig,
        4 => ConfigSource::StaticBrokerConfig,
        5 => ConfigSource::DefaultConfig,
        _ => ConfigSource::Unknown,
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    resources: Vec<WireResourceRequest>,
}

#[derive(Debug, Serialize)]
struct WireResourceRequest {
    resource_type: i32,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireResponse {
    /// `0` or `1`; selects which of `is_default`/`source` the entries carry.
    pub(crate) version: u8,
    #[serde(default)]
    pub(crate) throttle_time_ms: i32,
    pub(crate) resources: Vec<WireResourceResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireResourceResult {
    pub(crate) resource_type: i32,
    pub(crate) name: String,
    pub(crate) error_code: i16,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
    #[serde(default)]
    pub(crate) entries: Vec<WireConfigEntryResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct WireConfigEntryResult {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    pub(crate) is_read_only: bool,
    pub(crate) is_sensitive: bool,
    /// v0 only.
    #[serde(default)]
    pub(crate) is_default: Option<bool>,
    /// v1 only.
    #[serde(default)]
    pub(crate) source: Option<i32>,
    #[serde(default)]
    pub(crate) synonyms: Vec<WireConfigEntryResult>,
}

pub(crate) fn encode(resources: &[ConfigResource]) -> Result<Vec<u8>, AdminError> {
    let req = WireRequest {
        resources: resources
            .iter()
            .map(|r| WireResourceRequest {
                resource_type: resource_type_code(r.resource_type),
                name: r.name.clone(),
            })
            .collect(),
    };
    serde_json::to_vec(&req)
        .map_err(|e| AdminError::bad_msg(format!("encode DescribeConfigs request: {e}")))
}

fn entry_from_wire(wire: WireConfigEntryResult, version: u8, depth: u32) -> ConfigEntry {
    let (source, is_default) = match version {
        0 => {
            let is_default = wire.is_default.unwrap_or(false);
            let source = if is_default { ConfigSource::DefaultConfig } else { ConfigSource::Unknown };
            (source, is_default)
        }
        _ => {
            let source = config_source_from_code(wire.source.unwrap_or(0));
            (source, source == ConfigSource::DefaultConfig)
        }
    };

    let synonyms = if version >= 1 && depth == 0 {
        let mut syns = wire.synonyms;
        if syns.len() > MAX_SYNONYMS_PER_ENTRY {
            eprintln!(
                "warning: DescribeConfigs entry '{}' carried {} synonyms, truncating to {}",
                wire.name,
                syns.len(),
                MAX_SYNONYMS_PER_ENTRY
            );
            syns.truncate(MAX_SYNONYMS_PER_ENTRY);
        }
        syns.into_iter()
            .map(|s| entry_from_wire(s, version, depth + 1))
            .collect()
    } else {
        Vec::new()
    };

    ConfigEntry {
        name: wire.name,
        value: wire.value,
        operation: ConfigOperation::Set,
        source,
        is_read_only: wire.is_read_only,
        is_default,
        is_sensitive: wire.is_sensitive,
        is_synonym: depth > 0,
        synonyms,
    }
}

pub(crate) fn decode(
    resources: &[ConfigResource],
    buf: &[u8],
) -> Result<(Vec<ConfigResourceResult>, i32), AdminError> {
    let resp: WireResponse = serde_json::from_slice(buf)
        .map_err(|e| AdminError::bad_msg(format!("decode DescribeConfigs response: {e}")))?;
    let version = resp.version;

    let mut recognized = Vec::with_capacity(resp.resources.len());
    for r in resp.resources {
        match resource_type_from_code(r.resource_type) {
            Some(resource_type) => recognized.push((resource_type, r)),
            None => {
                eprintln!(
                    "warning: DescribeConfigs response referenced an unrecognized resource type {} for '{}', skipping",
                    r.resource_type, r.name
                );
            }
        }
    }

    let elements: Vec<((ConfigResourceType, String), WireResourceResult)> = recognized
        .into_iter()
        .map(|(resource_type, r)| ((resource_type, r.name.clone()), r))
        .collect();
    let slots = reorder(resources.len(), elements, |i| {
        (resources[i].resource_type, resources[i].name.clone())
    })?;

    let mut results = Vec::new();
    for slot in slots.into_iter() {
        let Some(wire) = slot else { continue };
        let resource_type = resource_type_from_code(wire.resource_type).unwrap_or(ConfigResourceType::Unknown);
        let error = element_error(wire.error_code, wire.error_message);
        results.push(match error {
            Some(err) => ConfigResourceResult::failed(resource_type, wire.name, err),
            None => {
                let entries = wire
                    .entries
                    .into_iter()
                    .map(|e| entry_from_wire(e, version, 0))
                    .collect();
                ConfigResourceResult::ok(resource_type, wire.name, entries)
            }
        });
    }
    Ok((results, resp.throttle_time_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> WireConfigEntryResult {
        WireConfigEntryResult {
            name: name.to_string(),
            value: Some("1".to_string()),
            is_read_only: false,
            is_sensitive: false,
            is_default: None,
            source: None,
            synonyms: Vec::new(),
        }
    }

    #[test]
    fn v0_is_default_true_implies_default_source() {
        let resources = vec![ConfigResource::new(ConfigResourceType::Topic, "A")];
        let mut e = entry("retention.ms");
        e.is_default = Some(true);
        let wire = WireResponse {
            version: 0,
            throttle_time_ms: 0,
            resources: vec![WireResourceResult {
                resource_type: 2,
                name: "A".into(),
                error_code: 0,
                error_message: None,
                entries: vec![e],
            }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&resources, &buf).unwrap();
        let cfg = &results[0].config[0];
        assert!(cfg.is_default);
        assert_eq!(cfg.source, ConfigSource::DefaultConfig);
    }

    #[test]
    fn v1_default_source_implies_is_default_true() {
        let resources = vec![ConfigResource::new(ConfigResourceType::Topic, "A")];
        let mut e = entry("retention.ms");
        e.source = Some(config_source_code(ConfigSource::DefaultConfig));
        let wire = WireResponse {
            version: 1,
            throttle_time_ms: 0,
            resources: vec![WireResourceResult {
                resource_type: 2,
                name: "A".into(),
                error_code: 0,
                error_message: None,
                entries: vec![e],
            }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&resources, &buf).unwrap();
        let cfg = &results[0].config[0];
        assert!(cfg.is_default);
        assert_eq!(cfg.source, ConfigSource::DefaultConfig);
    }

    #[test]
    fn v1_synonyms_are_capped() {
        let resources = vec![ConfigResource::new(ConfigResourceType::Topic, "A")];
        let mut e = entry("retention.ms");
        e.synonyms = (0..(MAX_SYNONYMS_PER_ENTRY + 10)).map(|i| entry(&format!("syn{i}"))).collect();
        let wire = WireResponse {
            version: 1,
            throttle_time_ms: 0,
            resources: vec![WireResourceResult {
                resource_type: 2,
                name: "A".into(),
                error_code: 0,
                error_message: None,
                entries: vec![e],
            }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&resources, &buf).unwrap();
        assert_eq!(results[0].config[0].synonyms.len(), MAX_SYNONYMS_PER_ENTRY);
    }
}
