use serde::{Deserialize, Serialize};

use streamctl_core::{AdminError, AdminOptions, ConfigResource, ConfigResourceResult, ConfigResourceType};

use super::{element_error, reorder, WireConfigEntry};

fn resource_type_code(t: ConfigResourceType) -> i32 {
    match t {
        ConfigResourceType::Unknown => 0,
        ConfigResourceType::Any => 1,
        ConfigResourceType::Topic => 2,
        ConfigResourceType::Group => 3,
        ConfigResourceType::Broker => 4,
    }
}

/// `None` means the wire code does not map to a type this client
/// recognizes.
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

#[derive(Debug, Serialize)]
struct WireRequest {
    resources: Vec<WireResource>,
    validate_only: bool,
    incremental: bool,
}

#[derive(Debug, Serialize)]
struct WireResource {
    resource_type: i32,
    name: String,
    config: Vec<WireConfigEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireResponse {
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
}

pub(crate) fn encode(resources: &[ConfigResource], options: &AdminOptions) -> Result<Vec<u8>, AdminError> {
    let req = WireRequest {
        resources: resources
            .iter()
            .map(|r| WireResource {
                resource_type: resource_type_code(r.resource_type),
                name: r.name.clone(),
                config: r.config.iter().map(WireConfigEntry::from).collect(),
            })
            .collect(),
        validate_only: options.validate_only(),
        incremental: options.incremental(),
    };
    serde_json::to_vec(&req)
        .map_err(|e| AdminError::bad_msg(format!("encode AlterConfigs request: {e}")))
}

pub(crate) fn decode(
    resources: &[ConfigResource],
    buf: &[u8],
) -> Result<(Vec<ConfigResourceResult>, i32), AdminError> {
    let resp: WireResponse = serde_json::from_slice(buf)
        .map_err(|e| AdminError::bad_msg(format!("decode AlterConfigs response: {e}")))?;

    let mut recognized = Vec::with_capacity(resp.resources.len());
    for r in resp.resources {
        match resource_type_from_code(r.resource_type) {
            Some(resource_type) => recognized.push((resource_type, r)),
            None => {
                eprintln!(
                    "warning: AlterConfigs response referenced an unrecognized resource type {} for '{}', skipping",
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
        let error = element_error(wire.error_code, wire.error_message);
        results.push(match error {
            Some(err) => ConfigResourceResult::failed(
                resource_type_from_code(wire.resource_type).unwrap_or(ConfigResourceType::Unknown),
                wire.name,
                err,
            ),
            None => ConfigResourceResult::ok(
                resource_type_from_code(wire.resource_type).unwrap_or(ConfigResourceType::Unknown),
                wire.name,
                Vec::new(),
            ),
        });
    }
    Ok((results, resp.throttle_time_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_resource_in_response_is_a_protocol_parse_failure() {
        let resources = vec![ConfigResource::new(ConfigResourceType::Topic, "A")];
        let wire = WireResponse {
            throttle_time_ms: 0,
            resources: vec![
                WireResourceResult { resource_type: 2, name: "A".into(), error_code: 0, error_message: None },
                WireResourceResult { resource_type: 2, name: "A".into(), error_code: 0, error_message: None },
            ],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let err = decode(&resources, &buf).unwrap_err();
        assert_eq!(err.kind, streamctl_core::AdminErrorKind::BadMsg);
    }

    #[test]
    fn unrecognized_resource_type_is_skipped_not_a_failure() {
        let resources = vec![ConfigResource::new(ConfigResourceType::Topic, "A")];
        let wire = WireResponse {
            throttle_time_ms: 0,
            resources: vec![
                WireResourceResult { resource_type: 99, name: "mystery".into(), error_code: 0, error_message: None },
                WireResourceResult { resource_type: 2, name: "A".into(), error_code: 0, error_message: None },
            ],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&resources, &buf).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "A");
    }
}
