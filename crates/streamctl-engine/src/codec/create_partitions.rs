use serde::{Deserialize, Serialize};

use streamctl_core::{AdminError, AdminErrorKind, AdminOptions, NewPartitions, TopicResult};

use super::{element_error, reorder, REQUEST_TIMED_OUT_CODE};

#[derive(Debug, Serialize)]
struct WireRequest {
    topics: Vec<WireNewPartitions>,
    validate_only: bool,
    operation_timeout_ms: i32,
}

#[derive(Debug, Serialize)]
struct WireNewPartitions {
    name: String,
    total_count: i32,
    replicas: Vec<Vec<i32>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub(crate) throttle_time_ms: i32,
    pub(crate) topics: Vec<WireTopicResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireTopicResult {
    pub(crate) name: String,
    pub(crate) error_code: i16,
    #[serde(default)]
    pub(crate) error_message: Option<String>,
}

pub(crate) fn encode(parts: &[NewPartitions], options: &AdminOptions) -> Result<Vec<u8>, AdminError> {
    let req = WireRequest {
        topics: parts
            .iter()
            .map(|p| WireNewPartitions {
                name: p.topic.clone(),
                total_count: p.total_count,
                replicas: p.replicas.clone(),
            })
            .collect(),
        validate_only: options.validate_only(),
        operation_timeout_ms: options.operation_timeout_ms(),
    };
    serde_json::to_vec(&req)
        .map_err(|e| AdminError::bad_msg(format!("encode CreatePartitions request: {e}")))
}

pub(crate) fn decode(
    parts: &[NewPartitions],
    options: &AdminOptions,
    buf: &[u8],
) -> Result<(Vec<TopicResult>, i32), AdminError> {
    let resp: WireResponse = serde_json::from_slice(buf)
        .map_err(|e| AdminError::bad_msg(format!("decode CreatePartitions response: {e}")))?;

    let elements: Vec<(String, WireTopicResult)> =
        resp.topics.into_iter().map(|t| (t.name.clone(), t)).collect();
    let slots = reorder(parts.len(), elements, |i| parts[i].topic.clone())?;

    let hide_timeout = options.operation_timeout_ms() <= 0;
    let mut results = Vec::with_capacity(parts.len());
    for (i, slot) in slots.into_iter().enumerate() {
        let Some(wire) = slot else {
            return Err(AdminError::bad_msg(format!(
                "response missing element for topic '{}'",
                parts[i].topic
            )));
        };
        let mut error = element_error(wire.error_code, wire.error_message);
        if hide_timeout {
            if let Some(err) = &error {
                if matches!(err.kind, AdminErrorKind::Broker(code) if code == REQUEST_TIMED_OUT_CODE) {
                    error = None;
                }
            }
        }
        results.push(match error {
            Some(err) => TopicResult::failed(wire.name, err),
            None => TopicResult::ok(wire.name),
        });
    }
    Ok((results, resp.throttle_time_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_success() {
        let parts = vec![NewPartitions::new("A", 6)];
        let wire = WireResponse {
            throttle_time_ms: 12,
            topics: vec![WireTopicResult { name: "A".into(), error_code: 0, error_message: None }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, throttle) = decode(&parts, &AdminOptions::new(), &buf).unwrap();
        assert_eq!(throttle, 12);
        assert!(results[0].error.is_none());
    }
}
