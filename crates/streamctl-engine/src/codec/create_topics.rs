use serde::{Deserialize, Serialize};

use streamctl_core::{AdminError, AdminErrorKind, AdminOptions, NewTopic, TopicResult};

use super::{element_error, reorder, WireConfigEntry, REQUEST_TIMED_OUT_CODE};

#[derive(Debug, Serialize)]
struct WireRequest {
    topics: Vec<WireNewTopic>,
    validate_only: bool,
    operation_timeout_ms: i32,
}

#[derive(Debug, Serialize)]
struct WireNewTopic {
    name: String,
    partition_count: i32,
    replication_factor: i32,
    replicas: Vec<Vec<i32>>,
    config: Vec<WireConfigEntry>,
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

pub(crate) fn encode(topics: &[NewTopic], options: &AdminOptions) -> Result<Vec<u8>, AdminError> {
    let req = WireRequest {
        topics: topics
            .iter()
            .map(|t| WireNewTopic {
                name: t.topic.clone(),
                partition_count: t.partition_count,
                replication_factor: t.replication_factor,
                replicas: t.replicas.clone(),
                config: t.config.iter().map(WireConfigEntry::from).collect(),
            })
            .collect(),
        validate_only: options.validate_only(),
        operation_timeout_ms: options.operation_timeout_ms(),
    };
    serde_json::to_vec(&req)
        .map_err(|e| AdminError::bad_msg(format!("encode CreateTopics request: {e}")))
}

pub(crate) fn decode(
    topics: &[NewTopic],
    options: &AdminOptions,
    buf: &[u8],
) -> Result<(Vec<TopicResult>, i32), AdminError> {
    let resp: WireResponse = serde_json::from_slice(buf)
        .map_err(|e| AdminError::bad_msg(format!("decode CreateTopics response: {e}")))?;

    let elements: Vec<(String, WireTopicResult)> =
        resp.topics.into_iter().map(|t| (t.name.clone(), t)).collect();
    let slots = reorder(topics.len(), elements, |i| topics[i].topic.clone())?;

    let hide_timeout = options.operation_timeout_ms() <= 0;
    let mut results = Vec::with_capacity(topics.len());
    for (i, slot) in slots.into_iter().enumerate() {
        let Some(wire) = slot else {
            return Err(AdminError::bad_msg(format!(
                "response missing element for topic '{}'",
                topics[i].topic
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
    fn hidden_timeout_becomes_success_when_operation_timeout_is_zero() {
        let topics = vec![NewTopic::with_replication_factor("X", 1, 1)];
        let options = AdminOptions::new();
        let wire = WireResponse {
            throttle_time_ms: 0,
            topics: vec![WireTopicResult {
                name: "X".to_string(),
                error_code: REQUEST_TIMED_OUT_CODE,
                error_message: None,
            }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&topics, &options, &buf).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].error.is_none());
    }

    #[test]
    fn hidden_timeout_preserved_when_operation_timeout_is_positive() {
        let topics = vec![NewTopic::with_replication_factor("X", 1, 1)];
        let mut options = AdminOptions::new();
        options
            .set_operation_timeout_ms(streamctl_core::ApiKind::CreateTopics, 30_000)
            .unwrap();
        let wire = WireResponse {
            throttle_time_ms: 0,
            topics: vec![WireTopicResult {
                name: "X".to_string(),
                error_code: REQUEST_TIMED_OUT_CODE,
                error_message: None,
            }],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&topics, &options, &buf).unwrap();
        assert!(results[0].error.is_some());
    }

    #[test]
    fn reorders_response_into_request_order() {
        let topics = vec![
            NewTopic::with_replication_factor("A", 1, 1),
            NewTopic::with_replication_factor("B", 1, 1),
        ];
        let wire = WireResponse {
            throttle_time_ms: 0,
            topics: vec![
                WireTopicResult { name: "B".to_string(), error_code: 0, error_message: None },
                WireTopicResult { name: "A".to_string(), error_code: 36, error_message: None },
            ],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&topics, &AdminOptions::new(), &buf).unwrap();
        assert_eq!(results[0].topic, "A");
        assert_eq!(results[0].error.as_ref().unwrap().kind, AdminErrorKind::Broker(36));
        assert_eq!(results[1].topic, "B");
        assert!(results[1].error.is_none());
    }
}
