use serde::{Deserialize, Serialize};

use streamctl_core::{AdminError, AdminErrorKind, AdminOptions, DeleteTopic, TopicResult};

use super::{element_error, reorder, REQUEST_TIMED_OUT_CODE};

#[derive(Debug, Serialize)]
struct WireRequest {
    topics: Vec<String>,
    operation_timeout_ms: i32,
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

pub(crate) fn encode(topics: &[DeleteTopic], options: &AdminOptions) -> Result<Vec<u8>, AdminError> {
    let req = WireRequest {
        topics: topics.iter().map(|t| t.topic.clone()).collect(),
        operation_timeout_ms: options.operation_timeout_ms(),
    };
    serde_json::to_vec(&req)
        .map_err(|e| AdminError::bad_msg(format!("encode DeleteTopics request: {e}")))
}

pub(crate) fn decode(
    topics: &[DeleteTopic],
    options: &AdminOptions,
    buf: &[u8],
) -> Result<(Vec<TopicResult>, i32), AdminError> {
    let resp: WireResponse = serde_json::from_slice(buf)
        .map_err(|e| AdminError::bad_msg(format!("decode DeleteTopics response: {e}")))?;

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
    fn reorders_and_preserves_element_errors() {
        let topics = vec![
            DeleteTopic::new("A"),
            DeleteTopic::new("B"),
            DeleteTopic::new("C"),
        ];
        let wire = WireResponse {
            throttle_time_ms: 0,
            topics: vec![
                WireTopicResult { name: "B".into(), error_code: 0, error_message: None },
                WireTopicResult { name: "A".into(), error_code: 3, error_message: None },
                WireTopicResult { name: "C".into(), error_code: 0, error_message: None },
            ],
        };
        let buf = serde_json::to_vec(&wire).unwrap();
        let (results, _) = decode(&topics, &AdminOptions::new(), &buf).unwrap();
        assert_eq!(results[0].topic, "A");
        assert_eq!(results[0].error.as_ref().unwrap().kind, AdminErrorKind::Broker(3));
        assert_eq!(results[1].topic, "B");
        assert!(results[1].error.is_none());
        assert_eq!(results[2].topic, "C");
        assert!(results[2].error.is_none());
    }
}
