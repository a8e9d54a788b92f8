mod alter_configs;
mod create_partitions;
mod create_topics;
mod delete_topics;
mod describe_configs;

use serde::{Deserialize, Serialize};

use streamctl_core::{AdminError, ConfigEntry, ConfigOperation};

use crate::item::{RequestItem, RequestPayload};

/// The wire error code brokers use for "server ran out of time applying
/// this element's change". The hidden-timeout rule rewrites this to
/// success when `operation_timeout <= 0`.
pub(crate) const REQUEST_TIMED_OUT_CODE: i16 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct WireConfigEntry {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    pub(crate) operation: i32,
}

impl From<&ConfigEntry> for WireConfigEntry {
    fn from(e: &ConfigEntry) -> Self {
        Self {
            name: e.name.clone(),
            value: e.value.clone(),
            operation: match e.operation {
                ConfigOperation::Set => 0,
                ConfigOperation::Delete => 1,
                ConfigOperation::Add => 2,
            },
        }
    }
}

/// Substitutes a canonical message when the server's error message is
/// missing or empty; returns `None` for a success code.
pub(crate) fn element_error(code: i16, message: Option<String>) -> Option<AdminError> {
    if code == 0 {
        return None;
    }
    let message = match message {
        Some(m) if !m.is_empty() => m,
        _ => format!("broker error {code}"),
    };
    Some(AdminError::broker(code, message))
}

/// Reorders response elements into request-index slots by identifier,
/// enforcing the arity/duplicate/unknown-element rules shared by every
/// decoder.
pub(crate) fn reorder<K: PartialEq, E>(
    request_len: usize,
    elements: Vec<(K, E)>,
    identifier_of: impl Fn(usize) -> K,
) -> Result<Vec<Option<E>>, AdminError> {
    if elements.len() > request_len {
        return Err(AdminError::bad_msg(format!(
            "response contained {} elements, request had {request_len}",
            elements.len()
        )));
    }

    let mut slots: Vec<Option<E>> = (0..request_len).map(|_| None).collect();
    'elements: for (key, value) in elements {
        for i in 0..request_len {
            if identifier_of(i) == key {
                if slots[i].is_some() {
                    return Err(AdminError::bad_msg(
                        "response contained a duplicate element for a request slot",
                    ));
                }
                slots[i] = Some(value);
                continue 'elements;
            }
        }
        return Err(AdminError::bad_msg(
            "response referenced an element not present in the request",
        ));
    }
    Ok(slots)
}

/// Encodes the wire request for `item.payload` using `item.options`.
pub(crate) fn encode(item: &RequestItem) -> Result<Vec<u8>, AdminError> {
    match &item.payload {
        RequestPayload::CreateTopics(topics) => create_topics::encode(topics, &item.options),
        RequestPayload::DeleteTopics(topics) => delete_topics::encode(topics, &item.options),
        RequestPayload::CreatePartitions(parts) => create_partitions::encode(parts, &item.options),
        RequestPayload::AlterConfigs(resources) => alter_configs::encode(resources, &item.options),
        RequestPayload::DescribeConfigs(resources) => describe_configs::encode(resources),
    }
}

/// Decodes `buf` into a result event plus an optional throttle time.
pub(crate) fn decode(
    item: &RequestItem,
    buf: &[u8],
) -> Result<(streamctl_core::AdminResultEvent, i32), AdminError> {
    let opaque = item.opaque.clone();
    match &item.payload {
        RequestPayload::CreateTopics(topics) => {
            let (results, throttle) = create_topics::decode(topics, &item.options, buf)?;
            Ok((
                streamctl_core::AdminResultEvent::CreateTopics {
                    opaque,
                    outcome: streamctl_core::AdminRequestOutcome::ok(results),
                },
                throttle,
            ))
        }
        RequestPayload::DeleteTopics(topics) => {
            let (results, throttle) = delete_topics::decode(topics, &item.options, buf)?;
            Ok((
                streamctl_core::AdminResultEvent::DeleteTopics {
                    opaque,
                    outcome: streamctl_core::AdminRequestOutcome::ok(results),
                },
                throttle,
            ))
        }
        RequestPayload::CreatePartitions(parts) => {
            let (results, throttle) = create_partitions::decode(parts, &item.options, buf)?;
            Ok((
                streamctl_core::AdminResultEvent::CreatePartitions {
                    opaque,
                    outcome: streamctl_core::AdminRequestOutcome::ok(results),
                },
                throttle,
            ))
        }
        RequestPayload::AlterConfigs(resources) => {
            let (results, throttle) = alter_configs::decode(resources, buf)?;
            Ok((
                streamctl_core::AdminResultEvent::AlterConfigs {
                    opaque,
                    outcome: streamctl_core::AdminRequestOutcome::ok(results),
                },
                throttle,
            ))
        }
        RequestPayload::DescribeConfigs(resources) => {
            let (results, throttle) = describe_configs::decode(resources, buf)?;
            Ok((
                streamctl_core::AdminResultEvent::DescribeConfigs {
                    opaque,
                    outcome: streamctl_core::AdminRequestOutcome::ok(results),
                },
                throttle,
            ))
        }
    }
}

/// Builds a request-level failure event for `kind`, with an empty element
/// list, for a request that never got a response (or never got sent at
/// all — e.g. a broker-conflict rejection).
pub(crate) fn failure_event(
    kind: streamctl_core::ApiKind,
    opaque: Option<serde_json::Value>,
    err: AdminError,
) -> streamctl_core::AdminResultEvent {
    use streamctl_core::{AdminRequestOutcome, AdminResultEvent, ApiKind};
    match kind {
        ApiKind::CreateTopics => AdminResultEvent::CreateTopics { opaque, outcome: AdminRequestOutcome::failed(err) },
        ApiKind::DeleteTopics => AdminResultEvent::DeleteTopics { opaque, outcome: AdminRequestOutcome::failed(err) },
        ApiKind::CreatePartitions => {
            AdminResultEvent::CreatePartitions { opaque, outcome: AdminRequestOutcome::failed(err) }
        }
        ApiKind::AlterConfigs => AdminResultEvent::AlterConfigs { opaque, outcome: AdminRequestOutcome::failed(err) },
        ApiKind::DescribeConfigs => {
            AdminResultEvent::DescribeConfigs { opaque, outcome: AdminRequestOutcome::failed(err) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_rejects_excess_elements() {
        let elements = vec![("a", 1), ("b", 2), ("c", 3)];
        let err = reorder(2, elements, |i| ["a", "b"][i]).unwrap_err();
        assert!(err.message.contains("response contained"));
    }

    #[test]
    fn reorder_places_elements_by_identifier() {
        let elements = vec![("b", 1), ("a", 2)];
        let slots = reorder(2, elements, |i| ["a", "b"][i]).unwrap();
        assert_eq!(slots[0], Some(2));
        assert_eq!(slots[1], Some(1));
    }

    #[test]
    fn reorder_rejects_duplicates() {
        let elements = vec![("a", 1), ("a", 2)];
        assert!(reorder(2, elements, |i| ["a", "b"][i]).is_err());
    }

    #[test]
    fn reorder_rejects_unknown_identifier() {
        let elements = vec![("z", 1)];
        assert!(reorder(2, elements, |i| ["a", "b"][i]).is_err());
    }
}
