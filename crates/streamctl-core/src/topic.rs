use serde::{Deserialize, Serialize};

use crate::config::ConfigEntry;
use crate::error::AdminError;

/// Replica assignment for a single partition: the ordered list of broker ids
/// hosting its replicas.
pub type ReplicaAssignment = Vec<i32>;

/// Input element for `CreateTopics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
    pub topic: String,
    pub partition_count: i32,
    pub replication_factor: i32,
    /// Indexed by partition number; empty when `replication_factor` is used
    /// instead of an explicit assignment.
    pub replicas: Vec<ReplicaAssignment>,
    pub config: Vec<ConfigEntry>,
}

impl NewTopic {
    pub const MIN_PARTITION_COUNT: i32 = 1;
    /// `-1` requests the broker's configured default.
    pub const MIN_REPLICATION_FACTOR: i32 = -1;

    /// Explicit assignment, mutually exclusive with a numeric replication
    /// factor.
    pub fn with_assignments(topic: impl Into<String>, replicas: Vec<ReplicaAssignment>) -> Self {
        Self {
            topic: topic.into(),
            partition_count: replicas.len() as i32,
            replication_factor: -1,
            replicas,
            config: Vec::new(),
        }
    }

    pub fn with_replication_factor(
        topic: impl Into<String>,
        partition_count: i32,
        replication_factor: i32,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition_count,
            replication_factor,
            replicas: Vec::new(),
            config: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.topic
    }

    /// Validates the "explicit replica assignment is mutually exclusive
    /// with a numeric replication factor" rule and that any assignment
    /// given is well-formed.
    pub fn validate(&self) -> Result<(), AdminError> {
        if self.topic.is_empty() {
            return Err(AdminError::invalid_arg("topic name must not be empty"));
        }

        let has_assignment = !self.replicas.is_empty();
        let has_replication_factor = self.replication_factor != -1;
        if has_assignment && has_replication_factor {
            return Err(AdminError::invalid_arg(format!(
                "topic '{}': explicit replica assignment is mutually exclusive with replication_factor",
                self.topic
            )));
        }

        if has_assignment {
            validate_non_empty_assignments(&self.topic, &self.replicas)?;
        } else {
            if self.partition_count < Self::MIN_PARTITION_COUNT {
                return Err(AdminError::invalid_arg(format!(
                    "topic '{}': partition_count must be >= {}",
                    self.topic,
                    Self::MIN_PARTITION_COUNT
                )));
            }
            if self.replication_factor < Self::MIN_REPLICATION_FACTOR {
                return Err(AdminError::invalid_arg(format!(
                    "topic '{}': replication_factor must be >= {}",
                    self.topic,
                    Self::MIN_REPLICATION_FACTOR
                )));
            }
        }
        Ok(())
    }
}

/// Input element for `DeleteTopics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTopic {
    pub topic: String,
}

impl DeleteTopic {
    pub fn new(topic: impl Into<String>) -> Self {
        Self { topic: topic.into() }
    }

    pub fn identifier(&self) -> &str {
        &self.topic
    }

    pub fn validate(&self) -> Result<(), AdminError> {
        if self.topic.is_empty() {
            return Err(AdminError::invalid_arg("topic name must not be empty"));
        }
        Ok(())
    }
}

/// Input element for `CreatePartitions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPartitions {
    pub topic: String,
    pub total_count: i32,
    pub replicas: Vec<ReplicaAssignment>,
}

impl NewPartitions {
    pub fn new(topic: impl Into<String>, total_count: i32) -> Self {
        Self {
            topic: topic.into(),
            total_count,
            replicas: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.topic
    }

    pub fn validate(&self) -> Result<(), AdminError> {
        if self.topic.is_empty() {
            return Err(AdminError::invalid_arg("topic name must not be empty"));
        }
        if self.total_count < 1 {
            return Err(AdminError::invalid_arg(format!(
                "topic '{}': total_count must be >= 1",
                self.topic
            )));
        }
        if !self.replicas.is_empty() {
            validate_non_empty_assignments(&self.topic, &self.replicas)?;
        }
        Ok(())
    }
}

/// The partition index is the position in `replicas`, so there's nothing
/// left to order; this only rejects an empty assignment list and any
/// partition assigned zero replicas.
fn validate_non_empty_assignments(topic: &str, replicas: &[ReplicaAssignment]) -> Result<(), AdminError> {
    if replicas.is_empty() {
        return Err(AdminError::invalid_arg(format!(
            "topic '{topic}': replica assignment must not be empty"
        )));
    }
    for assignment in replicas {
        if assignment.is_empty() {
            return Err(AdminError::invalid_arg(format!(
                "topic '{topic}': replica assignment must list at least one broker"
            )));
        }
    }
    Ok(())
}

/// Per-element outcome for CreateTopics/DeleteTopics/CreatePartitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicResult {
    pub topic: String,
    pub error: Option<AdminError>,
}

impl TopicResult {
    pub fn ok(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            error: None,
        }
    }

    pub fn failed(topic: impl Into<String>, error: AdminError) -> Self {
        Self {
            topic: topic.into(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_and_replication_factor_are_mutually_exclusive() {
        let mut topic = NewTopic::with_assignments("a", vec![vec![0], vec![1]]);
        topic.replication_factor = 2;
        assert!(topic.validate().is_err());
    }

    #[test]
    fn plain_replication_factor_topic_validates() {
        let topic = NewTopic::with_replication_factor("a", 3, 1);
        assert!(topic.validate().is_ok());
    }

    #[test]
    fn empty_assignment_list_rejected() {
        let topic = NewTopic::with_assignments("a", vec![]);
        assert!(topic.validate().is_err());
    }
}
