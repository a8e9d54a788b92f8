use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Which admin API a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiKind {
    CreateTopics,
    DeleteTopics,
    CreatePartitions,
    AlterConfigs,
    DescribeConfigs,
}

impl ApiKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiKind::CreateTopics => "CreateTopics",
            ApiKind::DeleteTopics => "DeleteTopics",
            ApiKind::CreatePartitions => "CreatePartitions",
            ApiKind::AlterConfigs => "AlterConfigs",
            ApiKind::DescribeConfigs => "DescribeConfigs",
        }
    }

    fn supports_operation_timeout(self) -> bool {
        matches!(
            self,
            ApiKind::CreateTopics | ApiKind::DeleteTopics | ApiKind::CreatePartitions
        )
    }

    fn supports_validate_only(self) -> bool {
        matches!(
            self,
            ApiKind::CreateTopics | ApiKind::CreatePartitions | ApiKind::AlterConfigs
        )
    }

    fn supports_incremental(self) -> bool {
        matches!(self, ApiKind::AlterConfigs)
    }
}

/// Validated, per-API option bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOptions {
    request_timeout_ms: Option<i64>,
    operation_timeout_ms: Option<i32>,
    validate_only: Option<bool>,
    incremental: Option<bool>,
    broker: Option<i32>,
    opaque: Option<serde_json::Value>,
}

impl AdminOptions {
    pub const MIN_REQUEST_TIMEOUT_MS: i64 = 0;
    pub const MAX_REQUEST_TIMEOUT_MS: i64 = 3_600_000;
    pub const MIN_OPERATION_TIMEOUT_MS: i32 = -1;
    pub const MAX_OPERATION_TIMEOUT_MS: i32 = 3_600_000;
    pub const DEFAULT_OPERATION_TIMEOUT_MS: i32 = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// `request_timeout`: absolute in-engine deadline, applicable to all APIs.
    pub fn set_request_timeout_ms(&mut self, ms: i64) -> Result<(), AdminError> {
        if !(Self::MIN_REQUEST_TIMEOUT_MS..=Self::MAX_REQUEST_TIMEOUT_MS).contains(&ms) {
            return Err(AdminError::invalid_arg(format!(
                "request_timeout must be between {} and {} ms, got {ms}",
                Self::MIN_REQUEST_TIMEOUT_MS,
                Self::MAX_REQUEST_TIMEOUT_MS
            )));
        }
        self.request_timeout_ms = Some(ms);
        Ok(())
    }

    pub fn request_timeout_ms(&self, default_ms: i64) -> i64 {
        self.request_timeout_ms.unwrap_or(default_ms)
    }

    /// `operation_timeout`: only CreateTopics, DeleteTopics, CreatePartitions.
    pub fn set_operation_timeout_ms(&mut self, kind: ApiKind, ms: i32) -> Result<(), AdminError> {
        if !kind.supports_operation_timeout() {
            return Err(unsupported(kind, "operation_timeout"));
        }
        if !(Self::MIN_OPERATION_TIMEOUT_MS..=Self::MAX_OPERATION_TIMEOUT_MS).contains(&ms) {
            return Err(AdminError::invalid_arg(format!(
                "operation_timeout must be between {} and {} ms, got {ms}",
                Self::MIN_OPERATION_TIMEOUT_MS,
                Self::MAX_OPERATION_TIMEOUT_MS
            )));
        }
        self.operation_timeout_ms = Some(ms);
        Ok(())
    }

    pub fn operation_timeout_ms(&self) -> i32 {
        self.operation_timeout_ms
            .unwrap_or(Self::DEFAULT_OPERATION_TIMEOUT_MS)
    }

    /// `validate_only`: CreateTopics, CreatePartitions, AlterConfigs.
    pub fn set_validate_only(&mut self, kind: ApiKind, value: bool) -> Result<(), AdminError> {
        if !kind.supports_validate_only() {
            return Err(unsupported(kind, "validate_only"));
        }
        self.validate_only = Some(value);
        Ok(())
    }

    pub fn validate_only(&self) -> bool {
        self.validate_only.unwrap_or(false)
    }

    /// `incremental`: reserved for incremental AlterConfigs.
    pub fn set_incremental(&mut self, kind: ApiKind, value: bool) -> Result<(), AdminError> {
        if !kind.supports_incremental() {
            return Err(unsupported(kind, "incremental"));
        }
        self.incremental = Some(value);
        Ok(())
    }

    pub fn incremental(&self) -> bool {
        self.incremental.unwrap_or(false)
    }

    /// `broker`: applicable to all APIs; target that broker id instead of
    /// the controller when set and `>= 0`.
    pub fn set_broker(&mut self, broker_id: i32) -> Result<(), AdminError> {
        if broker_id < -1 {
            return Err(AdminError::invalid_arg(format!(
                "broker id must be -1 or >= 0, got {broker_id}"
            )));
        }
        self.broker = Some(broker_id);
        Ok(())
    }

    /// `-1` means "use the controller", matching `RequestItem::broker_id`.
    pub fn broker(&self) -> i32 {
        self.broker.unwrap_or(-1)
    }

    /// `opaque`: caller cookie returned in the result, applicable to all APIs.
    pub fn set_opaque(&mut self, opaque: serde_json::Value) {
        self.opaque = Some(opaque);
    }

    pub fn opaque(&self) -> Option<&serde_json::Value> {
        self.opaque.as_ref()
    }
}

fn unsupported(kind: ApiKind, option: &str) -> AdminError {
    AdminError::invalid_arg(format!(
        "option '{option}' is not supported by {}",
        kind.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_timeout_rejected_on_unsupported_api() {
        let mut opts = AdminOptions::new();
        let err = opts
            .set_operation_timeout_ms(ApiKind::DescribeConfigs, 1000)
            .unwrap_err();
        assert_eq!(err.kind, crate::error::AdminErrorKind::InvalidArg);
    }

    #[test]
    fn operation_timeout_applies_on_supported_api_and_does_not_mutate_on_error() {
        let mut opts = AdminOptions::new();
        assert!(opts.set_operation_timeout_ms(ApiKind::CreateTopics, 5000).is_ok());
        assert_eq!(opts.operation_timeout_ms(), 5000);

        let before = opts.operation_timeout_ms();
        assert!(opts
            .set_operation_timeout_ms(ApiKind::CreateTopics, 10_000_000)
            .is_err());
        assert_eq!(opts.operation_timeout_ms(), before);
    }

    #[test]
    fn broker_minus_one_means_controller() {
        let opts = AdminOptions::new();
        assert_eq!(opts.broker(), -1);
    }
}
