use clap::{Parser, Subcommand, ValueEnum};

/// Offline demo for the admin engine: runs each subcommand against an
/// in-memory cluster that accepts every request it is shown.
#[derive(Debug, Parser)]
#[command(name = "streamctl", version, about = "streamctl admin engine demo")]
pub struct Cli {
    /// Request-level deadline, applied to every submitted request.
    #[arg(long, env = "STREAMCTL_REQUEST_TIMEOUT_MS", default_value_t = streamctl_engine::ClientConfig::DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: i64,

    /// Target a specific broker instead of the controller (`-1` = controller).
    #[arg(long, default_value_t = -1)]
    pub broker: i32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceTypeArg {
    Topic,
    Broker,
    Group,
}

impl From<ResourceTypeArg> for streamctl_core::ConfigResourceType {
    fn from(t: ResourceTypeArg) -> Self {
        match t {
            ResourceTypeArg::Topic => streamctl_core::ConfigResourceType::Topic,
            ResourceTypeArg::Broker => streamctl_core::ConfigResourceType::Broker,
            ResourceTypeArg::Group => streamctl_core::ConfigResourceType::Group,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a single topic.
    CreateTopic {
        topic: String,
        #[arg(long, default_value_t = 1)]
        partitions: i32,
        #[arg(long, default_value_t = 1)]
        replication_factor: i32,
    },
    /// Delete a single topic.
    DeleteTopic { topic: String },
    /// Grow a topic to a new total partition count.
    CreatePartitions {
        topic: String,
        #[arg(long)]
        total_count: i32,
    },
    /// Set one or more config entries on a resource (`key=value` pairs).
    AlterConfig {
        #[arg(long = "type", value_enum)]
        resource_type: ResourceTypeArg,
        name: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
    },
    /// Read back a resource's configuration.
    DescribeConfig {
        #[arg(long = "type", value_enum)]
        resource_type: ResourceTypeArg,
        name: String,
    },
}
