//! Typed ID wrappers for members, teams, executions, jobs, sessions, and agents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up member IDs, execution IDs, etc.
/// These are just strings underneath — no UUID enforcement, no format
/// requirement beyond what each wrapper's constructor imposes.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(MemberId, "Stable, globally unique identifier for a robot member.");
typed_id!(TeamId, "Identifier for the team a robot belongs to.");
typed_id!(ExecutionId, "Unique identifier for one triggered execution.");
typed_id!(SessionId, "Identifier for the agent-bridge session of an execution.");
typed_id!(AgentId, "Identifier for a delegated per-phase agent.");
typed_id!(ToolServerId, "Identifier for a registered MCP tool server.");

/// The persisted job id, always derived from an execution id as
/// `robot_exec_<execution_id>` (§6).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Derive the canonical job id for an execution.
    pub fn for_execution(execution_id: &ExecutionId) -> Self {
        Self(format!("robot_exec_{}", execution_id.as_str()))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
