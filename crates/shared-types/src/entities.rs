//! # Core Domain Entities
//!
//! The records the authoritative store keeps and the delegate protocol moves
//! between nodes.
//!
//! ## Clusters
//!
//! - **Cluster membership**: `Node`, `NodeInfo`, `NodeStatus`
//! - **Workload**: `Project`, `Spider`, `Task`, `TaskStat`, `Schedule`
//! - **Administration**: `User`, `Tag`
//! - **Audit**: `Artifact`
//!
//! Every entity serializes its identity as `_id` and tolerates missing fields
//! on decode, so a caller may send an identity-only record.

use crate::object_id::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: MEMBERSHIP
// =============================================================================

/// Lifecycle status of a node.
///
/// ```text
/// Unregistered ──Register──→ Registered ──Heartbeat──→ Online ⇄ Offline
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Unregistered,
    Registered,
    Online,
    Offline,
}

impl NodeStatus {
    /// Whether the lifecycle allows moving from `self` to `to`.
    ///
    /// Re-registration is always allowed. `Unregistered` only leaves through
    /// registration.
    #[must_use]
    pub fn can_transition(self, to: NodeStatus) -> bool {
        use NodeStatus::*;
        match (self, to) {
            (_, Registered) => true,
            (Unregistered, _) => false,
            (Registered | Online | Offline, Online) => true,
            (Registered | Online, Offline) => true,
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// A cluster participant, master or worker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Cluster-unique, stable identity.
    pub key: String,
    pub name: String,
    pub ip: String,
    pub hostname: String,
    pub description: String,
    pub is_master: bool,
    pub max_runners: u32,
    pub status: NodeStatus,
    pub active: bool,
    pub enabled: bool,
    /// Last time the node proved liveness.
    pub active_ts: Option<DateTime<Utc>>,
}

impl Node {
    /// Apply a lifecycle mutation.
    pub fn set_status(&mut self, status: NodeStatus, active: bool, active_ts: Option<DateTime<Utc>>) {
        self.status = status;
        self.active = active;
        if let Some(ts) = active_ts {
            self.active_ts = Some(ts);
        }
    }
}

/// What a worker reports about itself when registering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub key: String,
    pub is_master: bool,
    pub name: String,
    pub ip: String,
    pub hostname: String,
    pub description: String,
    pub max_runners: u32,
}

// =============================================================================
// CLUSTER B: WORKLOAD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
}

/// A runnable crawler definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spider {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Collection results are written to.
    pub col_name: String,
    pub project_id: Option<ObjectId>,
    pub cmd: String,
    pub param: String,
    pub description: String,
}

/// One execution of a spider on a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub spider_id: Option<ObjectId>,
    pub node_id: Option<ObjectId>,
    pub status: String,
    pub cmd: String,
    pub param: String,
    pub priority: u8,
    pub error: String,
}

/// Counters kept for a task. Shares its id with the task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskStat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub create_ts: Option<DateTime<Utc>>,
    pub start_ts: Option<DateTime<Utc>>,
    pub end_ts: Option<DateTime<Utc>>,
    pub result_count: u64,
    pub log_count: u64,
    pub error_log_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub cron: String,
    pub spider_id: Option<ObjectId>,
    pub enabled: bool,
}

// =============================================================================
// CLUSTER C: ADMINISTRATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub color: String,
    /// Collection of the entities this tag applies to.
    pub col: String,
}

// =============================================================================
// CLUSTER D: AUDIT
// =============================================================================

/// Audit record the store keeps for every entity, keyed by the entity id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Collection of the entity this artifact tracks.
    pub col: String,
    pub deleted: bool,
    pub create_ts: Option<DateTime<Utc>>,
    pub update_ts: Option<DateTime<Utc>>,
    pub delete_ts: Option<DateTime<Utc>>,
}
