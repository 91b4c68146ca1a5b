//! # Model Dispatch
//!
//! Closed set of entity kinds the delegate protocol and the store understand.
//! A [`ModelKind`] travels on the wire as a raw `i32`; a [`Model`] is the
//! decoded entity, one variant per kind.

use crate::codec;
use crate::entities::{Artifact, Node, Project, Schedule, Spider, Tag, Task, TaskStat, User};
use crate::errors::CodecError;
use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire tag naming an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i32)]
pub enum ModelKind {
    Node = 1,
    Project = 2,
    Spider = 3,
    Task = 4,
    TaskStat = 5,
    Schedule = 6,
    User = 7,
    Tag = 8,
    Artifact = 9,
}

impl ModelKind {
    pub const ALL: [ModelKind; 9] = [
        Self::Node,
        Self::Project,
        Self::Spider,
        Self::Task,
        Self::TaskStat,
        Self::Schedule,
        Self::User,
        Self::Tag,
        Self::Artifact,
    ];

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ModelKind {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_i32() == value)
            .ok_or(value)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! define_models {
    ($($variant:ident => ($label:literal, $col:literal)),+ $(,)?) => {
        impl ModelKind {
            /// Short label used in logs and metric labels.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Store collection backing this kind.
            #[must_use]
            pub const fn collection(self) -> &'static str {
                match self {
                    $(Self::$variant => $col),+
                }
            }
        }

        /// A decoded entity of any known kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Model {
            $($variant($variant)),+
        }

        impl Model {
            #[must_use]
            pub fn kind(&self) -> ModelKind {
                match self {
                    $(Self::$variant(_) => ModelKind::$variant),+
                }
            }

            #[must_use]
            pub fn id(&self) -> Option<ObjectId> {
                match self {
                    $(Self::$variant(m) => m.id),+
                }
            }

            pub fn set_id(&mut self, id: ObjectId) {
                match self {
                    $(Self::$variant(m) => m.id = Some(id)),+
                }
            }

            /// An entity of `kind` carrying nothing but `id`.
            #[must_use]
            pub fn identity(kind: ModelKind, id: ObjectId) -> Self {
                let mut model = match kind {
                    $(ModelKind::$variant => Self::$variant($variant::default())),+
                };
                model.set_id(id);
                model
            }

            /// Serialize the entity as a JSON payload.
            pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
                match self {
                    $(Self::$variant(m) => codec::to_json(m)),+
                }
            }

            /// Decode a JSON payload as an entity of `kind`.
            pub fn decode(kind: ModelKind, bytes: &[u8]) -> Result<Self, CodecError> {
                match kind {
                    $(ModelKind::$variant => codec::from_json::<$variant>(bytes).map(Self::$variant)),+
                }
            }
        }

        $(
            impl From<$variant> for Model {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<Model> for $variant {
                type Error = Model;

                fn try_from(model: Model) -> Result<Self, Self::Error> {
                    match model {
                        Model::$variant(m) => Ok(m),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

define_models! {
    Node => ("node", "nodes"),
    Project => ("project", "projects"),
    Spider => ("spider", "spiders"),
    Task => ("task", "tasks"),
    TaskStat => ("task_stat", "task_stats"),
    Schedule => ("schedule", "schedules"),
    User => ("user", "users"),
    Tag => ("tag", "tags"),
    Artifact => ("artifact", "artifacts"),
}
