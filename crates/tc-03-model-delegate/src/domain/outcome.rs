//! Result of a delegate call.

use shared_types::{codec, Artifact, CodecError, Model};

/// What a delegate call hands back: the entity, or for `GetDerived` its
/// artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum DelegateOutcome {
    Model(Model),
    Artifact(Artifact),
}

impl DelegateOutcome {
    /// JSON payload for the response, same encoding as requests.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Model(model) => model.encode(),
            Self::Artifact(artifact) => codec::to_json(artifact),
        }
    }

    #[must_use]
    pub fn into_model(self) -> Option<Model> {
        match self {
            Self::Model(model) => Some(model),
            Self::Artifact(_) => None,
        }
    }

    #[must_use]
    pub fn into_artifact(self) -> Option<Artifact> {
        match self {
            Self::Artifact(artifact) => Some(artifact),
            Self::Model(_) => None,
        }
    }
}
