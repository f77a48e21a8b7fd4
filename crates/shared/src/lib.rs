use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the service as reported by the health check
pub const SERVICE_NAME: &str = "ai-lure-designer";

// ============================================================================
// HTTP payloads
// ============================================================================

/// Single human-readable status line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}

/// Available lure shapes. Entries carry no schema yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LureCatalog {
    pub lures: Vec<Value>,
}

/// Available texture patterns. Entries carry no schema yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternCatalog {
    pub patterns: Vec<Value>,
}

/// Error body returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// Design assistant chat
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One turn of a conversation with the design assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Assistant answer to a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub id: String,
    pub model: String,
    pub reply: String,
}

// ============================================================================
// Scene model used by the headless smoke test
// ============================================================================

/// Identifier of an object in a scene
pub type ObjectId = String;

/// Primitive shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Cube {
        width: f64,
        height: f64,
        depth: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    Cone {
        radius: f64,
        height: f64,
    },
}

/// Object placement. Rotation is in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

/// Step applied to a scene, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneOperation {
    /// Remove every object, including whatever the host starts with
    ClearScene,
    CreatePrimitive {
        id: ObjectId,
        primitive: Primitive,
        transform: Transform,
    },
    Rename {
        id: ObjectId,
        name: String,
    },
}

/// Scene as a sequence of operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneDescription {
    pub operations: Vec<SceneOperation>,
}
