//! Headless 3D scene tooling.
//!
//! A [`SceneHost`] executes a [`SceneDescription`] and reports which objects
//! the scene ends up with. Two hosts exist: [`blender::BlenderHost`] drives a
//! Blender subprocess in background mode, [`kernel::KernelHost`] runs the
//! operations in-process on the vcad kernel. [`smoke`] uses either one to
//! check that headless scene editing works at all.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shared::{SceneDescription, SceneOperation};
use thiserror::Error;

pub mod blender;
pub mod kernel;
pub mod smoke;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to start '{path}': {source}", path = .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{host} exited with {status}: {stderr}")]
    HostFailed {
        host: String,
        status: String,
        stderr: String,
    },

    #[error("no scene report in host output")]
    MissingReport,

    #[error("invalid scene report: {0}")]
    InvalidReport(#[from] serde_json::Error),

    #[error("object '{0}' not found")]
    UnknownObject(String),

    #[error("object '{0}' already exists")]
    DuplicateObject(String),

    #[error("non-finite value in object '{0}'")]
    InvalidValue(String),

    #[error("GLB export of '{id}' failed: {message}")]
    Export { id: String, message: String },

    #[error("expected objects {expected:?}, scene has {found:?}")]
    UnexpectedObjects {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// What a host reports after running a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReport {
    pub host: String,
    pub host_version: Option<String>,
    /// Object names present at the end, sorted
    pub objects: Vec<String>,
}

/// Something that can execute scene operations headlessly
pub trait SceneHost {
    fn name(&self) -> &str;

    fn run(&self, scene: &SceneDescription) -> Result<SceneReport, SceneError>;
}

/// Objects of Blender's factory startup scene.
pub const STARTUP_OBJECTS: &[&str] = &["Camera", "Cube", "Light"];

/// Checks that every rename targets a live id and no id is created twice.
///
/// Objects the host starts with are not addressable by id, but their names
/// stay taken until the first [`SceneOperation::ClearScene`]. Blender would
/// silently create `Cube.001` instead.
pub fn check_operations(scene: &SceneDescription) -> Result<(), SceneError> {
    let mut live: HashSet<&str> = HashSet::new();
    let mut startup: HashSet<&str> = STARTUP_OBJECTS.iter().copied().collect();

    for op in &scene.operations {
        match op {
            SceneOperation::ClearScene => {
                live.clear();
                startup.clear();
            }
            SceneOperation::CreatePrimitive { id, transform, primitive } => {
                let dims = primitive_dimensions(primitive);
                let mut values = transform
                    .position
                    .iter()
                    .chain(&transform.rotation)
                    .chain(&transform.scale)
                    .chain(&dims);
                if values.any(|v| !v.is_finite()) {
                    return Err(SceneError::InvalidValue(id.clone()));
                }
                if startup.contains(id.as_str()) || !live.insert(id) {
                    return Err(SceneError::DuplicateObject(id.clone()));
                }
            }
            SceneOperation::Rename { id, .. } => {
                if !live.contains(id.as_str()) {
                    return Err(SceneError::UnknownObject(id.clone()));
                }
            }
        }
    }

    Ok(())
}

fn primitive_dimensions(primitive: &shared::Primitive) -> Vec<f64> {
    use shared::Primitive;

    match primitive {
        Primitive::Cube { width, height, depth } => vec![*width, *height, *depth],
        Primitive::Cylinder { radius, height } | Primitive::Cone { radius, height } => {
            vec![*radius, *height]
        }
        Primitive::Sphere { radius } => vec![*radius],
    }
}
