//! In-process scene host on the vcad CSG kernel.

use std::collections::BTreeMap;

use shared::{Primitive, SceneDescription, SceneOperation, Transform};
use vcad::export::gltf_export::to_glb_bytes;
use vcad::export::Material;
use vcad::{centered_cube, Part};

use crate::{check_operations, SceneError, SceneHost, SceneReport};

const DEFAULT_SEGMENTS: u32 = 32;

/// Name of the object every fresh scene starts with
pub const DEFAULT_OBJECT: &str = "Cube";

struct SceneObject {
    name: String,
    part: Part,
}

/// Runs scenes on the vcad kernel and exports every result to GLB.
///
/// A fresh scene holds one 2x2x2 cube named [`DEFAULT_OBJECT`], like
/// Blender's factory startup file.
#[derive(Debug, Clone, Default)]
pub struct KernelHost;

impl KernelHost {
    pub fn new() -> Self {
        Self
    }
}

impl SceneHost for KernelHost {
    fn name(&self) -> &str {
        "vcad"
    }

    fn run(&self, scene: &SceneDescription) -> Result<SceneReport, SceneError> {
        check_operations(scene)?;

        let mut objects = default_scene();
        for op in &scene.operations {
            apply_operation(&mut objects, op)?;
        }

        let material = Material::default();
        let mut names = Vec::with_capacity(objects.len());
        for (id, object) in &objects {
            let glb = to_glb_bytes(&object.part, &material).map_err(|e| SceneError::Export {
                id: id.clone(),
                message: e.to_string(),
            })?;
            tracing::debug!(
                id = %id,
                name = %object.name,
                volume = object.part.volume(),
                glb_bytes = glb.len(),
                "Exported object"
            );
            names.push(object.name.clone());
        }
        names.sort();

        Ok(SceneReport {
            host: self.name().to_string(),
            host_version: None,
            objects: names,
        })
    }
}

/// Objects keyed by id; host-provided objects use their name as id
fn default_scene() -> BTreeMap<String, SceneObject> {
    let mut objects = BTreeMap::new();
    objects.insert(
        DEFAULT_OBJECT.to_string(),
        SceneObject {
            name: DEFAULT_OBJECT.to_string(),
            part: centered_cube(DEFAULT_OBJECT, 2.0, 2.0, 2.0),
        },
    );
    objects
}

fn apply_operation(
    objects: &mut BTreeMap<String, SceneObject>,
    op: &SceneOperation,
) -> Result<(), SceneError> {
    match op {
        SceneOperation::ClearScene => objects.clear(),
        SceneOperation::CreatePrimitive { id, primitive, transform } => {
            if objects.contains_key(id) {
                return Err(SceneError::DuplicateObject(id.clone()));
            }
            let part = apply_transform(create_primitive(id, primitive), transform);
            objects.insert(
                id.clone(),
                SceneObject {
                    name: id.clone(),
                    part,
                },
            );
        }
        SceneOperation::Rename { id, name } => {
            let object = objects
                .get_mut(id)
                .ok_or_else(|| SceneError::UnknownObject(id.clone()))?;
            object.name = name.clone();
        }
    }
    Ok(())
}

fn create_primitive(id: &str, primitive: &Primitive) -> Part {
    match primitive {
        Primitive::Cube { width, height, depth } => centered_cube(id, *width, *height, *depth),
        Primitive::Cylinder { radius, height } => Part::cylinder(id, *radius, *height, DEFAULT_SEGMENTS),
        Primitive::Sphere { radius } => Part::sphere(id, *radius, DEFAULT_SEGMENTS),
        Primitive::Cone { radius, height } => Part::cone(id, *radius, 0.0, *height, DEFAULT_SEGMENTS),
    }
}

fn apply_transform(part: Part, transform: &Transform) -> Part {
    let [tx, ty, tz] = transform.position;
    let [rx, ry, rz] = transform.rotation;
    let [sx, sy, sz] = transform.scale;

    let mut p = part;

    if sx != 1.0 || sy != 1.0 || sz != 1.0 {
        p = p.scale(sx, sy, sz);
    }
    if rx != 0.0 || ry != 0.0 || rz != 0.0 {
        p = p.rotate(rx, ry, rz);
    }
    if tx != 0.0 || ty != 0.0 || tz != 0.0 {
        p = p.translate(tx, ty, tz);
    }

    p
}
