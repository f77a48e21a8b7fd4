//! Blender in background mode.
//!
//! The scene is rendered into a `bpy` program passed with `--python-expr`.
//! The program ends by printing one line starting with [`REPORT_PREFIX`]
//! followed by a JSON object with the Blender version and the object names.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use shared::{Primitive, SceneDescription, SceneOperation, Transform};

use crate::{check_operations, SceneError, SceneHost, SceneReport};

pub const REPORT_PREFIX: &str = "LURE_SCENE_REPORT ";
pub const DEFAULT_EXECUTABLE: &str = "blender";

#[derive(Debug, Clone)]
pub struct BlenderHost {
    executable: PathBuf,
}

impl BlenderHost {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Default for BlenderHost {
    fn default() -> Self {
        Self::new(DEFAULT_EXECUTABLE)
    }
}

impl SceneHost for BlenderHost {
    fn name(&self) -> &str {
        "Blender"
    }

    fn run(&self, scene: &SceneDescription) -> Result<SceneReport, SceneError> {
        check_operations(scene)?;
        let program = python_program(scene);

        tracing::debug!(executable = %self.executable.display(), "Starting Blender");
        tracing::trace!("bpy program:\n{}", program);

        let output = Command::new(&self.executable)
            .args(["--background", "--factory-startup", "--python-exit-code", "1"])
            .arg("--python-expr")
            .arg(&program)
            .output()
            .map_err(|source| SceneError::Spawn {
                program: self.executable.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            return Err(SceneError::HostFailed {
                host: self.name().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = parse_report(&stdout)?;
        tracing::debug!(version = %report.version, objects = ?report.objects, "Blender finished");

        let mut objects = report.objects;
        objects.sort();
        Ok(SceneReport {
            host: self.name().to_string(),
            host_version: Some(report.version),
            objects,
        })
    }
}

/// Report line printed by the generated program
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlenderReport {
    pub version: String,
    pub objects: Vec<String>,
}

/// Finds the last report line in Blender's stdout.
pub fn parse_report(stdout: &str) -> Result<BlenderReport, SceneError> {
    let line = stdout
        .lines()
        .rev()
        .find_map(|line| line.trim_end().strip_prefix(REPORT_PREFIX))
        .ok_or(SceneError::MissingReport)?;

    Ok(serde_json::from_str(line)?)
}

/// Renders the operations as a `bpy` program.
///
/// Expects operations already accepted by [`check_operations`].
pub fn python_program(scene: &SceneDescription) -> String {
    let mut py = String::from("import bpy, json, math\nobjects = {}\n");

    for op in &scene.operations {
        match op {
            SceneOperation::ClearScene => {
                py.push_str("bpy.ops.object.select_all(action='SELECT')\n");
                py.push_str("bpy.ops.object.delete(use_global=False)\n");
                py.push_str("objects.clear()\n");
            }
            SceneOperation::CreatePrimitive { id, primitive, transform } => {
                py.push_str(&primitive_call(primitive, transform));
                py.push('\n');
                let id = py_str(id);
                let _ = writeln!(py, "objects[{id}] = bpy.context.active_object");
                let _ = writeln!(py, "objects[{id}].name = {id}");
            }
            SceneOperation::Rename { id, name } => {
                let _ = writeln!(py, "objects[{}].name = {}", py_str(id), py_str(name));
            }
        }
    }

    let _ = writeln!(
        py,
        "print({} + json.dumps({{'version': bpy.app.version_string, \
         'objects': sorted(o.name for o in bpy.context.scene.objects)}}), flush=True)",
        py_str(REPORT_PREFIX)
    );
    py
}

/// Blender is Z-up: width runs along X, depth along Y, height along Z.
fn primitive_call(primitive: &Primitive, transform: &Transform) -> String {
    let [sx, sy, sz] = transform.scale;
    let placement = format!(
        "location={}, rotation={}",
        py_tuple(transform.position),
        py_tuple(transform.rotation.map(f64::to_radians)),
    );

    match primitive {
        Primitive::Cube { width, height, depth } => format!(
            "bpy.ops.mesh.primitive_cube_add(size=1.0, {placement}, scale={})",
            py_tuple([width * sx, depth * sy, height * sz])
        ),
        Primitive::Cylinder { radius, height } => format!(
            "bpy.ops.mesh.primitive_cylinder_add(radius={}, depth={}, {placement}, scale={})",
            py_float(*radius),
            py_float(*height),
            py_tuple(transform.scale)
        ),
        Primitive::Sphere { radius } => format!(
            "bpy.ops.mesh.primitive_uv_sphere_add(radius={}, {placement}, scale={})",
            py_float(*radius),
            py_tuple(transform.scale)
        ),
        Primitive::Cone { radius, height } => format!(
            "bpy.ops.mesh.primitive_cone_add(radius1={}, radius2=0.0, depth={}, {placement}, scale={})",
            py_float(*radius),
            py_float(*height),
            py_tuple(transform.scale)
        ),
    }
}

/// JSON string literals are valid Python string literals
fn py_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn py_float(v: f64) -> String {
    format!("{v:?}")
}

fn py_tuple([x, y, z]: [f64; 3]) -> String {
    format!("({}, {}, {})", py_float(x), py_float(y), py_float(z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoke::smoke_scene;

    #[test]
    fn test_program_clears_adds_and_renames() {
        let py = python_program(&smoke_scene());
        let lines: Vec<&str> = py.lines().collect();

        let select = lines.iter().position(|l| l.contains("select_all(action='SELECT')")).unwrap();
        let delete = lines.iter().position(|l| l.contains("object.delete(use_global=False)")).unwrap();
        let add = lines.iter().position(|l| l.starts_with("bpy.ops.mesh.primitive_cube_add")).unwrap();
        let rename = lines.iter().position(|l| *l == r#"objects["lure"].name = "TestLure""#).unwrap();

        assert!(select < delete && delete < add && add < rename);
        assert!(lines[add].contains("location=(0.0, 0.0, 0.0)"));
        assert!(lines[add].contains("scale=(2.0, 2.0, 2.0)"));
    }

    #[test]
    fn test_program_prints_report_last() {
        let py = python_program(&smoke_scene());
        let last = py.lines().last().unwrap();
        assert!(last.starts_with(r#"print("LURE_SCENE_REPORT " + json.dumps("#));
        assert!(last.contains("bpy.app.version_string"));
    }

    #[test]
    fn test_rotation_converted_to_radians() {
        let transform = Transform {
            position: [1.0, -2.5, 0.0],
            rotation: [180.0, 0.0, 90.0],
            scale: [1.0, 1.0, 1.0],
        };
        let call = primitive_call(&Primitive::Sphere { radius: 0.5 }, &transform);
        assert!(call.starts_with("bpy.ops.mesh.primitive_uv_sphere_add(radius=0.5"));
        assert!(call.contains("location=(1.0, -2.5, 0.0)"));
        assert!(call.contains(&format!(
            "rotation=({:?}, 0.0, {:?})",
            180f64.to_radians(),
            90f64.to_radians()
        )));
    }

    #[test]
    fn test_cone_has_point() {
        let call = primitive_call(&Primitive::Cone { radius: 1.0, height: 3.0 }, &Transform::new());
        assert!(call.contains("radius1=1.0, radius2=0.0, depth=3.0"));
    }

    #[test]
    fn test_names_are_quoted() {
        assert_eq!(py_str("Test\"Lure"), r#""Test\"Lure""#);
        assert_eq!(py_str("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn test_parse_report_takes_last_line() {
        let stdout = "Blender 4.1.1 (hash e1743a0317bc built 2024-04-15)\n\
                      LURE_SCENE_REPORT {\"version\": \"old\", \"objects\": []}\n\
                      LURE_SCENE_REPORT {\"version\": \"4.1.1\", \"objects\": [\"TestLure\"]}\n\
                      \n\
                      Blender quit\n";
        let report = parse_report(stdout).unwrap();
        assert_eq!(report.version, "4.1.1");
        assert_eq!(report.objects, vec!["TestLure".to_string()]);
    }

    #[test]
    fn test_parse_report_missing() {
        assert!(matches!(
            parse_report("Blender 4.1.1\nBlender quit\n"),
            Err(SceneError::MissingReport)
        ));
    }

    #[test]
    fn test_parse_report_garbled() {
        assert!(matches!(
            parse_report("LURE_SCENE_REPORT {\"version\": 4"),
            Err(SceneError::InvalidReport(_))
        ));
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let host = BlenderHost::new("/nonexistent/bin/blender-for-lure-tests");
        let err = host.run(&smoke_scene()).unwrap_err();
        assert!(matches!(err, SceneError::Spawn { .. }), "{err}");
    }

    #[test]
    fn test_invalid_scene_rejected_before_spawn() {
        let host = BlenderHost::new("/nonexistent/bin/blender-for-lure-tests");
        let scene = SceneDescription {
            operations: vec![SceneOperation::Rename {
                id: "nope".to_string(),
                name: "TestLure".to_string(),
            }],
        };
        assert!(matches!(host.run(&scene), Err(SceneError::UnknownObject(_))));
    }
}
