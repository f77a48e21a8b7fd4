//! Manual check that a scene host works headlessly: clear the default scene,
//! add a cube at the origin, rename it, and print what happened.

use std::io::Write;

use shared::{Primitive, SceneDescription, SceneOperation, Transform};

use crate::{SceneError, SceneHost, SceneReport};

pub const LURE_NAME: &str = "TestLure";
const LURE_ID: &str = "lure";

pub fn smoke_scene() -> SceneDescription {
    SceneDescription {
        operations: vec![
            SceneOperation::ClearScene,
            SceneOperation::CreatePrimitive {
                id: LURE_ID.to_string(),
                primitive: Primitive::Cube {
                    width: 2.0,
                    height: 2.0,
                    depth: 2.0,
                },
                transform: Transform::at([0.0, 0.0, 0.0]),
            },
            SceneOperation::Rename {
                id: LURE_ID.to_string(),
                name: LURE_NAME.to_string(),
            },
        ],
    }
}

/// The scene must end up holding the renamed cube and nothing else.
pub fn verify(report: &SceneReport) -> Result<(), SceneError> {
    if report.objects.len() == 1 && report.objects[0] == LURE_NAME {
        Ok(())
    } else {
        Err(SceneError::UnexpectedObjects {
            expected: vec![LURE_NAME.to_string()],
            found: report.objects.clone(),
        })
    }
}

pub fn execute(host: &dyn SceneHost) -> Result<SceneReport, SceneError> {
    let report = host.run(&smoke_scene())?;
    verify(&report)?;
    Ok(report)
}

/// Runs the smoke scene on `host`, writing progress lines to `out`.
pub fn run_headless_smoke_test(host: &dyn SceneHost, out: &mut dyn Write) -> bool {
    let host_name = host.name();
    let _ = writeln!(out, "🔧 Testing {host_name} headless mode...");

    match execute(host) {
        Ok(report) => {
            let version = report.host_version.as_deref().unwrap_or("unknown");
            let _ = writeln!(out, "✅ Created object: {LURE_NAME}");
            let _ = writeln!(out, "✅ {host_name} version: {version}");
            let _ = writeln!(out, "✅ {host_name} headless test completed successfully!");
            tracing::info!(host = host_name, version, "Smoke test passed");
            true
        }
        Err(e) => {
            let _ = writeln!(out, "❌ {host_name} headless test failed: {e}");
            tracing::error!(host = host_name, "Smoke test failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelHost;

    struct FixedHost(Result<Vec<&'static str>, ()>);

    impl SceneHost for FixedHost {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn run(&self, _scene: &SceneDescription) -> Result<SceneReport, SceneError> {
            match &self.0 {
                Ok(objects) => Ok(SceneReport {
                    host: "Fixed".to_string(),
                    host_version: Some("9.9.9".to_string()),
                    objects: objects.iter().map(|s| s.to_string()).collect(),
                }),
                Err(()) => Err(SceneError::MissingReport),
            }
        }
    }

    fn output_of(host: &dyn SceneHost) -> (bool, String) {
        let mut out = Vec::new();
        let ok = run_headless_smoke_test(host, &mut out);
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_kernel_smoke_passes() {
        let (ok, out) = output_of(&KernelHost::new());
        assert!(ok, "{out}");
        assert!(out.contains("✅ Created object: TestLure"));
        assert!(out.contains("✅ vcad version: unknown"));
        assert!(out.ends_with("✅ vcad headless test completed successfully!\n"));
    }

    #[test]
    fn test_host_version_printed() {
        let (ok, out) = output_of(&FixedHost(Ok(vec!["TestLure"])));
        assert!(ok);
        assert!(out.starts_with("🔧 Testing Fixed headless mode...\n"));
        assert!(out.contains("✅ Fixed version: 9.9.9"));
    }

    #[test]
    fn test_leftover_objects_fail() {
        let (ok, out) = output_of(&FixedHost(Ok(vec!["Camera", "TestLure"])));
        assert!(!ok);
        assert!(out.contains("❌ Fixed headless test failed"));
        assert!(out.contains("Camera"));
    }

    #[test]
    fn test_host_error_fails() {
        let (ok, out) = output_of(&FixedHost(Err(())));
        assert!(!ok);
        assert!(out.contains("no scene report in host output"));
    }

    #[test]
    fn test_verify_requires_exact_name() {
        let report = SceneReport {
            host: "x".to_string(),
            host_version: None,
            objects: vec!["TestLure.001".to_string()],
        };
        assert!(matches!(verify(&report), Err(SceneError::UnexpectedObjects { .. })));
    }
}
