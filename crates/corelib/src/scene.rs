//! Scene description: which mesh/texture pairs are drawn and where.
//!
//! The description only holds paths and placements. GPU resources for it are
//! created by the renderer and owned there.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::placement::Placement;
use crate::{CoreError, CoreResult, Vec3, vec3};

/// One drawable entry: a mesh, the texture bound while drawing it, and its
/// placement in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSlot {
    pub name: String,
    pub mesh_path: PathBuf,
    pub texture_path: PathBuf,
    pub flip_texture: bool,
    pub placement: Placement,
}

impl ModelSlot {
    pub fn new(
        name: impl Into<String>,
        mesh_path: impl Into<PathBuf>,
        texture_path: impl Into<PathBuf>,
        placement: Placement,
    ) -> Self {
        Self {
            name: name.into(),
            mesh_path: mesh_path.into(),
            texture_path: texture_path.into(),
            flip_texture: true,
            placement,
        }
    }
}

/// Ordered list of model slots, drawn in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDesc {
    slots: Vec<ModelSlot>,
}

impl SceneDesc {
    /// Validates slot names and placements.
    pub fn new(slots: Vec<ModelSlot>) -> CoreResult<Self> {
        if slots.is_empty() {
            return Err(CoreError::EmptyScene);
        }
        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.name.as_str()) {
                return Err(CoreError::DuplicateSlot(slot.name.clone()));
            }
            if !slot.placement.is_finite() {
                return Err(CoreError::InvalidPlacement(slot.name.clone()));
            }
        }
        Ok(Self { slots })
    }

    /// Two crates, a robot and a floor.
    pub fn default_scene() -> Self {
        let slots = vec![
            ModelSlot::new(
                "crate1",
                "assets/models/woodcrate.obj",
                "assets/textures/crate.png",
                Placement::new(vec3(-2.5, 1.0, 0.0), Vec3::ONE),
            ),
            ModelSlot::new(
                "crate2",
                "assets/models/crate.obj",
                "assets/textures/woodcrate_diffuse.png",
                Placement::new(vec3(2.5, 1.0, 0.0), Vec3::ONE),
            ),
            ModelSlot::new(
                "robot",
                "assets/models/robot.obj",
                "assets/textures/robot_diffuse.png",
                Placement::new(vec3(0.0, 0.0, -2.0), Vec3::ONE),
            ),
            ModelSlot::new(
                "floor",
                "assets/models/floor.obj",
                "assets/textures/tile_floor.png",
                Placement::new(Vec3::ZERO, vec3(10.0, 1.0, 10.0)),
            ),
        ];
        Self { slots }
    }

    /// Re-root every relative asset path under `root`.
    pub fn rooted_at(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        for slot in &mut self.slots {
            if slot.mesh_path.is_relative() {
                slot.mesh_path = root.join(&slot.mesh_path);
            }
            if slot.texture_path.is_relative() {
                slot.texture_path = root.join(&slot.texture_path);
            }
        }
        self
    }

    #[inline]
    pub fn slots(&self) -> &[ModelSlot] {
        &self.slots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_has_four_slots() {
        let scene = SceneDesc::default_scene();
        assert_eq!(scene.len(), 4);
        let names: Vec<_> = scene.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["crate1", "crate2", "robot", "floor"]);
        assert_eq!(scene.slots()[3].placement.scale, vec3(10.0, 1.0, 10.0));
        assert!(scene.slots().iter().all(|s| s.flip_texture));
        // the default scene must also pass validation
        assert!(SceneDesc::new(scene.slots().to_vec()).is_ok());
    }

    #[test]
    fn rejects_bad_scenes() {
        assert!(matches!(SceneDesc::new(vec![]), Err(CoreError::EmptyScene)));

        let slot = ModelSlot::new("a", "a.obj", "a.png", Placement::identity());
        let dup = SceneDesc::new(vec![slot.clone(), slot.clone()]);
        assert!(matches!(dup, Err(CoreError::DuplicateSlot(name)) if name == "a"));

        let mut broken = slot;
        broken.placement.scale.x = f32::NAN;
        assert!(matches!(
            SceneDesc::new(vec![broken]),
            Err(CoreError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn rooting_only_touches_relative_paths() {
        let absolute = if cfg!(windows) { "C:\\abs\\m.obj" } else { "/abs/m.obj" };
        let scene = SceneDesc::new(vec![ModelSlot::new(
            "a",
            absolute,
            "textures/t.png",
            Placement::identity(),
        )])
        .unwrap()
        .rooted_at("data");
        let slot = &scene.slots()[0];
        assert_eq!(slot.mesh_path, PathBuf::from(absolute));
        assert_eq!(slot.texture_path, Path::new("data").join("textures/t.png"));
    }
}
