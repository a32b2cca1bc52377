//! Override scenes that suspend cursor-driven switching.
//!
//! Each scene is one atomic flag. Flags are independent: writers never
//! take a lock spanning more than one flag, so a focus-in for one scene
//! racing a focus-out for another resolves per flag, last writer wins.

use inputshift_context::{Scene, UnknownScene};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct SceneArbiter {
    flags: [AtomicBool; Scene::ALL.len()],
}

impl SceneArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, returning its previous value.
    pub fn set_flag(&self, scene: Scene, active: bool) -> bool {
        let previous = self.flags[scene.index()].swap(active, Ordering::SeqCst);
        if previous != active {
            tracing::debug!(%scene, active, "scene flag changed");
        }
        previous
    }

    /// Set a flag by its name (`"commit"`, `"tool-window"`).
    pub fn set_flag_by_name(&self, name: &str, active: bool) -> Result<bool, UnknownScene> {
        let scene: Scene = name.parse()?;
        Ok(self.set_flag(scene, active))
    }

    pub fn is_active(&self, scene: Scene) -> bool {
        self.flags[scene.index()].load(Ordering::SeqCst)
    }

    /// True while cursor-driven requests must be skipped.
    pub fn is_any_active(&self) -> bool {
        self.flags.iter().any(|flag| flag.load(Ordering::SeqCst))
    }

    pub fn active_scenes(&self) -> Vec<Scene> {
        Scene::ALL
            .into_iter()
            .filter(|scene| self.is_active(*scene))
            .collect()
    }
}
