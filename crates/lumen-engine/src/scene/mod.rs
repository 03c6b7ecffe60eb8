//! Host-side scene records and the reference scene.

mod object;
mod reference;

pub use object::{ColorRecord, SceneObject};
pub use reference::{reference_scene, REFERENCE_SCENE_LEN};
