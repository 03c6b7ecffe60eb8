use super::SceneObject;

/// Number of spheres in [`reference_scene`].
pub const REFERENCE_SCENE_LEN: usize = 9;

/// The reference Cornell-box scene: six huge spheres acting as walls, two
/// small spheres on the floor and one light in the ceiling.
pub fn reference_scene() -> [SceneObject; REFERENCE_SCENE_LEN] {
    const WALL: f32 = 200.0;
    const WHITE: [f32; 3] = [0.9, 0.8, 0.7];
    const DARK: [f32; 3] = [0.0, 0.0, 0.0];

    [
        // left wall
        SceneObject::new(WALL, [-200.6, 0.0, 0.0], [0.75, 0.25, 0.25], DARK),
        // right wall
        SceneObject::new(WALL, [200.6, 0.0, 0.0], [0.25, 0.25, 0.75], DARK),
        // floor
        SceneObject::new(WALL, [0.0, -200.4, 0.0], WHITE, DARK),
        // ceiling
        SceneObject::new(WALL, [0.0, 200.4, 0.0], WHITE, DARK),
        // back wall
        SceneObject::new(WALL, [0.0, 0.0, -200.4], WHITE, DARK),
        // front wall
        SceneObject::new(WALL, [0.0, 0.0, 202.0], WHITE, DARK),
        // left sphere
        SceneObject::new(0.16, [-0.25, -0.24, -0.1], WHITE, DARK),
        // right sphere
        SceneObject::new(0.16, [0.25, -0.24, 0.1], WHITE, DARK),
        // light
        SceneObject::new(1.0, [0.0, 1.36, 0.0], DARK, [9.0, 8.0, 6.0]),
    ]
}
