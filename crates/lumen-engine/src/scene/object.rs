use bytemuck::{Pod, Zeroable};

/// One sphere of the scene, in the device's memory layout.
///
/// The device stores every 3-component vector in a 4-component slot, so
/// each vector is followed by one padding scalar, and `radius` is padded up
/// to the first vector's 16-byte boundary. Padding is written as zero and
/// never read.
///
/// Device-side equivalent (WGSL):
///
/// ```wgsl
/// struct Sphere {
///     radius: f32,
///     position: vec3<f32>,
///     color: vec3<f32>,
///     emission: vec3<f32>,
/// }
/// ```
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SceneObject {
    pub radius: f32,
    _pad0: [f32; 3],
    pub position: [f32; 3],
    _pad1: f32,
    pub color: [f32; 3],
    _pad2: f32,
    pub emission: [f32; 3],
    _pad3: f32,
}

impl SceneObject {
    #[inline]
    pub const fn new(radius: f32, position: [f32; 3], color: [f32; 3], emission: [f32; 3]) -> Self {
        Self {
            radius,
            _pad0: [0.0; 3],
            position,
            _pad1: 0.0,
            color,
            _pad2: 0.0,
            emission,
            _pad3: 0.0,
        }
    }

    /// Compares every field except the padding slots.
    pub fn same_fields(&self, other: &Self) -> bool {
        self.radius.to_bits() == other.radius.to_bits()
            && bits(self.position) == bits(other.position)
            && bits(self.color) == bits(other.color)
            && bits(self.emission) == bits(other.emission)
    }
}

fn bits(v: [f32; 3]) -> [u32; 3] {
    v.map(f32::to_bits)
}

/// One output pixel as written by the kernel: RGB in a 4-component slot.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ColorRecord {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    _pad: f32,
}

impl ColorRecord {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, _pad: 0.0 }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }
}
