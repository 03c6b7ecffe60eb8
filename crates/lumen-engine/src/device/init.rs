/// Initialization parameters for the compute layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct ContextInit {
    /// Backends enumerated by the device catalog.
    ///
    /// Each backend that exposes at least one adapter becomes a platform.
    pub backends: wgpu::Backends,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Allocation strategy hint for the logical device.
    pub memory_hints: wgpu::MemoryHints,

    /// Debug label attached to the logical device.
    pub label: &'static str,
}

impl Default for ContextInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            required_features: wgpu::Features::empty(),
            memory_hints: wgpu::MemoryHints::Performance,
            label: "lumen-engine device",
        }
    }
}
