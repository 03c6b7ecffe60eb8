use std::fmt;
use std::io::{self, Write};

use super::{CatalogError, ContextError, ContextInit};

/// A compute-API implementation (one wgpu backend) exposing at least one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub backend: wgpu::Backend,
    pub name: String,
}

impl Platform {
    pub fn new(backend: wgpu::Backend) -> Self {
        Self {
            backend,
            name: backend_name(backend),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn backend_name(backend: wgpu::Backend) -> String {
    match backend {
        wgpu::Backend::Vulkan => "Vulkan".to_string(),
        wgpu::Backend::Metal => "Metal".to_string(),
        wgpu::Backend::Dx12 => "DirectX 12".to_string(),
        wgpu::Backend::Gl => "OpenGL".to_string(),
        wgpu::Backend::BrowserWebGpu => "WebGPU".to_string(),
        other => format!("{other:?}"),
    }
}

/// Capabilities of one adapter, captured at enumeration time.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub device_type: wgpu::DeviceType,
    pub driver: String,
    pub backend: wgpu::Backend,
    /// Maximum invocations in one work group.
    pub max_work_group_size: u32,
    /// Maximum number of work groups along one dispatch dimension.
    ///
    /// wgpu does not report a compute-unit count; this is the closest
    /// capacity figure it exposes.
    pub max_workgroups_per_dimension: u32,
}

impl DeviceInfo {
    fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let info = adapter.get_info();
        let limits = adapter.limits();
        Self {
            name: info.name,
            device_type: info.device_type,
            driver: info.driver,
            backend: info.backend,
            max_work_group_size: limits.max_compute_invocations_per_workgroup,
            max_workgroups_per_dimension: limits.max_compute_workgroups_per_dimension,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.backend, self.device_type)
    }
}

/// Opaque handle identifying a device inside the catalog that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(usize);

/// A selectable execution target.
pub struct Device {
    id: DeviceId,
    adapter: wgpu::Adapter,
    info: DeviceInfo,
}

impl Device {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.fmt(f)
    }
}

/// All adapters visible to one wgpu instance, grouped by backend on demand.
///
/// # Field drop order
/// `instance` is declared last so it outlives every adapter handle.
pub struct DeviceCatalog {
    devices: Vec<Device>,
    instance: wgpu::Instance,
}

impl DeviceCatalog {
    /// Enumerates every adapter of every backend enabled in `init`.
    ///
    /// Never fails: an empty catalog is reported by [`platforms`](Self::platforms).
    pub fn enumerate(init: &ContextInit) -> Self {
        pollster::block_on(Self::enumerate_async(init))
    }

    async fn enumerate_async(init: &ContextInit) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        let adapters = instance.enumerate_adapters(init.backends).await;

        let devices: Vec<Device> = adapters
            .into_iter()
            .enumerate()
            .map(|(i, adapter)| {
                let info = DeviceInfo::from_adapter(&adapter);
                log::debug!("adapter {i}: {info}");
                Device {
                    id: DeviceId(i),
                    adapter,
                    info,
                }
            })
            .collect();

        Self { devices, instance }
    }

    /// Returns the distinct platforms in enumeration order.
    ///
    /// An empty catalog is fatal: there is nothing to render on.
    pub fn platforms(&self) -> Result<Vec<Platform>, CatalogError> {
        let platforms = distinct_platforms(self.devices.iter().map(|d| d.info.backend));
        if platforms.is_empty() {
            return Err(CatalogError::NoPlatforms);
        }
        Ok(platforms)
    }

    /// Returns every device of `platform` (all device types).
    pub fn devices(&self, platform: &Platform) -> Result<Vec<&Device>, CatalogError> {
        let devices: Vec<&Device> = self
            .devices
            .iter()
            .filter(|d| d.info.backend == platform.backend)
            .collect();
        if devices.is_empty() {
            return Err(CatalogError::NoDevices {
                platform: platform.name.clone(),
            });
        }
        Ok(devices)
    }

    /// Consumes the catalog, keeping only the chosen device and the instance.
    pub fn claim(self, id: DeviceId) -> Result<SelectedDevice, ContextError> {
        let DeviceCatalog { devices, instance } = self;
        let device = devices
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(ContextError::UnknownDevice(id.0))?;

        Ok(SelectedDevice {
            adapter: device.adapter,
            info: device.info,
            instance,
        })
    }
}

/// The one device chosen for this run, detached from its catalog.
pub struct SelectedDevice {
    pub(crate) adapter: wgpu::Adapter,
    pub(crate) info: DeviceInfo,
    pub(crate) instance: wgpu::Instance,
}

impl SelectedDevice {
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

fn distinct_platforms(backends: impl Iterator<Item = wgpu::Backend>) -> Vec<Platform> {
    let mut out: Vec<Platform> = Vec::new();
    for backend in backends {
        if !out.iter().any(|p| p.backend == backend) {
            out.push(Platform::new(backend));
        }
    }
    out
}

/// Writes the numbered platform listing shown before selection.
pub fn write_platform_list<W: Write>(out: &mut W, platforms: &[Platform]) -> io::Result<()> {
    writeln!(out, "Available platforms:")?;
    writeln!(out)?;
    for (i, platform) in platforms.iter().enumerate() {
        writeln!(out, "\t{}: {}", i + 1, platform.name)?;
    }
    Ok(())
}

/// Writes the numbered device listing, with capabilities, shown before selection.
pub fn write_device_list<W: Write>(out: &mut W, devices: &[&Device]) -> io::Result<()> {
    writeln!(out, "Available devices on this platform:")?;
    writeln!(out)?;
    for (i, device) in devices.iter().enumerate() {
        writeln!(out, "\t{}: {}", i + 1, device.info.name)?;
        write_capabilities(out, &device.info, "\t\t")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the capability lines of one device with the given indent.
pub fn write_capabilities<W: Write>(out: &mut W, info: &DeviceInfo, indent: &str) -> io::Result<()> {
    writeln!(out, "{indent}Device type: {:?}", info.device_type)?;
    if !info.driver.is_empty() {
        writeln!(out, "{indent}Driver: {}", info.driver)?;
    }
    writeln!(out, "{indent}Max work group size: {}", info.max_work_group_size)?;
    writeln!(
        out,
        "{indent}Max work groups per dimension: {}",
        info.max_workgroups_per_dimension
    )
}
