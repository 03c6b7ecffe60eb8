//! Device discovery, selection and the compute context.
//!
//! This module is responsible for:
//! - enumerating platforms (wgpu backends) and their devices (adapters)
//! - choosing one of each, automatically or through a prompt
//! - creating the logical device + queue pairing that owns a render

mod catalog;
mod context;
mod error;
mod init;
mod select;

pub use catalog::{
    write_capabilities, write_device_list, write_platform_list, Device, DeviceCatalog, DeviceId,
    DeviceInfo, Platform, SelectedDevice,
};
pub use context::ComputeContext;
pub use error::{CatalogError, ContextError, SelectionError, WaitError};
pub use init::ContextInit;
pub use select::{select_device, select_index, select_platform};
