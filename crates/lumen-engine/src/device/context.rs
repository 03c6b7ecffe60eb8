use super::{ContextError, ContextInit, DeviceInfo, SelectedDevice, WaitError};

/// Owns the device pairing used for one render: adapter, logical device and
/// the command queue bound to it.
///
/// Every buffer, shader module and pipeline of the run is created through
/// this value, so they all reference the same device.
///
/// # Field drop order
/// Rust drops struct fields in declaration order. `_instance` is declared
/// last so the `wgpu::Instance` outlives `device` and `queue`.
pub struct ComputeContext {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue, 1:1 with `device`.
    queue: wgpu::Queue,

    /// Limits granted to `device`.
    limits: wgpu::Limits,

    /// Capabilities captured when the adapter was enumerated.
    info: DeviceInfo,

    /// Selected adapter.
    _adapter: wgpu::Adapter,

    /// Keeps the instance alive until every device-level object is gone.
    _instance: wgpu::Instance,
}

impl ComputeContext {
    /// Creates the logical device and its queue on the selected adapter.
    ///
    /// Failure is reported immediately; no other device is tried.
    pub fn create(selected: SelectedDevice, init: &ContextInit) -> Result<Self, ContextError> {
        pollster::block_on(Self::create_async(selected, init))
    }

    async fn create_async(
        selected: SelectedDevice,
        init: &ContextInit,
    ) -> Result<Self, ContextError> {
        let SelectedDevice {
            adapter,
            info,
            instance,
        } = selected;

        // Ask for everything the adapter offers so large images are not
        // rejected by the conservative defaults.
        let required_limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(init.label),
                required_features: init.required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: init.memory_hints.clone(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|source| ContextError::DeviceRequest {
                device: info.name.clone(),
                source,
            })?;

        let limits = device.limits();
        log::info!("compute context created on {info}");

        Ok(Self {
            device,
            queue,
            limits,
            info,
            _adapter: adapter,
            _instance: instance,
        })
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the limits granted to the logical device.
    pub fn limits(&self) -> &wgpu::Limits {
        &self.limits
    }

    /// Returns the capabilities of the underlying adapter.
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Runs `create` inside validation and internal error scopes and returns
    /// the first error the device raised, if any.
    ///
    /// Object creation does not report errors directly. Outside a scope they
    /// reach the uncaptured-error handler, which panics by default.
    pub fn capture_errors<T>(
        &self,
        create: impl FnOnce(&wgpu::Device) -> T,
    ) -> (T, Option<wgpu::Error>) {
        let internal_scope = self.device.push_error_scope(wgpu::ErrorFilter::Internal);
        let validation_scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = create(&self.device);

        // Scopes pop innermost first.
        let validation = pollster::block_on(validation_scope.pop());
        let internal = pollster::block_on(internal_scope.pop());
        (value, validation.or(internal))
    }

    /// Submits `commands` and blocks until the device reports them complete.
    ///
    /// Pending `Queue::write_buffer` calls are flushed by the same submission,
    /// so an empty `commands` acts as an upload barrier.
    pub fn submit_and_wait<I>(&self, commands: I) -> Result<(), WaitError>
    where
        I: IntoIterator<Item = wgpu::CommandBuffer>,
    {
        let submission = self.queue.submit(commands);
        self.wait_for(submission)
    }

    /// Blocks until `submission` has finished executing on the device.
    pub fn wait_for(&self, submission: wgpu::SubmissionIndex) -> Result<(), WaitError> {
        self.poll_wait(Some(submission))
    }

    /// Blocks until all submitted work is done and pending map callbacks have fired.
    pub fn wait_idle(&self) -> Result<(), WaitError> {
        self.poll_wait(None)
    }

    fn poll_wait(&self, submission_index: Option<wgpu::SubmissionIndex>) -> Result<(), WaitError> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index,
                timeout: None,
            })
            .map(|_| ())
            .map_err(|e| WaitError {
                message: format!("wgpu device poll failed: {e:?}"),
            })
    }
}
