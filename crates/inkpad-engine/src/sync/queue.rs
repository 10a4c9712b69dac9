use std::sync::Mutex;

use super::lock;

/// The device queue behind the crate-wide submission lock.
///
/// wgpu queues are internally synchronized, but submission *ordering* across
/// the compositor and presenter threads is part of the contract: a block's
/// submit and its completion wait, or a frame's submit/wait/present, must not
/// interleave with another thread's work. Every submission path takes this lock.
pub struct SharedQueue {
    queue: Mutex<wgpu::Queue>,
}

impl SharedQueue {
    pub fn new(queue: wgpu::Queue) -> Self {
        Self {
            queue: Mutex::new(queue),
        }
    }

    /// Runs `f` with exclusive access to the queue.
    pub fn with_lock<R>(&self, f: impl FnOnce(&wgpu::Queue) -> R) -> R {
        let queue = lock(&self.queue);
        f(&queue)
    }

    /// Submits command buffers as one batch and blocks until the device has
    /// finished executing them. The queue lock is held throughout.
    pub fn submit_and_wait<I>(&self, device: &wgpu::Device, buffers: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = wgpu::CommandBuffer>,
    {
        self.with_lock(|queue| {
            let index = queue.submit(buffers);
            wait_for(device, index)
        })
    }
}

/// Blocks until submission `index` has completed on `device`.
pub fn wait_for(device: &wgpu::Device, index: wgpu::SubmissionIndex) -> anyhow::Result<()> {
    device
        .poll(wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: None,
        })
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("device poll failed: {e}"))
}
