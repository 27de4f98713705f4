//! Device selection: CUDA when requested and available, CPU otherwise.

use candle_core::Device;

/// Select the compute device.
///
/// With `prefer_cuda`, tries CUDA device 0 (only when compiled with the
/// `cuda` feature), then falls back to CPU.
pub fn select_device(prefer_cuda: bool) -> Device {
    if !prefer_cuda {
        return Device::Cpu;
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                log::info!("Using CUDA device 0");
                return device;
            }
            Err(e) => log::warn!("CUDA requested but unavailable ({e}), falling back to CPU"),
        }
    }

    #[cfg(not(feature = "cuda"))]
    log::warn!("CUDA requested but samplesort was built without the `cuda` feature, using CPU");

    Device::Cpu
}
