use std::path::Path;

use crate::transcription::domain::model::Device;
use crate::transcription::domain::speech_recognizer::DeviceSelector;

/// Selects CUDA when this build has GPU support and the runtime exposes an
/// NVIDIA device, otherwise CPU.
pub struct EnvironmentDeviceSelector;

impl DeviceSelector for EnvironmentDeviceSelector {
    fn select(&self) -> Device {
        let visible = std::env::var("CUDA_VISIBLE_DEVICES").ok();
        let device = if cfg!(feature = "cuda")
            && cuda_devices_visible(visible.as_deref())
            && nvidia_driver_present()
        {
            Device::Cuda
        } else {
            Device::Cpu
        };
        log::info!("Using device: {device}");
        device
    }
}

/// `CUDA_VISIBLE_DEVICES` set to empty or `-1` hides every GPU.
fn cuda_devices_visible(var: Option<&str>) -> bool {
    match var.map(str::trim) {
        None => true,
        Some(v) => !v.is_empty() && v != "-1",
    }
}

fn nvidia_driver_present() -> bool {
    if cfg!(windows) {
        return true;
    }
    Path::new("/dev/nvidiactl").exists()
}
