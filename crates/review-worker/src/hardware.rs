//! Picks CPU-only or accelerated engine mode.

use std::process::Stdio;

use clap::ValueEnum;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HardwareMode {
    /// Probe for a GPU.
    Auto,
    Cpu,
    Gpu,
}

/// True when `nvidia-smi -L` lists at least one GPU.
pub async fn gpu_present() -> bool {
    let output = Command::new("nvidia-smi")
        .arg("-L")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await;
    match output {
        Ok(out) => out.status.success() && String::from_utf8_lossy(&out.stdout).contains("GPU"),
        Err(_) => false,
    }
}

/// Resolve `mode` to whether the engine must run CPU-only.
pub async fn cpu_only(mode: HardwareMode) -> bool {
    match mode {
        HardwareMode::Cpu => true,
        HardwareMode::Gpu => false,
        HardwareMode::Auto => {
            let gpu = gpu_present().await;
            info!(gpu, "Hardware probe finished");
            !gpu
        }
    }
}
