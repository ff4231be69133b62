//! Android platform initialization settings
//!
//! Settings handed to the sound engine at init on Android, and the fast
//! audio path adjustment.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use breach_core::EngineStatus;

bitflags! {
    /// Output APIs the engine may pick from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AudioApi: u32 {
        /// Lower latency, Android 8.1 or above
        const AAUDIO = 1 << 0;
        /// Older API, works on every device
        const OPENSL_ES = 1 << 1;
        /// Opt into Dolby Atmos where available
        const DOLBY_ATMOS = 1 << 8;
        /// Opt into the Android spatializer. May add output latency.
        const ANDROID_SPATIALIZER = 1 << 9;

        const DEFAULT = Self::AAUDIO.bits() | Self::OPENSL_ES.bits() | Self::DOLBY_ATMOS.bits();
    }
}

impl Default for AudioApi {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Route to the system mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioPath {
    /// Highest latency, widest compatibility
    Legacy,
    /// Low-latency path to the system mixer, falls back to legacy
    #[default]
    LowLatency,
    /// Exclusive stream bypassing the system mixer
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadProperties {
    pub priority: i32,
    pub affinity_mask: u64,
    /// Stack size in bytes
    pub stack_size: u32,
}

impl ThreadProperties {
    pub const PRIORITY_NORMAL: i32 = 0;
    pub const PRIORITY_ABOVE_NORMAL: i32 = -4;
    pub const DEFAULT_STACK_SIZE: u32 = 128 * 1024;

    pub fn normal() -> Self {
        Self {
            priority: Self::PRIORITY_NORMAL,
            affinity_mask: 0,
            stack_size: Self::DEFAULT_STACK_SIZE,
        }
    }

    pub fn above_normal() -> Self {
        Self {
            priority: Self::PRIORITY_ABOVE_NORMAL,
            ..Self::normal()
        }
    }
}

impl Default for ThreadProperties {
    fn default() -> Self {
        Self::normal()
    }
}

/// Platform specific initialization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformInitSettings {
    pub thread_lower_engine: ThreadProperties,
    pub thread_output_mgr: ThreadProperties,
    pub thread_bank_manager: ThreadProperties,
    /// Unused in release builds
    pub thread_monitor: ThreadProperties,
    pub audio_api: AudioApi,
    pub audio_path: AudioPath,
    /// 0 selects the native rate
    pub sample_rate: u32,
    pub num_refills_in_voice: u16,
    /// Log sink behavior, for debugging non-standard devices
    pub verbose_sink: bool,
}

impl Default for PlatformInitSettings {
    fn default() -> Self {
        Self {
            thread_lower_engine: ThreadProperties::above_normal(),
            thread_output_mgr: ThreadProperties::above_normal(),
            thread_bank_manager: ThreadProperties::normal(),
            thread_monitor: ThreadProperties::above_normal(),
            audio_api: AudioApi::DEFAULT,
            audio_path: AudioPath::LowLatency,
            sample_rate: 0,
            num_refills_in_voice: 4,
            verbose_sink: false,
        }
    }
}

/// Platform independent part of the init settings touched by the fast path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitSettings {
    pub num_samples_per_frame: u32,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            num_samples_per_frame: 1024,
        }
    }
}

/// Output hardware properties reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    pub native_sample_rate: u32,
    /// Hardware buffer size in frames
    pub hardware_buffer_frames: u32,
}

/// Adjust settings for the fast audio path: the sample rate must match the
/// hardware and the frame size must be a multiple of the hardware buffer.
pub fn fast_path_settings(
    settings: &mut InitSettings,
    platform: &mut PlatformInitSettings,
    caps: &DeviceCaps,
) -> EngineStatus {
    if caps.native_sample_rate == 0 || caps.hardware_buffer_frames == 0 {
        log::warn!("Fast path unavailable, device reported {:?}", caps);
        return EngineStatus::INVALID_PARAMETER;
    }

    let hw = caps.hardware_buffer_frames;
    let frames = settings.num_samples_per_frame.max(1);
    settings.num_samples_per_frame = frames.div_ceil(hw) * hw;
    platform.sample_rate = caps.native_sample_rate;

    log::debug!(
        "Fast path: {} Hz, {} samples per frame",
        platform.sample_rate,
        settings.num_samples_per_frame
    );
    EngineStatus::SUCCESS
}
