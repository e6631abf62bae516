use crate::types::{DeviceSnapshot, RemoteKey};
use std::sync::{Arc, Mutex, PoisonError};

const MAX_VOLUME: u8 = 100;
const MIN_CHANNEL: u32 = 1;
const MAX_PENDING_DIGITS: usize = 4;

/// Mutable device model guarded by [`Device`]
#[derive(Debug, Clone)]
struct DeviceState {
    power: bool,
    volume: u8,
    channel: u32,
    // Digits typed for direct channel entry, committed by KEY_ENTER
    pending_digits: String,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            power: true,
            volume: 10,
            channel: 1,
            pending_digits: String::new(),
        }
    }
}

impl DeviceState {
    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            power: self.power,
            volume: self.volume,
            channel: self.channel,
        }
    }

    fn apply(&mut self, key: &RemoteKey) {
        match key {
            RemoteKey::VolumeUp => self.volume = self.volume.saturating_add(1).min(MAX_VOLUME),
            RemoteKey::VolumeDown => self.volume = self.volume.saturating_sub(1),
            RemoteKey::ChannelUp => {
                self.channel = self.channel.saturating_add(1);
                self.pending_digits.clear();
            }
            RemoteKey::ChannelDown => {
                self.channel = self.channel.saturating_sub(1).max(MIN_CHANNEL);
                self.pending_digits.clear();
            }
            RemoteKey::Mute => self.volume = 0,
            RemoteKey::Power => self.power = !self.power,
            RemoteKey::Digit(d) => {
                if self.pending_digits.len() < MAX_PENDING_DIGITS {
                    self.pending_digits.push(char::from(b'0' + d));
                }
            }
            RemoteKey::Enter => {
                if let Ok(channel) = self.pending_digits.parse::<u32>() {
                    self.channel = channel.max(MIN_CHANNEL);
                }
                self.pending_digits.clear();
            }
            RemoteKey::Other(code) => {
                tracing::debug!("Ignoring unsupported key {}", code);
            }
        }
    }
}

/// Shared handle to the emulated device
///
/// Cloning is cheap and every clone observes the same state. Each call to
/// [`Device::apply`] runs under a single lock, so commands from concurrent
/// sessions interleave whole, never field by field.
#[derive(Debug, Clone, Default)]
pub struct Device {
    state: Arc<Mutex<DeviceState>>,
}

impl Device {
    /// Create a device with power on, volume 10, channel 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a remote key and return the resulting snapshot
    pub fn apply(&self, key: &RemoteKey) -> DeviceSnapshot {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply(key);
        state.snapshot()
    }

    /// Get the current state without modifying it
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(device: &Device, key: RemoteKey, times: usize) -> DeviceSnapshot {
        let mut last = device.snapshot();
        for _ in 0..times {
            last = device.apply(&key);
        }
        last
    }

    #[test]
    fn starts_with_defaults() {
        let device = Device::new();
        assert_eq!(
            device.snapshot(),
            DeviceSnapshot {
                power: true,
                volume: 10,
                channel: 1
            }
        );
    }

    #[test]
    fn volume_is_clamped() {
        let device = Device::new();
        assert_eq!(press(&device, RemoteKey::VolumeUp, 150).volume, 100);
        assert_eq!(press(&device, RemoteKey::VolumeDown, 250).volume, 0);
        assert_eq!(press(&device, RemoteKey::VolumeUp, 3).volume, 3);
    }

    #[test]
    fn channel_never_drops_below_one() {
        let device = Device::new();
        assert_eq!(press(&device, RemoteKey::ChannelDown, 1).channel, 1);
        assert_eq!(press(&device, RemoteKey::ChannelUp, 5).channel, 6);
        assert_eq!(press(&device, RemoteKey::ChannelDown, 10).channel, 1);
    }

    #[test]
    fn mute_is_idempotent() {
        let device = Device::new();
        press(&device, RemoteKey::VolumeUp, 20);
        assert_eq!(device.apply(&RemoteKey::Mute).volume, 0);
        assert_eq!(device.apply(&RemoteKey::Mute).volume, 0);
    }

    #[test]
    fn power_toggles() {
        let device = Device::new();
        assert!(!press(&device, RemoteKey::Power, 3).power);
        assert!(press(&device, RemoteKey::Power, 1).power);
        assert!(press(&device, RemoteKey::Power, 4).power);
    }

    #[test]
    fn unknown_keys_leave_state_untouched() {
        let device = Device::new();
        let before = device.snapshot();
        assert_eq!(device.apply(&RemoteKey::Other("KEY_HDMI".into())), before);
    }

    #[test]
    fn digits_then_enter_tune_channel() {
        let device = Device::new();
        device.apply(&RemoteKey::Digit(4));
        let pending = device.apply(&RemoteKey::Digit(2));
        assert_eq!(pending.channel, 1);
        assert_eq!(device.apply(&RemoteKey::Enter).channel, 42);
        // buffer is cleared after commit
        assert_eq!(device.apply(&RemoteKey::Enter).channel, 42);
    }

    #[test]
    fn digit_entry_is_bounded_and_floored() {
        let device = Device::new();
        for d in [1, 2, 3, 4, 5, 6] {
            device.apply(&RemoteKey::Digit(d));
        }
        assert_eq!(device.apply(&RemoteKey::Enter).channel, 1234);

        device.apply(&RemoteKey::Digit(0));
        assert_eq!(device.apply(&RemoteKey::Enter).channel, 1);
    }

    #[test]
    fn channel_step_discards_pending_digits() {
        let device = Device::new();
        device.apply(&RemoteKey::Digit(9));
        device.apply(&RemoteKey::ChannelUp);
        assert_eq!(device.apply(&RemoteKey::Enter).channel, 2);
    }

    #[test]
    fn concurrent_commands_do_not_lose_updates() {
        let device = Device::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let device = device.clone();
                std::thread::spawn(move || {
                    let key = if i % 2 == 0 {
                        RemoteKey::ChannelUp
                    } else {
                        RemoteKey::VolumeUp
                    };
                    for _ in 0..10 {
                        device.apply(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = device.snapshot();
        assert_eq!(state.channel, 41);
        assert_eq!(state.volume, 50);
    }
}
