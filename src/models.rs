use std::fmt;
use time::OffsetDateTime;

use crate::utils::format_datetime;

/// Length of the device signature that follows the company identifier
pub const SIGNATURE_LEN: usize = 6;
/// AES-128 key and block length
pub const BLOCK_LEN: usize = 16;

/// Marker bytes identifying the sensor model amid unrelated BLE traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSignature(pub [u8; SIGNATURE_LEN]);

impl DeviceSignature {
    pub fn matches(&self, candidate: &[u8]) -> bool {
        self.0[..] == *candidate
    }
}

impl fmt::Display for DeviceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Static 128-bit key the sensor firmware encrypts its payload with
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CipherKey(pub [u8; BLOCK_LEN]);

impl CipherKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// Keep the key out of logs
impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// One AES block of ciphertext taken from a matching advertisement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherBlock(pub [u8; BLOCK_LEN]);

/// Decoded sensor telemetry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    pub temperature: f32,
    pub humidity: f32,
    pub battery: u8,
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temperature: {:.2}°C, Humidity: {:.2}%, Battery: {}%",
            self.temperature, self.humidity, self.battery
        )
    }
}

/// A decoded record together with where and when it was seen
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub address: String,
    pub record: TelemetryRecord,
    pub time: OffsetDateTime,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} Parsed Data - {}",
            format_datetime(&self.time),
            self.address,
            self.record
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_formats_two_decimals() {
        let record = TelemetryRecord {
            temperature: 24.58,
            humidity: 60.0,
            battery: 90,
        };
        assert_eq!(
            record.to_string(),
            "Temperature: 24.58°C, Humidity: 60.00%, Battery: 90%"
        );
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = CipherKey([0xAB; BLOCK_LEN]);
        assert_eq!(format!("{:?}", key), "CipherKey(..)");
    }

    #[test]
    fn signature_compares_bytewise() {
        let signature = DeviceSignature(*b"thermy");
        assert!(signature.matches(b"thermy"));
        assert!(!signature.matches(b"therm"));
        assert!(!signature.matches(b"thermz"));
        assert_eq!(signature.to_string(), "746865726d79");
    }
}
