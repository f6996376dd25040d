use std::env;

use crate::models::{CipherKey, DeviceSignature};
use crate::utils::{parse_flag, parse_hex_bytes};

#[derive(Debug, Clone)]
pub struct SensorConfig {
    pub device_signature: DeviceSignature,
    pub cipher_key: CipherKey,
    pub adapter: Option<String>,
    pub verbose: bool,
}

impl SensorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_id = lookup("SENSOR_DEVICE_ID")
            .ok_or("SENSOR_DEVICE_ID environment variable not set")?;
        let device_signature = DeviceSignature(
            parse_hex_bytes(&device_id).map_err(|e| format!("SENSOR_DEVICE_ID: {}", e))?,
        );

        let key = lookup("SENSOR_KEY").ok_or("SENSOR_KEY environment variable not set")?;
        let cipher_key =
            CipherKey(parse_hex_bytes(&key).map_err(|e| format!("SENSOR_KEY: {}", e))?);

        let adapter = lookup("BLUETOOTH_ADAPTER")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let verbose = match lookup("DEBUG") {
            Some(value) => parse_flag(&value).map_err(|e| format!("DEBUG: {}", e))?,
            None => false,
        };

        Ok(SensorConfig {
            device_signature,
            cipher_key,
            adapter,
            verbose,
        })
    }
}
