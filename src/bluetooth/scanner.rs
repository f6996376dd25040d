/// Bluetooth Low Energy scanning glue around the decoding pipeline
use bluer::{AdapterEvent, AdapterProperty, Address};
use futures_util::{pin_mut, StreamExt};
use log::{debug, error, info, warn};
use time::OffsetDateTime;

use crate::config::SensorConfig;
use crate::models::SensorReading;
use crate::protocol;
use crate::utils::manufacturer_frame;

/// Handle one manufacturer data frame seen from a peripheral
///
/// This is the per-event boundary between the scanner and the pure
/// pipeline. Foreign traffic is only reported when verbose logging is on;
/// decode failures from a device carrying our signature are always reported.
///
/// # Arguments
/// * `address` - Address of the advertising peripheral, for log output
/// * `raw` - Manufacturer data including the 2-byte company identifier
/// * `config` - Device signature and key to match and decrypt with
///
/// # Returns
/// Some(SensorReading) if the frame decoded, None otherwise
pub fn on_discover(address: &str, raw: &[u8], config: &SensorConfig) -> Option<SensorReading> {
    match protocol::process(raw, &config.device_signature, &config.cipher_key) {
        Ok(record) => {
            let reading = SensorReading {
                address: address.to_string(),
                record,
                time: OffsetDateTime::now_utc(),
            };
            info!("{}", reading);
            Some(reading)
        }
        Err(e) if e.is_expected() => {
            debug!("Skipping device {} - {}", address, e);
            None
        }
        Err(e) => {
            warn!("Device {} matched but could not be decoded: {}", address, e);
            None
        }
    }
}

/// Feed every manufacturer data entry of a device into `on_discover`
async fn process_device(adapter: &bluer::Adapter, addr: Address, config: &SensorConfig) {
    let device = match adapter.device(addr) {
        Ok(device) => device,
        Err(_) => return,
    };

    let addr_str = device.address().to_string().to_uppercase();

    match device.manufacturer_data().await {
        Ok(Some(manufacturer_data)) => {
            for (company_id, payload) in manufacturer_data {
                let raw = manufacturer_frame(company_id, &payload);
                on_discover(&addr_str, &raw, config);
            }
        }
        Ok(None) => {
            debug!("No manufacturer data for {}", addr_str);
        }
        Err(e) => {
            debug!("Failed to get manufacturer data for {}: {}", addr_str, e);
        }
    }
}

/// Listen for sensor advertisements until the adapter goes away
///
/// Opens a BlueZ session, starts LE discovery and decodes every
/// advertisement update as it arrives. Returns Ok(()) when the adapter is
/// powered off or discovery ends, so the caller can wait and start over.
///
/// # Arguments
/// * `config` - Configuration with adapter name, device signature and key
///
/// # Returns
/// Result indicating a clean stop, or the Bluetooth error that ended the scan
pub async fn listen_for_sensors(config: &SensorConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize Bluetooth session
    let session = match bluer::Session::new().await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to create Bluetooth session: {}", e);
            return Err(e.into());
        }
    };

    // Use the configured adapter, or the default one
    let adapter = match &config.adapter {
        Some(name) => session.adapter(name),
        None => session.default_adapter().await,
    };
    let adapter = match adapter {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Failed to get Bluetooth adapter: {}", e);
            return Err(e.into());
        }
    };

    // Ask for power, but the adapter may be rfkill'd or owned by someone else
    if let Err(e) = adapter.set_powered(true).await {
        warn!("Failed to power on adapter {}: {}", adapter.name(), e);
    }

    if !adapter.is_powered().await? {
        info!("State: powered off");
        return Ok(());
    }

    // Low Energy only, and report every advertisement rather than just new devices
    let filter = bluer::DiscoveryFilter {
        transport: bluer::DiscoveryTransport::Le,
        duplicate_data: true,
        ..Default::default()
    };

    if let Err(e) = adapter.set_discovery_filter(filter).await {
        warn!("Failed to set discovery filter: {}", e);
    }

    let adapter_events = adapter.events().await?;
    let discovery = match adapter.discover_devices_with_changes().await {
        Ok(discovery) => discovery,
        Err(e) => {
            error!("Failed to start device discovery: {}", e);
            return Err(e.into());
        }
    };
    pin_mut!(adapter_events);
    pin_mut!(discovery);

    info!("Starting scan on {}...", adapter.name());

    loop {
        tokio::select! {
            event = discovery.next() => match event {
                Some(AdapterEvent::DeviceAdded(addr)) => {
                    process_device(&adapter, addr, config).await;
                }
                Some(AdapterEvent::DeviceRemoved(addr)) => {
                    debug!("Device removed: {}", addr);
                }
                Some(_) => {}
                None => {
                    warn!("Discovery stream ended");
                    return Ok(());
                }
            },
            event = adapter_events.next() => match event {
                Some(AdapterEvent::PropertyChanged(AdapterProperty::Powered(false))) => {
                    info!("State: powered off");
                    return Ok(());
                }
                Some(AdapterEvent::PropertyChanged(property)) => {
                    debug!("Adapter property changed: {:?}", property);
                }
                Some(_) => {}
                None => {
                    warn!("Adapter event stream ended");
                    return Ok(());
                }
            },
        }
    }
}
