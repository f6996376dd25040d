/// Decryption and field decoding of sensor payloads
use aes::cipher::{BlockDecrypt, KeyInit};
use aes::Aes128;
use log::debug;

use crate::models::{CipherBlock, CipherKey, TelemetryRecord, BLOCK_LEN};
use crate::protocol::error::DecodeError;

/// Bytes of plaintext needed to populate every field
pub const MIN_PLAINTEXT_LEN: usize = 5;

/// Turns one cipher block into plaintext
///
/// Implemented by `CipherKey`; the pipeline is generic over it so that the
/// decryption step can be observed in isolation.
pub trait BlockDecryptor {
    fn decrypt_block(&self, block: &CipherBlock) -> Result<[u8; BLOCK_LEN], DecodeError>;
}

/// AES-128-ECB with no IV and no padding: the firmware encrypts exactly one block.
impl BlockDecryptor for CipherKey {
    fn decrypt_block(&self, block: &CipherBlock) -> Result<[u8; BLOCK_LEN], DecodeError> {
        let cipher =
            Aes128::new_from_slice(self.as_bytes()).map_err(|_| DecodeError::DecryptionFailed)?;

        let mut output = block.0;
        cipher.decrypt_block((&mut output).into());
        Ok(output)
    }
}

/// Decode a decrypted payload into telemetry
///
/// Payload structure:
/// - Bytes 0-1: Temperature (unsigned 16-bit big-endian, 0.01°C resolution)
/// - Bytes 2-3: Humidity (unsigned 16-bit big-endian, 0.01% resolution)
/// - Byte 4: Battery percentage
/// - Bytes 5-15: Unused
///
/// Battery values above 100 are passed through as sent by the sensor.
pub fn parse_plaintext(data: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    if data.len() < MIN_PLAINTEXT_LEN {
        return Err(DecodeError::MalformedPlaintext {
            len: data.len(),
            min: MIN_PLAINTEXT_LEN,
        });
    }

    let temperature_raw = u16::from_be_bytes([data[0], data[1]]);
    let humidity_raw = u16::from_be_bytes([data[2], data[3]]);
    let battery = data[4];

    Ok(TelemetryRecord {
        temperature: temperature_raw as f32 / 100.0,
        humidity: humidity_raw as f32 / 100.0,
        battery,
    })
}

/// Decrypt a cipher block and decode its fields
pub fn decode_block<D: BlockDecryptor + ?Sized>(
    block: &CipherBlock,
    decryptor: &D,
) -> Result<TelemetryRecord, DecodeError> {
    let plaintext = decryptor.decrypt_block(block)?;
    debug!("Decrypted data: {}", hex::encode(plaintext));

    parse_plaintext(&plaintext)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aes::cipher::BlockEncrypt;

    pub(crate) const KEY: CipherKey = CipherKey([
        0xA2, 0x36, 0x3C, 0xC2, 0x07, 0x23, 0x48, 0x97, 0x92, 0x2A, 0xEA, 0x86, 0x96, 0x85, 0x11,
        0x5B,
    ]);

    /// AES-128-ECB of `09 9a 17 70 5a` followed by 11 zero bytes under `KEY`
    pub(crate) const SCENARIO_CIPHERTEXT: [u8; BLOCK_LEN] = [
        0x62, 0xcd, 0xb3, 0xaf, 0xba, 0x39, 0xff, 0x68, 0x0e, 0x27, 0xdb, 0x91, 0x16, 0xd9, 0x75,
        0x0e,
    ];

    pub(crate) fn encrypt(key: &CipherKey, plaintext: [u8; BLOCK_LEN]) -> CipherBlock {
        let cipher = Aes128::new_from_slice(key.as_bytes()).unwrap();
        let mut output = plaintext;
        cipher.encrypt_block((&mut output).into());
        CipherBlock(output)
    }

    #[test]
    fn decrypts_known_vector() {
        let plaintext = KEY
            .decrypt_block(&CipherBlock(SCENARIO_CIPHERTEXT))
            .unwrap();
        assert_eq!(
            hex::encode(plaintext),
            "099a17705a0000000000000000000000"
        );
    }

    #[test]
    fn decodes_known_vector() {
        let record = decode_block(&CipherBlock(SCENARIO_CIPHERTEXT), &KEY).unwrap();
        assert_eq!(
            record,
            TelemetryRecord {
                temperature: 24.58,
                humidity: 60.0,
                battery: 90,
            }
        );
    }

    #[test]
    fn encrypt_then_decode_reproduces_fields() {
        let mut plaintext = [0x5Au8; BLOCK_LEN];
        plaintext[..5].copy_from_slice(&[0x0B, 0xB8, 0x13, 0x88, 0x64]);

        let block = encrypt(&KEY, plaintext);
        assert_ne!(block.0, plaintext);

        let record = decode_block(&block, &KEY).unwrap();
        assert_eq!(record, parse_plaintext(&plaintext).unwrap());
        assert_eq!(record.temperature, 30.0);
        assert_eq!(record.humidity, 50.0);
        assert_eq!(record.battery, 100);
    }

    #[test]
    fn decoding_is_repeatable() {
        let block = CipherBlock(SCENARIO_CIPHERTEXT);
        let first = decode_block(&block, &KEY).unwrap();
        let second = decode_block(&block, &KEY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_key_still_yields_record() {
        let wrong_key = CipherKey([0u8; BLOCK_LEN]);
        let record = decode_block(&CipherBlock(SCENARIO_CIPHERTEXT), &wrong_key).unwrap();

        assert_eq!(record.temperature, 353.63);
        assert_eq!(record.humidity, 156.15);
        assert_eq!(record.battery, 159);
    }

    #[test]
    fn battery_is_not_clamped() {
        let record = parse_plaintext(&[0x00, 0x00, 0x00, 0x00, 0xFF]).unwrap();
        assert_eq!(record.battery, 255);
    }

    #[test]
    fn full_scale_values() {
        let record = parse_plaintext(&[0xFF, 0xFF, 0xFF, 0xFF, 0x00]).unwrap();
        assert_eq!(record.temperature, 655.35);
        assert_eq!(record.humidity, 655.35);
        assert_eq!(record.battery, 0);
    }

    #[test]
    fn short_plaintext_is_malformed() {
        assert_eq!(
            parse_plaintext(&[0x09, 0x9A, 0x17, 0x70]),
            Err(DecodeError::MalformedPlaintext { len: 4, min: 5 })
        );
        assert!(parse_plaintext(&[]).is_err());
    }
}
