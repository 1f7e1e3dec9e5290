//! Opaque state save/restore of control ports.
//!
//! Format: `[id_len: u8, id: utf8, value: f64 LE]*`, one record per control
//! port in port-table order.
//!
//! Records are keyed by port id so that reordering or adding ports in a later
//! version does not scramble restored values. Unknown ids are silently
//! ignored, and values are clamped to the port's current range.

use std::sync::Arc;

use crate::error::{PluginError, PluginResult};
use crate::port::ControlPort;

/// Serialize control values to bytes.
pub fn save_controls(controls: &[Arc<ControlPort>]) -> Vec<u8> {
    let mut data = Vec::with_capacity(controls.len() * 16);
    for port in controls {
        let id = port.id().as_bytes();
        data.push(id.len() as u8);
        data.extend_from_slice(id);
        data.extend_from_slice(&f64::from(port.value()).to_le_bytes());
    }
    data
}

/// Restore control values from bytes produced by [`save_controls`].
///
/// Returns the number of ports that were set. An empty input is a no-op. A
/// truncated trailing record is ignored.
pub fn load_controls(controls: &[Arc<ControlPort>], data: &[u8]) -> PluginResult<usize> {
    let mut restored = 0;
    let mut cursor = 0;

    while cursor < data.len() {
        let id_len = data[cursor] as usize;
        cursor += 1;

        if cursor + id_len + 8 > data.len() {
            break; // Incomplete data
        }

        let id = &data[cursor..cursor + id_len];
        cursor += id_len;

        let value_bytes: [u8; 8] = data[cursor..cursor + 8]
            .try_into()
            .map_err(|_| PluginError::StateError("Invalid state data".to_owned()))?;
        let value = f64::from_le_bytes(value_bytes);
        cursor += 8;

        // Skip invalid UTF-8 and unknown ids
        let Ok(id) = std::str::from_utf8(id) else {
            continue;
        };
        if let Some(port) = controls.iter().find(|p| p.id() == id) {
            port.set_value(value as f32);
            restored += 1;
        }
    }

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{PortMeta, PortSet, Unit};

    static PORTS: [PortMeta; 3] = [
        PortMeta::int_control("d_in", "Delay", Unit::Samples, 10000.0),
        PortMeta::dry_gain(0.0),
        PortMeta::wet_gain(1.0),
    ];

    fn controls() -> Vec<Arc<ControlPort>> {
        PortSet::from_metas(&PORTS).controls().cloned().collect()
    }

    #[test]
    fn test_save_restore() {
        let source = controls();
        source[0].set_value(480.0);
        source[1].set_value(0.25);
        source[2].set_value(0.75);
        let data = save_controls(&source);

        let target = controls();
        assert_eq!(load_controls(&target, &data).ok(), Some(3));
        assert_eq!(target[0].value(), 480.0);
        assert_eq!(target[1].value(), 0.25);
        assert_eq!(target[2].value(), 0.75);
    }

    #[test]
    fn test_empty_and_truncated() {
        let target = controls();
        assert_eq!(load_controls(&target, &[]).ok(), Some(0));

        let source = controls();
        source[0].set_value(12.0);
        source[2].set_value(0.5);
        let data = save_controls(&source);
        // Cut into the last record
        let cut = &data[..data.len() - 3];
        assert_eq!(load_controls(&target, cut).ok(), Some(2));
        assert_eq!(target[0].value(), 12.0);
        assert_eq!(target[2].value(), 1.0);
    }

    #[test]
    fn test_unknown_ids_and_clamping() {
        let mut data = Vec::new();
        for (id, value) in [("bogus", 3.0f64), ("d_in", 1.0e9)] {
            data.push(id.len() as u8);
            data.extend_from_slice(id.as_bytes());
            data.extend_from_slice(&value.to_le_bytes());
        }

        let target = controls();
        assert_eq!(load_controls(&target, &data).ok(), Some(1));
        assert_eq!(target[0].value(), 10000.0);
    }
}
