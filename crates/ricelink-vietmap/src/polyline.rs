//! Decoder for the Encoded Polyline Algorithm Format (5-decimal precision)
//! used by the VietMap routing service's `points_encoded=true` responses.

/// Decodes an encoded polyline into `(longitude, latitude)` pairs.
///
/// Each point is stored as a pair of zigzag-encoded deltas (latitude first,
/// then longitude) against the previous point, split into 6-bit groups with
/// a continuation bit. Accumulators are fixed-point with 5 decimal places.
///
/// The output is longitude-first to match the map rendering convention,
/// even though the wire format accumulates latitude first.
///
/// Truncated input terminates the decode: a point whose groups run past the
/// end of the string is dropped, and all previously completed points are
/// returned. The decoder never loops on corrupt input.
#[must_use]
pub fn decode(encoded: &str) -> Vec<(f64, f64)> {
    let bytes = encoded.as_bytes();
    let mut index = 0usize;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut coordinates = Vec::new();

    while index < bytes.len() {
        let Some((dlat, next)) = decode_delta(bytes, index) else {
            break;
        };
        let Some((dlon, after)) = decode_delta(bytes, next) else {
            break;
        };
        index = after;
        lat += dlat;
        lon += dlon;

        #[allow(clippy::cast_precision_loss)]
        coordinates.push((lon as f64 / 1e5, lat as f64 / 1e5));
    }

    coordinates
}

/// Reads one varint-encoded signed delta starting at `index`.
///
/// Returns the delta and the index of the first byte after it, or `None`
/// when the continuation chain runs past the end of the input or exceeds
/// the representable width (corrupt data).
fn decode_delta(bytes: &[u8], mut index: usize) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let chunk = i64::from(*bytes.get(index)?) - 63;
        index += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return None;
        }
    }

    let delta = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Some((delta, index))
}
