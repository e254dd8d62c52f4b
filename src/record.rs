//! The 32-byte `.splat` point record and typed, offset-based access to it.
//!
//! Layout (little-endian):
//!
//! | offset | field      | type      |
//! |--------|------------|-----------|
//! | 0      | center     | 3 x f32   |
//! | 12     | scale      | 3 x f32   |
//! | 24     | color RGBA | 4 x u8    |
//! | 28     | quaternion | 4 x u8    |

use crate::error::{SortError, SortResult};

pub const RECORD_SIZE: usize = 32;
pub const CENTER_OFFSET: usize = 0;
pub const SCALE_OFFSET: usize = 12;
pub const COLOR_OFFSET: usize = 24;
pub const QUAT_OFFSET: usize = 28;

fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_vec3_f32(bytes: &[u8], offset: usize) -> [f32; 3] {
    [
        read_f32(bytes, offset),
        read_f32(bytes, offset + 4),
        read_f32(bytes, offset + 8),
    ]
}

fn read_u8x4(bytes: &[u8], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}

/// Borrowed view of one record.
#[derive(Debug, Clone, Copy)]
pub struct SplatRecord<'a> {
    bytes: &'a [u8],
}

impl<'a> SplatRecord<'a> {
    pub fn center(&self) -> [f32; 3] {
        read_vec3_f32(self.bytes, CENTER_OFFSET)
    }

    pub fn scale(&self) -> [f32; 3] {
        read_vec3_f32(self.bytes, SCALE_OFFSET)
    }

    pub fn color(&self) -> [u8; 4] {
        read_u8x4(self.bytes, COLOR_OFFSET)
    }

    pub fn quat(&self) -> [u8; 4] {
        read_u8x4(self.bytes, QUAT_OFFSET)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// A record buffer whose length has been checked against its vertex count.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuffer<'a> {
    bytes: &'a [u8],
    vertex_count: usize,
}

impl<'a> RecordBuffer<'a> {
    pub fn new(bytes: &'a [u8], vertex_count: usize) -> SortResult<Self> {
        let expected = vertex_count.checked_mul(RECORD_SIZE).ok_or(
            SortError::RecordLengthMismatch {
                vertex_count,
                expected: usize::MAX,
                actual: bytes.len(),
            },
        )?;
        if bytes.len() != expected {
            return Err(SortError::RecordLengthMismatch {
                vertex_count,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes,
            vertex_count,
        })
    }

    /// Infers the vertex count from the byte length, which must be a whole
    /// number of records.
    pub fn from_bytes(bytes: &'a [u8]) -> SortResult<Self> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(SortError::misaligned_splat_file(bytes.len()));
        }
        Self::new(bytes, bytes.len() / RECORD_SIZE)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn record(&self, index: usize) -> SplatRecord<'a> {
        debug_assert!(index < self.vertex_count, "record {index} out of range");
        let start = index * RECORD_SIZE;
        SplatRecord {
            bytes: &self.bytes[start..start + RECORD_SIZE],
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = SplatRecord<'a>> + 'a {
        let bytes = self.bytes;
        bytes
            .chunks_exact(RECORD_SIZE)
            .map(|bytes| SplatRecord { bytes })
    }
}

/// Inverse of the repacker's `(byte - 128) / 128` dequantization, clamped to
/// the representable byte range.
pub fn quantize_quat_component(value: f32) -> u8 {
    (value * 128.0 + 128.0).round().clamp(0.0, 255.0) as u8
}

pub fn encode_record(center: [f32; 3], scale: [f32; 3], color: [u8; 4], quat: [u8; 4]) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    for (i, v) in center.iter().enumerate() {
        let at = CENTER_OFFSET + i * 4;
        out[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }
    for (i, v) in scale.iter().enumerate() {
        let at = SCALE_OFFSET + i * 4;
        out[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }
    out[COLOR_OFFSET..COLOR_OFFSET + 4].copy_from_slice(&color);
    out[QUAT_OFFSET..QUAT_OFFSET + 4].copy_from_slice(&quat);
    out
}
