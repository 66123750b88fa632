//! Reassembly of per-segment MP3 audio into one stream.
//!
//! MP3 is a sequence of self-contained frames, so joining segments is a
//! frame-level splice: tags are removed, each segment's frame chain is
//! validated, and the frames are written back to back in segment order.
//! A Xing/Info/VBRI header frame describes only its own segment, so it
//! is dropped from every segment when more than one is joined.

/// Encoded audio produced for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentAudio {
    pub index: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("no segments to assemble")]
    NoSegments,
    #[error("segment {0} is missing")]
    MissingSegment(usize),
    #[error("segment {0} was produced twice")]
    DuplicateSegment(usize),
    #[error("segment {index} is corrupt: {reason}")]
    CorruptSegment { index: usize, reason: String },
}

/// Join segment audio in index order, whatever order it arrived in.
///
/// A single segment is returned untouched. Segment buffers are consumed,
/// so every exit path releases them.
pub fn assemble(mut segments: Vec<SegmentAudio>) -> Result<Vec<u8>, AssemblyError> {
    if segments.is_empty() {
        return Err(AssemblyError::NoSegments);
    }

    segments.sort_by_key(|s| s.index);
    for (expected, segment) in segments.iter().enumerate() {
        if segment.index > expected {
            return Err(AssemblyError::MissingSegment(expected));
        }
        if segment.index < expected {
            return Err(AssemblyError::DuplicateSegment(segment.index));
        }
    }

    if segments.len() == 1 {
        let only = segments.remove(0);
        if only.bytes.is_empty() {
            return Err(corrupt(only.index, "empty audio"));
        }
        return Ok(only.bytes);
    }

    let mut output = Vec::with_capacity(segments.iter().map(|s| s.bytes.len()).sum());
    for segment in &segments {
        let frames = audio_frames(segment.index, &segment.bytes)?;
        for frame in frames {
            output.extend_from_slice(frame);
        }
    }

    tracing::debug!(
        segment_count = segments.len(),
        output_size = output.len(),
        "Segments assembled"
    );

    Ok(output)
}

fn corrupt(index: usize, reason: impl Into<String>) -> AssemblyError {
    AssemblyError::CorruptSegment {
        index,
        reason: reason.into(),
    }
}

/// Audio frames of one segment, without tags or VBR header frame.
fn audio_frames(index: usize, bytes: &[u8]) -> Result<Vec<&[u8]>, AssemblyError> {
    if bytes.is_empty() {
        return Err(corrupt(index, "empty audio"));
    }

    let start = id3v2_len(bytes).map_err(|reason| corrupt(index, reason))?;
    let end = if bytes.len() >= start + 128 && &bytes[bytes.len() - 128..bytes.len() - 125] == b"TAG" {
        bytes.len() - 128
    } else {
        bytes.len()
    };

    let mut frames = Vec::new();
    let mut offset = start;
    while offset < end {
        let header = FrameHeader::parse(&bytes[offset..end])
            .ok_or_else(|| corrupt(index, format!("no valid frame header at byte {}", offset)))?;
        let frame_end = offset + header.frame_len;
        if frame_end > end {
            return Err(corrupt(index, format!("truncated frame at byte {}", offset)));
        }

        let frame = &bytes[offset..frame_end];
        if !(frames.is_empty() && header.is_vbr_info(frame)) {
            frames.push(frame);
        }
        offset = frame_end;
    }

    if frames.is_empty() {
        return Err(corrupt(index, "no audio frames"));
    }

    Ok(frames)
}

/// Total size of a leading ID3v2 tag, or zero.
fn id3v2_len(bytes: &[u8]) -> Result<usize, String> {
    if bytes.len() < 10 || &bytes[..3] != b"ID3" {
        return Ok(0);
    }

    let size_bytes = &bytes[6..10];
    if size_bytes.iter().any(|b| b & 0x80 != 0) {
        return Err("malformed ID3v2 size".to_string());
    }
    let size = size_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | usize::from(*b));
    let footer = if bytes[5] & 0x10 != 0 { 10 } else { 0 };
    let total = 10 + size + footer;

    if total > bytes.len() {
        return Err("ID3v2 tag runs past end of audio".to_string());
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MpegVersion {
    V1,
    V2,
    V25,
}

#[derive(Debug, Clone, Copy)]
struct FrameHeader {
    version: MpegVersion,
    mono: bool,
    frame_len: usize,
}

const BITRATES_V1_L3: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];
const BITRATES_V2_L3: [u32; 16] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0];

impl FrameHeader {
    /// Parse a Layer III frame header; `None` for anything else.
    fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] & 0xE0 != 0xE0 {
            return None;
        }

        let version = match (bytes[1] >> 3) & 0x03 {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None,
        };
        // Layer III only
        if (bytes[1] >> 1) & 0x03 != 0b01 {
            return None;
        }

        let bitrate_index = usize::from(bytes[2] >> 4);
        let sample_rate_index = usize::from((bytes[2] >> 2) & 0x03);
        let padding = u32::from((bytes[2] >> 1) & 0x01);
        let mono = bytes[3] >> 6 == 0b11;

        let bitrate_kbps = match version {
            MpegVersion::V1 => BITRATES_V1_L3[bitrate_index],
            MpegVersion::V2 | MpegVersion::V25 => BITRATES_V2_L3[bitrate_index],
        };
        if bitrate_kbps == 0 || sample_rate_index == 3 {
            return None;
        }

        let sample_rate = match version {
            MpegVersion::V1 => [44_100, 48_000, 32_000][sample_rate_index],
            MpegVersion::V2 => [22_050, 24_000, 16_000][sample_rate_index],
            MpegVersion::V25 => [11_025, 12_000, 8_000][sample_rate_index],
        };
        let coefficient = match version {
            MpegVersion::V1 => 144,
            MpegVersion::V2 | MpegVersion::V25 => 72,
        };
        let frame_len = (coefficient * bitrate_kbps * 1000 / sample_rate + padding) as usize;

        Some(Self {
            version,
            mono,
            frame_len,
        })
    }

    fn side_info_len(&self) -> usize {
        match (self.version, self.mono) {
            (MpegVersion::V1, false) => 32,
            (MpegVersion::V1, true) => 17,
            (_, false) => 17,
            (_, true) => 9,
        }
    }

    /// Xing/Info tag after the side info, or a VBRI tag at its fixed offset.
    fn is_vbr_info(&self, frame: &[u8]) -> bool {
        let xing_at = 4 + self.side_info_len();
        let has_tag = |at: usize, tag: &[u8]| frame.get(at..at + 4) == Some(tag);

        has_tag(xing_at, b"Xing") || has_tag(xing_at, b"Info") || has_tag(36, b"VBRI")
    }
}
