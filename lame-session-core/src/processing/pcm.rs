/// Interleave two planar channels. The shorter channel bounds the output.
pub fn interleave(left: &[i16], right: &[i16]) -> Vec<i16> {
    let frames = left.len().min(right.len());
    let mut out = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        out.push(left[i]);
        out.push(right[i]);
    }
    out
}

/// Split interleaved PCM into a left channel and, for stereo, a right one.
///
/// Only whole frames are kept. Channels beyond the second are dropped.
pub fn deinterleave(samples: &[i16], channels: usize) -> (Vec<i16>, Option<Vec<i16>>) {
    if channels <= 1 {
        return (samples.to_vec(), None);
    }
    let frames = samples.len() / channels;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in samples.chunks_exact(channels) {
        left.push(frame[0]);
        right.push(frame[1]);
    }
    (left, Some(right))
}

/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
pub fn downmix_to_mono(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Decode little-endian 16-bit PCM bytes. A trailing odd byte is ignored.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_basic() {
        assert_eq!(interleave(&[1, 2, 3], &[-1, -2, -3]), vec![1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn interleave_unequal_lengths() {
        assert_eq!(interleave(&[1, 2, 3], &[9]), vec![1, 9]);
    }

    #[test]
    fn deinterleave_stereo() {
        let (left, right) = deinterleave(&[1, -1, 2, -2, 3], 2);
        assert_eq!(left, vec![1, 2]);
        assert_eq!(right, Some(vec![-1, -2]));
    }

    #[test]
    fn deinterleave_mono_has_no_right() {
        let (left, right) = deinterleave(&[4, 5, 6], 1);
        assert_eq!(left, vec![4, 5, 6]);
        assert!(right.is_none());
    }

    #[test]
    fn downmix_averages_frames() {
        assert_eq!(
            downmix_to_mono(&[100, 200, -50, 50, i16::MAX, i16::MAX], 2),
            vec![150, 0, i16::MAX]
        );
    }

    #[test]
    fn le_bytes_decode() {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0x7f];
        assert_eq!(samples_from_le_bytes(&bytes), vec![1, -1, i16::MIN]);
    }
}
