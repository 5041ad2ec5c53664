use std::cmp::Ordering;

use crate::protocol::StreamFormat;

/// Orders formats from worst to best, the way downloaders expect: formats
/// with video beat audio-only ones, then height, width, total bitrate and
/// frame rate decide. `format_id` breaks remaining ties so the order is
/// deterministic.
pub fn sort_formats(formats: &mut [StreamFormat]) {
    formats.sort_by(quality_cmp);
}

fn quality_cmp(a: &StreamFormat, b: &StreamFormat) -> Ordering {
    (!a.is_audio_only())
        .cmp(&!b.is_audio_only())
        .then_with(|| a.height.cmp(&b.height))
        .then_with(|| a.width.cmp(&b.width))
        .then_with(|| cmp_f64(a.tbr, b.tbr))
        .then_with(|| cmp_f64(a.fps, b.fps))
        .then_with(|| a.format_id.cmp(&b.format_id))
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
