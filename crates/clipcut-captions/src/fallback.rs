//! Demonstration captions for offline editing.

use clipcut_timeline::CaptionSegment;

const DEMO_LINES: &[&str] = &[
    "Wait until you see this...",
    "This is the moment that matters",
    "Watch closely right here",
    "You won't believe what happens next!",
];

/// Fixed demonstration caption set spread evenly over `clip_duration`.
///
/// Returns an empty list for a non-positive duration.
pub fn demo_captions(clip_duration: f64) -> Vec<CaptionSegment> {
    if !clip_duration.is_finite() || clip_duration <= 0.0 {
        return Vec::new();
    }
    let step = clip_duration / DEMO_LINES.len() as f64;
    DEMO_LINES
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let start = step * i as f64;
            let end = if i + 1 == DEMO_LINES.len() {
                clip_duration
            } else {
                step * (i + 1) as f64
            };
            CaptionSegment::new(start, end, *line)
        })
        .collect()
}
