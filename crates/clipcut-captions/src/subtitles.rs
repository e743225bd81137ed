//! Subtitle transforms: typewriter expansion and SubRip export.

use std::fmt::Write;

use clipcut_timeline::CaptionSegment;

const MIN_WORD_SECONDS: f64 = 0.2;
const MAX_WORD_SECONDS: f64 = 0.5;

/// Expand each segment into cumulative word-by-word segments.
///
/// Each output segment shows one more word than the last. Words advance
/// every `1 / words_per_second` seconds, kept within 0.2..0.5 s, and never
/// run past the source segment's end. Segments without words are dropped.
pub fn split_word_by_word(segments: &[CaptionSegment]) -> Vec<CaptionSegment> {
    let mut out = Vec::new();
    for segment in segments {
        let words: Vec<&str> = segment.text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let span = segment.end - segment.start;
        let words_per_second = if span > 0.0 {
            words.len() as f64 / span
        } else {
            2.0
        };
        let word_duration = (1.0 / words_per_second).clamp(MIN_WORD_SECONDS, MAX_WORD_SECONDS);

        let mut current = segment.start;
        for count in 1..=words.len() {
            let next = (current + word_duration).min(segment.end);
            out.push(CaptionSegment::new(current, next, words[..count].join(" ")));
            current = next;
            if current >= segment.end {
                break;
            }
        }
    }
    out
}

/// Format seconds as a SubRip timestamp (`HH:MM:SS,mmm`).
pub fn format_srt_time(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Render segments as a SubRip document.
pub fn render_srt(segments: &[CaptionSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            segment.text.trim()
        );
    }
    out
}
