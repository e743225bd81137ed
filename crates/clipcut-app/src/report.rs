//! Console output and caption export.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clipcut_captions::{render_srt, split_word_by_word};
use clipcut_service::FinalizedClip;
use clipcut_timeline::{CaptionAnimation, ClipCollection};
use tracing::info;

pub fn print_clips(clips: &ClipCollection) {
    println!("{} clip(s) on a {:.1}s timeline", clips.len(), clips.timeline_duration());
    for clip in clips.iter() {
        println!(
            "  [{}] {} - {} ({:.1}s) {}",
            clip.id(),
            clip.formatted_start(),
            clip.formatted_end(),
            clip.duration(),
            clip.title.as_deref().unwrap_or("")
        );
    }
}

pub fn print_finalized(clips: &[FinalizedClip]) {
    println!("{} finalized clip(s)", clips.len());
    for clip in clips {
        println!(
            "  [{}] {} - {} {}{}",
            clip.id(),
            clip.formatted_start(),
            clip.formatted_end(),
            clip.path().unwrap_or("(no path)"),
            if clip.has_captions() { " +captions" } else { "" }
        );
    }
}

/// Write one `.srt` per captioned clip. Typewriter-styled clips are
/// expanded word by word.
pub fn write_srt_files(clips: &ClipCollection, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for clip in clips.iter().filter(|c| !c.captions().is_empty()) {
        let typewriter = clip
            .caption_style()
            .is_some_and(|s| s.animation == CaptionAnimation::Typewriter);
        let srt = if typewriter {
            render_srt(&split_word_by_word(clip.captions()))
        } else {
            render_srt(clip.captions())
        };
        let path = dir.join(format!("{}.srt", clip.id()));
        fs::write(&path, srt).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(clip = %clip.id(), path = %path.display(), "Wrote captions");
    }
    Ok(())
}
