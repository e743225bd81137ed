//! Command line parsing.

use std::path::PathBuf;

use anyhow::{bail, Result};

pub const USAGE: &str = "\
Usage: clipcut <url> <prompt> [options]

Options:
  --captions        Generate captions for every clip
  --apply           Burn generated captions into the clips (implies --captions)
  --srt <dir>       Write each clip's captions as <dir>/<clip id>.srt
  --finalize        Finalize the clips after editing
  -h, --help        Show this help";

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub url: String,
    pub prompt: String,
    pub captions: bool,
    pub apply_captions: bool,
    pub srt_dir: Option<PathBuf>,
    pub finalize: bool,
}

impl Args {
    /// Parse arguments (without the program name). `None` means help was asked for.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let mut positional = Vec::new();
        let mut captions = false;
        let mut apply_captions = false;
        let mut srt_dir = None;
        let mut finalize = false;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--captions" => captions = true,
                "--apply" => {
                    captions = true;
                    apply_captions = true;
                }
                "--srt" => match iter.next() {
                    Some(dir) => {
                        captions = true;
                        srt_dir = Some(PathBuf::from(dir));
                    }
                    None => bail!("--srt needs a directory"),
                },
                "--finalize" => finalize = true,
                flag if flag.starts_with("--") => bail!("Unknown option {flag}\n\n{USAGE}"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let (Some(url), Some(prompt), None) = (positional.next(), positional.next(), positional.next())
        else {
            bail!("Expected a video URL and a prompt\n\n{USAGE}");
        };

        Ok(Some(Self {
            url,
            prompt,
            captions,
            apply_captions,
            srt_dir,
            finalize,
        }))
    }
}
