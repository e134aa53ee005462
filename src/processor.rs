use crate::pack::SubsPack;
use crate::subtitle::Pos;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::info;

/// The transformations selected on the command line.
#[derive(Debug, Default)]
pub struct ProcessOpts {
    /// Second part of the movie and where it starts.
    pub concat: Option<(SubsPack, Duration)>,
    /// Pack to merge in as a dual subtitle.
    pub merge: Option<SubsPack>,
    pub remove_control: bool,
    pub remove_html: bool,
    pub remove_hi: bool,
    pub shift: Option<Duration>,
    pub scale: Option<f64>,
    pub lengthen: Option<f64>,
    pub pos: Option<Pos>,
    pub color: Option<String>,
    pub sort: bool,
}

/// Applies the selected transformations in a fixed order: joining packs
/// first, then cleanup, then timing, then display attributes.
pub fn process(mut pack: SubsPack, opts: ProcessOpts) -> Result<SubsPack> {
    if let Some((second, start)) = opts.concat {
        info!("Concatenating {} subtitles", second.len());
        pack.concatenate(second, start).context("Failed to concatenate subtitles")?;
    }
    if let Some(other) = opts.merge {
        info!("Merging {} subtitles", other.len());
        pack.merge(other);
    }

    if opts.remove_control {
        pack.remove_control();
    }
    if opts.remove_html {
        pack.remove_html();
    }
    if opts.remove_hi {
        let before = pack.len();
        pack.remove_hi();
        info!("Removed hearing impaired content, {} subtitles dropped", before - pack.len());
    }

    if let Some(delta) = opts.shift {
        pack.shift(delta).context("Failed to shift subtitles")?;
    }
    if let Some(factor) = opts.scale {
        pack.scale(factor).context("Failed to scale subtitles")?;
    }
    if let Some(factor) = opts.lengthen {
        pack.lengthen(factor).context("Failed to lengthen subtitles")?;
    }

    if let Some(pos) = opts.pos {
        pack.set_pos(pos);
    }
    if let Some(color) = opts.color {
        pack.set_color(&color);
    }

    if opts.sort {
        pack.sort();
    }
    Ok(pack)
}
