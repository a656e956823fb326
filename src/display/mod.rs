pub mod artview;
pub mod terminal;

use crate::artwork::Artwork;
use crate::identify::IdentificationResult;

pub use artview::ArtworkView;
pub use terminal::TerminalDisplay;

/// The render surface seam. The session only ever needs these two calls;
/// production uses the ratatui terminal, tests substitute a recording fake.
pub trait InfoDisplay {
    /// Clear everything and show the empty dark canvas (idle / not-found).
    fn render_blank(&mut self) -> anyhow::Result<()>;

    /// Replace the current rendering with the two-panel result view:
    /// artwork on the left, song/artist/album text on the right.
    fn render_result(&mut self, info: &IdentificationResult, artwork: &Artwork)
        -> anyhow::Result<()>;
}
