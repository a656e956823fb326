use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;

use spindle::artwork::{placeholder, Artwork};
use spindle::display::{InfoDisplay, TerminalDisplay};
use spindle::identify::IdentificationResult;

fn buffer_text(buf: &Buffer) -> String {
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            out.push_str(buf.get(x, y).symbol());
        }
        out.push('\n');
    }
    out
}

fn found(song: &str, artist: &str, album: &str) -> IdentificationResult {
    IdentificationResult {
        found: true,
        song: song.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
    }
}

#[test]
fn test_blank_render_is_an_empty_canvas() {
    let mut display = TerminalDisplay::with_backend(TestBackend::new(80, 24)).unwrap();
    display.render_blank().unwrap();

    let text = buffer_text(display.backend().buffer());
    assert!(!text.contains("Song:"));
    assert!(!text.contains('▀'));
    assert!(text.chars().all(|c| c == ' ' || c == '\n'));
}

#[test]
fn test_result_render_shows_artwork_and_info_panels() {
    let mut display = TerminalDisplay::with_backend(TestBackend::new(80, 24)).unwrap();
    let art = Artwork {
        image: placeholder(500),
        placeholder: true,
    };
    display
        .render_result(&found("SongA", "ArtistA", "AlbumA"), &art)
        .unwrap();

    let text = buffer_text(display.backend().buffer());
    // Right panel: title and the literal info lines.
    assert!(text.contains("Now Spinning"));
    assert!(text.contains("Song: SongA"));
    assert!(text.contains("Artist: ArtistA"));
    assert!(text.contains("Album: AlbumA"));
    // Left panel: the artwork painted as half-block cells.
    assert!(text.contains('▀'));

    // The square artwork fills the left panel's height and stays inside the
    // left half (40 of 80 columns).
    let buf = display.backend().buffer();
    let mut rightmost_block = 0u16;
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            if buf.get(x, y).symbol() == "\u{2580}" {
                rightmost_block = rightmost_block.max(x);
            }
        }
    }
    assert!(rightmost_block < 40, "artwork leaked into the text panel");
}

#[test]
fn test_each_render_replaces_the_previous_one() {
    let mut display = TerminalDisplay::with_backend(TestBackend::new(80, 24)).unwrap();
    let art = Artwork {
        image: placeholder(500),
        placeholder: true,
    };

    display
        .render_result(&found("SongA", "ArtistA", "AlbumA"), &art)
        .unwrap();
    assert!(buffer_text(display.backend().buffer()).contains("Song: SongA"));

    // Not-found on the next episode: back to the empty canvas, nothing
    // accumulated from the previous render.
    display.render_blank().unwrap();
    let text = buffer_text(display.backend().buffer());
    assert!(!text.contains("Song:"));
    assert!(!text.contains('▀'));

    // And a new result fully replaces the old text.
    display
        .render_result(&found("Other", "Artist", "Record"), &art)
        .unwrap();
    let text = buffer_text(display.backend().buffer());
    assert!(text.contains("Song: Other"));
    assert!(!text.contains("SongA"));
}

#[test]
fn test_wide_artwork_is_scaled_aspect_preserved() {
    let mut display = TerminalDisplay::with_backend(TestBackend::new(80, 24)).unwrap();
    // A 4:1 banner must not paint the full panel height.
    let wide = image::DynamicImage::new_rgb8(400, 100);
    let art = Artwork {
        image: wide,
        placeholder: false,
    };
    display
        .render_result(&found("S", "A", "B"), &art)
        .unwrap();

    let buf = display.backend().buffer();
    let mut rows_with_blocks = 0;
    for y in 0..buf.area.height {
        let has_block = (0..buf.area.width).any(|x| buf.get(x, y).symbol() == "\u{2580}");
        if has_block {
            rows_with_blocks += 1;
        }
    }
    assert!(rows_with_blocks > 0);
    // 40 columns wide at 4:1 is 10 pixel rows, i.e. 5 half-block cell rows.
    assert!(
        rows_with_blocks <= 6,
        "banner painted {} rows, expected ~5",
        rows_with_blocks
    );
}
