use regex::Regex;
use std::sync::OnceLock;

use super::{CandidateGroup, Release};

/// Pick the canonical release from the service's candidate groups.
///
/// Recognition services report every pressing and reissue of a track; later
/// reissues and compilations tend to have inconsistent or missing art on the
/// metadata side, so the earliest-dated release wins. Two reduction steps:
/// the minimum year within each group, then the group whose minimum is the
/// global minimum. Ties break toward the first occurrence, and the selected
/// release is the first in its group carrying that minimum year. Groups with
/// no releases are skipped; `None` means no usable candidate existed.
pub fn earliest_release(groups: &[CandidateGroup]) -> Option<&Release> {
    let mut best: Option<(&CandidateGroup, i32)> = None;
    for group in groups {
        let group_min = match group.releases.iter().map(|r| r.year).min() {
            Some(year) => year,
            None => continue,
        };
        if best.map_or(true, |(_, year)| group_min < year) {
            best = Some((group, group_min));
        }
    }
    let (group, year) = best?;
    group.releases.iter().find(|r| r.year == year)
}

fn annotation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\(\[].*?[\)\]]").expect("static pattern"))
}

/// Strip parenthetical and bracketed annotations (reissue markers, "(Live)",
/// "[Remastered]") from an album title. Non-greedy, so nested or repeated
/// annotations are removed individually; surrounding whitespace is left
/// untouched.
pub fn clean_album_title(album: &str) -> String {
    annotation_pattern().replace_all(album, "").into_owned()
}
