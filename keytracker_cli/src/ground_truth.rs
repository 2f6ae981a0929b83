// Ground-truth keys encoded in file names, and scoring against them.
//
// Corpus files carry their annotated key as the last underscore-separated
// token of the file stem: `ballade_g.mid` is g minor, `prelude_Eb.mid` is
// Eb major. Anything else (no underscore, an unparsable token) simply means
// no ground truth for that file.

use keytracker_hmm::Key;
use serde::Serialize;
use std::path::Path;

/// Annotated key of a corpus file, if its name carries one.
pub fn ground_truth_from_path(path: &Path) -> Option<Key> {
    let stem = path.file_stem()?.to_str()?;
    let (_, token) = stem.rsplit_once('_')?;
    token.parse().ok()
}

/// How an estimate compares with the annotated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Exact,
    /// The estimate is the annotated key's relative major/minor.
    Relative,
    Wrong,
}

impl Verdict {
    /// Correct when relative-key confusions are forgiven.
    pub fn is_lenient_hit(self) -> bool {
        matches!(self, Verdict::Exact | Verdict::Relative)
    }
}

pub fn judge(estimate: Key, truth: Key) -> Verdict {
    if estimate == truth {
        Verdict::Exact
    } else if estimate == truth.relative() {
        Verdict::Relative
    } else {
        Verdict::Wrong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_selects_key_and_mode() {
        assert_eq!(
            ground_truth_from_path(Path::new("corpus/ballade_g.mid")),
            Some(Key::minor(7))
        );
        assert_eq!(
            ground_truth_from_path(Path::new("prelude_Eb.midi")),
            Some(Key::major(3))
        );
        assert_eq!(
            ground_truth_from_path(Path::new("bach_wtc1_prelude_f#.mid")),
            Some(Key::minor(6))
        );
    }

    #[test]
    fn test_missing_or_bad_suffix_is_none() {
        assert_eq!(ground_truth_from_path(Path::new("untitled.mid")), None);
        assert_eq!(ground_truth_from_path(Path::new("song_final.mid")), None);
        assert_eq!(ground_truth_from_path(Path::new("trailing_.mid")), None);
    }

    #[test]
    fn test_judge() {
        let c = Key::major(0);
        let a = Key::minor(9);
        assert_eq!(judge(c, c), Verdict::Exact);
        assert_eq!(judge(a, c), Verdict::Relative);
        assert_eq!(judge(c, a), Verdict::Relative);
        assert_eq!(judge(Key::major(7), c), Verdict::Wrong);
        assert_eq!(judge(Key::minor(0), c), Verdict::Wrong);
        assert!(Verdict::Relative.is_lenient_hit());
        assert!(!Verdict::Wrong.is_lenient_hit());
    }
}
