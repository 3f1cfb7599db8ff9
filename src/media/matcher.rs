use crate::{MatchTier, MediaFile, MetadataRecord};

/// Reverse containment only trusts record names longer than this.
pub const REVERSE_MIN_LEN: usize = 10;
/// Fuzzy matching needs both names, and the shared prefix, longer than this.
pub const FUZZY_MIN_LEN: usize = 20;

pub struct PairMatcher;

impl PairMatcher {
    /// Picks the sidecar record describing `media` from its directory's pool.
    ///
    /// Tiers are tried in order and the first hit wins:
    /// 1. forward: record stem starts with the media stem
    /// 2. reverse: media stem starts with a record stem longer than 10 chars
    /// 3. fuzzy: longest common prefix over 20 chars, both stems over 20 chars
    ///
    /// Ties go to the earliest record in `candidates`, so the result depends
    /// on directory listing order, which varies across platforms.
    pub fn find<'a>(
        media: &MediaFile,
        candidates: &'a [MetadataRecord],
    ) -> Option<(&'a MetadataRecord, MatchTier)> {
        let media_stem = media.stem.as_str();
        if let Some(record) = candidates.iter().find(|c| c.stem.starts_with(media_stem)) {
            return Some((record, MatchTier::Forward));
        }

        if let Some(record) = candidates
            .iter()
            .find(|c| media_stem.starts_with(c.stem.as_str()) && char_len(&c.stem) > REVERSE_MIN_LEN)
        {
            return Some((record, MatchTier::Reverse));
        }

        if char_len(media_stem) <= FUZZY_MIN_LEN {
            return None;
        }

        let mut best: Option<&MetadataRecord> = None;
        let mut best_len = FUZZY_MIN_LEN;
        for candidate in candidates {
            if char_len(&candidate.stem) <= FUZZY_MIN_LEN {
                continue;
            }
            let shared = common_prefix_len(media_stem, &candidate.stem);
            if shared > best_len {
                best_len = shared;
                best = Some(candidate);
            }
        }
        best.map(|record| (record, MatchTier::Fuzzy))
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool(names: &[&str]) -> Vec<MetadataRecord> {
        names
            .iter()
            .map(|n| MetadataRecord::from_path(format!("/album/{n}")))
            .collect()
    }

    fn matched<'a>(media: &str, candidates: &'a [MetadataRecord]) -> Option<(&'a str, MatchTier)> {
        PairMatcher::find(&MediaFile::from_path(format!("/album/{media}")), candidates)
            .map(|(r, tier)| (r.stem.as_str(), tier))
    }

    #[test]
    fn forward_match_on_exact_and_suffixed_names() {
        let candidates = pool(&["IMG_0001.JSON"]);
        assert_eq!(matched("IMG_0001.JPG", &candidates), Some(("IMG_0001", MatchTier::Forward)));

        let candidates = pool(&["other.json", "IMG_0001(1).json"]);
        assert_eq!(matched("IMG_0001.jpg", &candidates), Some(("IMG_0001(1)", MatchTier::Forward)));

        let candidates = pool(&["IMG_0001.jpg.supplemental-metadata.json"]);
        assert_eq!(
            matched("IMG_0001.jpg", &candidates),
            Some(("IMG_0001.jpg.supplemental-metadata", MatchTier::Forward))
        );
    }

    #[test]
    fn forward_beats_reverse() {
        let candidates = pool(&["PXL_20230101_1234.json", "PXL_20230101_123456789.jpg.json"]);
        assert_eq!(
            matched("PXL_20230101_123456789.jpg", &candidates),
            Some(("PXL_20230101_123456789.jpg", MatchTier::Forward))
        );
    }

    #[test]
    fn reverse_match_on_truncated_record() {
        let candidates = pool(&["VeryLongUniqueIdentifie.json"]);
        assert_eq!(
            matched("VeryLongUniqueIdentifierABCDEFG.heic", &candidates),
            Some(("VeryLongUniqueIdentifie", MatchTier::Reverse))
        );
    }

    #[test]
    fn reverse_ignores_short_record_names() {
        // 10 characters exactly: not long enough
        let candidates = pool(&["IMG_000123.json"]);
        assert_eq!(matched("IMG_000123_edited.jpg", &candidates), None);

        let candidates = pool(&["IMG_0001234.json"]);
        assert_eq!(
            matched("IMG_0001234_edited.jpg", &candidates),
            Some(("IMG_0001234", MatchTier::Reverse))
        );
    }

    #[test]
    fn fuzzy_picks_longest_shared_prefix() {
        let candidates = pool(&[
            "AF1QipMabcdefghijklmnoXX_one.json",
            "AF1QipMabcdefghijklmnopqrsZZ.json",
            "unrelated_but_very_long_name.json",
        ]);
        let hit = matched("AF1QipMabcdefghijklmnopqrstuvw.mp4", &candidates).unwrap();
        assert_eq!(hit, ("AF1QipMabcdefghijklmnopqrsZZ", MatchTier::Fuzzy));
        assert_eq!(common_prefix_len("AF1QipMabcdefghijklmnopqrstuvw", hit.0), 26);
    }

    #[test]
    fn fuzzy_tie_goes_to_first_candidate() {
        let candidates = pool(&["ABCDEFGHIJKLMNOPQRSTUVW_first.json", "ABCDEFGHIJKLMNOPQRSTUVW_other.json"]);
        assert_eq!(
            matched("ABCDEFGHIJKLMNOPQRSTUVWxyz.jpg", &candidates),
            Some(("ABCDEFGHIJKLMNOPQRSTUVW_first", MatchTier::Fuzzy))
        );
    }

    #[test]
    fn fuzzy_needs_long_names_and_long_prefix() {
        // media stem of exactly 20 chars never reaches the fuzzy tier
        let candidates = pool(&["ABCDEFGHIJKLMNOPQRSTxxxxx.json"]);
        assert_eq!(matched("ABCDEFGHIJKLMNOPQRSz.jpg", &candidates), None);

        // shared prefix of exactly 20 chars is rejected
        let candidates = pool(&["ABCDEFGHIJKLMNOPQRSTleft.json"]);
        assert_eq!(matched("ABCDEFGHIJKLMNOPQRSTright.jpg", &candidates), None);

        // 21 shared chars is accepted
        let candidates = pool(&["ABCDEFGHIJKLMNOPQRSTUleft.json"]);
        assert_eq!(
            matched("ABCDEFGHIJKLMNOPQRSTUright.jpg", &candidates),
            Some(("ABCDEFGHIJKLMNOPQRSTUleft", MatchTier::Fuzzy))
        );
    }

    #[test]
    fn no_candidates_no_match() {
        assert_eq!(matched("random.jpg", &[]), None);
        let candidates = pool(&["something_else.json"]);
        assert_eq!(matched("random.jpg", &candidates), None);
    }

    #[test]
    fn matching_is_deterministic_for_fixed_order() {
        let candidates = pool(&["VeryLongUniqueIdentifie.json", "VeryLongUniqueIdentifierABC.json", "x.json"]);
        let first = matched("VeryLongUniqueIdentifierABCDEFG.heic", &candidates);
        for _ in 0..10 {
            assert_eq!(matched("VeryLongUniqueIdentifierABCDEFG.heic", &candidates), first);
        }
    }
}
