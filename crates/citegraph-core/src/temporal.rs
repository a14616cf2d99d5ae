//! Publication dates encoded in arXiv-style identifiers (`YYMM.NNNNN`) and the
//! plausibility rule that a paper cannot cite one published after it.

use crate::text::strip_version;

/// Two-digit year and month decoded from an identifier's first four chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdDate {
    pub year: u32,
    pub month: u32,
}

/// Decode `(year, month)` from `YYMM...`.
///
/// Returns `None` when the identifier is shorter than four characters or its
/// first four are not all ASCII digits. No range check is done on the month.
pub fn decode_id_date(id: &str) -> Option<IdDate> {
    let id = strip_version(id);
    let head = id.get(..4)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(IdDate {
        year: head[..2].parse().ok()?,
        month: head[2..].parse().ok()?,
    })
}

/// Whether `citing` may cite `cited` given their encoded dates.
///
/// Rejects only when both dates decode and the cited paper is strictly later:
/// a later year, or the same year with a later month. Undecodable dates on
/// either side pass.
pub fn is_temporally_plausible(citing_id: &str, cited_id: &str) -> bool {
    match (decode_id_date(citing_id), decode_id_date(cited_id)) {
        (Some(citing), Some(cited)) => {
            if cited.year > citing.year {
                return false;
            }
            !(cited.year == citing.year && cited.month > citing.month)
        }
        _ => true,
    }
}
