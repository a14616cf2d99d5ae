use std::path::Path;

use crate::index::TitleIndex;
use crate::matching::match_citation;
use crate::temporal::{decode_id_date, is_temporally_plausible};
use crate::text::strip_version;
use crate::{CitationExtractor, PaperOutcome, ResolvedEdge};

/// Resolve the outbound citations of one corpus folder.
///
/// Reads only the folder's own bibliography files (through `extractor`);
/// `index` is never mutated, so any number of calls may run concurrently.
/// A folder whose identifier is not in the index (no title file) yields no
/// edges and no error.
pub fn process_paper(
    folder: &str,
    corpus_root: &Path,
    index: &TitleIndex,
    extractor: &dyn CitationExtractor,
) -> PaperOutcome {
    let citing_id = strip_version(folder).to_string();
    let mut outcome = PaperOutcome {
        citing_id: citing_id.clone(),
        ..Default::default()
    };

    if !index.contains_id(&citing_id) {
        return outcome;
    }

    let cited = extractor.cited_titles(&corpus_root.join(folder));

    for candidate in cited.iter() {
        let m = match_citation(&candidate.title, index);
        let (Some(matched_title), Some(cited_id)) = (m.matched_title, m.matched_id) else {
            continue;
        };

        if !is_temporally_plausible(&citing_id, &cited_id) {
            outcome.logs.push(format!(
                "[TEMPORAL REJECT] {} -> {} ({} cites later {})",
                candidate.title, matched_title, citing_id, cited_id
            ));
            continue;
        }

        if cited_id == citing_id {
            continue;
        }

        if let (Some(year), Some(date)) = (candidate.year, decode_id_date(&cited_id)) {
            if u32::from(year % 100) != date.year {
                tracing::debug!(
                    citing = %citing_id,
                    cited = %cited_id,
                    bib_year = year,
                    id_year = date.year,
                    "bibliography year disagrees with identifier date"
                );
            }
        }

        outcome.edges.push(ResolvedEdge {
            citing_id: citing_id.clone(),
            cited_id,
            candidate_title: candidate.title.clone(),
            matched_title,
        });
    }

    outcome
}
