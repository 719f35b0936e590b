//! Ordered harvest round descriptors.
//!
//! Each round is data: a tag, where its candidates come from, and the
//! vetting mode applied to them. The coordinator walks the list in order.

use briefwright_shared::RoundTag;
use briefwright_vetting::VetMode;

use crate::synonyms::synonym_queries;
use crate::topic::Topic;

/// Where a round gets its candidates.
#[derive(Debug, Clone, Copy)]
pub enum RoundSource {
    /// Curated references from the seed catalog.
    Seeds,
    /// Search queries derived from the topic.
    Queries(fn(&Topic) -> Vec<String>),
}

#[derive(Debug, Clone, Copy)]
pub struct RoundDescriptor {
    pub tag: RoundTag,
    pub source: RoundSource,
    /// Vetting override for this round's candidates.
    pub mode: VetMode,
}

impl RoundDescriptor {
    /// Queries this round would issue, empty for the seed round.
    pub fn queries(&self, topic: &Topic) -> Vec<String> {
        match self.source {
            RoundSource::Seeds => Vec::new(),
            RoundSource::Queries(build) => build(topic),
        }
    }
}

/// The five rounds in their fixed execution order.
pub fn standard_rounds() -> Vec<RoundDescriptor> {
    vec![
        RoundDescriptor {
            tag: RoundTag::Seeds,
            source: RoundSource::Seeds,
            mode: VetMode::CuratedBypass,
        },
        RoundDescriptor {
            tag: RoundTag::Topical,
            source: RoundSource::Queries(topical_queries),
            mode: VetMode::Standard,
        },
        RoundDescriptor {
            tag: RoundTag::Scholar,
            source: RoundSource::Queries(scholar_queries),
            mode: VetMode::Standard,
        },
        RoundDescriptor {
            tag: RoundTag::Extension,
            source: RoundSource::Queries(extension_queries),
            mode: VetMode::Standard,
        },
        RoundDescriptor {
            tag: RoundTag::Synonyms,
            source: RoundSource::Queries(synonym_queries),
            mode: VetMode::Standard,
        },
    ]
}

// ---------------------------------------------------------------------------
// Query builders
// ---------------------------------------------------------------------------

pub fn topical_queries(topic: &Topic) -> Vec<String> {
    let p = topic.phrase();
    vec![
        p.to_string(),
        format!("{p} overview"),
        format!("{p} research"),
        format!("{p} facts"),
        format!("what is {p}"),
    ]
}

/// Queries scoped to academic repositories, museums and DOI resolvers.
pub fn scholar_queries(topic: &Topic) -> Vec<String> {
    let p = topic.phrase();
    vec![
        format!("{p} site:edu"),
        format!("{p} site:gov"),
        format!("{p} site:doi.org"),
        format!("{p} museum collection"),
        format!("{p} journal article pdf"),
    ]
}

pub fn extension_queries(topic: &Topic) -> Vec<String> {
    let p = topic.phrase();
    vec![
        format!("{p} extension site:edu"),
        format!("{p} fact sheet site:gov"),
        format!("{p} educational resources site:edu"),
        format!("{p} cooperative extension"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_are_in_fixed_order() {
        let tags: Vec<RoundTag> = standard_rounds().iter().map(|r| r.tag).collect();
        assert_eq!(tags, RoundTag::ALL.to_vec());
    }

    #[test]
    fn only_the_seed_round_bypasses_scoring() {
        for round in standard_rounds() {
            let expected = if round.tag == RoundTag::Seeds {
                VetMode::CuratedBypass
            } else {
                VetMode::Standard
            };
            assert_eq!(round.mode, expected, "{}", round.tag);
        }
    }

    #[test]
    fn query_rounds_use_the_topic_phrase() {
        let topic = Topic::from_prompt("volcano eruption analysis");
        let rounds = standard_rounds();
        assert!(rounds[0].queries(&topic).is_empty());
        for round in &rounds[1..4] {
            let queries = round.queries(&topic);
            assert!(!queries.is_empty());
            assert!(queries.iter().all(|q| q.contains("volcano eruption")), "{}", round.tag);
        }
        assert!(rounds[2].queries(&topic).iter().any(|q| q.ends_with("site:doi.org")));
    }
}
