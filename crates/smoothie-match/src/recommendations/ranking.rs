use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{Candidate, Profile, ScoringContext};
use super::scoring::{MatchResult, ScoringEngine};

/// Number of results shown per provider group.
pub const DEFAULT_GROUP_TOP_K: usize = 3;

/// Applies the scoring engine across a catalog and orders or groups the results.
#[derive(Debug, Clone)]
pub struct RankingAggregator {
    engine: Arc<ScoringEngine>,
    group_top_k: usize,
}

impl RankingAggregator {
    pub fn new(engine: Arc<ScoringEngine>) -> Self {
        Self {
            engine,
            group_top_k: DEFAULT_GROUP_TOP_K,
        }
    }

    pub fn with_group_top_k(mut self, top_k: usize) -> Self {
        self.group_top_k = top_k;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Scores every candidate and returns the best `limit`. Equal scores keep catalog order.
    pub fn rank_all(
        &self,
        candidates: &[Candidate],
        profile: &Profile,
        context: &ScoringContext,
        limit: usize,
    ) -> Vec<MatchResult> {
        let mut results = self.score_each(candidates, profile, context);
        sort_by_score(&mut results);
        results.truncate(limit);
        results
    }

    /// Ranks provider groups by the mean score of all their candidates, showing the top K.
    pub fn rank_by_group(
        &self,
        groups: &[ProviderGroup],
        profile: &Profile,
        context: &ScoringContext,
    ) -> Vec<ProviderRanking> {
        let mut rankings: Vec<ProviderRanking> = groups
            .iter()
            .filter(|group| !group.candidates.is_empty())
            .map(|group| {
                let mut results = self.score_each(&group.candidates, profile, context);
                let total: u32 = results.iter().map(|result| u32::from(result.score)).sum();
                let average_score = total as f32 / results.len() as f32;
                let candidate_count = results.len();

                sort_by_score(&mut results);
                results.truncate(self.group_top_k);

                ProviderRanking {
                    provider: group.provider.clone(),
                    top_matches: results,
                    average_score,
                    candidate_count,
                }
            })
            .collect();

        rankings.sort_by(|a, b| b.average_score.total_cmp(&a.average_score));
        rankings
    }

    fn score_each(
        &self,
        candidates: &[Candidate],
        profile: &Profile,
        context: &ScoringContext,
    ) -> Vec<MatchResult> {
        candidates
            .iter()
            .map(|candidate| self.engine.score(candidate, profile, context))
            .collect()
    }
}

fn sort_by_score(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Candidates offered by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderGroup {
    pub provider: String,
    pub candidates: Vec<Candidate>,
}

/// Splits a flat catalog by provider, keeping first-seen provider order.
pub fn group_by_provider(candidates: &[Candidate]) -> Vec<ProviderGroup> {
    let mut groups: Vec<ProviderGroup> = Vec::new();
    for candidate in candidates {
        match groups
            .iter_mut()
            .find(|group| group.provider == candidate.provider)
        {
            Some(group) => group.candidates.push(candidate.clone()),
            None => groups.push(ProviderGroup {
                provider: candidate.provider.clone(),
                candidates: vec![candidate.clone()],
            }),
        }
    }
    groups
}

/// Ranked view of one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRanking {
    pub provider: String,
    pub top_matches: Vec<MatchResult>,
    pub average_score: f32,
    pub candidate_count: usize,
}
