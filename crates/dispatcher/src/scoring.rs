use matcher_domain::ChairCandidate;
use matcher_errors::{MatchingError, MatchingResult};

/// 带评分的候选椅子，分数越低越好
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: ChairCandidate,
    pub score: f64,
}

/// 评分公式: `ride_distance / speed + chair_distance / speed`
///
/// 即椅子赶到接客点与完成整段行程的总耗时。
pub struct Scorer;

impl Scorer {
    pub fn score(ride_distance: f64, candidate: &ChairCandidate) -> MatchingResult<f64> {
        if candidate.speed <= 0 {
            return Err(MatchingError::invalid_data(format!(
                "椅子 {} 的速度必须为正数，实际为 {}",
                candidate.chair_id, candidate.speed
            )));
        }
        let speed = candidate.speed as f64;
        Ok(ride_distance / speed + candidate.distance / speed)
    }

    /// 按分数升序排列，同分保持候选顺序
    pub fn rank(
        ride_distance: f64,
        candidates: Vec<ChairCandidate>,
    ) -> MatchingResult<Vec<ScoredCandidate>> {
        let mut scored = candidates
            .into_iter()
            .map(|candidate| {
                Self::score(ride_distance, &candidate)
                    .map(|score| ScoredCandidate { candidate, score })
            })
            .collect::<MatchingResult<Vec<_>>>()?;

        scored.sort_by(|a, b| a.score.total_cmp(&b.score));
        Ok(scored)
    }

    pub fn best(
        ride_distance: f64,
        candidates: Vec<ChairCandidate>,
    ) -> MatchingResult<Option<ScoredCandidate>> {
        Ok(Self::rank(ride_distance, candidates)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slower_nearer_chair_can_lose() {
        // ride distance 10: A = 10/2 + 2/2 = 6, B = 10/1 + 1/1 = 11
        let a = ChairCandidate::new("A", "m2", 2, 2.0);
        let b = ChairCandidate::new("B", "m1", 1, 1.0);

        assert_eq!(Scorer::score(10.0, &a).unwrap(), 6.0);
        assert_eq!(Scorer::score(10.0, &b).unwrap(), 11.0);

        let best = Scorer::best(10.0, vec![b, a]).unwrap().unwrap();
        assert_eq!(best.candidate.chair_id, "A");
        assert_eq!(best.score, 6.0);
    }

    #[test]
    fn test_equal_scores_keep_candidate_order() {
        let first = ChairCandidate::new("first", "m", 2, 4.0);
        let second = ChairCandidate::new("second", "m", 1, 2.0);
        let third = ChairCandidate::new("third", "m", 2, 4.0);

        // first = third = 4, second = 6
        let ranked = Scorer::rank(4.0, vec![first, second, third]).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|s| s.candidate.chair_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "third", "second"]);
    }

    #[test]
    fn test_non_positive_speed_is_rejected() {
        let stalled = ChairCandidate::new("s", "m", 0, 1.0);
        assert!(matches!(
            Scorer::score(1.0, &stalled),
            Err(MatchingError::InvalidData(_))
        ));
        assert!(Scorer::rank(1.0, vec![stalled]).is_err());
    }

    #[test]
    fn test_empty_candidates_have_no_best() {
        assert!(Scorer::best(5.0, Vec::new()).unwrap().is_none());
    }
}
