use matcher_domain::ChairCandidate;
use tracing::debug;

/// 按到接客点的距离升序排列候选椅子
///
/// 使用稳定排序，距离相同的椅子保持存储返回的顺序。
pub struct CandidateBuilder;

impl CandidateBuilder {
    pub fn build(mut chairs: Vec<ChairCandidate>) -> Vec<ChairCandidate> {
        chairs.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        if chairs.is_empty() {
            debug!("没有活跃的椅子");
        }
        chairs
    }
}
