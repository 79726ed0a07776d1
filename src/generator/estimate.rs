use crate::model::Layout;

/// Lowest estimate ever reported.
pub const MIN_ESTIMATE: u32 = 5;
const BASE_FLOOR: u32 = 8;
const MOVES_SAVED_PER_SPARE_EMPTY: u32 = 5;

/// Layers in each container that are not that container's own majority
/// color. Ties pick any one of the tied colors as the majority.
pub fn misplaced_layers(layout: &Layout) -> usize {
    layout
        .get_containers()
        .iter()
        .map(|c| {
            let majority = c.color_counts().into_iter().map(|(_, n)| n).max().unwrap_or(0);
            c.len() - majority
        })
        .sum()
}

/// Advisory lower bound on moves to solve, used for rating only.
pub fn estimate_min_moves(layout: &Layout, difficulty: u32) -> u32 {
    // scale of 1.2 at rank 0 growing by 0.025 per rank, kept in per-mille
    let scale_per_mille = 1_200 + 25 * difficulty as usize;
    let scaled = (misplaced_layers(layout) * scale_per_mille / 1_000) as u32;
    let base = scaled.max(BASE_FLOOR);
    let spare_empties = layout.empty_container_count().saturating_sub(2) as u32;
    base.saturating_sub(spare_empties * MOVES_SAVED_PER_SPARE_EMPTY)
        .max(MIN_ESTIMATE)
}
