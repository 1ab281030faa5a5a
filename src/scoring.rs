//! Integer score arithmetic shared by activities, profiles and the leaderboard.

/// `numerator / denominator` rounded half up, or 0 when the denominator is 0.
pub fn rounded_div(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((2 * numerator + denominator) / (2 * denominator)) as u32
}

/// round(100 × correct / total), 0 for an empty activity.
pub fn percentage(correct: usize, total: usize) -> u32 {
    rounded_div(100 * correct as u64, total as u64)
}

/// Average of integer percentages, rounded. 0 when there are none.
pub fn average<I>(scores: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), s| (sum + s as u64, count + 1));
    rounded_div(sum, count)
}
