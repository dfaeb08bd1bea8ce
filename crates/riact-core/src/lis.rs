/// Longest strictly increasing subsequence of `sequence`, ignoring negative entries.
///
/// Returns the values of one maximum-length run.
pub fn longest_increasing_subsequence(sequence: &[isize]) -> Vec<isize> {
    longest_increasing_positions(sequence)
        .into_iter()
        .map(|index| sequence[index])
        .collect()
}

/// Positions in `sequence` of one longest strictly increasing run.
///
/// Patience sorting: `tails[k]` holds the index of the smallest tail of any
/// increasing run of length `k + 1`, and `previous` links each index to the
/// element before it in its run.
pub fn longest_increasing_positions(sequence: &[isize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::with_capacity(sequence.len());
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (index, &value) in sequence.iter().enumerate() {
        if value < 0 {
            continue;
        }
        let position = tails.partition_point(|&tail| sequence[tail] < value);
        if position > 0 {
            previous[index] = Some(tails[position - 1]);
        }
        if position == tails.len() {
            tails.push(index);
        } else {
            tails[position] = index;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        result.push(index);
        cursor = previous[index];
    }
    result.reverse();
    result
}

#[cfg(test)]
#[path = "tests/lis_tests.rs"]
mod tests;
