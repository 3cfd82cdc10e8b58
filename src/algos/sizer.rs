/// Sizes of the teams needed to host `total` students with teams of about
/// `target` members: `ceil(total / target)` teams whose sizes differ by at
/// most one, larger ones first.
pub fn team_sizes(total: usize, target: usize) -> Vec<usize> {
    assert!(target > 0, "team size must be positive");
    if total == 0 {
        return Vec::new();
    }
    let teams = total.div_ceil(target);
    let base = total / teams;
    let extra = total % teams;
    (0..teams)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}
