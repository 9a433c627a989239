use crate::errors::LedgerError;

/// Round to the nearest integer currency unit, halves up.
/// `(x + 0.5).floor()` — note negative halves also round toward +∞,
/// which is the behavior the profit fixtures assume.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Distribute `target_total` across buckets proportionally to their
/// current `quantities`, preserving the exact sum ("largest remainder").
///
/// Each bucket first gets its rounded ideal share; the residual drift is
/// then walked off round-robin, one unit per bucket per pass, never
/// taking a bucket below zero. Per-bucket deviation from the ideal share
/// is bounded by one unit.
///
/// Fails closed with `AllocationImpossible` if a full pass cannot make
/// progress (only reachable with adversarial inputs — increasing-ratio
/// splits always have headroom).
pub fn allocate_proportional(
    target_total: i64,
    quantities: &[i64],
) -> Result<Vec<i64>, LedgerError> {
    if quantities.is_empty() {
        return Ok(Vec::new());
    }
    if target_total < 0 {
        return Err(LedgerError::ValidationError(format!(
            "Allocation target must be non-negative, got {target_total}"
        )));
    }
    let current_total: i64 = quantities.iter().sum();
    if current_total <= 0 {
        return Err(LedgerError::ValidationError(format!(
            "Allocation source total must be positive, got {current_total}"
        )));
    }

    let mut allocated: Vec<i64> = quantities
        .iter()
        .map(|&q| round_half_up(target_total as f64 * q as f64 / current_total as f64).max(0))
        .collect();

    let mut diff = target_total - allocated.iter().sum::<i64>();
    while diff != 0 {
        let mut moved = false;
        for slot in allocated.iter_mut() {
            if diff == 0 {
                break;
            }
            if diff > 0 {
                *slot += 1;
                diff -= 1;
                moved = true;
            } else if *slot > 0 {
                *slot -= 1;
                diff += 1;
                moved = true;
            }
        }
        if !moved {
            return Err(LedgerError::AllocationImpossible {
                adjusted: 0,
                remaining: quantities.len(),
                reason: format!(
                    "no bucket has headroom to absorb a residual of {diff} \
                     (target {target_total} over {} buckets)",
                    quantities.len()
                ),
            });
        }
    }

    Ok(allocated)
}
