//! Range-index cost estimate consumed by query planners

/// Column is compared for equality
pub const EQUALITY: u8 = 1;
/// Column has a lower bound
pub const START: u8 = 2;
/// Column has an upper bound
pub const END: u8 = 4;
/// Column has both bounds
pub const RANGE: u8 = START | END;

/// Added to every row count so tiny tables are not free to scan
const COST_ROW_OFFSET: u64 = 1000;

/// Assumed selectivity (percent) of a column without statistics
const DEFAULT_SELECTIVITY: u64 = 50;

/// Estimate the cost of reading through a range index.
///
/// `masks` holds one condition mask per indexed column, in index column
/// order. Conditions are used left to right until a column without an
/// equality condition is reached. A covering index reads entries only; any
/// other index also pays one row fetch per entry.
pub fn range_index_cost(masks: &[u8], row_count: u64, unique: bool, covering: bool) -> f64 {
    let row_count = row_count.saturating_add(COST_ROW_OFFSET);
    let mut rows_cost = row_count;
    let mut total_selectivity = 0;

    for (i, &mask) in masks.iter().enumerate() {
        if mask & EQUALITY == EQUALITY {
            if i + 1 == masks.len() && unique {
                rows_cost = 3;
                break;
            }
            total_selectivity = 100 - (100 - total_selectivity) * (100 - DEFAULT_SELECTIVITY) / 100;
            let distinct_rows = (row_count.saturating_mul(total_selectivity) / 100).max(1);
            rows_cost = 2 + (row_count / distinct_rows).max(1);
        } else if mask & RANGE == RANGE {
            rows_cost = 2 + rows_cost / 4;
            break;
        } else if mask & START == START {
            rows_cost = 2 + rows_cost / 3;
            break;
        } else if mask & END == END {
            rows_cost /= 3;
            break;
        } else {
            break;
        }
    }

    let fetch_cost = if covering { 0 } else { rows_cost };
    (rows_cost + fetch_cost + 20) as f64
}
