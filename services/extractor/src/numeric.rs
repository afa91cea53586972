use crate::grid::Cell;

/// Parses text as a number after removing `,` thousands separators.
/// Blank, unparseable and non-finite input (`NaN`, `inf`) yield `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn looks_like_number(raw: &str) -> bool {
    parse_number(raw).is_some()
}

/// Coerces a cell to a number; missing values are `None`, never zero.
pub fn coerce_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Number(_) => None,
        Cell::Text(s) => parse_number(s),
    }
}
