use super::cells::CellValue;

/// Keyword vocabularies per column role. Matching is case-insensitive;
/// short abbreviations must stand alone as a token, longer keywords
/// match as substrings of the header cell.
const DATE_KEYWORDS: &[&str] = &["date", "dt"];
const DESCRIPTION_KEYWORDS: &[&str] = &[
    "description",
    "narration",
    "particulars",
    "details",
    "remarks",
    "memo",
];
const DEBIT_KEYWORDS: &[&str] = &["debit", "withdrawal", "paid out", "dr"];
const CREDIT_KEYWORDS: &[&str] = &["credit", "deposit", "paid in", "cr"];
const AMOUNT_KEYWORDS: &[&str] = &["amount", "value"];
const BALANCE_KEYWORDS: &[&str] = &["balance"];

/// Scan window and acceptance threshold for header detection.
pub(crate) const HEADER_SCAN_ROWS: usize = 50;
pub(crate) const MIN_HEADER_SCORE: u32 = 3;

/// Column index per role, as resolved from the winning header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderScan {
    pub row: usize,
    pub score: u32,
    pub roles: ColumnRoles,
}

/// Scan at most the first 50 rows and keep the best-scoring candidate.
/// Returns `None` when no row reaches the minimum score; such a sheet is
/// treated as non-tabular, not as an error.
pub fn detect_header(grid: &[Vec<CellValue>]) -> Option<HeaderScan> {
    let mut best: Option<(usize, u32)> = None;

    for (row_index, row) in grid.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let score = score_row(row);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((row_index, score));
        }
    }

    let (row, score) = best.filter(|(_, score)| *score >= MIN_HEADER_SCORE)?;
    Some(HeaderScan {
        row,
        score,
        roles: assign_roles(&grid[row]),
    })
}

/// Role membership score: date weighs 3, description/debit/credit 2,
/// a generic amount column 1. Balance does not contribute.
fn score_row(row: &[CellValue]) -> u32 {
    let texts = lowercased(row);
    let has = |keywords: &[&str]| texts.iter().any(|text| matches_any(text, keywords));

    let mut score = 0;
    if has(DATE_KEYWORDS) {
        score += 3;
    }
    if has(DESCRIPTION_KEYWORDS) {
        score += 2;
    }
    if has(DEBIT_KEYWORDS) {
        score += 2;
    }
    if has(CREDIT_KEYWORDS) {
        score += 2;
    }
    if has(AMOUNT_KEYWORDS) {
        score += 1;
    }
    score
}

fn assign_roles(row: &[CellValue]) -> ColumnRoles {
    let texts = lowercased(row);
    let find = |keywords: &[&str]| texts.iter().position(|text| matches_any(text, keywords));

    let mut roles = ColumnRoles {
        date: find(DATE_KEYWORDS),
        description: find(DESCRIPTION_KEYWORDS),
        debit: find(DEBIT_KEYWORDS),
        credit: find(CREDIT_KEYWORDS),
        amount: find(AMOUNT_KEYWORDS),
        balance: find(BALANCE_KEYWORDS),
    };
    repair_collisions(&mut roles, &texts);
    roles
}

/// A merged header (e.g. a cell reading "Description Credit") can pull
/// two roles onto one column. When the column to its right is blank in
/// the header row, the later role shifts there.
fn repair_collisions(roles: &mut ColumnRoles, texts: &[String]) {
    let mut used: Vec<usize> = Vec::new();
    let slots: [&mut Option<usize>; 6] = [
        &mut roles.date,
        &mut roles.description,
        &mut roles.debit,
        &mut roles.credit,
        &mut roles.amount,
        &mut roles.balance,
    ];

    for slot in slots {
        let Some(column) = *slot else { continue };
        if used.contains(&column) {
            let next = column + 1;
            if next < texts.len() && texts[next].trim().is_empty() && !used.contains(&next) {
                *slot = Some(next);
                used.push(next);
                continue;
            }
        }
        used.push(column);
    }
}

fn lowercased(row: &[CellValue]) -> Vec<String> {
    row.iter().map(|cell| cell.as_text().to_lowercase()).collect()
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    if text.is_empty() {
        return false;
    }
    keywords.iter().any(|keyword| {
        if keyword.len() <= 2 {
            text.split_whitespace()
                .any(|token| token.trim_matches(|c: char| !c.is_alphanumeric()) == *keyword)
        } else {
            text.contains(keyword)
        }
    })
}
