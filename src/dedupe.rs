use std::collections::HashSet;

use tracing::debug;

use crate::types::Transaction;

/// A leading fragment has a description shorter than this.
const FRAGMENT_DESCRIPTION_MAX: usize = 6;

/// Collapse extraction artifacts in a normalized stream.
///
/// The canonical key includes `source_file`, so identical transactions
/// from two different accounts are both kept; it includes the original
/// row index when present, so grid rows only ever collapse when the
/// extraction really emitted the same row twice (index-less OCR rows).
/// Running the function on its own output is a no-op.
pub fn dedupe(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut retained: Vec<Transaction> = Vec::new();
    let mut duplicates = 0usize;

    for transaction in transactions {
        if !seen.insert(canonical_key(&transaction)) {
            duplicates += 1;
            continue;
        }

        match retained.last_mut() {
            // OCR às vezes divide uma transação em duas linhas: um toco
            // de descrição sem valores e depois a linha completa. A
            // linha completa substitui o toco no lugar.
            Some(previous) if is_fragment_of(previous, &transaction) => {
                *previous = transaction;
            }
            _ => retained.push(transaction),
        }
    }

    if duplicates > 0 {
        debug!(duplicates, "dropped duplicate extraction rows");
    }
    retained
}

fn canonical_key(transaction: &Transaction) -> String {
    let mut key = format!(
        "{}|{}|{}|{:.2}|{:.2}|{:.2}|{}",
        transaction.source_file,
        transaction.date.as_str(),
        transaction.description.to_lowercase(),
        transaction.debit,
        transaction.credit,
        transaction.balance,
        transaction.currency,
    );
    if let Some(index) = transaction.original_index {
        key.push_str(&format!("|{index}"));
    }
    key
}

fn is_fragment_of(previous: &Transaction, current: &Transaction) -> bool {
    previous.source_file == current.source_file
        && previous.date == current.date
        && previous.description.len() < FRAGMENT_DESCRIPTION_MAX
        && previous.debit.is_zero()
        && previous.credit.is_zero()
        && previous.balance.is_zero()
        && current.description.len() > previous.description.len()
}
