use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};
use crate::types::{Direction, Invoice, Transaction};

/// Fixed rationale strings. These are part of the contract: callers key
/// UI copy and saved drafts off the exact text.
pub const REASON_NO_INVOICE: &str = "No Selected Invoice";
pub const REASON_NO_DIRECTION: &str = "Bank transaction has no clear debit/credit direction";
pub const REASON_DIRECTION_MISMATCH: &str = "Direction mismatch (Sales vs Purchase)";
pub const REASON_AMOUNT_MISMATCH: &str = "Amount mismatch";
pub const REASON_MATCHED: &str = "Exact amount and direction match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

/// One row of the assignment map. `invoice` is a position in the invoice
/// slice handed to the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub invoice: Option<usize>,
    pub status: MatchStatus,
    pub reason: String,
}

/// Transaction position (in the input slice) -> match entry. Recomputed
/// from scratch whenever transactions, invoices or an override change.
pub type ReconciliationAssignment = BTreeMap<usize, MatchEntry>;

/// Matching tolerance in currency units.
fn amount_tolerance() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

/// Eligibility of one transaction/invoice pairing, independent of what
/// any other row selected. This is the whole rule for manual overrides.
fn evaluate(transaction: &Transaction, invoice: Option<&Invoice>) -> (MatchStatus, &'static str) {
    let Some(invoice) = invoice else {
        return (MatchStatus::Unmatched, REASON_NO_INVOICE);
    };

    let direction = transaction.direction();
    if direction == Direction::None {
        return (MatchStatus::Unmatched, REASON_NO_DIRECTION);
    }
    if invoice.invoice_type.direction() != direction {
        return (MatchStatus::Unmatched, REASON_DIRECTION_MISMATCH);
    }
    if (transaction.amount() - invoice.matchable_total()).abs() > amount_tolerance() {
        return (MatchStatus::Unmatched, REASON_AMOUNT_MISMATCH);
    }

    (MatchStatus::Matched, REASON_MATCHED)
}

/// The first token of the invoice party's name, when it is long enough
/// to be meaningful inside a bank narration.
fn name_token_hit(transaction: &Transaction, invoice: &Invoice) -> bool {
    let Some(token) = invoice.party_name().split_whitespace().next() else {
        return false;
    };
    token.len() > 2
        && transaction
            .description
            .to_lowercase()
            .contains(&token.to_lowercase())
}

/// Greedy single-pass suggestion of invoice pairings.
///
/// Transactions are visited in `(date, ingestion order)`; each one takes
/// the best not-yet-consumed invoice with matching direction and amount,
/// preferring a candidate whose party name shows up in the narration,
/// otherwise the earliest by `(invoice date, ingestion order)`. Once an
/// invoice is consumed it is ineligible for later transactions, so an
/// automatically produced map never repeats an invoice. This is a
/// heuristic, not an optimal assignment; every suggestion is expected to
/// go through human review.
pub fn match_all(
    transactions: &[Transaction],
    invoices: &[Invoice],
) -> ReconciliationAssignment {
    let mut transaction_order: Vec<usize> = (0..transactions.len()).collect();
    transaction_order.sort_by_key(|&i| (transactions[i].date.parse().ok(), i));

    let mut invoice_order: Vec<usize> = (0..invoices.len()).collect();
    invoice_order.sort_by_key(|&i| (invoices[i].invoice_date.parse().ok(), i));

    let mut consumed = vec![false; invoices.len()];
    let mut assignment = ReconciliationAssignment::new();

    for &txn_index in &transaction_order {
        let transaction = &transactions[txn_index];
        let direction = transaction.direction();

        if direction == Direction::None {
            assignment.insert(
                txn_index,
                MatchEntry {
                    invoice: None,
                    status: MatchStatus::Unmatched,
                    reason: REASON_NO_DIRECTION.to_string(),
                },
            );
            continue;
        }

        let candidates: Vec<usize> = invoice_order
            .iter()
            .copied()
            .filter(|&i| {
                !consumed[i]
                    && invoices[i].invoice_type.direction() == direction
                    && (transaction.amount() - invoices[i].matchable_total()).abs()
                        <= amount_tolerance()
            })
            .collect();

        let selected = candidates
            .iter()
            .copied()
            .find(|&i| name_token_hit(transaction, &invoices[i]))
            .or_else(|| candidates.first().copied());

        match selected {
            Some(invoice_index) => {
                consumed[invoice_index] = true;
                let (status, reason) = evaluate(transaction, Some(&invoices[invoice_index]));
                assignment.insert(
                    txn_index,
                    MatchEntry {
                        invoice: Some(invoice_index),
                        status,
                        reason: reason.to_string(),
                    },
                );
            }
            None => {
                assignment.insert(
                    txn_index,
                    MatchEntry {
                        invoice: None,
                        status: MatchStatus::Unmatched,
                        reason: REASON_NO_INVOICE.to_string(),
                    },
                );
            }
        }
    }

    assignment
}

/// Manual override: set or clear one transaction's pairing and recompute
/// its row with the eligibility rule alone. The greedy uniqueness
/// constraint does not apply here; a reviewer may deliberately reuse an
/// invoice across rows.
pub fn reassign(
    assignment: &mut ReconciliationAssignment,
    transactions: &[Transaction],
    invoices: &[Invoice],
    txn_index: usize,
    invoice: Option<usize>,
) -> EngineResult<()> {
    let transaction = transactions
        .get(txn_index)
        .ok_or(EngineError::UnknownTransaction(txn_index))?;
    let selected = match invoice {
        Some(invoice_index) => Some(
            invoices
                .get(invoice_index)
                .ok_or(EngineError::UnknownInvoice(invoice_index))?,
        ),
        None => None,
    };

    let (status, reason) = evaluate(transaction, selected);
    assignment.insert(
        txn_index,
        MatchEntry {
            invoice,
            status,
            reason: reason.to_string(),
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvoiceType;
    use rstest::rstest;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn txn(date: &str, description: &str, debit: &str, credit: &str) -> Transaction {
        Transaction {
            date: date.into(),
            description: description.to_string(),
            debit: Decimal::from_str(debit).unwrap(),
            credit: Decimal::from_str(credit).unwrap(),
            balance: Decimal::ZERO,
            currency: "AED".to_string(),
            source_file: "jan.xlsx".to_string(),
            original_index: None,
            confidence: None,
        }
    }

    fn invoice(
        id: &str,
        invoice_type: InvoiceType,
        date: &str,
        party: &str,
        total_aed: &str,
    ) -> Invoice {
        Invoice {
            invoice_id: id.to_string(),
            invoice_type,
            vendor_name: if invoice_type == InvoiceType::Purchase {
                party.to_string()
            } else {
                "Own Company LLC".to_string()
            },
            customer_name: if invoice_type == InvoiceType::Sales {
                party.to_string()
            } else {
                "Own Company LLC".to_string()
            },
            invoice_date: date.into(),
            currency: "AED".to_string(),
            total_before_tax: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            zero_rated: Decimal::ZERO,
            total_amount: Decimal::from_str(total_aed).unwrap(),
            total_before_tax_aed: None,
            total_tax_aed: None,
            zero_rated_aed: None,
            total_amount_aed: Some(Decimal::from_str(total_aed).unwrap()),
            confidence: None,
        }
    }

    #[test]
    fn test_amount_within_tolerance_matches() {
        // Crédito de 1500.00: a venda de 1500.05 casa (|0.05| <= 0.1),
        // a compra de 1500.00 é inelegível por direção
        let transactions = vec![txn("2025-01-10", "Inward remittance", "0", "1500.00")];
        let invoices = vec![
            invoice("A", InvoiceType::Sales, "2025-01-08", "Globex FZE", "1500.05"),
            invoice("B", InvoiceType::Purchase, "2025-01-08", "Acme LLC", "1500.00"),
        ];

        let assignment = match_all(&transactions, &invoices);
        let entry = &assignment[&0];
        assert_eq!(entry.invoice, Some(0));
        assert_eq!(entry.status, MatchStatus::Matched);
        assert_eq!(entry.reason, REASON_MATCHED);
    }

    #[test]
    fn test_amount_beyond_tolerance_stays_unmatched() {
        let transactions = vec![txn("2025-01-10", "Inward remittance", "0", "1500.00")];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-08",
            "Globex FZE",
            "1500.20",
        )];

        let assignment = match_all(&transactions, &invoices);
        let entry = &assignment[&0];
        assert_eq!(entry.invoice, None);
        assert_eq!(entry.status, MatchStatus::Unmatched);
        assert_eq!(entry.reason, REASON_NO_INVOICE);
    }

    #[test]
    fn test_no_direction_reason() {
        let transactions = vec![txn("2025-01-10", "Zero line", "0", "0")];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-08",
            "Globex FZE",
            "100.00",
        )];

        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].reason, REASON_NO_DIRECTION);
    }

    #[test]
    fn test_invoice_consumed_once() {
        let transactions = vec![
            txn("2025-01-10", "First payment", "0", "100.00"),
            txn("2025-01-11", "Second payment", "0", "100.00"),
        ];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-08",
            "Globex FZE",
            "100.00",
        )];

        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].invoice, Some(0));
        assert_eq!(assignment[&1].invoice, None);
        assert_eq!(assignment[&1].reason, REASON_NO_INVOICE);
    }

    #[test]
    fn test_no_invoice_repeated_in_automatic_map() {
        let transactions: Vec<Transaction> = (0..6)
            .map(|i| txn("2025-01-10", &format!("Payment {i}"), "0", "250.00"))
            .collect();
        let invoices: Vec<Invoice> = (0..4)
            .map(|i| {
                invoice(
                    &format!("INV-{i}"),
                    InvoiceType::Sales,
                    "2025-01-05",
                    "Globex FZE",
                    "250.00",
                )
            })
            .collect();

        let assignment = match_all(&transactions, &invoices);
        let used: Vec<usize> = assignment.values().filter_map(|e| e.invoice).collect();
        let unique: HashSet<usize> = used.iter().copied().collect();
        assert_eq!(used.len(), unique.len());
        assert_eq!(used.len(), 4); // todas as invoices consumidas, duas sobram sem par
    }

    #[test]
    fn test_name_token_breaks_ties() {
        let transactions = vec![txn(
            "2025-01-10",
            "TT REF 8821 GLOBEX PAYMENT",
            "0",
            "100.00",
        )];
        // A invoice mais antiga viria primeiro, mas o nome no extrato
        // aponta para a segunda
        let invoices = vec![
            invoice("A", InvoiceType::Sales, "2025-01-01", "Initech LLC", "100.00"),
            invoice("B", InvoiceType::Sales, "2025-01-05", "Globex FZE", "100.00"),
        ];

        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].invoice, Some(1));
    }

    #[test]
    fn test_tie_break_falls_back_to_invoice_date() {
        let transactions = vec![txn("2025-01-10", "Inward remittance", "0", "100.00")];
        let invoices = vec![
            invoice("A", InvoiceType::Sales, "2025-01-07", "Initech LLC", "100.00"),
            invoice("B", InvoiceType::Sales, "2025-01-03", "Umbrella DMCC", "100.00"),
        ];

        // Nenhum nome aparece na narração: vence a data mais antiga
        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].invoice, Some(1));
    }

    #[test]
    fn test_short_name_token_does_not_tie_break() {
        let transactions = vec![txn("2025-01-10", "TT AB TRANSFER", "0", "100.00")];
        let invoices = vec![
            invoice("A", InvoiceType::Sales, "2025-01-01", "Initech LLC", "100.00"),
            invoice("B", InvoiceType::Sales, "2025-01-05", "AB Holdings", "100.00"),
        ];

        // "AB" tem só dois caracteres: não conta como evidência
        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].invoice, Some(0));
    }

    #[test]
    fn test_transactions_processed_in_date_order() {
        // A transação mais antiga está depois na lista, mas consome a
        // única invoice primeiro
        let transactions = vec![
            txn("2025-01-20", "Later payment", "0", "100.00"),
            txn("2025-01-05", "Earlier payment", "0", "100.00"),
        ];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-01",
            "Globex FZE",
            "100.00",
        )];

        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&1].invoice, Some(0));
        assert_eq!(assignment[&0].invoice, None);
    }

    #[rstest]
    #[case(InvoiceType::Sales, "0", "740.00")] // crédito casa com venda
    #[case(InvoiceType::Purchase, "740.00", "0")] // débito casa com compra
    fn test_direction_pairing(
        #[case] invoice_type: InvoiceType,
        #[case] debit: &str,
        #[case] credit: &str,
    ) {
        let transactions = vec![txn("2025-01-10", "Movement", debit, credit)];
        let invoices = vec![invoice("A", invoice_type, "2025-01-08", "Globex FZE", "740.00")];

        let assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&0].status, MatchStatus::Matched);
    }

    #[test]
    fn test_manual_override_reuses_consumed_invoice() {
        let transactions = vec![
            txn("2025-01-10", "First payment", "0", "100.00"),
            txn("2025-01-11", "Second payment", "0", "100.00"),
        ];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-08",
            "Globex FZE",
            "100.00",
        )];

        let mut assignment = match_all(&transactions, &invoices);
        assert_eq!(assignment[&1].invoice, None);

        // O revisor decide reutilizar a invoice já consumida
        reassign(&mut assignment, &transactions, &invoices, 1, Some(0)).unwrap();
        assert_eq!(assignment[&1].invoice, Some(0));
        assert_eq!(assignment[&1].status, MatchStatus::Matched);
        assert_eq!(assignment[&1].reason, REASON_MATCHED);
        // A primeira linha permanece intocada
        assert_eq!(assignment[&0].invoice, Some(0));
    }

    #[test]
    fn test_manual_override_reports_mismatches() {
        let transactions = vec![txn("2025-01-10", "Payment", "0", "100.00")];
        let invoices = vec![
            invoice("A", InvoiceType::Purchase, "2025-01-08", "Acme LLC", "100.00"),
            invoice("B", InvoiceType::Sales, "2025-01-08", "Globex FZE", "320.00"),
        ];

        let mut assignment = match_all(&transactions, &invoices);

        reassign(&mut assignment, &transactions, &invoices, 0, Some(0)).unwrap();
        assert_eq!(assignment[&0].status, MatchStatus::Unmatched);
        assert_eq!(assignment[&0].reason, REASON_DIRECTION_MISMATCH);

        reassign(&mut assignment, &transactions, &invoices, 0, Some(1)).unwrap();
        assert_eq!(assignment[&0].reason, REASON_AMOUNT_MISMATCH);

        reassign(&mut assignment, &transactions, &invoices, 0, None).unwrap();
        assert_eq!(assignment[&0].reason, REASON_NO_INVOICE);
        assert_eq!(assignment[&0].invoice, None);
    }

    #[test]
    fn test_reassign_rejects_unknown_indices() {
        let transactions = vec![txn("2025-01-10", "Payment", "0", "100.00")];
        let invoices: Vec<Invoice> = vec![];
        let mut assignment = match_all(&transactions, &invoices);

        let result = reassign(&mut assignment, &transactions, &invoices, 9, None);
        assert!(matches!(result, Err(EngineError::UnknownTransaction(9))));

        let result = reassign(&mut assignment, &transactions, &invoices, 0, Some(3));
        assert!(matches!(result, Err(EngineError::UnknownInvoice(3))));
    }

    #[test]
    fn test_assignment_serializes_as_plain_json() {
        let transactions = vec![txn("2025-01-10", "Payment", "0", "100.00")];
        let invoices = vec![invoice(
            "A",
            InvoiceType::Sales,
            "2025-01-08",
            "Globex FZE",
            "100.00",
        )];

        let assignment = match_all(&transactions, &invoices);
        let json = serde_json::to_string(&assignment).unwrap();
        assert!(json.contains(REASON_MATCHED));

        let restored: ReconciliationAssignment = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, assignment);
    }

    #[test]
    fn test_raw_total_used_without_aed_amount() {
        let transactions = vec![txn("2025-01-10", "Payment", "0", "500.00")];
        let mut inv = invoice("A", InvoiceType::Sales, "2025-01-08", "Globex FZE", "500.00");
        inv.total_amount_aed = None;

        let assignment = match_all(&transactions, &[inv]);
        assert_eq!(assignment[&0].status, MatchStatus::Matched);
    }
}
