use rust_decimal::Decimal;
use statement_recon_rs::{
    Invoice, InvoiceType, MatchStatus, Transaction, match_all, reassign,
};
use std::str::FromStr;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let transactions = vec![
        transaction("2025-01-20", "TT GLOBEX PAYMENT REF 8821", "0", "2450.00"),
        transaction("2025-01-22", "CHEQUE 001923 ACME TRADING", "3500.00", "0"),
        transaction("2025-01-25", "CASH DEPOSIT", "0", "2450.00"),
    ];

    let invoices = vec![
        invoice("INV-104", InvoiceType::Sales, "Globex FZE", "2450.00"),
        invoice("PB-220", InvoiceType::Purchase, "Acme Trading LLC", "3500.00"),
    ];

    let mut assignment = match_all(&transactions, &invoices);

    for (txn_index, entry) in &assignment {
        let label = match entry.invoice {
            Some(i) => invoices[i].invoice_id.as_str(),
            None => "-",
        };
        println!(
            "txn {} -> {:<8} {:?}: {}",
            txn_index, label, entry.status, entry.reason
        );
    }

    // A reviewer may reuse an invoice the greedy pass already consumed
    reassign(&mut assignment, &transactions, &invoices, 2, Some(0))?;
    let entry = &assignment[&2];
    assert_eq!(entry.status, MatchStatus::Matched);
    println!("\nafter manual override: txn 2 -> INV-104: {}", entry.reason);

    Ok(())
}

fn transaction(date: &str, description: &str, debit: &str, credit: &str) -> Transaction {
    Transaction {
        date: date.into(),
        description: description.to_string(),
        debit: Decimal::from_str(debit).unwrap(),
        credit: Decimal::from_str(credit).unwrap(),
        balance: Decimal::ZERO,
        currency: "AED".to_string(),
        source_file: "january.csv".to_string(),
        original_index: None,
        confidence: None,
    }
}

fn invoice(id: &str, invoice_type: InvoiceType, party: &str, total: &str) -> Invoice {
    let total = Decimal::from_str(total).unwrap();
    Invoice {
        invoice_id: id.to_string(),
        invoice_type,
        vendor_name: party.to_string(),
        customer_name: party.to_string(),
        invoice_date: "2025-01-15".into(),
        currency: "AED".to_string(),
        total_before_tax: total,
        total_tax: Decimal::ZERO,
        zero_rated: Decimal::ZERO,
        total_amount: total,
        total_before_tax_aed: Some(total),
        total_tax_aed: Some(Decimal::ZERO),
        zero_rated_aed: Some(Decimal::ZERO),
        total_amount_aed: Some(total),
        confidence: None,
    }
}
