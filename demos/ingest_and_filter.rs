use chrono::NaiveDate;
use statement_recon_rs::IngestionBuilder;

const SAMPLE_CSV: &str = "\
Txn Date,Narration,Debit,Credit,Balance
02/01/2025,Opening deposit,,\"10,000.00\",\"10,000.00\"
15/01/2025,Office rent,\"(3,500.00)\",,\"6,500.00\"
20/01/2025,Customer payment INV-104,,\"2,450.00\",\"8,950.00\"
04/04/2025,Out of period payment,,\"1,000.00\",\"9,950.00\"
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let period_start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let period_end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

    let output = IngestionBuilder::new()
        .csv("january.csv", SAMPLE_CSV)
        .period(period_start, period_end)
        .ingest()?;

    let summary = &output.ledger.summary;
    println!("Period {}\n", summary.statement_period);
    println!("Opening balance:   {:>12}", summary.opening_balance);
    println!("Total deposits:    {:>12}", summary.total_deposits);
    println!("Total withdrawals: {:>12}", summary.total_withdrawals);
    println!("Closing balance:   {:>12}\n", summary.closing_balance);

    println!("{} transactions in period:", output.ledger.transactions.len());
    for tx in &output.ledger.transactions {
        println!(
            "  {}  {:<30} debit {:>10}  credit {:>10}",
            tx.date.as_str(),
            tx.description,
            tx.debit,
            tx.credit
        );
    }

    if output.ledger.unparsed_dates > 0 {
        println!(
            "{} rows had unreadable dates and were included fail-open",
            output.ledger.unparsed_dates
        );
    }

    Ok(())
}
