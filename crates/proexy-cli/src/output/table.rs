use proexy_core::oman::fields::OMAN_FIELDS;
use proexy_core::oman::OmanExtraction;
use proexy_core::proserv::{ProservExtraction, PROSERV_COLUMNS};
use proexy_core::{RunReport, RunStatus};

pub fn print_run(report: &RunReport) {
    let stats = &report.stats;
    println!("=== Run summary ===\n");
    println!("  Proserv:       {}", stats.proserv);
    println!("  Oman:          {}", stats.oman);
    println!("  Unclassified:  {}", stats.unclassified);
    println!("  Errors:        {}", stats.errors);
    println!();

    for family in &report.families {
        let output = family
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not written)".into());
        println!(
            "  {:<8} {} of {} documents, {} rows -> {}",
            family.family.to_string(),
            family.extracted,
            family.documents,
            family.rows,
            output
        );
        if let Some(ref failure) = family.failure {
            println!("           FAILED: {failure}");
        }
    }

    if !report.unclassified.is_empty() {
        println!("\n  Unclassified files:");
        for name in &report.unclassified {
            println!("    {name}");
        }
    }

    let issues: Vec<_> = report.all_issues().collect();
    if !issues.is_empty() {
        let width = issues.iter().map(|i| i.filename.len()).max().unwrap_or(10);
        println!("\n  Issues:");
        for issue in issues {
            println!(
                "    {:<width$}  {}",
                issue.filename,
                issue.reason,
                width = width
            );
        }
    }

    println!();
    match &report.status {
        RunStatus::Completed => println!("  Status: completed"),
        RunStatus::Cancelled => println!("  Status: cancelled"),
        RunStatus::Failed { reason } => println!("  Status: failed ({reason})"),
    }
}

pub fn print_oman(extraction: &OmanExtraction) {
    let record = &extraction.record;
    println!("=== {} ===\n", record.filename);

    let width = OMAN_FIELDS.iter().map(|f| f.len()).max().unwrap_or(10);
    for (name, value) in OMAN_FIELDS.iter().zip(&record.values) {
        println!("  {:<width$}  {}", name, value, width = width);
    }

    if extraction.is_degraded() {
        println!(
            "\n  Missing fields (record written blank): {}",
            extraction.missing.join(", ")
        );
    }
}

pub fn print_proserv(extraction: &ProservExtraction) {
    let equipment_id = if extraction.equipment_id.is_empty() {
        "(not found)"
    } else {
        extraction.equipment_id.as_str()
    };
    println!("  Equipment ID: {equipment_id}");
    println!(
        "  Rows: {} ({} detection)\n",
        extraction.rows.len(),
        extraction.strategy
    );

    let width = PROSERV_COLUMNS.iter().map(|c| c.len()).max().unwrap_or(10);
    for (i, row) in extraction.rows.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for (column, value) in PROSERV_COLUMNS.iter().zip(&row.values) {
            println!("  {:<width$}  {}", column, value, width = width);
        }
    }
}
