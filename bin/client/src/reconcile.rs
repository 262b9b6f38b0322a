use crate::constants::RECONCILE_ENDPOINT;
use crate::response_error;
use anyhow::{Context, Result};
use common::{ReconcilePass, ReconcileRequest, ReconcileResponse};
use reqwest::blocking::Client;

/// Ask the server to run the consistency reconciler and print its report
pub fn run(server: &str, repair: bool, pass: ReconcilePass) -> Result<ReconcileResponse> {
    let url = format!("{}{}", server.trim_end_matches('/'), RECONCILE_ENDPOINT);
    let response = Client::new()
        .post(&url)
        .json(&ReconcileRequest { repair, pass })
        .send()
        .context("Failed to connect to server")?;
    if !response.status().is_success() {
        return Err(response_error("Reconcile failed", response));
    }

    let report: ReconcileResponse = response.json().context("Invalid reconcile response")?;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &ReconcileResponse) {
    let mode = if report.repair { "repair" } else { "report-only" };
    println!("Reconcile ({})", mode);

    if let Some(catalog) = &report.catalog {
        println!(
            "  catalog orphans: {} of {} records checked, {} tombstoned, {} errors",
            catalog.orphans.len(),
            catalog.checked,
            catalog.tombstoned,
            catalog.errors
        );
        for hash in &catalog.orphans {
            println!("    missing blob: {}", hash);
        }
    }

    if let Some(blobs) = &report.blobs {
        println!(
            "  blob orphans: {} of {} blobs scanned, {} deleted, {} errors",
            blobs.orphans.len(),
            blobs.scanned,
            blobs.deleted,
            blobs.errors
        );
        for key in &blobs.orphans {
            println!("    unreferenced blob: {}", key);
        }
    }
}
