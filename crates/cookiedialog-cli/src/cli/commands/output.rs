//! Text and JSON rendering of records and region results.

use chrono::{TimeZone, Utc};
use cookiedialog_core::{ConsentRecord, ConsentRecordStore, RegionLookupResult};

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

pub fn print_record(record: &ConsentRecord, store: &ConsentRecordStore) {
    let created = record
        .created_at_utc()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| record.created_at.to_string());

    println!("key:        {}", store.storage_key());
    println!("reason:     {}", record.reason);
    println!("created:    {}", created);
    println!("expires:    {}", format_millis(record.expires_at(store.expiry_days())));
    println!("version:    {}", record.schema_version);
    if let Some(ctx) = &record.region_context {
        println!(
            "region:     {} / {} (consent required: {}, via {})",
            ctx.country.as_deref().unwrap_or("-"),
            ctx.region.as_deref().unwrap_or("-"),
            ctx.in_eu,
            ctx.detection_method
        );
    }
    println!("categories:");
    for (id, granted) in &record.categories {
        println!("  {:<16} {}", id, if *granted { "granted" } else { "denied" });
    }
}

pub fn print_record_json(record: &ConsentRecord) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

pub fn print_region(result: &RegionLookupResult) {
    println!("requires consent: {}", result.requires_consent);
    println!("country:          {}", result.country.as_deref().unwrap_or("-"));
    println!("region:           {}", result.region.as_deref().unwrap_or("-"));
}
