//! # Prefs Inspector
//!
//! Command-line tool to inspect a saved preferences blob.

use obscura_prefs::{sniff_kind, verify_entry, PrefsSerializer, StorageSerializer, StoreKey};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         OBSCURA PREFS INSPECTOR                                  ║");
    println!("║         THE VAULT                                                ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: prefs_inspector <prefs_file>");
        println!();
        println!("Options:");
        println!("  --passphrase <text>  Verify entry integrity with this store key");
        return;
    }

    let path = &args[1];
    let key = args
        .iter()
        .position(|a| a == "--passphrase")
        .and_then(|i| args.get(i + 1))
        .map(|p| StoreKey::from_passphrase(p));

    println!("Loading prefs: {path}");

    let blob = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            println!("Error: Could not open file: {e}");
            return;
        }
    };

    let Some(kind) = sniff_kind(&blob) else {
        println!("Error: Not a prefs blob ({} bytes, unknown format)", blob.len());
        return;
    };

    let entries = match PrefsSerializer::for_kind(kind).deserialize(&blob) {
        Ok(e) => e,
        Err(e) => {
            println!("Error: Could not parse prefs: {e}");
            return;
        }
    };

    println!();
    println!("┌─ BLOB INFO ────────────────────────────────────────────────────┐");
    println!("│ Format:             {kind:?}");
    println!("│ Size:               {} bytes", blob.len());
    println!("│ Entries:            {}", entries.len());
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let mut failed = 0usize;
    println!("┌─ ENTRIES ──────────────────────────────────────────────────────┐");
    for (name, data) in &entries {
        let status = match &key {
            None => "unverified",
            Some(key) => match verify_entry(key, name, data) {
                Ok(()) => "ok",
                Err(_) => {
                    failed += 1;
                    "INTEGRITY FAILED"
                }
            },
        };
        let data_type = format!("{:?}", data.data_type);
        println!(
            "│ {name:<24} {data_type:<8} {:>6} bytes  {status}",
            data.payload.len()
        );
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    if key.is_none() {
        println!("Pass --passphrase to verify entry integrity");
    } else if failed == 0 {
        println!("✓ All entries verified");
    } else {
        println!("⚠ {failed} entries failed verification - wrong key or tampered blob");
    }
}
