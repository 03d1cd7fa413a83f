use std::env;
use std::fs::File;
use std::io::Cursor;
use std::process::exit;

use anyhow::{Context, Result};
use verinfo::{Dialect, VersionInfo};

fn dump_one(path: &str, dialect: Dialect) -> Result<()> {
    let mut file = File::open(path).with_context(|| format!("opening {path}"))?;
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut file, &mut bytes)
        .with_context(|| format!("reading {path}"))?;

    let mut stream = Cursor::new(bytes);
    let mut info = VersionInfo::new(dialect);
    info.read_from_stream(&mut stream)
        .with_context(|| format!("parsing VS_VERSIONINFO in {path}"))?;

    let ffi = info.get_fixed_file_info();
    println!("{path}:");
    println!(
        "  file version:    {}.{}.{}.{}",
        ffi.dw_file_version_ms >> 16,
        ffi.dw_file_version_ms & 0xFFFF,
        ffi.dw_file_version_ls >> 16,
        ffi.dw_file_version_ls & 0xFFFF
    );
    println!(
        "  product version: {}.{}.{}.{}",
        ffi.dw_product_version_ms >> 16,
        ffi.dw_product_version_ms & 0xFFFF,
        ffi.dw_product_version_ls >> 16,
        ffi.dw_product_version_ls & 0xFFFF
    );

    for t in 0..info.translation_count() {
        println!("  translation[{t}]: {}", info.translation_string(t)?);
    }

    for t in 0..info.string_table_count() {
        println!("  string table {}:", info.string_table_trans_string(t)?);
        for s in 0..info.string_count(t)? {
            println!(
                "    {} = {:?}",
                info.string_name(t, s)?,
                info.string_value(t, s)?
            );
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: verinfo-dump [--ansi16] <blob>...");
        exit(2);
    }

    let (dialect, paths) = match args[0].as_str() {
        "--ansi16" => (Dialect::Ansi16, &args[1..]),
        _ => (Dialect::Wide32, &args[..]),
    };

    if paths.is_empty() {
        eprintln!("usage: verinfo-dump [--ansi16] <blob>...");
        exit(2);
    }

    let mut failures = 0;
    for path in paths {
        if let Err(e) = dump_one(path, dialect) {
            eprintln!("ERROR: {e:#}");
            failures += 1;
        }
    }

    if failures > 0 {
        exit(1);
    }
}
