use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use pagesim::common::{Result, VmConfig};
use pagesim::mmu::Translator;
use pagesim::storage::FileBackingStore;
use pagesim::trace::AddressStream;

const DEFAULT_LOG_PATH: &str = "pagesim.log";

fn usage() -> String {
    "usage: pagesim <addresses> <backing-store> [log-output]".to_string()
}

fn run(addresses: PathBuf, backing_store: PathBuf, log_path: PathBuf) -> Result<()> {
    let config = VmConfig::default();
    let store = FileBackingStore::open(&backing_store)?;
    let mut translator = Translator::new(config, store)?;
    println!(
        "Translating {} against {}",
        addresses.display(),
        backing_store.display()
    );

    let stream = AddressStream::open(&addresses)?;
    let log_file = BufWriter::new(File::create(&log_path)?);
    let run = translator.replay(stream, log_file, |address, outcome| match outcome {
        Ok(translation) => println!("{}", translation),
        Err(e) => eprintln!("pagesim: skipped {}: {}", address, e),
    });

    println!("\n{}", translator.summary());
    let report = run?;
    if report.rejected > 0 {
        println!("\n{} addresses rejected", report.rejected);
    }
    println!("\nLog written to {}", log_path.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let (Some(addresses), Some(backing_store)) = (args.next(), args.next()) else {
        eprintln!("{}", usage());
        return ExitCode::from(2);
    };
    let log_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

    match run(addresses.into(), backing_store.into(), log_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pagesim: {}", e);
            ExitCode::FAILURE
        }
    }
}
