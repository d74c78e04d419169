use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use audioprep_rs::{CorpusBatcher, MfccParams, PhonemeDict};

#[derive(Parser, Debug)]
#[command(about = "Prepare speech-corpus batches and print per-batch summaries", version)]
struct Args {
    /// Corpus root directory (author/chapter layout)
    root: PathBuf,

    /// Audio format to read, converting from the origin format when absent
    #[arg(long, default_value = "wav")]
    format: String,

    /// Format converted from when the requested format is missing
    #[arg(long, default_value = "flac")]
    origin_format: String,

    /// Pronunciation dictionary file (bundled dictionary when omitted)
    #[arg(long)]
    dict: Option<PathBuf>,

    /// Phoneme table file the dictionary is written against (bundled table
    /// when omitted)
    #[arg(long)]
    phonemes: Option<PathBuf>,

    /// Number of batches to produce; defaults to one full epoch
    #[arg(long)]
    batches: Option<usize>,

    /// Cepstral coefficients per frame
    #[arg(long, default_value_t = 12)]
    num_ceps: usize,
}

#[derive(Serialize)]
struct UtteranceSummary {
    id: String,
    phonemes: usize,
    frames: usize,
}

#[derive(Serialize)]
struct BatchSummary {
    batch: usize,
    utterances: Vec<UtteranceSummary>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut batcher = CorpusBatcher::new(&args.root)?;
    batcher.set_conversion_formats(&args.origin_format, &args.format);
    batcher.set_mfcc_params(MfccParams {
        num_ceps: args.num_ceps,
        ..MfccParams::default()
    });
    if args.dict.is_some() || args.phonemes.is_some() {
        batcher.set_dict(PhonemeDict::load(
            args.dict.as_deref(),
            args.phonemes.as_deref(),
        )?);
    }

    let count = args.batches.unwrap_or_else(|| batcher.author_count());
    for n in 0..count {
        let batch = batcher.next_batch_as(&args.format)?;

        let mut utterances: Vec<UtteranceSummary> = batch
            .iter()
            .map(|(id, prepared)| UtteranceSummary {
                id: id.clone(),
                phonemes: prepared.phonemes.len(),
                frames: prepared.features.nrows(),
            })
            .collect();
        utterances.sort_by(|a, b| a.id.cmp(&b.id));

        send_summary(&BatchSummary { batch: n, utterances })?;
    }

    Ok(())
}

fn send_summary(summary: &BatchSummary) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, summary)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
