use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sentence_context::transforms::{Lowercase, Tokenize, Transform, WhitespaceTokenize};
use sentence_context::vocab::DEFAULT_UNK_TOKEN;
use sentence_context::{CorpusEnumerator, SamplerConfig, Vocabulary, WindowedContrastiveSampler};
use std::path::PathBuf;
use std::sync::Arc;

/// Turn section-tagged TSV corpora into contrastive sentence-context batches.
#[derive(Parser)]
#[command(name = "sentence-context", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read the corpus once and report document and sentence counts
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Run the sampler over the corpus and report batch counts
    Batches {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Vocabulary file (JSON object or one token per line)
        #[arg(long)]
        vocab: PathBuf,
        /// Token standing for out-of-vocabulary words
        #[arg(long, default_value = DEFAULT_UNK_TOKEN)]
        unk_token: String,
        /// JSON sampler config; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        n_negative: Option<usize>,
        #[arg(long)]
        seq_length: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of passes over the corpus
        #[arg(long, default_value_t = 1)]
        epochs: usize,
    },
}

#[derive(Args)]
struct CorpusArgs {
    /// A corpus file or a directory of corpus files
    source: PathBuf,
    /// Read at most this many files per pass
    #[arg(long)]
    limit: Option<usize>,
    /// HuggingFace tokenizer.json; defaults to lowercase whitespace splitting
    #[arg(long)]
    tokenizer: Option<PathBuf>,
}

impl CorpusArgs {
    fn open(&self) -> Result<CorpusEnumerator<Box<dyn Transform<String, Vec<String>>>>> {
        let preprocess: Box<dyn Transform<String, Vec<String>>> = match &self.tokenizer {
            Some(path) => Box::new(Tokenize::from_file(path)?),
            None => Box::new(Lowercase.then(WhitespaceTokenize)),
        };
        Ok(CorpusEnumerator::new(&self.source, preprocess)?.with_limit(self.limit))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentence_context=info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Stats { corpus } => {
            let mut enumerator = corpus.open()?;
            let mut documents = 0usize;
            for document in enumerator.documents() {
                document?;
                documents += 1;
            }
            let snapshot = enumerator.stats().snapshot();
            println!("documents:        {}", documents);
            println!("sentences:        {}", snapshot.sentences);
            println!("usable estimate:  {}", snapshot.usable_sentences);
        }
        Command::Batches {
            corpus,
            vocab,
            unk_token,
            config,
            batch_size,
            n_negative,
            seq_length,
            seed,
            epochs,
        } => {
            let mut sampler_config = match config {
                Some(path) => SamplerConfig::from_json_file(path)?,
                None => SamplerConfig::default(),
            };
            if let Some(v) = batch_size {
                sampler_config.batch_size = v;
            }
            if let Some(v) = n_negative {
                sampler_config.n_negative = v;
            }
            if let Some(v) = seq_length {
                sampler_config.seq_length = v;
            }
            if let Some(v) = seed {
                sampler_config.seed = v;
            }

            let vocab = Arc::new(Vocabulary::from_file(&vocab, &unk_token)?);
            let mut enumerator = corpus.open()?;
            let mut sampler = WindowedContrastiveSampler::new(sampler_config, vocab)?;

            for epoch in 0..epochs {
                let mut batches = 0usize;
                for batch in sampler.batches(enumerator.documents()) {
                    batch?;
                    batches += 1;
                }
                let stats = sampler.stats();
                println!(
                    "epoch {}: {} batches (valid positions {}, invalid positions {})",
                    epoch, batches, stats.valid, stats.invalid
                );
            }
        }
    }
    Ok(())
}
