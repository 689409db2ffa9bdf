use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Args, Parser, Subcommand};
use hmmtagger::{pipeline::tag_or_fallback, read_sentences, tag_corpus, Dataset, DecoderConfig, Evaluation, Model, Result};

/// Train a first-order HMM part-of-speech tagger and tag sentences with it
#[derive(Debug, Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Argv {
    /// log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// estimate a model from a tagged corpus (word<TAB>tag per line) and write it as JSON
    Train {
        #[arg(short, long, value_name = "FILE")]
        corpus: PathBuf,
        /// write the model to this file
        #[arg(short, long, value_name = "MODEL")]
        model: PathBuf,
    },
    /// tag sentences given one word per line, with a blank line between sentences
    Tag {
        #[command(flatten)]
        source: ModelSource,
        #[command(flatten)]
        decoder: DecoderArgs,
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
        /// write word<TAB>tag lines to this file instead of STDOUT
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// report the performance of the model on a tagged corpus
    Evaluate {
        #[command(flatten)]
        source: ModelSource,
        #[command(flatten)]
        decoder: DecoderArgs,
        #[arg(short, long, value_name = "FILE")]
        test: PathBuf,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ModelSource {
    /// read a model written by `train`
    #[arg(short, long, value_name = "MODEL")]
    model: Option<PathBuf>,
    /// train a model on this tagged corpus first
    #[arg(short, long, value_name = "FILE")]
    corpus: Option<PathBuf>,
}

impl ModelSource {
    fn load(&self) -> Result<Model> {
        match (&self.model, &self.corpus) {
            (Some(path), _) => Model::from_path(path),
            (None, Some(path)) => Model::from_reader(BufReader::new(File::open(path)?)),
            (None, None) => unreachable!("clap requires one model source"),
        }
    }
}

#[derive(Debug, Args)]
struct DecoderArgs {
    /// read decoder settings from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// probability assumed for transitions and emissions never seen in training
    #[arg(long)]
    floor: Option<f64>,
    /// tag used when no tag can be recovered (default: most frequent training tag)
    #[arg(long)]
    fallback: Option<String>,
}

impl DecoderArgs {
    fn resolve(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => DecoderConfig::from_path(path)?,
            None => DecoderConfig::default(),
        };
        if let Some(floor) = self.floor {
            config = config.with_floor(floor);
        }
        if let Some(tag) = &self.fallback {
            config = config.with_fallback(tag.as_str());
        }
        config.validate()?;
        log::debug!("{:?}", config);
        Ok(config)
    }
}

fn train(corpus: &Path, path: &Path) -> Result<()> {
    let model = Model::from_reader(BufReader::new(File::open(corpus)?))?;
    model.dump(path)
}

fn tag(source: &ModelSource, decoder: &DecoderArgs, input: &Path, output: Option<&Path>) -> Result<()> {
    let model = source.load()?;
    let mut tagger = model.tagger(&decoder.resolve()?)?;
    let sentences = read_sentences(BufReader::new(File::open(input)?))?;
    let begin = Instant::now();
    let mut w: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let summary = tag_corpus(&mut tagger, &sentences, &mut w)?;
    w.flush()?;
    log::info!(
        "tagged {} sentences ({} tokens, {} failed) in {:?}",
        summary.sentences,
        summary.tokens,
        summary.failures,
        begin.elapsed()
    );
    Ok(())
}

fn evaluate(source: &ModelSource, decoder: &DecoderArgs, test: &Path) -> Result<()> {
    let model = source.load()?;
    let mut tagger = model.tagger(&decoder.resolve()?)?;
    let dataset = Dataset::try_from(File::open(test)?)?;
    let mut evaluation = Evaluation::default();
    let begin = Instant::now();
    for (i, sentence) in dataset.iter().enumerate() {
        let (prediction, _) = tag_or_fallback(&mut tagger, i, &sentence.words);
        evaluation.accumulate(&sentence.tags, &prediction);
    }
    evaluation.evaluate();
    print!("{}", evaluation);
    let elapsed = begin.elapsed();
    println!(
        "Elapsed time: {:.6} [sec] ({:.1} [sentence/sec])",
        elapsed.as_secs_f64(),
        dataset.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn main() -> ExitCode {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("argv: {:?}", argv);

    let result = match &argv.command {
        Command::Train { corpus, model } => train(corpus, model),
        Command::Tag { source, decoder, input, output } => tag(source, decoder, input, output.as_deref()),
        Command::Evaluate { source, decoder, test } => evaluate(source, decoder, test),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
