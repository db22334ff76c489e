use clap::{ArgAction, Parser, ValueEnum};
use keystep::{
    charlist::read_charlist,
    config::{Config, ConfigStore, FileConfigStore},
    dictionary::Dictionary,
    error::LessonError,
    formatter::{CourseFormatter, PlainTextFormatter, XmlFormatter},
    lesson::{CourseBuilder, DictionaryIndex, Lesson},
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::{
    error::Error,
    fs,
    io::{self, Write},
    path::PathBuf,
};
use tracing::Level;

/// generate progressive touch-typing lessons from a list of characters
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "keystep",
    version,
    about,
    long_about = "Generate one typing lesson per line of <CHARSLIST>. Each lesson drills the characters its line introduces together with everything learned before, using words from <DICTIONARY> or, without one, random letter combinations."
)]
pub struct Cli {
    /// file with the new characters of each lesson, one lesson per line
    charslist: PathBuf,

    /// word list to build lessons from (plain text, or a JSON word list)
    dictionary: Option<PathBuf>,

    /// only generate the lesson on this line of the character list (1-based)
    #[clap(short = 'n', long)]
    lesson_number: Option<usize>,

    /// output file, `-` for stdout [default: lessons.xml/txt, or the lesson characters]
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// output format
    #[clap(short = 'f', long, value_enum, default_value_t = OutputFormat::Xml)]
    format: OutputFormat,

    /// shorthand for `--format plain-text`
    #[clap(short = 'p', long)]
    plain_text: bool,

    /// wrap lesson text at this width
    #[clap(short = 'w', long)]
    word_wrap: Option<usize>,

    /// soft cap on the number of characters in a lesson
    #[clap(short = 'l', long)]
    characters_per_lesson: Option<usize>,

    /// shortest dictionary word to use
    #[clap(long)]
    min_word_length: Option<usize>,

    /// longest dictionary word to use
    #[clap(long)]
    max_word_length: Option<usize>,

    /// symbols per word
    #[clap(long)]
    symbols_density: Option<f64>,

    /// numbers per word
    #[clap(long)]
    numbers_density: Option<f64>,

    /// share of symbols taken from earlier lessons
    #[clap(long)]
    previous_symbols_fraction: Option<f64>,

    /// share of numbers built from earlier lessons' digits
    #[clap(long)]
    previous_numbers_fraction: Option<f64>,

    /// share of words that only use characters from earlier lessons
    #[clap(long)]
    previous_words_fraction: Option<f64>,

    /// only use this lesson's symbols
    #[clap(long)]
    no_previous_symbols: bool,

    /// only use this lesson's digits
    #[clap(long)]
    no_previous_numbers: bool,

    /// longest generated number
    #[clap(long)]
    max_number_length: Option<usize>,

    /// longest generated letter combination
    #[clap(long)]
    max_letters_combination_length: Option<usize>,

    /// prefer words with the rarest new letters
    #[clap(long)]
    balance_words: bool,

    /// keep the dictionary in file order instead of shuffling it
    #[clap(long)]
    no_shuffle_dict: bool,

    /// prefix for lesson titles in XML output
    #[clap(long)]
    title_prefix: Option<String>,

    /// seed for every random choice, for reproducible courses
    #[clap(long)]
    seed: Option<u64>,

    /// store the resolved options as defaults for later runs
    #[clap(long)]
    save_defaults: bool,

    /// more logging (repeat for more)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// only log errors
    #[clap(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum OutputFormat {
    Xml,
    PlainText,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.plain_text {
            OutputFormat::PlainText
        } else {
            self.format
        }
    }

    fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, 2) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }

    /// Layer the command line over the stored defaults
    fn apply_to(&self, config: &mut Config) {
        let lesson = &mut config.lesson;
        if let Some(v) = self.characters_per_lesson {
            lesson.characters_per_lesson = v;
        }
        if let Some(v) = self.min_word_length {
            lesson.min_word_length = v;
        }
        if let Some(v) = self.max_word_length {
            lesson.max_word_length = v;
        }
        if let Some(v) = self.symbols_density {
            lesson.symbols_density = v;
        }
        if let Some(v) = self.numbers_density {
            lesson.numbers_density = v;
        }
        if let Some(v) = self.previous_symbols_fraction {
            lesson.previous_symbols_fraction = v;
        }
        if let Some(v) = self.previous_numbers_fraction {
            lesson.previous_numbers_fraction = v;
        }
        if let Some(v) = self.previous_words_fraction {
            lesson.previous_words_fraction = v;
        }
        if self.no_previous_symbols {
            lesson.previous_symbols_fraction = 0.0;
        }
        if self.no_previous_numbers {
            lesson.previous_numbers_fraction = 0.0;
        }
        if let Some(v) = self.max_number_length {
            lesson.max_number_length = v;
        }
        if let Some(v) = self.max_letters_combination_length {
            lesson.max_combination_length = v;
        }
        if self.balance_words {
            lesson.balance_words = true;
        }
        if let Some(v) = self.word_wrap {
            config.word_wrap = v;
        }
        if let Some(prefix) = &self.title_prefix {
            config.title_prefix = prefix.clone();
        }
        if self.no_shuffle_dict {
            config.shuffle_dictionary = false;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cli.log_level())
        .init();

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    config.lesson.validate().map_err(LessonError::InvalidOptions)?;
    if config.word_wrap == 0 {
        return Err(LessonError::InvalidOptions("word wrap must be at least 1".to_string()).into());
    }
    if cli.save_defaults {
        store.save(&config)?;
        tracing::info!("saved defaults to {}", store.path().display());
    }

    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::debug!("base seed {seed}");

    let lessons = read_charlist(&cli.charslist, &config.lesson)?;

    let dictionary = match &cli.dictionary {
        Some(path) => {
            let mut dictionary = Dictionary::load(path)?;
            if config.shuffle_dictionary {
                dictionary.shuffle(&mut StdRng::seed_from_u64(seed));
            }
            Some(dictionary)
        }
        None => None,
    };
    let index = dictionary
        .as_ref()
        .map(|d| DictionaryIndex::build(&d.words, &lessons, !config.shuffle_dictionary));

    let builder = CourseBuilder::new(&lessons, index.as_ref()).with_seed(seed);
    let composed: Vec<Lesson> = match cli.lesson_number {
        Some(line) => vec![builder.build_line(line)?],
        None => builder.build_all().into_iter().flatten().collect(),
    };
    if composed.len() < lessons.len() && cli.lesson_number.is_none() {
        tracing::warn!(
            "{} of {} lessons could not be generated",
            lessons.len() - composed.len(),
            lessons.len()
        );
    }

    let formatter: Box<dyn CourseFormatter> = match cli.output_format() {
        OutputFormat::Xml => Box::new(
            XmlFormatter::new(config.word_wrap, config.title_prefix.clone()).with_seed(seed),
        ),
        OutputFormat::PlainText => Box::new(PlainTextFormatter {
            word_wrap: config.word_wrap,
        }),
    };
    let document = formatter.format(&composed);

    let output = output_path(&cli, &composed, formatter.extension());
    if output.as_os_str() == "-" {
        io::stdout().write_all(document.as_bytes())?;
    } else {
        fs::write(&output, document)?;
        tracing::info!(
            "wrote {} lessons as {} to {}",
            composed.len(),
            cli.output_format(),
            output.display()
        );
    }

    Ok(())
}

/// `-o` when given; otherwise `lessons.<ext>` for a course, or the lesson's characters for a
/// single lesson
fn output_path(cli: &Cli, composed: &[Lesson], extension: &str) -> PathBuf {
    if let Some(path) = &cli.output {
        return path.clone();
    }
    match (cli.lesson_number, composed.first()) {
        (Some(n), Some(lesson)) => {
            let stem: String = lesson
                .new_chars
                .iter()
                .filter(|c| c.is_alphanumeric())
                .collect();
            if stem.is_empty() {
                PathBuf::from(format!("lesson-{n}.{extension}"))
            } else {
                PathBuf::from(format!("{stem}.{extension}"))
            }
        }
        _ => PathBuf::from(format!("lessons.{extension}")),
    }
}
