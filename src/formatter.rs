use crate::lesson::Lesson;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicode_width::UnicodeWidthStr;
use uuid::{Builder, Uuid};

const RULE_WIDTH: usize = 60;

/// Trait for course output strategies
pub trait CourseFormatter {
    /// File extension used when no output path is given
    fn extension(&self) -> &'static str;

    /// Render the successfully composed lessons of a course
    fn format(&self, lessons: &[Lesson]) -> String;
}

/// Greedy word wrap by display width. Tokens are never split or reordered; a token wider
/// than `width` gets a line of its own.
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if !line.is_empty() && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

fn lesson_chars(lesson: &Lesson) -> String {
    if lesson.new_chars.is_empty() {
        "(review)".to_string()
    } else {
        lesson.title()
    }
}

/// Human readable course, one block per lesson
pub struct PlainTextFormatter {
    pub word_wrap: usize,
}

impl CourseFormatter for PlainTextFormatter {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn format(&self, lessons: &[Lesson]) -> String {
        lessons
            .iter()
            .map(|lesson| {
                format!(
                    "New characters: {}\n{}\n{}\n\n",
                    lesson_chars(lesson),
                    "-".repeat(RULE_WIDTH),
                    wrap(&lesson.text.render(), self.word_wrap)
                )
            })
            .join("")
    }
}

/// KTouch course document
pub struct XmlFormatter {
    pub word_wrap: usize,
    pub title_prefix: String,
    /// Makes the generated ids reproducible
    pub seed: Option<u64>,
}

impl XmlFormatter {
    pub fn new(word_wrap: usize, title_prefix: impl Into<String>) -> Self {
        Self {
            word_wrap,
            title_prefix: title_prefix.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn lesson_title(&self, lesson: &Lesson) -> String {
        if lesson.new_chars.is_empty() {
            format!("{}Review {}", self.title_prefix, lesson.step + 1)
        } else {
            format!("{}{}", self.title_prefix, lesson.title())
        }
    }
}

impl CourseFormatter for XmlFormatter {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn format(&self, lessons: &[Lesson]) -> String {
        let mut ids = IdSource::new(self.seed);
        let course_id = ids.next_id().to_string();

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\"?>\n<course>\n");
        out.push_str(&format!("    <id>{{{course_id}}}</id>\n"));
        out.push_str(&format!(
            "    <title>KTouch-Generator-{}</title>\n",
            &course_id[..8]
        ));
        out.push_str("    <description></description>\n");
        out.push_str("    <keyboardLayout></keyboardLayout>\n");
        out.push_str("    <lessons>\n");
        for lesson in lessons {
            out.push_str("        <lesson>\n");
            out.push_str(&format!("            <id>{{{}}}</id>\n", ids.next_id()));
            out.push_str(&format!(
                "            <title>{}</title>\n",
                escape_xml(&self.lesson_title(lesson))
            ));
            out.push_str(&format!(
                "            <newCharacters>{}</newCharacters>\n",
                escape_xml(&lesson.title())
            ));
            out.push_str(&format!(
                "            <text>{}</text>\n",
                escape_xml(&wrap(&lesson.text.render(), self.word_wrap))
            ));
            out.push_str("        </lesson>\n");
        }
        out.push_str("    </lessons>\n</course>\n");
        out
    }
}

/// Random v4 ids, drawn from a seeded generator when one is given
enum IdSource {
    Random,
    Seeded(StdRng),
}

impl IdSource {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => IdSource::Seeded(StdRng::seed_from_u64(seed)),
            None => IdSource::Random,
        }
    }

    fn next_id(&mut self) -> Uuid {
        match self {
            IdSource::Random => Uuid::new_v4(),
            IdSource::Seeded(rng) => Builder::from_random_bytes(rng.gen()).into_uuid(),
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
