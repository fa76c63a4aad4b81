//! Magic comments: `# @name:`, `# @description:`, `# @default:`, `# @required:`.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::EnumString;

static MAGIC_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*@([A-Za-z]+):(.*)$").expect("magic comment pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    Name,
    Description,
    Default,
    Required,
}

/// Parses one raw comment line. Returns `None` for plain prose, unknown
/// tags and lines without a colon.
pub fn parse_magic_comment(line: &str) -> Option<(Tag, String)> {
    let captures = MAGIC_COMMENT.captures(line.trim())?;
    let tag = Tag::from_str(captures.get(1)?.as_str()).ok()?;
    let value = captures.get(2)?.as_str().trim();
    Some((tag, value.to_string()))
}

/// Metadata resolved for one expanded item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    pub required: bool,
}

/// Per-tag positional queues built from one comment run.
///
/// The Nth expanded item of an instruction reads the Nth fragment of every
/// queue. There is no name-based matching.
#[derive(Debug, Clone, Default)]
pub struct AnnotationQueue {
    names: Vec<String>,
    descriptions: Vec<String>,
    defaults: Vec<String>,
    required: Vec<String>,
}

impl AnnotationQueue {
    pub fn from_comments<S: AsRef<str>>(comments: &[S]) -> Self {
        let mut queue = Self::default();
        for (tag, value) in comments
            .iter()
            .filter_map(|line| parse_magic_comment(line.as_ref()))
        {
            match tag {
                Tag::Name => queue.names.push(value),
                Tag::Description => queue.descriptions.push(value),
                Tag::Default => queue.defaults.push(value),
                Tag::Required => queue.required.push(value),
            }
        }
        queue
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.descriptions.is_empty()
            && self.defaults.is_empty()
            && self.required.is_empty()
    }

    pub fn annotation_at(&self, index: usize) -> Annotation {
        Annotation {
            name: self.names.get(index).cloned(),
            description: self.descriptions.get(index).cloned(),
            default: self.defaults.get(index).cloned(),
            required: self.required.get(index).is_some_and(|v| v == "true"),
        }
    }
}
