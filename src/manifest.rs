use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::PathBuf;

/// Line shapes recognized in a manifest. Anything else is ignored.
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const REFERENCE_PREFIX: &str = "<In FileName=\"";
const REFERENCE_SUFFIX: &str = "\" Lumi=\"0.0\"/>";

/// Lazy iterator over the ntuple paths referenced by one manifest file.
///
/// The file is opened on the first `next()` call, not on construction, so
/// an unreadable file fails when the sequence is consumed rather than when
/// the tree is walked. Open and read errors surface as a single `Err` item
/// and end the sequence.
///
/// This is deliberately not an XML parser. Manifests are matched line by
/// line against the exact literal shapes above; a reference line whose
/// `Lumi` attribute differs from `0.0` yields its path with the unmatched
/// markup still attached.
pub struct ManifestReferences {
    state: State,
    in_comment: bool,
}

enum State {
    Unopened(PathBuf),
    Reading(Lines<BufReader<File>>),
    Done,
}

impl ManifestReferences {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            state: State::Unopened(path.into()),
            in_comment: false,
        }
    }
}

impl Iterator for ManifestReferences {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Unopened(path) => {
                    let path = std::mem::take(path);
                    match File::open(&path) {
                        Ok(file) => {
                            self.state = State::Reading(BufReader::new(file).lines());
                        }
                        Err(e) => {
                            self.state = State::Done;
                            return Some(Err(e));
                        }
                    }
                }
                State::Reading(lines) => match lines.next() {
                    Some(Ok(line)) => {
                        if let Some(path) = scan_line(&line, &mut self.in_comment) {
                            return Some(Ok(path));
                        }
                    }
                    Some(Err(e)) => {
                        self.state = State::Done;
                        return Some(Err(e));
                    }
                    None => {
                        self.state = State::Done;
                        return None;
                    }
                },
                State::Done => return None,
            }
        }
    }
}

/// Evaluate one manifest line against the comment state and the reference
/// template. Check order matters: a comment opened and closed on the same
/// line leaves the flag clear, and the skip check runs before the
/// reference test.
fn scan_line(line: &str, in_comment: &mut bool) -> Option<String> {
    if line.starts_with(COMMENT_OPEN) {
        *in_comment = true;
    }
    if line.ends_with(COMMENT_CLOSE) {
        *in_comment = false;
    }
    if *in_comment {
        return None;
    }
    if !line.starts_with(REFERENCE_PREFIX) {
        return None;
    }
    Some(
        line.trim()
            .replace(REFERENCE_PREFIX, "")
            .replace(REFERENCE_SUFFIX, ""),
    )
}
