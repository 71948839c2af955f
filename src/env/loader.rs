use super::{parse::parse_line, EnvStore};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{debug, info, warn};

/// Well-known location of the local secrets file, relative to the working
/// directory.
pub const LOCAL_ENV_PATH: &str = ".env/sprout.env";

/// What a load pass did. Purely informational; loading never fails.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Whether the secrets file existed
    pub found: bool,
    /// Keys written to the store, in file order
    pub applied: Vec<String>,
    /// Keys found in the file but left alone because they were already set
    pub preserved: Vec<String>,
    /// Malformed lines that were ignored
    pub skipped_lines: usize,
}

impl LoadReport {
    /// True when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Load `.env/sprout.env` into `store` without overriding anything already
/// set.
///
/// A missing file is the normal case on hosted machines where secrets are
/// injected directly, and is a silent no-op. Calling this more than once is
/// harmless: values set by an earlier call are themselves never overridden.
pub fn load_local_environment<S: EnvStore + ?Sized>(store: &mut S) -> LoadReport {
    load_env_file(Path::new(LOCAL_ENV_PATH), store)
}

/// Load a dotenv-style file at `path` into `store`.
///
/// Every physical line is parsed on its own (see [`parse_line`]). Parse
/// policy is skip-and-continue: a line that cannot be parsed is logged,
/// counted and skipped, and the remaining lines are still applied. A read
/// failure stops the pass but keeps whatever was applied before it.
/// `${NAME}` references resolve against `store`, so earlier lines and
/// existing variables are visible to later ones.
pub fn load_env_file<S: EnvStore + ?Sized>(path: &Path, store: &mut S) -> LoadReport {
    let mut report = LoadReport::default();

    if !path.exists() {
        debug!(path = %path.display(), "No local secrets file; nothing to load");
        return report;
    }
    report.found = true;

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Could not open secrets file");
            return report;
        }
    };

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_number = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = line_number,
                    error = %err,
                    "Stopped reading secrets file"
                );
                break;
            }
        };

        match parse_line(&line, |name| store.get(name)) {
            Ok(None) => {}
            Ok(Some((key, value))) => {
                if store.contains(&key) {
                    debug!(key = %key, "Keeping existing value");
                    report.preserved.push(key);
                } else {
                    store.set(&key, &value);
                    report.applied.push(key);
                }
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = line_number,
                    error = %err,
                    "Skipping malformed line"
                );
                report.skipped_lines += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        applied = report.applied.len(),
        preserved = report.preserved.len(),
        skipped = report.skipped_lines,
        "Loaded local secrets"
    );

    report
}
