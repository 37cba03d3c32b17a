use crate::error::AprioriError;
use crate::parse::parse_rule_line;
use crate::preset::{MiningParams, MiningPreset};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tagfix_types::{DatabaseParseError, Rule, TagDatabase, TagSet};
use tracing::{debug, info};

/// Exit codes treated as success: 0, and 15 ("no frequent items").
pub const ACCEPTED_EXIT_CODES: [i32; 2] = [0, 15];

static CORPUS_EXCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:special::.+|.+:special:.+|.+:TODO|.+:todo)$").expect("static regex")
});

/// Read a tag database for mining, dropping bookkeeping and placeholder tags.
pub fn read_mining_corpus(path: &Utf8Path) -> Result<TagDatabase, DatabaseParseError> {
    TagDatabase::load_filtered(path, |tag| !CORPUS_EXCLUDE.is_match(tag))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AprioriConfig {
    pub program: Utf8PathBuf,
    /// Discard the miner's stderr.
    pub quiet: bool,
    /// Only tags carried by at least this many packages are mined. 0 disables the cut.
    pub card_threshold: usize,
    pub preset: MiningPreset,
}

impl Default for AprioriConfig {
    fn default() -> Self {
        Self {
            program: Utf8PathBuf::from("./apriori"),
            quiet: false,
            card_threshold: 30,
            preset: MiningPreset::Standard,
        }
    }
}

/// Driver for one mining run.
#[derive(Debug, Clone)]
pub struct Apriori {
    config: AprioriConfig,
    params: MiningParams,
}

impl Apriori {
    pub fn new(config: AprioriConfig) -> Self {
        let params = config.preset.params();
        Self { config, params }
    }

    /// Use explicit parameters instead of the configured preset.
    pub fn with_params(config: AprioriConfig, params: MiningParams) -> Self {
        Self { config, params }
    }

    pub fn config(&self) -> &AprioriConfig {
        &self.config
    }

    pub fn params(&self) -> &MiningParams {
        &self.params
    }

    /// Arguments passed after the program name.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-tr".to_string()];
        args.extend(self.params.args());
        args.push("-".to_string());
        args.push("-".to_string());
        args
    }

    /// Tags frequent enough to be mined, or `None` when no cut applies.
    pub fn tag_whitelist(&self, db: &TagDatabase) -> Option<TagSet> {
        if self.config.card_threshold == 0 {
            return None;
        }
        Some(
            db.iter_tags_packages()
                .filter(|(_, pkgs)| pkgs.len() >= self.config.card_threshold)
                .map(|(tag, _)| tag.clone())
                .collect(),
        )
    }

    /// One transaction line per package. Packages left with no tags are skipped.
    pub fn corpus_lines(&self, db: &TagDatabase) -> Vec<String> {
        let whitelist = self.tag_whitelist(db);
        db.iter_packages_tags()
            .filter_map(|(_, tags)| {
                let line = tags
                    .iter()
                    .filter(|t| whitelist.as_ref().is_none_or(|w| w.contains(*t)))
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                (!line.is_empty()).then_some(line)
            })
            .collect()
    }

    /// Run the miner over `db` and return the rules that pass the filter.
    pub fn run(&self, db: &TagDatabase) -> Result<Vec<Rule>, AprioriError> {
        let program = &self.config.program;
        let lines = self.corpus_lines(db);
        info!(
            program = %program,
            transactions = lines.len(),
            "running association rule miner"
        );

        let mut child = Command::new(program.as_std_path())
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.config.quiet {
                Stdio::null()
            } else {
                Stdio::inherit()
            })
            .spawn()
            .map_err(|e| AprioriError::Spawn {
                program: program.clone(),
                message: e.to_string(),
            })?;

        let io_err = |e: io::Error| AprioriError::Io {
            program: program.clone(),
            message: e.to_string(),
        };
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io_err(io::Error::other("stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_err(io::Error::other("stdout not captured")))?;

        // The writer runs beside the reader so a chatty miner cannot deadlock on a full pipe.
        let (written, read) = std::thread::scope(|s| {
            let writer = s.spawn(|| feed(stdin, &lines));
            let read = collect_rules(BufReader::new(stdout), &self.params);
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("corpus writer panicked")));
            (written, read)
        });

        let status = child.wait().map_err(io_err)?;
        match status.code() {
            Some(code) if ACCEPTED_EXIT_CODES.contains(&code) => {}
            Some(code) => {
                return Err(AprioriError::ExitStatus {
                    program: program.clone(),
                    code,
                });
            }
            None => {
                return Err(AprioriError::Killed {
                    program: program.clone(),
                });
            }
        }
        match written {
            // the miner may stop reading once it decides there is nothing to find
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(io_err(e)),
            _ => {}
        }
        let rules = read.map_err(io_err)?;
        debug!(rules = rules.len(), "miner finished");
        Ok(rules)
    }
}

fn feed(stdin: impl Write, lines: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(stdin);
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

fn collect_rules(reader: impl BufRead, params: &MiningParams) -> io::Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for line in reader.lines() {
        if let Some(rule) = parse_rule_line(&line?)
            && params.filter.accepts(&rule)
        {
            rules.push(rule);
        }
    }
    Ok(rules)
}
