use crate::error::SourceLoadError;
use camino::Utf8Path;
use fs_err as fs;
use std::collections::BTreeMap;
use tracing::info;

/// Popularity-contest vote counts by package.
#[derive(Debug, Clone, Default)]
pub struct Popcon {
    votes: BTreeMap<String, u64>,
}

impl Popcon {
    pub fn load(path: &Utf8Path) -> Result<Self, SourceLoadError> {
        info!(path = %path, "loading popcon votes");
        let contents = fs::read_to_string(path).map_err(|e| SourceLoadError::io(path, e))?;
        Self::parse(path, &contents)
    }

    /// Parse the `rank name inst vote ...` table. `#` lines are comments and the table ends at
    /// the first line starting with `-` (the totals separator).
    pub fn parse(path: &Utf8Path, contents: &str) -> Result<Self, SourceLoadError> {
        let mut votes = BTreeMap::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if line.starts_with('-') {
                break;
            }
            let malformed = || SourceLoadError::Popcon {
                path: path.to_path_buf(),
                line_no: idx + 1,
                line: line.to_string(),
            };
            let mut fields = line.split_whitespace();
            let (Some(_rank), Some(name), Some(_inst), Some(vote)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            let vote: u64 = vote.parse().map_err(|_| malformed())?;
            votes.insert(name.to_string(), vote);
        }
        Ok(Self { votes })
    }

    pub fn votes(&self, pkg: &str) -> Option<u64> {
        self.votes.get(pkg).copied()
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#Format
#rank name inst vote old recent no-files (maintainer)
1     dpkg  171000 160000 5000 2000 4000 (Dpkg Developers)
2     vim   90000  40000  30000 1000 19000 (Debian Vim Maintainers)
---------------------------------------------------
500   Total 171000
";

    #[test]
    fn reads_votes_until_totals() {
        let p = Popcon::parse(Utf8Path::new("popcon"), SAMPLE).unwrap();
        assert_eq!(p.votes("vim"), Some(40000));
        assert_eq!(p.votes("Total"), None);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn short_line_is_an_error() {
        let err = Popcon::parse(Utf8Path::new("popcon"), "1 vim\n").unwrap_err();
        assert!(matches!(err, SourceLoadError::Popcon { line_no: 1, .. }));
    }
}
