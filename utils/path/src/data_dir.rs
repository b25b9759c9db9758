use anyhow::Context;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const ORGANIZATION: &str = "Farmgate";
const QUALIFIER: &str = "";

/// Daemon data directory. Defaults to the platform data location (XDG
/// on Linux); `FromStr` lets it double as a CLI argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDir(PathBuf);

impl DataDir {
    pub fn new(app_name: &str) -> Self {
        DataDir(
            directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, app_name)
                .map(|dirs| dirs.data_dir().into())
                .unwrap_or_else(|| PathBuf::from(ORGANIZATION).join(app_name)),
        )
    }

    /// Creates the directory on first use and returns its canonical path.
    pub fn get_or_create(&self) -> anyhow::Result<PathBuf> {
        if !self.0.exists() {
            // the logger is not up yet at this point
            eprintln!("Creating data dir: {}", self.0.display());
            std::fs::create_dir_all(&self.0)
                .context(format!("data dir {:?} creation error", self))?;
        }
        Ok(self.0.canonicalize()?)
    }
}

impl FromStr for DataDir {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DataDir(PathBuf::from(s.trim_matches('"'))))
    }
}

impl fmt::Display for DataDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never quote here. Quotes leak into paths built from this value,
        // e.g. `"/home/user/.local/share/farmgate"/logs`.
        write!(f, "{}", self.0.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_trims_quotes() {
        let dir: DataDir = "\"/var/lib/farmgate\"".parse().unwrap();
        assert_eq!(dir, DataDir(PathBuf::from("/var/lib/farmgate")));
        assert_eq!(dir.to_string(), "/var/lib/farmgate");
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        let dir = DataDir::new("farmgate");
        assert!(dir.to_string().contains("farmgate"));
    }
}
