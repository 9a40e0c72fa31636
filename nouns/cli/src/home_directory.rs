use std::path::PathBuf;

/// Where the client keeps its configuration. Nothing fetched from the network
/// is written here.
pub struct HomeDirectory {
    home: PathBuf,
}

impl HomeDirectory {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    /// `home` if given, otherwise `~/.nouns`.
    pub fn new_or_default(home: Option<PathBuf>) -> anyhow::Result<Self> {
        match home {
            Some(home) => Ok(Self::new(home)),
            None => {
                let home = home::home_dir()
                    .ok_or_else(|| anyhow::anyhow!("failed to find the home directory"))?;

                Ok(Self::new(home.join(".nouns")))
            },
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join("app.toml")
    }
}
