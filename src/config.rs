use std::path::PathBuf;

/// Runtime settings, read from the environment (and `.env` in debug builds).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub snapshot_file: String,
}

impl Config {
    pub fn from_env() -> Self {
        fn str_env(name: &str, default: &str) -> String {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        }
        Self {
            data_dir: PathBuf::from(str_env("THICKET_DATA_DIR", "data")),
            snapshot_file: str_env("THICKET_SNAPSHOT", "platform.json"),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_when_unset() {
        std::env::remove_var("THICKET_DATA_DIR");
        std::env::remove_var("THICKET_SNAPSHOT");
        let cfg = Config::from_env();
        assert_eq!(cfg.snapshot_path(), PathBuf::from("data").join("platform.json"));
    }

    #[test]
    #[serial]
    fn env_overrides() {
        std::env::set_var("THICKET_DATA_DIR", "/tmp/thicket-test");
        std::env::set_var("THICKET_SNAPSHOT", "state.json");
        let cfg = Config::from_env();
        assert_eq!(cfg.snapshot_path(), PathBuf::from("/tmp/thicket-test/state.json"));
        std::env::remove_var("THICKET_DATA_DIR");
        std::env::remove_var("THICKET_SNAPSHOT");
    }
}
