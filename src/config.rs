//! Environment-driven configuration: listen port, database directory, test mode.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Directory holding one `<name>.db` file per named database.
    pub data_dir: PathBuf,
    /// When set, a single shared in-memory handle replaces per-request file
    /// handles and filesystem enumeration returns mock data.
    pub test_mode: bool,
}

impl Config {
    /// Read `PORT` (default 3000), `DATA_DIR` (default `./dbs`) and
    /// `TEST_MODE` from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./dbs"));
        let test_mode = std::env::var("TEST_MODE")
            .map(|v| flag_enabled(&v))
            .unwrap_or(false);
        Config {
            port,
            data_dir,
            test_mode,
        }
    }
}

fn flag_enabled(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::flag_enabled;

    #[test]
    fn flag_accepts_one_and_true() {
        assert!(flag_enabled("1"));
        assert!(flag_enabled("true"));
        assert!(flag_enabled("TRUE"));
        assert!(!flag_enabled("0"));
        assert!(!flag_enabled("yes"));
        assert!(!flag_enabled(""));
    }
}
