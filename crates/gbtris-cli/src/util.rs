use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use gbtris_driver::driver::DriverConfig;
use gbtris_engine::Board;
use gbtris_evaluator::weights::HeuristicWeights;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::open(path)?,
            None => Output::stdout(),
        };
        output.write_json(value)
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads a board in its text form (`#` occupied, `.` empty, one row per line).
pub fn read_board_file<P>(path: P) -> anyhow::Result<Board>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    text.parse()
        .with_context(|| format!("Failed to parse board file: {}", path.display()))
}

/// Reads heuristic weights, or returns the defaults when no file is given.
///
/// Missing fields keep their default value.
pub fn read_weights_file(path: Option<&Path>) -> anyhow::Result<HeuristicWeights> {
    path.map_or(Ok(HeuristicWeights::DEFAULT), |path| {
        read_json_file("weights", path)
    })
}

/// Reads the driver configuration, or returns the defaults when no file is given.
pub fn read_driver_config_file(path: Option<&Path>) -> anyhow::Result<DriverConfig> {
    path.map_or_else(|| Ok(DriverConfig::default()), |path| {
        read_json_file("driver config", path)
    })
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("gbtris-cli-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_board_file() {
        let path = temp_file("board.txt", "....\n.#..\n####\n");
        let board = read_board_file(&path).unwrap();
        assert_eq!((board.height(), board.width()), (3, 4));
        assert_eq!(board.occupied_count(), 5);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_ragged_board_file() {
        let path = temp_file("ragged.txt", "....\n...\n");
        let err = read_board_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse board file"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_weights_file() {
        assert_eq!(read_weights_file(None).unwrap(), HeuristicWeights::DEFAULT);

        let path = temp_file("weights.json", r#"{"holes": -1.0}"#);
        let weights = read_weights_file(Some(&path)).unwrap();
        assert_eq!(weights.holes, -1.0);
        assert_eq!(weights.bumpiness, HeuristicWeights::DEFAULT.bumpiness);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_driver_config_file() {
        let path = temp_file("driver.json", r#"{"poll_interval_ms": 20}"#);
        let config = read_driver_config_file(Some(&path)).unwrap();
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.timing.press_ms, 50);
        fs::remove_file(path).unwrap();

        assert!(read_driver_config_file(Some(Path::new("/nonexistent/driver.json"))).is_err());
    }
}
